use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::{
    atomic::{AtomicPtr, Ordering},
    Arc,
};

use crate::{
    config::Config, constant::SPONSOR_PRIVATE_KEY_ENV, error::SkittyError,
    signer::keypair::Ed25519Keypair,
};

// Global sponsor keypair (the fee payer identity for sponsored transactions)
static GLOBAL_SPONSOR: Lazy<RwLock<Option<Arc<Ed25519Keypair>>>> =
    Lazy::new(|| RwLock::new(None));

// Global config with zero-cost reads
static GLOBAL_CONFIG: AtomicPtr<Config> = AtomicPtr::new(std::ptr::null_mut());

/// Initialize the global sponsor keypair from the environment.
/// A missing key is a configuration error surfaced verbatim, never retried.
pub fn init_sponsor_from_env() -> Result<(), SkittyError> {
    let keypair = Ed25519Keypair::from_env(SPONSOR_PRIVATE_KEY_ENV)?;
    let mut sponsor_guard = GLOBAL_SPONSOR.write();
    if sponsor_guard.is_some() {
        return Err(SkittyError::InternalServerError(
            "Sponsor already initialized".to_string(),
        ));
    }

    log::info!("Initialized sponsor signer {}", keypair.address().short());

    *sponsor_guard = Some(Arc::new(keypair));
    Ok(())
}

/// Get the global sponsor keypair
pub fn get_sponsor() -> Result<Arc<Ed25519Keypair>, SkittyError> {
    let sponsor_guard = GLOBAL_SPONSOR.read();
    match &*sponsor_guard {
        Some(keypair) => Ok(Arc::clone(keypair)),
        None => Err(SkittyError::ConfigError(format!(
            "Sponsor not configured. Set {SPONSOR_PRIVATE_KEY_ENV} in the deployment environment."
        ))),
    }
}

/// Replace the global sponsor keypair (test only)
#[cfg(test)]
pub fn update_sponsor(keypair: Ed25519Keypair) {
    let mut sponsor_guard = GLOBAL_SPONSOR.write();
    *sponsor_guard = Some(Arc::new(keypair));
}

#[cfg(test)]
pub fn clear_sponsor() {
    let mut sponsor_guard = GLOBAL_SPONSOR.write();
    *sponsor_guard = None;
}

/// Initialize the global config with a Config instance
pub fn init_config(config: Config) -> Result<(), SkittyError> {
    let current_ptr = GLOBAL_CONFIG.load(Ordering::Acquire);
    if !current_ptr.is_null() {
        return Err(SkittyError::InternalServerError("Config already initialized".to_string()));
    }

    let config_ptr = Box::into_raw(Box::new(config));
    GLOBAL_CONFIG.store(config_ptr, Ordering::Release);
    Ok(())
}

/// Get a reference to the global config (zero-cost read)
pub fn get_config() -> Result<&'static Config, SkittyError> {
    let config_ptr = GLOBAL_CONFIG.load(Ordering::Acquire);
    if config_ptr.is_null() {
        return Err(SkittyError::InternalServerError("Config not initialized".to_string()));
    }

    // SAFETY: the pointer is valid and the config lives for the duration of the program
    Ok(unsafe { &*config_ptr })
}

/// Update the global config with a new full config (test only)
#[cfg(test)]
pub fn update_config(new_config: Config) -> Result<(), SkittyError> {
    let old_ptr = GLOBAL_CONFIG.load(Ordering::Acquire);
    let new_ptr = Box::into_raw(Box::new(new_config));

    GLOBAL_CONFIG.store(new_ptr, Ordering::Release);

    // Clean up old config if it exists
    if !old_ptr.is_null() {
        unsafe {
            let _ = Box::from_raw(old_ptr);
        }
    }

    Ok(())
}
