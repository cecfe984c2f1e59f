//! Debounced request-coalescing cache for normalized-module lookups.
//!
//! Burn discovery asks for the same module repeatedly (once per owned type in
//! that module). Lookups arriving within the debounce window are collected
//! and resolved by one flush task; every waiter gets the shared result.
//! Results (including negative ones) are cached for the process lifetime and
//! never invalidated within a session.

use crate::{
    constant::BURN_MODULE_DEBOUNCE_MS,
    query::{types::NormalizedModule, QueryClient},
    types::SuiAddress,
};
use parking_lot::Mutex;
use std::{collections::HashMap, str::FromStr, sync::Arc, time::Duration};
use tokio::sync::oneshot;

type ModuleResult = Option<Arc<NormalizedModule>>;

#[derive(Clone)]
pub struct ModuleCache {
    shared: Arc<CacheShared>,
}

struct CacheShared {
    client: Arc<dyn QueryClient>,
    inner: Mutex<CacheInner>,
}

#[derive(Default)]
struct CacheInner {
    resolved: HashMap<String, ModuleResult>,
    pending: HashMap<String, Vec<oneshot::Sender<ModuleResult>>>,
    flush_scheduled: bool,
}

impl ModuleCache {
    pub fn new(client: Arc<dyn QueryClient>) -> Self {
        Self { shared: Arc::new(CacheShared { client, inner: Mutex::new(CacheInner::default()) }) }
    }

    fn cache_key(package: &SuiAddress, module: &str) -> String {
        format!("{}::{module}", package.to_hex())
    }

    /// Look up a normalized module, coalescing concurrent requests for the
    /// same package+module into a single query.
    pub async fn get(&self, package: &SuiAddress, module: &str) -> ModuleResult {
        let key = Self::cache_key(package, module);
        let receiver = {
            let mut inner = self.shared.inner.lock();
            if let Some(hit) = inner.resolved.get(&key) {
                return hit.clone();
            }
            let (tx, rx) = oneshot::channel();
            inner.pending.entry(key).or_default().push(tx);
            if !inner.flush_scheduled {
                inner.flush_scheduled = true;
                let shared = Arc::clone(&self.shared);
                tokio::spawn(async move { flush_after_debounce(shared).await });
            }
            rx
        };
        receiver.await.unwrap_or(None)
    }
}

async fn flush_after_debounce(shared: Arc<CacheShared>) {
    tokio::time::sleep(Duration::from_millis(BURN_MODULE_DEBOUNCE_MS)).await;

    let pending = {
        let mut inner = shared.inner.lock();
        inner.flush_scheduled = false;
        std::mem::take(&mut inner.pending)
    };

    for (key, waiters) in pending {
        let cached = shared.inner.lock().resolved.get(&key).cloned();
        let result = match cached {
            Some(hit) => hit,
            None => {
                let resolved = resolve(&shared, &key).await;
                shared.inner.lock().resolved.insert(key, resolved.clone());
                resolved
            }
        };
        for waiter in waiters {
            let _ = waiter.send(result.clone());
        }
    }
}

async fn resolve(shared: &CacheShared, key: &str) -> ModuleResult {
    let Some((package_hex, module)) = key.split_once("::") else {
        return None;
    };
    let Ok(package) = SuiAddress::from_str(package_hex) else {
        return None;
    };
    match shared.client.get_normalized_module(&package, module).await {
        Ok(Some(normalized)) => Some(Arc::new(normalized)),
        Ok(None) => None,
        Err(e) => {
            log::warn!("Module lookup failed for {key}: {e}");
            None
        }
    }
}
