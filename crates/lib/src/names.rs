//! Name-service resolution: a human-readable `.sui` domain resolves to an
//! address via a primary resolver, falling back to a second resolver when
//! the primary fails or comes up empty. Results (including misses) are
//! cached for the session; total failure yields None, never an error.

use crate::{query::QueryClient, types::SuiAddress};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

/// True if the input looks like a name-service domain
pub fn is_name_domain(input: &str) -> bool {
    input.trim().to_lowercase().ends_with(".sui")
}

pub struct NameResolver {
    primary: Arc<dyn QueryClient>,
    fallback: Option<Arc<dyn QueryClient>>,
    cache: Mutex<HashMap<String, Option<SuiAddress>>>,
}

impl NameResolver {
    pub fn new(primary: Arc<dyn QueryClient>, fallback: Option<Arc<dyn QueryClient>>) -> Self {
        Self { primary, fallback, cache: Mutex::new(HashMap::new()) }
    }

    pub async fn resolve(&self, domain: &str) -> Option<SuiAddress> {
        if !is_name_domain(domain) {
            return None;
        }
        let normalized = domain.trim().to_lowercase();

        if let Some(cached) = self.cache.lock().get(&normalized) {
            return *cached;
        }

        let resolved = self.resolve_uncached(&normalized).await;
        self.cache.lock().insert(normalized, resolved);
        resolved
    }

    async fn resolve_uncached(&self, domain: &str) -> Option<SuiAddress> {
        match self.primary.resolve_name_address(domain).await {
            Ok(Some(address)) => return Some(address),
            Ok(None) => {}
            Err(e) => {
                log::warn!("Primary name resolution failed for {domain}: {e}");
            }
        }

        if let Some(fallback) = &self.fallback {
            match fallback.resolve_name_address(domain).await {
                Ok(Some(address)) => return Some(address),
                Ok(None) => {}
                Err(e) => {
                    log::warn!("Fallback name resolution failed for {domain}: {e}");
                }
            }
        }

        None
    }
}
