//! Explicit per-scan state: blocklists, the known-burnable table, and the
//! module-introspection cache. Passed into the classifier so no hidden
//! globals leak between test cases.

use crate::{move_type::KnownBurnableEntry, query::QueryClient, scanner::module_cache::ModuleCache};
use std::{collections::HashSet, sync::Arc};

#[cfg(not(test))]
use crate::state::get_config;

#[cfg(test)]
use crate::tests::config_mock::mock_state::get_config;

pub struct ScanContext {
    pub coin_blocklist: HashSet<String>,
    pub object_blocklist: HashSet<String>,
    pub known_burnable: Vec<KnownBurnableEntry>,
    pub module_cache: ModuleCache,
}

impl ScanContext {
    /// Build a context for a scan session: process-wide blocklists (fetched
    /// at most once) plus a fresh module cache bound to the query client.
    pub async fn initialize(client: Arc<dyn QueryClient>) -> Self {
        let blocklists = crate::scanner::blocklist::get_blocklists().await;
        let known_burnable = get_config()
            .map(|config| config.reclaim.known_burnable.clone())
            .unwrap_or_default();
        Self {
            coin_blocklist: blocklists.coin.clone(),
            object_blocklist: blocklists.object.clone(),
            known_burnable,
            module_cache: ModuleCache::new(client),
        }
    }

    pub fn with_parts(
        client: Arc<dyn QueryClient>,
        coin_blocklist: HashSet<String>,
        object_blocklist: HashSet<String>,
        known_burnable: Vec<KnownBurnableEntry>,
    ) -> Self {
        Self {
            coin_blocklist,
            object_blocklist,
            known_burnable,
            module_cache: ModuleCache::new(client),
        }
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        use crate::tests::query_mock::QueryMockBuilder;
        Self::with_parts(
            QueryMockBuilder::new().build(),
            HashSet::new(),
            HashSet::new(),
            Vec::new(),
        )
    }

    #[cfg(test)]
    pub fn for_tests_with_client(client: Arc<dyn QueryClient>) -> Self {
        Self::with_parts(client, HashSet::new(), HashSet::new(), Vec::new())
    }
}
