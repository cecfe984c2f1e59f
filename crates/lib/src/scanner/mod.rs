pub mod blocklist;
pub mod burns;
pub mod coins;
pub mod context;
pub mod kiosks;
pub mod module_cache;

use crate::{
    action::{CleanupAction, ScanOutcome, ScanProgress},
    error::SkittyError,
    query::QueryClient,
    types::SuiAddress,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

pub use context::ScanContext;
pub use module_cache::ModuleCache;

pub(crate) fn report(
    progress: &Option<mpsc::UnboundedSender<ScanProgress>>,
    phase: &str,
    current: usize,
    total: usize,
) {
    if let Some(sender) = progress {
        let _ = sender.send(ScanProgress::new(phase, current, total));
    }
}

/// The inventory classifier: turns a wallet's raw object inventory into
/// economically-viable cleanup actions.
pub struct Scanner {
    client: Arc<dyn QueryClient>,
    context: ScanContext,
}

impl Scanner {
    pub fn new(client: Arc<dyn QueryClient>, context: ScanContext) -> Self {
        Self { client, context }
    }

    /// Run the three discovery phases (coins, then containers, then burns)
    /// and concatenate their results. A failing data source contributes zero
    /// actions and is logged; it never aborts the whole scan.
    pub async fn scan(
        &self,
        address: &SuiAddress,
        progress: Option<mpsc::UnboundedSender<ScanProgress>>,
    ) -> Result<ScanOutcome, SkittyError> {
        report(&progress, "starting", 0, 1);

        let coin_actions = match coins::find_coin_actions(
            self.client.as_ref(),
            &self.context,
            address,
            &progress,
        )
        .await
        {
            Ok(actions) => actions,
            Err(e) => {
                log::error!("Coin scan failed for {}: {e}", address.short());
                Vec::new()
            }
        };

        let kiosk_actions = match kiosks::find_close_kiosk_actions(
            self.client.as_ref(),
            &self.context,
            address,
            &progress,
        )
        .await
        {
            Ok(actions) => actions,
            Err(e) => {
                log::error!("Kiosk scan failed for {}: {e}", address.short());
                Vec::new()
            }
        };

        let burn_actions = match burns::find_burn_actions(
            self.client.as_ref(),
            &self.context,
            address,
            &progress,
        )
        .await
        {
            Ok(actions) => actions,
            Err(e) => {
                log::error!("Burn scan failed for {}: {e}", address.short());
                Vec::new()
            }
        };

        let mut actions = coin_actions;
        actions.extend(kiosk_actions);
        actions.extend(burn_actions);

        let total_user_rebate_mist = total_user_rebate(&actions)?;

        Ok(ScanOutcome { actions, total_user_rebate_mist, scanned_address: *address })
    }

    /// Drop actions whose constituent objects no longer exist on-chain
    /// (after a successful execution); unrelated actions remain.
    pub async fn purge_executed(
        &self,
        executed: &[CleanupAction],
        current: Vec<CleanupAction>,
    ) -> Vec<CleanupAction> {
        if executed.is_empty() {
            return current;
        }
        let mut all_ids: Vec<_> = executed.iter().flat_map(|a| a.object_ids()).collect();
        all_ids.sort();
        all_ids.dedup();
        if all_ids.is_empty() {
            return current;
        }

        let existing = match self.client.multi_get_objects_exist(&all_ids).await {
            Ok(existing) => existing,
            Err(e) => {
                log::error!("Post-execution refresh failed: {e}");
                return current;
            }
        };

        let purged_keys: std::collections::HashSet<String> = executed
            .iter()
            .filter(|action| action.object_ids().iter().all(|id| !existing.contains(id)))
            .map(|action| action.action_key())
            .collect();
        if purged_keys.is_empty() {
            return current;
        }

        current
            .into_iter()
            .filter(|action| !purged_keys.contains(&action.action_key()))
            .collect()
    }
}

pub fn total_user_rebate(actions: &[CleanupAction]) -> Result<u64, SkittyError> {
    actions.iter().try_fold(0u64, |sum, action| {
        sum.checked_add(action.economics().user_rebate_mist)
            .ok_or_else(|| SkittyError::ValidationError("Rebate total overflow".to_string()))
    })
}

/// Guards scan results against stale commits: a scan may be superseded by a
/// new scan for a different address, and in-flight results from the old scan
/// must not overwrite state for the new target.
#[derive(Default)]
pub struct ScanSession {
    state: Mutex<SessionState>,
}

#[derive(Default)]
struct SessionState {
    active_target: Option<SuiAddress>,
    outcome: Option<ScanOutcome>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a new scan target; previous results are discarded
    pub fn begin(&self, address: SuiAddress) {
        let mut state = self.state.lock();
        state.active_target = Some(address);
        state.outcome = None;
    }

    /// Commit a finished scan. Returns false (and drops the outcome) when the
    /// session has moved on to a different address.
    pub fn commit(&self, outcome: ScanOutcome) -> bool {
        let mut state = self.state.lock();
        if state.active_target != Some(outcome.scanned_address) {
            log::warn!(
                "Discarding stale scan result for {}",
                outcome.scanned_address.short()
            );
            return false;
        }
        state.outcome = Some(outcome);
        true
    }

    pub fn outcome(&self) -> Option<ScanOutcome> {
        self.state.lock().outcome.clone()
    }

    /// Replace the committed action list (after an execution purge),
    /// recomputing the rebate total
    pub fn replace_actions(&self, actions: Vec<CleanupAction>) {
        let mut state = self.state.lock();
        if let Some(outcome) = &mut state.outcome {
            outcome.total_user_rebate_mist = total_user_rebate(&actions).unwrap_or(0);
            outcome.actions = actions;
        }
    }
}
