//! The reclaim execution pipeline, modeled as named stages with typed
//! intermediate results:
//!
//! prepare → sponsor → simulate → viability re-check → finalize (rebuild with
//! real gas) → execute (user sign, submit, confirm, reconcile).
//!
//! The builder's estimates decide what gets drafted; only a successful
//! simulation establishing the real gas cost lets execution proceed, and the
//! rebuilt transaction recoups what the sponsor actually spends.

use crate::{
    action::CleanupAction,
    constant::{
        CONFIRMATION_POLL_INTERVAL_MS, CONFIRMATION_TIMEOUT_MS, EXECUTION_SAFETY_TIMEOUT_SECS,
    },
    error::SkittyError,
    fee::FeeUtil,
    move_type::is_native_coin_type,
    query::QueryClient,
    signer::UserSigner,
    sponsor::SponsorApi,
    transaction::{build_batch_transaction, SponsorOptions, TransactionKind},
    types::{SuiAddress, TransactionDigest},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::{sync::Arc, time::Duration};

#[cfg(not(test))]
use crate::state::get_config;

#[cfg(test)]
use crate::tests::config_mock::mock_state::get_config;

/// Batch-level money totals derived from the selected actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchTotals {
    pub storage_rebate_total: u64,
    pub user_rebate_mist: u64,
    pub estimated_gas_mist: u64,
    pub fee_mist: u64,
}

impl BatchTotals {
    pub fn from_actions(actions: &[CleanupAction]) -> Result<Self, SkittyError> {
        let mut storage_rebate_total = 0u64;
        let mut estimated_gas_mist = 0u64;
        for action in actions {
            let economics = action.economics();
            storage_rebate_total = storage_rebate_total
                .checked_add(economics.storage_rebate_total)
                .ok_or_else(|| {
                    SkittyError::ValidationError("Storage rebate overflow".to_string())
                })?;
            estimated_gas_mist = estimated_gas_mist
                .checked_add(economics.estimated_gas_mist)
                .ok_or_else(|| {
                    SkittyError::ValidationError("Gas estimate overflow".to_string())
                })?;
        }
        Ok(Self {
            storage_rebate_total,
            user_rebate_mist: FeeUtil::user_rebate_mist(storage_rebate_total),
            estimated_gas_mist,
            fee_mist: FeeUtil::compute_fee_mist(storage_rebate_total),
        })
    }
}

#[derive(Debug, Clone)]
pub struct DraftBatch {
    pub kind: TransactionKind,
    pub totals: BatchTotals,
    pub sender: SuiAddress,
}

#[derive(Debug, Clone)]
pub struct SponsoredDraft {
    pub tx_bytes: Vec<u8>,
    pub sponsor_signature: String,
}

#[derive(Debug, Clone, Copy)]
pub struct Simulation {
    pub gas_cost_mist: i64,
}

#[derive(Debug, Clone)]
pub struct ReadyTransaction {
    pub tx_bytes: Vec<u8>,
    pub sponsor_signature: String,
}

#[derive(Debug, Clone)]
pub struct ExecutionReceipt {
    pub digest: TransactionDigest,
    /// Net native-currency movement for the fee recipient in the confirmed
    /// transaction (positive = the sponsor came out ahead)
    pub sponsor_net_mist: i128,
}

pub struct ReclaimFlow {
    client: Arc<dyn QueryClient>,
    sponsor: Arc<dyn SponsorApi>,
}

impl ReclaimFlow {
    pub fn new(client: Arc<dyn QueryClient>, sponsor: Arc<dyn SponsorApi>) -> Self {
        Self { client, sponsor }
    }

    /// Stage 1: build a sponsored draft priced with the per-kind gas estimates
    pub fn prepare(
        &self,
        actions: &[CleanupAction],
        sender: &SuiAddress,
    ) -> Result<DraftBatch, SkittyError> {
        if actions.is_empty() {
            return Err(SkittyError::ValidationError("No actions selected".to_string()));
        }
        let totals = BatchTotals::from_actions(actions)?;
        let kind = build_batch_transaction(
            actions,
            None,
            totals.storage_rebate_total,
            None,
            totals.estimated_gas_mist,
            None,
            Some(&SponsorOptions { sender: *sender }),
        )?;
        Ok(DraftBatch { kind, totals, sender: *sender })
    }

    /// Stage 2: have the sponsor attach gas and countersign
    pub async fn sponsor_draft(&self, draft: &DraftBatch) -> Result<SponsoredDraft, SkittyError> {
        let sponsored =
            self.sponsor.sponsor(&draft.kind.to_base64()?, &draft.sender).await?;
        Ok(SponsoredDraft {
            tx_bytes: BASE64.decode(&sponsored.tx_bytes_b64)?,
            sponsor_signature: sponsored.sponsor_signature,
        })
    }

    /// Stage 3: dry run. No execution proceeds without a simulation that
    /// reports real gas usage.
    pub async fn simulate(&self, sponsored: &SponsoredDraft) -> Result<Simulation, SkittyError> {
        let result = self.client.dry_run_transaction(&sponsored.tx_bytes).await?;
        let Some(gas) = result.gas_used else {
            return Err(SkittyError::SimulationFailed(
                "Dry run returned no gas data".to_string(),
            ));
        };
        Ok(Simulation {
            gas_cost_mist: FeeUtil::gas_cost_from_simulation(
                gas.computation_cost,
                gas.storage_cost,
                gas.storage_rebate,
            ),
        })
    }

    /// Stage 4: re-check viability against the simulated cost. Returns the
    /// amount to recoup; refuses batches that would leave the sponsor short.
    pub fn check_viability(
        totals: &BatchTotals,
        simulation: &Simulation,
    ) -> Result<u64, SkittyError> {
        let recoup_mist =
            FeeUtil::recoup_gas_mist(simulation.gas_cost_mist, totals.estimated_gas_mist);
        let required_mist = recoup_mist.checked_add(totals.fee_mist).ok_or_else(|| {
            SkittyError::ValidationError("Recoup amount overflow".to_string())
        })?;
        if totals.user_rebate_mist < required_mist {
            return Err(SkittyError::InfeasibleSponsorship {
                user_rebate_mist: totals.user_rebate_mist,
                required_mist,
            });
        }
        Ok(recoup_mist)
    }

    /// Stage 5: rebuild with the real cost and re-sponsor
    pub async fn finalize(
        &self,
        actions: &[CleanupAction],
        draft: &DraftBatch,
        recoup_mist: u64,
    ) -> Result<ReadyTransaction, SkittyError> {
        let kind = build_batch_transaction(
            actions,
            None,
            draft.totals.storage_rebate_total,
            None,
            recoup_mist,
            None,
            Some(&SponsorOptions { sender: draft.sender }),
        )?;
        let sponsored = self.sponsor.sponsor(&kind.to_base64()?, &draft.sender).await?;
        Ok(ReadyTransaction {
            tx_bytes: BASE64.decode(&sponsored.tx_bytes_b64)?,
            sponsor_signature: sponsored.sponsor_signature,
        })
    }

    /// Stage 6: collect the user signature, submit, confirm, and reconcile
    /// the sponsor's net outcome. The whole attempt is bounded by the safety
    /// timeout so a stuck submission cannot hang forever.
    pub async fn execute(
        &self,
        ready: &ReadyTransaction,
        user_signer: &dyn UserSigner,
    ) -> Result<ExecutionReceipt, SkittyError> {
        let attempt = self.execute_inner(ready, user_signer);
        match tokio::time::timeout(Duration::from_secs(EXECUTION_SAFETY_TIMEOUT_SECS), attempt)
            .await
        {
            Ok(result) => result,
            Err(_) => Err(SkittyError::TransactionExecutionFailed(
                "Execution attempt exceeded the safety timeout".to_string(),
            )),
        }
    }

    async fn execute_inner(
        &self,
        ready: &ReadyTransaction,
        user_signer: &dyn UserSigner,
    ) -> Result<ExecutionReceipt, SkittyError> {
        let user_signature = user_signer.sign_transaction_bytes(&ready.tx_bytes).await?;
        let signatures = vec![ready.sponsor_signature.clone(), user_signature];

        let digest = self.client.execute_transaction(&ready.tx_bytes, &signatures).await?;
        self.client
            .wait_for_transaction(
                &digest,
                Duration::from_millis(CONFIRMATION_TIMEOUT_MS),
                Duration::from_millis(CONFIRMATION_POLL_INTERVAL_MS),
            )
            .await?;

        let sponsor_net_mist = self.reconcile_sponsor_net(&digest).await;
        Ok(ExecutionReceipt { digest, sponsor_net_mist })
    }

    /// Net native-coin movement for the fee recipient. Reconciliation is
    /// best-effort: a failed lookup reports zero rather than failing an
    /// already-confirmed execution.
    async fn reconcile_sponsor_net(&self, digest: &TransactionDigest) -> i128 {
        let Ok(config) = get_config() else {
            return 0;
        };
        let Ok(fee_recipient) = config.reclaim.fee_recipient_address() else {
            return 0;
        };
        match self.client.get_balance_changes(digest).await {
            Ok(changes) => changes
                .iter()
                .filter(|change| {
                    change.owner == Some(fee_recipient) && is_native_coin_type(&change.coin_type)
                })
                .map(|change| change.amount)
                .sum(),
            Err(e) => {
                log::warn!("Could not reconcile sponsor impact for {digest}: {e}");
                0
            }
        }
    }

    /// The full pipeline for a selected action set
    pub async fn run(
        &self,
        actions: &[CleanupAction],
        sender: &SuiAddress,
        user_signer: &dyn UserSigner,
    ) -> Result<ExecutionReceipt, SkittyError> {
        let draft = self.prepare(actions, sender)?;
        let sponsored = self.sponsor_draft(&draft).await?;
        let simulation = self.simulate(&sponsored).await?;
        let recoup_mist = Self::check_viability(&draft.totals, &simulation)?;
        let ready = self.finalize(actions, &draft, recoup_mist).await?;
        self.execute(&ready, user_signer).await
    }
}
