use crate::{
    error::SkittyError,
    query::types::{BalanceChange, NormalizedModule, OwnedObject, Page, SimulationResult},
    types::{ObjectId, ObjectRef, SuiAddress, TransactionDigest},
};
use async_trait::async_trait;
use std::{collections::HashSet, time::Duration};

/// The blockchain query collaborator. Treated as a black-box data source
/// returning typed records; all consumers depend on this trait so the core
/// stays testable without a live node.
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Objects owned by an address, optionally filtered by type, with
    /// cursor-based continuation
    async fn get_owned_objects(
        &self,
        owner: &SuiAddress,
        type_filter: Option<&str>,
        cursor: Option<String>,
        limit: usize,
    ) -> Result<Page<OwnedObject>, SkittyError>;

    /// Number of dynamic fields under an object (first page is enough for
    /// emptiness checks)
    async fn get_dynamic_field_count(&self, parent: &ObjectId) -> Result<u64, SkittyError>;

    /// Normalized signature of a published module; Ok(None) when the module
    /// does not exist
    async fn get_normalized_module(
        &self,
        package: &SuiAddress,
        module: &str,
    ) -> Result<Option<NormalizedModule>, SkittyError>;

    /// Simulate a transaction without committing it
    async fn dry_run_transaction(&self, tx_bytes: &[u8]) -> Result<SimulationResult, SkittyError>;

    async fn execute_transaction(
        &self,
        tx_bytes: &[u8],
        signatures: &[String],
    ) -> Result<TransactionDigest, SkittyError>;

    /// Poll until the transaction is confirmed or the timeout elapses
    async fn wait_for_transaction(
        &self,
        digest: &TransactionDigest,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<(), SkittyError>;

    async fn get_balance_changes(
        &self,
        digest: &TransactionDigest,
    ) -> Result<Vec<BalanceChange>, SkittyError>;

    /// Which of the given objects still exist on-chain
    async fn multi_get_objects_exist(
        &self,
        ids: &[ObjectId],
    ) -> Result<HashSet<ObjectId>, SkittyError>;

    /// One owned coin of the given type, as a gas-payment candidate
    async fn get_owned_coin_ref(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
    ) -> Result<Option<ObjectRef>, SkittyError>;

    async fn get_reference_gas_price(&self) -> Result<u64, SkittyError>;

    /// Resolve a name-service domain to an address; Ok(None) when unregistered
    async fn resolve_name_address(&self, name: &str) -> Result<Option<SuiAddress>, SkittyError>;
}
