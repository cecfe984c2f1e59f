//! Programmable fake [`QueryClient`] with call counters, built fluently.

use crate::{
    error::SkittyError,
    query::{
        types::{BalanceChange, NormalizedModule, OwnedObject, Page, SimulationResult},
        QueryClient,
    },
    types::{ObjectId, ObjectRef, SuiAddress, TransactionDigest},
};
use async_trait::async_trait;
use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

#[derive(Default)]
pub struct QueryMockBuilder {
    objects: Vec<OwnedObject>,
    dynamic_field_counts: HashMap<ObjectId, u64>,
    modules: HashMap<String, NormalizedModule>,
    simulation: Option<SimulationResult>,
    execute_digest: Option<TransactionDigest>,
    balance_changes: Vec<BalanceChange>,
    existing_objects: HashSet<ObjectId>,
    sponsor_coin: Option<ObjectRef>,
    names: HashMap<String, SuiAddress>,
    reference_gas_price: Option<u64>,
    fail_owned_objects: bool,
    fail_name_resolution: bool,
    fail_reference_gas_price: bool,
}

impl QueryMockBuilder {
    pub fn new() -> Self {
        Self { reference_gas_price: Some(1_000), ..Self::default() }
    }

    pub fn with_coins(mut self, coins: Vec<OwnedObject>) -> Self {
        self.objects.extend(coins);
        self
    }

    pub fn with_objects(mut self, objects: Vec<OwnedObject>) -> Self {
        self.objects.extend(objects);
        self
    }

    pub fn with_dynamic_field_count(mut self, parent: ObjectId, count: u64) -> Self {
        self.dynamic_field_counts.insert(parent, count);
        self
    }

    pub fn with_module(
        mut self,
        package: &SuiAddress,
        module: &str,
        normalized: NormalizedModule,
    ) -> Self {
        self.modules.insert(format!("{}::{module}", package.to_hex()), normalized);
        self
    }

    pub fn with_simulation(mut self, simulation: SimulationResult) -> Self {
        self.simulation = Some(simulation);
        self
    }

    pub fn with_execute_digest(mut self, digest: TransactionDigest) -> Self {
        self.execute_digest = Some(digest);
        self
    }

    pub fn with_balance_changes(mut self, changes: Vec<BalanceChange>) -> Self {
        self.balance_changes = changes;
        self
    }

    pub fn with_existing_objects(mut self, ids: Vec<ObjectId>) -> Self {
        self.existing_objects = ids.into_iter().collect();
        self
    }

    pub fn with_sponsor_coin(mut self, coin: ObjectRef) -> Self {
        self.sponsor_coin = Some(coin);
        self
    }

    pub fn with_name(mut self, domain: &str, address: SuiAddress) -> Self {
        self.names.insert(domain.to_string(), address);
        self
    }

    pub fn with_reference_gas_price(mut self, price: u64) -> Self {
        self.reference_gas_price = Some(price);
        self
    }

    pub fn with_reference_gas_price_failure(mut self) -> Self {
        self.fail_reference_gas_price = true;
        self
    }

    pub fn with_owned_objects_failure(mut self) -> Self {
        self.fail_owned_objects = true;
        self
    }

    pub fn with_name_resolution_failure(mut self) -> Self {
        self.fail_name_resolution = true;
        self
    }

    pub fn build(self) -> Arc<MockQueryClient> {
        Arc::new(MockQueryClient {
            objects: self.objects,
            dynamic_field_counts: self.dynamic_field_counts,
            modules: self.modules,
            simulation: self.simulation,
            execute_digest: self.execute_digest,
            balance_changes: self.balance_changes,
            existing_objects: self.existing_objects,
            sponsor_coin: self.sponsor_coin,
            names: self.names,
            reference_gas_price: self.reference_gas_price,
            fail_owned_objects: self.fail_owned_objects,
            fail_name_resolution: self.fail_name_resolution,
            fail_reference_gas_price: self.fail_reference_gas_price,
            module_calls: AtomicUsize::new(0),
            name_calls: AtomicUsize::new(0),
            execute_calls: AtomicUsize::new(0),
        })
    }
}

pub struct MockQueryClient {
    objects: Vec<OwnedObject>,
    dynamic_field_counts: HashMap<ObjectId, u64>,
    modules: HashMap<String, NormalizedModule>,
    simulation: Option<SimulationResult>,
    execute_digest: Option<TransactionDigest>,
    balance_changes: Vec<BalanceChange>,
    existing_objects: HashSet<ObjectId>,
    sponsor_coin: Option<ObjectRef>,
    names: HashMap<String, SuiAddress>,
    reference_gas_price: Option<u64>,
    fail_owned_objects: bool,
    fail_name_resolution: bool,
    fail_reference_gas_price: bool,
    module_calls: AtomicUsize,
    name_calls: AtomicUsize,
    execute_calls: AtomicUsize,
}

impl MockQueryClient {
    pub fn module_call_count(&self) -> usize {
        self.module_calls.load(Ordering::SeqCst)
    }

    pub fn name_call_count(&self) -> usize {
        self.name_calls.load(Ordering::SeqCst)
    }

    pub fn execute_call_count(&self) -> usize {
        self.execute_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryClient for MockQueryClient {
    async fn get_owned_objects(
        &self,
        _owner: &SuiAddress,
        type_filter: Option<&str>,
        cursor: Option<String>,
        limit: usize,
    ) -> Result<Page<OwnedObject>, SkittyError> {
        if self.fail_owned_objects {
            return Err(SkittyError::RpcError("owned objects unavailable".to_string()));
        }
        let filtered: Vec<OwnedObject> = self
            .objects
            .iter()
            .filter(|object| match type_filter {
                Some(filter) => object
                    .object_type
                    .as_deref()
                    .map(|t| t == filter || t.starts_with(&format!("{filter}<")))
                    .unwrap_or(false),
                None => true,
            })
            .cloned()
            .collect();

        let offset: usize = cursor.and_then(|c| c.parse().ok()).unwrap_or(0);
        let end = (offset + limit).min(filtered.len());
        let has_next_page = end < filtered.len();
        Ok(Page {
            data: filtered[offset..end].to_vec(),
            next_cursor: has_next_page.then(|| end.to_string()),
            has_next_page,
        })
    }

    async fn get_dynamic_field_count(&self, parent: &ObjectId) -> Result<u64, SkittyError> {
        Ok(self.dynamic_field_counts.get(parent).copied().unwrap_or(0))
    }

    async fn get_normalized_module(
        &self,
        package: &SuiAddress,
        module: &str,
    ) -> Result<Option<NormalizedModule>, SkittyError> {
        self.module_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.modules.get(&format!("{}::{module}", package.to_hex())).cloned())
    }

    async fn dry_run_transaction(&self, _tx_bytes: &[u8]) -> Result<SimulationResult, SkittyError> {
        self.simulation
            .clone()
            .ok_or_else(|| SkittyError::RpcError("no simulation fixture".to_string()))
    }

    async fn execute_transaction(
        &self,
        _tx_bytes: &[u8],
        _signatures: &[String],
    ) -> Result<TransactionDigest, SkittyError> {
        self.execute_calls.fetch_add(1, Ordering::SeqCst);
        self.execute_digest
            .clone()
            .ok_or_else(|| SkittyError::RpcError("no execution fixture".to_string()))
    }

    async fn wait_for_transaction(
        &self,
        _digest: &TransactionDigest,
        _timeout: Duration,
        _poll_interval: Duration,
    ) -> Result<(), SkittyError> {
        Ok(())
    }

    async fn get_balance_changes(
        &self,
        _digest: &TransactionDigest,
    ) -> Result<Vec<BalanceChange>, SkittyError> {
        Ok(self.balance_changes.clone())
    }

    async fn multi_get_objects_exist(
        &self,
        ids: &[ObjectId],
    ) -> Result<HashSet<ObjectId>, SkittyError> {
        Ok(ids.iter().filter(|id| self.existing_objects.contains(*id)).copied().collect())
    }

    async fn get_owned_coin_ref(
        &self,
        _owner: &SuiAddress,
        _coin_type: &str,
    ) -> Result<Option<ObjectRef>, SkittyError> {
        Ok(self.sponsor_coin.clone())
    }

    async fn get_reference_gas_price(&self) -> Result<u64, SkittyError> {
        if self.fail_reference_gas_price {
            return Err(SkittyError::RpcError("gas price unavailable".to_string()));
        }
        self.reference_gas_price
            .ok_or_else(|| SkittyError::RpcError("gas price unavailable".to_string()))
    }

    async fn resolve_name_address(&self, name: &str) -> Result<Option<SuiAddress>, SkittyError> {
        self.name_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_name_resolution {
            return Err(SkittyError::RpcError("name service unavailable".to_string()));
        }
        Ok(self.names.get(name).copied())
    }
}
