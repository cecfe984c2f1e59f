//! reqwest-based JSON-RPC implementation of [`QueryClient`] against a Sui
//! fullnode.

use crate::{
    error::SkittyError,
    query::{
        client::QueryClient,
        types::{
            parse_u64_field, BalanceChange, GasUsed, NormalizedModule, OwnedObject, Page,
            SimulationResult,
        },
    },
    sanitize_error,
    types::{ObjectId, ObjectRef, SuiAddress, TransactionDigest},
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::{
    collections::HashSet,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

pub struct SuiRpcClient {
    http: reqwest::Client,
    url: String,
    request_id: AtomicU64,
}

impl SuiRpcClient {
    pub fn new(url: &str, request_timeout: Duration) -> Result<Self, SkittyError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| SkittyError::InternalServerError(sanitize_error!(e)))?;
        Ok(Self { http, url: url.to_string(), request_id: AtomicU64::new(1) })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, SkittyError> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self.http.post(&self.url).json(&body).send().await.map_err(|e| {
            SkittyError::RpcError(format!("{method} request failed: {}", sanitize_error!(e)))
        })?;

        if !response.status().is_success() {
            return Err(SkittyError::RpcError(format!(
                "{method} returned HTTP {}",
                response.status()
            )));
        }

        let envelope: Value = response.json().await.map_err(|e| {
            SkittyError::RpcError(format!("{method} returned invalid JSON: {}", sanitize_error!(e)))
        })?;

        if let Some(error) = envelope.get("error") {
            let message =
                error.get("message").and_then(Value::as_str).unwrap_or("unknown error");
            return Err(SkittyError::RpcError(format!(
                "{method} failed: {}",
                sanitize_error!(message)
            )));
        }

        let result = envelope
            .get("result")
            .cloned()
            .ok_or_else(|| SkittyError::RpcError(format!("{method} returned no result")))?;

        serde_json::from_value(result).map_err(|e| {
            SkittyError::SerializationError(format!(
                "{method} result did not match expected shape: {}",
                sanitize_error!(e)
            ))
        })
    }

    fn narrow_owned_object(raw: &Value) -> Option<OwnedObject> {
        // Each entry is { data: {...} } or { error: {...} }; errors are skipped
        let data = raw.get("data")?;
        let object_id: SuiAddress = data.get("objectId")?.as_str()?.parse().ok()?;
        let version = data
            .get("version")
            .map(|v| parse_u64_field(v, "version").unwrap_or(0))
            .unwrap_or(0);
        let digest = data.get("digest").and_then(Value::as_str).unwrap_or_default().to_string();
        let object_type = data.get("type").and_then(Value::as_str).map(str::to_string);
        let storage_rebate = data
            .get("storageRebate")
            .map(|v| parse_u64_field(v, "storageRebate").unwrap_or(0))
            .unwrap_or(0);
        let content_fields = data
            .get("content")
            .and_then(|c| c.get("fields"))
            .cloned();
        Some(OwnedObject { object_id, version, digest, object_type, storage_rebate, content_fields })
    }

    fn narrow_gas_used(effects: &Value) -> Option<GasUsed> {
        let gas = effects.get("gasUsed")?;
        Some(GasUsed {
            computation_cost: parse_u64_field(gas.get("computationCost")?, "computationCost")
                .ok()?,
            storage_cost: parse_u64_field(gas.get("storageCost")?, "storageCost").ok()?,
            storage_rebate: parse_u64_field(gas.get("storageRebate")?, "storageRebate").ok()?,
        })
    }

    fn narrow_balance_changes(raw: Option<&Value>) -> Vec<BalanceChange> {
        let Some(Value::Array(changes)) = raw else {
            return Vec::new();
        };
        changes
            .iter()
            .filter_map(|change| {
                let coin_type =
                    change.get("coinType").and_then(Value::as_str)?.to_string();
                let amount: i128 =
                    change.get("amount").and_then(Value::as_str)?.parse().ok()?;
                let owner = change
                    .get("owner")
                    .and_then(|o| o.get("AddressOwner"))
                    .and_then(Value::as_str)
                    .and_then(|s| s.parse().ok());
                Some(BalanceChange { owner, coin_type, amount })
            })
            .collect()
    }

    fn narrow_simulation(result: Value) -> SimulationResult {
        let effects = result.get("effects");
        let status_ok = effects
            .and_then(|e| e.get("status"))
            .and_then(|s| s.get("status"))
            .and_then(Value::as_str)
            .map(|s| s == "success")
            .unwrap_or(false);
        let gas_used = effects.and_then(Self::narrow_gas_used);
        let balance_changes = Self::narrow_balance_changes(result.get("balanceChanges"));
        SimulationResult { status_ok, gas_used, balance_changes }
    }
}

#[async_trait]
impl QueryClient for SuiRpcClient {
    async fn get_owned_objects(
        &self,
        owner: &SuiAddress,
        type_filter: Option<&str>,
        cursor: Option<String>,
        limit: usize,
    ) -> Result<Page<OwnedObject>, SkittyError> {
        let mut query = json!({
            "options": { "showType": true, "showContent": true, "showStorageRebate": true }
        });
        if let Some(filter) = type_filter {
            query["filter"] = json!({ "StructType": filter });
        }
        let params = json!([owner.to_hex(), query, cursor, limit]);
        let result: Value = self.call("suix_getOwnedObjects", params).await?;

        let data = result
            .get("data")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().filter_map(Self::narrow_owned_object).collect())
            .unwrap_or_default();
        let next_cursor =
            result.get("nextCursor").and_then(Value::as_str).map(str::to_string);
        let has_next_page =
            result.get("hasNextPage").and_then(Value::as_bool).unwrap_or(false);
        Ok(Page { data, next_cursor, has_next_page })
    }

    async fn get_dynamic_field_count(&self, parent: &ObjectId) -> Result<u64, SkittyError> {
        let params = json!([parent.to_hex(), null, 1]);
        let result: Value = self.call("suix_getDynamicFields", params).await?;
        let count = result
            .get("data")
            .and_then(Value::as_array)
            .map(|fields| fields.len() as u64)
            .unwrap_or(0);
        Ok(count)
    }

    async fn get_normalized_module(
        &self,
        package: &SuiAddress,
        module: &str,
    ) -> Result<Option<NormalizedModule>, SkittyError> {
        let params = json!([package.to_hex(), module]);
        match self.call::<NormalizedModule>("sui_getNormalizedMoveModule", params).await {
            Ok(normalized) => Ok(Some(normalized)),
            // Unknown package/module is an RPC-level error; treat as absent
            Err(SkittyError::RpcError(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn dry_run_transaction(&self, tx_bytes: &[u8]) -> Result<SimulationResult, SkittyError> {
        let params = json!([BASE64.encode(tx_bytes)]);
        let result: Value = self.call("sui_dryRunTransactionBlock", params).await?;
        Ok(Self::narrow_simulation(result))
    }

    async fn execute_transaction(
        &self,
        tx_bytes: &[u8],
        signatures: &[String],
    ) -> Result<TransactionDigest, SkittyError> {
        let params = json!([
            BASE64.encode(tx_bytes),
            signatures,
            { "showEffects": true },
            "WaitForEffectsCert"
        ]);
        let result: Value = self.call("sui_executeTransactionBlock", params).await?;
        let digest = result
            .get("digest")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                SkittyError::TransactionExecutionFailed("Execution returned no digest".to_string())
            })?
            .to_string();
        Ok(TransactionDigest(digest))
    }

    async fn wait_for_transaction(
        &self,
        digest: &TransactionDigest,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<(), SkittyError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let params = json!([digest.0, { "showEffects": false }]);
            match self.call::<Value>("sui_getTransactionBlock", params).await {
                Ok(_) => return Ok(()),
                Err(_) if tokio::time::Instant::now() < deadline => {
                    tokio::time::sleep(poll_interval).await;
                }
                Err(_) => {
                    return Err(SkittyError::TransactionExecutionFailed(format!(
                        "Confirmation of {digest} timed out"
                    )));
                }
            }
        }
    }

    async fn get_balance_changes(
        &self,
        digest: &TransactionDigest,
    ) -> Result<Vec<BalanceChange>, SkittyError> {
        let params = json!([digest.0, { "showBalanceChanges": true }]);
        let result: Value = self.call("sui_getTransactionBlock", params).await?;
        Ok(Self::narrow_balance_changes(result.get("balanceChanges")))
    }

    async fn multi_get_objects_exist(
        &self,
        ids: &[ObjectId],
    ) -> Result<HashSet<ObjectId>, SkittyError> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        let hex_ids: Vec<String> = ids.iter().map(SuiAddress::to_hex).collect();
        let params = json!([hex_ids, {}]);
        let result: Vec<Value> = self.call("sui_multiGetObjects", params).await?;
        let mut existing = HashSet::new();
        for entry in &result {
            if let Some(id) = entry
                .get("data")
                .and_then(|d| d.get("objectId"))
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<ObjectId>().ok())
            {
                existing.insert(id);
            }
        }
        Ok(existing)
    }

    async fn get_owned_coin_ref(
        &self,
        owner: &SuiAddress,
        coin_type: &str,
    ) -> Result<Option<ObjectRef>, SkittyError> {
        let page = self.get_owned_objects(owner, Some(coin_type), None, 1).await?;
        Ok(page.data.into_iter().next().map(|obj| ObjectRef {
            object_id: obj.object_id,
            version: obj.version,
            digest: obj.digest,
        }))
    }

    async fn get_reference_gas_price(&self) -> Result<u64, SkittyError> {
        let result: Value = self.call("suix_getReferenceGasPrice", json!([])).await?;
        parse_u64_field(&result, "referenceGasPrice")
    }

    async fn resolve_name_address(&self, name: &str) -> Result<Option<SuiAddress>, SkittyError> {
        let result: Value = self.call("suix_resolveNameServiceAddress", json!([name])).await?;
        match result {
            Value::String(address) => Ok(address.parse().ok()),
            _ => Ok(None),
        }
    }
}
