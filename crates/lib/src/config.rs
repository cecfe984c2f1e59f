use serde::{Deserialize, Serialize};
use std::{fs, path::Path, str::FromStr};

use crate::{
    constant::{
        DEFAULT_COIN_BLOCKLIST_URL, DEFAULT_EXPLAIN_MODEL_URL, DEFAULT_EXPLAIN_TIMESTAMP_FILE,
        DEFAULT_FEE_RECIPIENT, DEFAULT_MAX_REQUEST_BODY_SIZE, DEFAULT_OBJECT_BLOCKLIST_URL,
        DEFAULT_RATE_LIMIT, DEFAULT_RPC_PORT, DRY_RUN_GAS_BUDGET_MIST, EXPLAIN_MAX_JSON_LENGTH,
        EXPLAIN_REQUESTS_PER_DAY, EXPLAIN_REQUESTS_PER_MINUTE,
    },
    error::SkittyError,
    move_type::{KnownBurnableEntry, MoveCallTarget},
    sanitize_error,
    types::SuiAddress,
};

#[derive(Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub reclaim: ReclaimConfig,
    #[serde(default)]
    pub rpc_server: RpcServerConfig,
    #[serde(default)]
    pub explain: ExplainConfig,
    #[serde(default)]
    pub blocklist: BlocklistConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub rpc_url: String,
    /// Second endpoint tried by the name resolver when the primary fails
    #[serde(default)]
    pub fallback_rpc_url: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self { rpc_url: "https://fullnode.mainnet.sui.io:443".to_string(), fallback_rpc_url: None }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReclaimConfig {
    /// Address receiving the protocol fee and the sponsor's gas recoupment
    pub fee_recipient: String,
    /// Statically-known destructible types checked before module introspection
    #[serde(default)]
    pub known_burnable: Vec<KnownBurnableEntry>,
}

impl Default for ReclaimConfig {
    fn default() -> Self {
        Self { fee_recipient: DEFAULT_FEE_RECIPIENT.to_string(), known_burnable: Vec::new() }
    }
}

impl ReclaimConfig {
    pub fn fee_recipient_address(&self) -> Result<SuiAddress, SkittyError> {
        SuiAddress::from_str(&self.fee_recipient)
            .map_err(|e| SkittyError::ConfigError(format!("Bad fee_recipient: {e}")))
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct RpcServerConfig {
    pub port: u16,
    /// requests per second admitted by the server middleware
    pub rate_limit: u64,
    pub max_request_body_size: usize,
    /// gas budget set on sponsored transactions
    pub gas_budget_mist: u64,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_RPC_PORT,
            rate_limit: DEFAULT_RATE_LIMIT,
            max_request_body_size: DEFAULT_MAX_REQUEST_BODY_SIZE,
            gas_budget_mist: DRY_RUN_GAS_BUDGET_MIST,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ExplainConfig {
    pub enabled: bool,
    pub model_url: String,
    pub requests_per_minute: u64,
    pub requests_per_day: u64,
    pub max_payload_bytes: usize,
    /// where the client-side guard persists its request timestamps
    pub timestamp_file: String,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model_url: DEFAULT_EXPLAIN_MODEL_URL.to_string(),
            requests_per_minute: EXPLAIN_REQUESTS_PER_MINUTE,
            requests_per_day: EXPLAIN_REQUESTS_PER_DAY,
            max_payload_bytes: EXPLAIN_MAX_JSON_LENGTH,
            timestamp_file: DEFAULT_EXPLAIN_TIMESTAMP_FILE.to_string(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct BlocklistConfig {
    pub coin_url: String,
    pub object_url: String,
}

impl Default for BlocklistConfig {
    fn default() -> Self {
        Self {
            coin_url: DEFAULT_COIN_BLOCKLIST_URL.to_string(),
            object_url: DEFAULT_OBJECT_BLOCKLIST_URL.to_string(),
        }
    }
}

impl Config {
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, SkittyError> {
        let config_str = fs::read_to_string(path.as_ref()).map_err(|e| {
            SkittyError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                sanitize_error!(e)
            ))
        })?;
        let config: Config = toml::from_str(&config_str)
            .map_err(|e| SkittyError::ConfigError(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SkittyError> {
        self.reclaim.fee_recipient_address()?;
        for entry in &self.reclaim.known_burnable {
            MoveCallTarget::from_str(&entry.target).map_err(|_| {
                SkittyError::ConfigError(format!(
                    "known_burnable target is not package::module::function: {}",
                    entry.target
                ))
            })?;
        }
        if self.rpc_server.gas_budget_mist == 0 {
            return Err(SkittyError::ConfigError("gas_budget_mist must be nonzero".to_string()));
        }
        Ok(())
    }
}
