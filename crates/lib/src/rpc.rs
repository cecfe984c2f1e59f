use std::{sync::Arc, time::Duration};

use crate::{constant::RPC_REQUEST_TIMEOUT_SECS, error::SkittyError, query::SuiRpcClient};

pub fn get_query_client(rpc_url: &str) -> Result<Arc<SuiRpcClient>, SkittyError> {
    Ok(Arc::new(SuiRpcClient::new(
        rpc_url,
        Duration::from_secs(RPC_REQUEST_TIMEOUT_SECS),
    )?))
}
