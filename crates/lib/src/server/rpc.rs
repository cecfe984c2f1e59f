use log::info;
use std::sync::Arc;

use crate::{error::SkittyError, query::QueryClient};

use crate::server::method::{
    explain_transaction::{
        explain_transaction, ExplainTransactionRequest, ExplainTransactionResponse,
    },
    sponsor_transaction::{
        sponsor_transaction, SponsorTransactionRequest, SponsorTransactionResponse,
    },
};

#[derive(Clone)]
pub struct SkittyRpc {
    query_client: Arc<dyn QueryClient>,
}

impl SkittyRpc {
    pub fn new(query_client: Arc<dyn QueryClient>) -> Self {
        Self { query_client }
    }

    pub fn get_query_client(&self) -> &Arc<dyn QueryClient> {
        &self.query_client
    }

    pub async fn liveness(&self) -> Result<(), SkittyError> {
        info!("Liveness request received");
        let result = Ok(());
        info!("Liveness response: {result:?}");
        result
    }

    pub async fn sponsor_transaction(
        &self,
        request: SponsorTransactionRequest,
    ) -> Result<SponsorTransactionResponse, SkittyError> {
        info!("Sponsor transaction request for user {}", request.user_address);
        let result = sponsor_transaction(&self.query_client, request).await;
        match &result {
            Ok(_) => info!("Sponsor transaction response: ok"),
            Err(e) => info!("Sponsor transaction response: {e}"),
        }
        result
    }

    pub async fn explain_transaction(
        &self,
        request: ExplainTransactionRequest,
    ) -> Result<ExplainTransactionResponse, SkittyError> {
        info!("Explain transaction request received");
        let result = explain_transaction(request).await;
        match &result {
            Ok(_) => info!("Explain transaction response: ok"),
            Err(e) => info!("Explain transaction response: {e}"),
        }
        result
    }
}
