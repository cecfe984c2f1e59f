use crate::{
    query::QueryClient,
    sponsor::sponsor_transaction_kind,
    state::get_sponsor,
    types::SuiAddress,
    SkittyError,
};
use serde::{Deserialize, Serialize};
use std::{str::FromStr, sync::Arc};

#[derive(Debug, Deserialize)]
pub struct SponsorTransactionRequest {
    /// base64 transaction-kind bytes (sender/gas/budget not yet fixed)
    pub transaction_kind_bytes: String,
    pub user_address: String,
}

#[derive(Debug, Serialize)]
pub struct SponsorTransactionResponse {
    pub sponsored_tx_bytes: String,
    pub sponsor_signature: String,
}

pub async fn sponsor_transaction(
    query_client: &Arc<dyn QueryClient>,
    request: SponsorTransactionRequest,
) -> Result<SponsorTransactionResponse, SkittyError> {
    if request.transaction_kind_bytes.is_empty() || request.user_address.is_empty() {
        return Err(SkittyError::ValidationError("Missing params".to_string()));
    }
    let user_address = SuiAddress::from_str(&request.user_address)?;

    // surfaced verbatim when the sponsor key is absent
    let keypair = get_sponsor()?;

    let sponsored = sponsor_transaction_kind(
        query_client.as_ref(),
        &keypair,
        &request.transaction_kind_bytes,
        &user_address,
    )
    .await?;

    Ok(SponsorTransactionResponse {
        sponsored_tx_bytes: sponsored.tx_bytes_b64,
        sponsor_signature: sponsored.sponsor_signature,
    })
}
