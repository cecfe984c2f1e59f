//! Sponsorship coordination: a distinct signing identity sets itself as gas
//! owner, selects one of its own SUI coins to pay gas, builds the full
//! transaction, and countersigns it. The user's signature is added later,
//! outside this module. Every invocation is independent — no connection or
//! request state is retained.

use crate::{
    constant::{DEFAULT_REFERENCE_GAS_PRICE_MIST, SUI_COIN_TYPE},
    error::SkittyError,
    query::QueryClient,
    signer::keypair::Ed25519Keypair,
    transaction::{
        data::{GasData, TransactionData},
        ptb::TransactionKind,
    },
    types::SuiAddress,
};
use async_trait::async_trait;
use std::sync::Arc;

#[cfg(not(test))]
use crate::state::get_config;

#[cfg(test)]
use crate::tests::config_mock::mock_state::get_config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SponsoredTransaction {
    /// base64 of the fully built transaction bytes
    pub tx_bytes_b64: String,
    /// the sponsor's serialized signature over those bytes
    pub sponsor_signature: String,
    pub sponsor_address: SuiAddress,
}

/// Build and countersign a sponsored transaction from raw transaction-kind
/// bytes. Fails with a configuration error when the sponsor holds no SUI
/// coin to pay gas with.
pub async fn sponsor_transaction_kind(
    client: &dyn QueryClient,
    keypair: &Ed25519Keypair,
    transaction_kind_b64: &str,
    sender: &SuiAddress,
) -> Result<SponsoredTransaction, SkittyError> {
    let config = get_config()?;
    let gas_budget_mist = config.rpc_server.gas_budget_mist;

    let kind = TransactionKind::from_base64(transaction_kind_b64)?;
    let sponsor_address = keypair.address();

    let gas_coin = client
        .get_owned_coin_ref(&sponsor_address, SUI_COIN_TYPE)
        .await?
        .ok_or_else(|| {
            SkittyError::ConfigError(
                "Sponsor wallet has no SUI coins. Send some SUI to the sponsor address so it can pay for gas."
                    .to_string(),
            )
        })?;

    let price = match client.get_reference_gas_price().await {
        Ok(price) => price,
        Err(e) => {
            log::warn!("Reference gas price unavailable, using default: {e}");
            DEFAULT_REFERENCE_GAS_PRICE_MIST
        }
    };

    let data = TransactionData::new(
        kind,
        *sender,
        GasData { payment: vec![gas_coin], owner: sponsor_address, price, budget: gas_budget_mist },
    );

    let tx_bytes = data.to_bytes()?;
    let sponsor_signature = keypair.sign_transaction_bytes(&tx_bytes);

    Ok(SponsoredTransaction {
        tx_bytes_b64: data.to_base64()?,
        sponsor_signature,
        sponsor_address,
    })
}

/// The sponsoring collaborator as seen by the execution flow. The local
/// implementation signs in-process; deployments may substitute a remote
/// endpoint.
#[async_trait]
pub trait SponsorApi: Send + Sync {
    async fn sponsor(
        &self,
        transaction_kind_b64: &str,
        sender: &SuiAddress,
    ) -> Result<SponsoredTransaction, SkittyError>;
}

pub struct LocalSponsor {
    client: Arc<dyn QueryClient>,
}

impl LocalSponsor {
    pub fn new(client: Arc<dyn QueryClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SponsorApi for LocalSponsor {
    async fn sponsor(
        &self,
        transaction_kind_b64: &str,
        sender: &SuiAddress,
    ) -> Result<SponsoredTransaction, SkittyError> {
        // the keypair is re-resolved per request; no state survives between calls
        let keypair = crate::state::get_sponsor()?;
        sponsor_transaction_kind(self.client.as_ref(), &keypair, transaction_kind_b64, sender)
            .await
    }
}
