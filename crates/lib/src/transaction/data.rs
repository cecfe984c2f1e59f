use crate::{
    error::SkittyError,
    signer::keypair::Ed25519Keypair,
    transaction::ptb::TransactionKind,
    types::{ObjectRef, SuiAddress},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasData {
    pub payment: Vec<ObjectRef>,
    /// The gas owner may differ from the sender (sponsored transactions)
    pub owner: SuiAddress,
    pub price: u64,
    pub budget: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionExpiration {
    None,
    Epoch(u64),
}

/// A fully-specified transaction: the kind plus sender, gas, and expiration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionData {
    pub kind: TransactionKind,
    pub sender: SuiAddress,
    pub gas_data: GasData,
    pub expiration: TransactionExpiration,
}

impl TransactionData {
    pub fn new(kind: TransactionKind, sender: SuiAddress, gas_data: GasData) -> Self {
        Self { kind, sender, gas_data, expiration: TransactionExpiration::None }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SkittyError> {
        Ok(bcs::to_bytes(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SkittyError> {
        Ok(bcs::from_bytes(bytes)?)
    }

    pub fn to_base64(&self) -> Result<String, SkittyError> {
        Ok(BASE64.encode(self.to_bytes()?))
    }

    pub fn from_base64(encoded: &str) -> Result<Self, SkittyError> {
        let bytes = BASE64.decode(encoded.trim())?;
        Self::from_bytes(&bytes)
    }

    /// The digest a signer commits to: Blake2b-256(intent ‖ bcs bytes)
    pub fn signing_digest(&self) -> Result<[u8; 32], SkittyError> {
        Ok(Ed25519Keypair::transaction_digest(&self.to_bytes()?))
    }
}
