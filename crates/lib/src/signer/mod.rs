pub mod keypair;

pub use keypair::Ed25519Keypair;

use crate::{error::SkittyError, types::SuiAddress};
use async_trait::async_trait;

/// The user's signing identity. Signing for the user is outside the
/// sponsorship coordinator's scope; callers supply an implementation
/// (a local key for the CLI, a wallet bridge elsewhere).
#[async_trait]
pub trait UserSigner: Send + Sync {
    fn address(&self) -> SuiAddress;

    /// Produce a serialized signature over built transaction bytes
    async fn sign_transaction_bytes(&self, tx_bytes: &[u8]) -> Result<String, SkittyError>;
}

/// A user signer backed by a local keypair
pub struct LocalSigner {
    keypair: Ed25519Keypair,
}

impl LocalSigner {
    pub fn new(keypair: Ed25519Keypair) -> Self {
        Self { keypair }
    }

    pub fn from_env(var: &str) -> Result<Self, SkittyError> {
        Ok(Self { keypair: Ed25519Keypair::from_env(var)? })
    }
}

#[async_trait]
impl UserSigner for LocalSigner {
    fn address(&self) -> SuiAddress {
        self.keypair.address()
    }

    async fn sign_transaction_bytes(&self, tx_bytes: &[u8]) -> Result<String, SkittyError> {
        Ok(self.keypair.sign_transaction_bytes(tx_bytes))
    }
}
