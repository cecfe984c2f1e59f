//! Ed25519 signing in the network's format: addresses are
//! Blake2b-256(flag ‖ pubkey), transactions are signed over
//! Blake2b-256(intent ‖ bcs bytes), and serialized signatures are
//! base64(flag ‖ signature ‖ pubkey).

use crate::{error::SkittyError, types::SuiAddress};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use blake2::{digest::consts::U32, Blake2b, Digest};
use ed25519_dalek::{Signer, SigningKey};

type Blake2b256 = Blake2b<U32>;

pub const ED25519_SCHEME_FLAG: u8 = 0x00;
/// Intent prefix for transaction data: scope, version, app id
pub const TRANSACTION_INTENT: [u8; 3] = [0, 0, 0];

const SEED_LENGTH: usize = 32;

pub struct Ed25519Keypair {
    signing_key: SigningKey,
}

impl Ed25519Keypair {
    pub fn from_seed_bytes(seed: [u8; SEED_LENGTH]) -> Self {
        Self { signing_key: SigningKey::from_bytes(&seed) }
    }

    /// Accepts a base64-encoded 32-byte seed, or 33 bytes with a leading
    /// scheme flag (the common export format)
    pub fn from_base64(encoded: &str) -> Result<Self, SkittyError> {
        let bytes = BASE64.decode(encoded.trim()).map_err(|_| {
            SkittyError::SigningError("Private key is not valid base64".to_string())
        })?;
        let seed: [u8; SEED_LENGTH] = match bytes.len() {
            SEED_LENGTH => bytes.as_slice().try_into().expect("length checked"),
            len if len == SEED_LENGTH + 1 && bytes[0] == ED25519_SCHEME_FLAG => {
                bytes[1..].try_into().expect("length checked")
            }
            len => {
                return Err(SkittyError::SigningError(format!(
                    "Private key must be a 32-byte seed, got {len} bytes"
                )))
            }
        };
        Ok(Self::from_seed_bytes(seed))
    }

    pub fn from_env(var: &str) -> Result<Self, SkittyError> {
        let encoded = std::env::var(var)
            .map_err(|_| SkittyError::ConfigError(format!("{var} is not set")))?;
        Self::from_base64(&encoded)
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Address = Blake2b-256(scheme flag ‖ public key)
    pub fn address(&self) -> SuiAddress {
        let mut hasher = Blake2b256::new();
        hasher.update([ED25519_SCHEME_FLAG]);
        hasher.update(self.public_key_bytes());
        let digest: [u8; 32] = hasher.finalize().into();
        SuiAddress::new(digest)
    }

    /// Signing digest for built transaction bytes:
    /// Blake2b-256(intent ‖ tx bytes)
    pub fn transaction_digest(tx_bytes: &[u8]) -> [u8; 32] {
        let mut hasher = Blake2b256::new();
        hasher.update(TRANSACTION_INTENT);
        hasher.update(tx_bytes);
        hasher.finalize().into()
    }

    /// Serialized signature over a 32-byte digest:
    /// base64(flag ‖ signature ‖ pubkey)
    pub fn sign_digest(&self, digest: &[u8; 32]) -> String {
        let signature = self.signing_key.sign(digest);
        let mut serialized = Vec::with_capacity(1 + 64 + 32);
        serialized.push(ED25519_SCHEME_FLAG);
        serialized.extend_from_slice(&signature.to_bytes());
        serialized.extend_from_slice(&self.public_key_bytes());
        BASE64.encode(serialized)
    }

    pub fn sign_transaction_bytes(&self, tx_bytes: &[u8]) -> String {
        let digest = Self::transaction_digest(tx_bytes);
        self.sign_digest(&digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_keypair() -> Ed25519Keypair {
        Ed25519Keypair::from_seed_bytes([7u8; 32])
    }

    #[test]
    fn test_address_is_deterministic_and_distinct() {
        let a = test_keypair().address();
        let b = test_keypair().address();
        assert_eq!(a, b);
        let other = Ed25519Keypair::from_seed_bytes([8u8; 32]).address();
        assert_ne!(a, other);
    }

    #[test]
    fn test_from_base64_seed_forms() {
        let seed = [7u8; 32];
        let bare = BASE64.encode(seed);
        let keypair = Ed25519Keypair::from_base64(&bare).unwrap();
        assert_eq!(keypair.address(), test_keypair().address());

        // with leading scheme flag
        let mut flagged = vec![ED25519_SCHEME_FLAG];
        flagged.extend_from_slice(&seed);
        let keypair = Ed25519Keypair::from_base64(&BASE64.encode(flagged)).unwrap();
        assert_eq!(keypair.address(), test_keypair().address());
    }

    #[test]
    fn test_from_base64_rejects_bad_input() {
        assert!(Ed25519Keypair::from_base64("!!!").is_err());
        assert!(Ed25519Keypair::from_base64(&BASE64.encode([1u8; 16])).is_err());
    }

    #[test]
    fn test_from_env_missing_is_config_error() {
        let result = Ed25519Keypair::from_env("SKITTY_TEST_KEY_THAT_IS_NOT_SET");
        assert!(matches!(result, Err(SkittyError::ConfigError(_))));
    }

    #[test]
    fn test_signature_serialization_shape() {
        let keypair = test_keypair();
        let signature = keypair.sign_transaction_bytes(b"tx bytes");
        let decoded = BASE64.decode(signature).unwrap();
        assert_eq!(decoded.len(), 1 + 64 + 32);
        assert_eq!(decoded[0], ED25519_SCHEME_FLAG);
        assert_eq!(&decoded[65..], &keypair.public_key_bytes());
    }

    #[test]
    fn test_signing_is_deterministic_over_same_bytes() {
        let keypair = test_keypair();
        assert_eq!(
            keypair.sign_transaction_bytes(b"abc"),
            keypair.sign_transaction_bytes(b"abc")
        );
        assert_ne!(
            keypair.sign_transaction_bytes(b"abc"),
            keypair.sign_transaction_bytes(b"abd")
        );
    }
}
