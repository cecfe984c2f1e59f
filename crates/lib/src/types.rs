use crate::error::SkittyError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

pub const ADDRESS_LENGTH: usize = 32;

/// A 32-byte Sui address. Object ids share the same representation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SuiAddress([u8; ADDRESS_LENGTH]);

/// Object ids are addresses on Sui
pub type ObjectId = SuiAddress;

impl SuiAddress {
    pub const ZERO: SuiAddress = SuiAddress([0; ADDRESS_LENGTH]);

    pub fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SkittyError> {
        if bytes.len() != ADDRESS_LENGTH {
            return Err(SkittyError::ValidationError(format!(
                "Address must be {ADDRESS_LENGTH} bytes, got {}",
                bytes.len()
            )));
        }
        let mut out = [0u8; ADDRESS_LENGTH];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Canonical form: `0x` + 64 lowercase hex chars
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Shortened form for display: `0x0154…8eb1`
    pub fn short(&self) -> String {
        let full = hex::encode(self.0);
        format!("0x{}…{}", &full[..4], &full[full.len() - 4..])
    }
}

impl FromStr for SuiAddress {
    type Err = SkittyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| {
                SkittyError::ValidationError(format!("Address missing 0x prefix: {trimmed}"))
            })?;
        if digits.is_empty() || digits.len() > ADDRESS_LENGTH * 2 {
            return Err(SkittyError::ValidationError(format!(
                "Address has invalid length: {trimmed}"
            )));
        }
        // Short forms like 0x2 are valid and left-pad to 32 bytes
        let padded = format!("{digits:0>64}");
        let bytes = hex::decode(&padded).map_err(|_| {
            SkittyError::ValidationError(format!("Address is not valid hex: {trimmed}"))
        })?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

// Human-readable formats (JSON) carry the hex form; binary formats (bcs) carry raw bytes.
impl Serialize for SuiAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for SuiAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            SuiAddress::from_bytes(&bytes).map_err(de::Error::custom)
        }
    }
}

/// A versioned reference to an owned object, as required for gas payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub object_id: ObjectId,
    pub version: u64,
    /// base58 object digest
    pub digest: String,
}

/// base58 transaction digest returned by execution
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionDigest(pub String);

impl fmt::Display for TransactionDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_address() {
        let s = "0x0154543c5e9d2db3b12d5b761b204b06620f35561b6065f5a793889fcd148eb1";
        let addr: SuiAddress = s.parse().unwrap();
        assert_eq!(addr.to_hex(), s);
        assert_eq!(addr.to_string(), s);
    }

    #[test]
    fn test_parse_short_address_left_pads() {
        let addr: SuiAddress = "0x2".parse().unwrap();
        assert_eq!(
            addr.to_hex(),
            "0x0000000000000000000000000000000000000000000000000000000000000002"
        );
        // Long and short forms are the same address
        let long: SuiAddress =
            "0x0000000000000000000000000000000000000000000000000000000000000002".parse().unwrap();
        assert_eq!(addr, long);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<SuiAddress>().is_err());
        assert!("2".parse::<SuiAddress>().is_err());
        assert!("0x".parse::<SuiAddress>().is_err());
        assert!("0xzz".parse::<SuiAddress>().is_err());
        let too_long = format!("0x{}", "a".repeat(65));
        assert!(too_long.parse::<SuiAddress>().is_err());
    }

    #[test]
    fn test_json_round_trip_is_hex() {
        let addr: SuiAddress = "0x2".parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert!(json.contains("0x0000"));
        let back: SuiAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, back);
    }

    #[test]
    fn test_bcs_round_trip() {
        let addr: SuiAddress =
            "0x0154543c5e9d2db3b12d5b761b204b06620f35561b6065f5a793889fcd148eb1".parse().unwrap();
        let bytes = bcs::to_bytes(&addr).unwrap();
        let back: SuiAddress = bcs::from_bytes(&bytes).unwrap();
        assert_eq!(addr, back);
    }

    #[test]
    fn test_short_display() {
        let addr: SuiAddress =
            "0x0154543c5e9d2db3b12d5b761b204b06620f35561b6065f5a793889fcd148eb1".parse().unwrap();
        assert_eq!(addr.short(), "0x0154…8eb1");
    }
}
