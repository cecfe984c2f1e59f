//! Typed records for the query collaborator. Responses from the node are
//! dynamically shaped; everything is validated and narrowed here at the
//! boundary so nothing loosely-typed propagates inward.

use crate::{error::SkittyError, types::SuiAddress};
use serde::Deserialize;

/// One page of a cursor-based listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub next_cursor: Option<String>,
    pub has_next_page: bool,
}

/// An owned object as reported by the node, narrowed to the fields the
/// scanner consumes
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedObject {
    pub object_id: SuiAddress,
    pub version: u64,
    pub digest: String,
    pub object_type: Option<String>,
    /// raw storage rebate in mist; absent fields degrade to 0
    pub storage_rebate: u64,
    /// Move field contents as JSON, when requested
    pub content_fields: Option<serde_json::Value>,
}

/// Normalized module signature used for burn discovery
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NormalizedModule {
    #[serde(default, rename = "exposedFunctions")]
    pub exposed_functions: std::collections::HashMap<String, NormalizedFunction>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NormalizedFunction {
    #[serde(default, rename = "isEntry")]
    pub is_entry: bool,
    #[serde(default)]
    pub parameters: Vec<NormalizedType>,
}

/// A normalized Move type. Primitives arrive as bare strings ("U64",
/// "Address"); everything else is an externally-tagged object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NormalizedType {
    Primitive(String),
    Composite(Box<CompositeType>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum CompositeType {
    Struct {
        address: String,
        module: String,
        name: String,
        #[serde(default, rename = "typeArguments")]
        type_arguments: Vec<serde_json::Value>,
    },
    Reference(NormalizedType),
    MutableReference(NormalizedType),
    Vector(NormalizedType),
    TypeParameter(u16),
}

impl NormalizedType {
    /// The struct at the root of this type, unwrapping references (but not
    /// vectors): a burn entry point may take its argument by value or by
    /// either reference.
    pub fn struct_root(&self) -> Option<(&str, &str, &str)> {
        match self {
            NormalizedType::Primitive(_) => None,
            NormalizedType::Composite(composite) => match composite.as_ref() {
                CompositeType::Struct { address, module, name, .. } => {
                    Some((address, module, name))
                }
                CompositeType::Reference(inner) | CompositeType::MutableReference(inner) => {
                    inner.struct_root()
                }
                _ => None,
            },
        }
    }
}

/// Gas usage from a dry run, parsed out of the node's string-encoded integers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasUsed {
    pub computation_cost: u64,
    pub storage_cost: u64,
    pub storage_rebate: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BalanceChange {
    pub owner: Option<SuiAddress>,
    pub coin_type: String,
    pub amount: i128,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub status_ok: bool,
    pub gas_used: Option<GasUsed>,
    pub balance_changes: Vec<BalanceChange>,
}

/// Parse one of the node's string-encoded u64 fields
pub fn parse_u64_field(value: &serde_json::Value, field: &str) -> Result<u64, SkittyError> {
    match value {
        serde_json::Value::String(s) => s.parse::<u64>().map_err(|_| {
            SkittyError::SerializationError(format!("Field {field} is not a u64: {s}"))
        }),
        serde_json::Value::Number(n) => n.as_u64().ok_or_else(|| {
            SkittyError::SerializationError(format!("Field {field} is not a u64: {n}"))
        }),
        _ => Err(SkittyError::SerializationError(format!("Field {field} has no numeric value"))),
    }
}
