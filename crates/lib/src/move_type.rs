//! Parsing and matching of Move type strings (`0xPKG::module::Name<args>`)
//! as returned by the query layer. Package addresses are normalized so the
//! short (`0x2`) and long forms compare equal.

use crate::{constant::CORE_PROTECTED_TYPES, error::SkittyError, types::SuiAddress};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::LazyLock};

static MOVE_TYPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0x[a-fA-F0-9]+)::([^:<]+)::([^<]+)(?:<(.+)>)?$")
        .expect("Failed to create move type regex pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveTypeTag {
    pub package: SuiAddress,
    pub module: String,
    pub name: String,
    /// Raw type parameter strings, unparsed
    pub type_params: Vec<String>,
}

impl MoveTypeTag {
    pub fn parse(type_str: &str) -> Result<Self, SkittyError> {
        let caps = MOVE_TYPE_PATTERN.captures(type_str.trim()).ok_or_else(|| {
            SkittyError::ValidationError(format!("Not a Move type: {type_str}"))
        })?;
        let package: SuiAddress = caps[1].parse()?;
        let type_params = caps
            .get(4)
            .map(|m| split_type_params(m.as_str()))
            .unwrap_or_default();
        Ok(Self {
            package,
            module: caps[2].to_string(),
            name: caps[3].to_string(),
            type_params,
        })
    }

    /// Same struct regardless of type instantiation
    pub fn same_struct(&self, other: &MoveTypeTag) -> bool {
        self.package == other.package && self.module == other.module && self.name == other.name
    }

    pub fn is_coin(&self) -> bool {
        self.package == framework_package() && self.module == "coin" && self.name == "Coin"
    }

    pub fn is_kiosk(&self) -> bool {
        self.package == framework_package() && self.module == "kiosk" && self.name == "Kiosk"
    }

    pub fn is_kiosk_owner_cap(&self) -> bool {
        self.package == framework_package()
            && self.module == "kiosk"
            && self.name == "KioskOwnerCap"
    }

    pub fn is_sui_coin(&self) -> bool {
        self.is_coin()
            && self
                .type_params
                .first()
                .and_then(|arg| MoveTypeTag::parse(arg).ok())
                .map(|arg| {
                    arg.package == framework_package()
                        && arg.module == "sui"
                        && arg.name.eq_ignore_ascii_case("SUI")
                })
                .unwrap_or(false)
    }
}

impl fmt::Display for MoveTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.type_params.is_empty() {
            write!(f, "{}::{}::{}", self.package, self.module, self.name)
        } else {
            write!(
                f,
                "{}::{}::{}<{}>",
                self.package,
                self.module,
                self.name,
                self.type_params.join(", ")
            )
        }
    }
}

fn framework_package() -> SuiAddress {
    "0x2".parse().expect("framework package address is valid")
}

// Split top-level type params, respecting nested angle brackets
fn split_type_params(raw: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in raw.chars() {
        match c {
            '<' => {
                depth += 1;
                current.push(c);
            }
            '>' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

/// Extract the type arg from a coin type
/// (e.g. "0x2::coin::Coin<0x..::wal::WAL>" -> "0x..::wal::WAL")
pub fn coin_type_arg(coin_type: &str) -> String {
    if let (Some(open), true) = (coin_type.find('<'), coin_type.ends_with('>')) {
        coin_type[open + 1..coin_type.len() - 1].to_string()
    } else {
        coin_type.to_string()
    }
}

/// True if this object type is protected and must never be suggested for burn/destroy
pub fn is_protected_type(object_type: &str) -> bool {
    let Ok(tag) = MoveTypeTag::parse(object_type) else {
        // Unparseable types are left alone
        return true;
    };
    CORE_PROTECTED_TYPES.iter().any(|protected| {
        MoveTypeTag::parse(protected)
            .map(|p| p.same_struct(&tag))
            .unwrap_or(false)
    })
}

/// True for the network's native currency type in any address form
/// ("0x2::sui::SUI", long-form package, any case for the struct name)
pub fn is_native_coin_type(type_str: &str) -> bool {
    MoveTypeTag::parse(type_str)
        .map(|tag| {
            tag.package == framework_package()
                && tag.module == "sui"
                && tag.name.eq_ignore_ascii_case("SUI")
        })
        .unwrap_or(false)
}

/// Display label: the type without its package prefix (e.g. "wal::WAL")
pub fn short_label(type_str: &str) -> String {
    match type_str.find("::") {
        Some(idx) => type_str[idx + 2..].to_string(),
        None => type_str.to_string(),
    }
}

/// A fully-qualified Move entry point (`package::module::function`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCallTarget {
    pub package: SuiAddress,
    pub module: String,
    pub function: String,
}

impl MoveCallTarget {
    pub fn new(package: SuiAddress, module: &str, function: &str) -> Self {
        Self { package, module: module.to_string(), function: function.to_string() }
    }
}

impl FromStr for MoveCallTarget {
    type Err = SkittyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split("::").collect();
        if parts.len() != 3 {
            return Err(SkittyError::ValidationError(format!("Not a Move call target: {s}")));
        }
        Ok(Self {
            package: parts[0].parse()?,
            module: parts[1].to_string(),
            function: parts[2].to_string(),
        })
    }
}

impl fmt::Display for MoveCallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.package, self.module, self.function)
    }
}

/// A statically-known burnable type and the entry point that destroys it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownBurnableEntry {
    pub type_pattern: String,
    pub target: String,
}

impl KnownBurnableEntry {
    pub fn matches(&self, object_type: &str) -> bool {
        object_type == self.type_pattern || object_type.starts_with(&self.type_pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_type() {
        let tag = MoveTypeTag::parse("0x2::kiosk::Kiosk").unwrap();
        assert_eq!(tag.module, "kiosk");
        assert_eq!(tag.name, "Kiosk");
        assert!(tag.type_params.is_empty());
        assert!(tag.is_kiosk());
    }

    #[test]
    fn test_parse_generic_type() {
        let tag = MoveTypeTag::parse("0x2::coin::Coin<0x2::sui::SUI>").unwrap();
        assert!(tag.is_coin());
        assert!(tag.is_sui_coin());
        assert_eq!(tag.type_params, vec!["0x2::sui::SUI".to_string()]);
    }

    #[test]
    fn test_parse_nested_generics() {
        let tag =
            MoveTypeTag::parse("0xabc::table::Table<0x1::string::String, 0x2::coin::Coin<0x2::sui::SUI>>")
                .unwrap();
        assert_eq!(tag.type_params.len(), 2);
        assert_eq!(tag.type_params[1], "0x2::coin::Coin<0x2::sui::SUI>");
    }

    #[test]
    fn test_short_and_long_package_forms_match() {
        let short = MoveTypeTag::parse("0x2::kiosk::Kiosk").unwrap();
        let long = MoveTypeTag::parse(
            "0x0000000000000000000000000000000000000000000000000000000000000002::kiosk::Kiosk",
        )
        .unwrap();
        assert!(short.same_struct(&long));
    }

    #[test]
    fn test_sui_coin_long_form() {
        let tag = MoveTypeTag::parse(
            "0x2::coin::Coin<0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI>",
        )
        .unwrap();
        assert!(tag.is_sui_coin());
    }

    #[test]
    fn test_non_sui_coin() {
        let tag = MoveTypeTag::parse("0x2::coin::Coin<0xabc::wal::WAL>").unwrap();
        assert!(tag.is_coin());
        assert!(!tag.is_sui_coin());
    }

    #[test]
    fn test_coin_type_arg() {
        assert_eq!(coin_type_arg("0x2::coin::Coin<0xabc::wal::WAL>"), "0xabc::wal::WAL");
        assert_eq!(coin_type_arg("0xabc::wal::WAL"), "0xabc::wal::WAL");
    }

    #[test]
    fn test_protected_types() {
        assert!(is_protected_type("0x2::kiosk::Kiosk"));
        assert!(is_protected_type("0x2::staking_pool::StakedSui"));
        assert!(is_protected_type("0x2::package::UpgradeCap"));
        // Generic instantiations of protected types are still protected
        assert!(is_protected_type("0x2::display::Display<0xabc::nft::Nft>"));
        assert!(!is_protected_type("0xabc::nft::Nft"));
        // Unparseable types are treated as protected (never burned)
        assert!(is_protected_type("garbage"));
    }

    #[test]
    fn test_native_coin_type_forms() {
        assert!(is_native_coin_type("0x2::sui::SUI"));
        assert!(is_native_coin_type(
            "0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI"
        ));
        assert!(!is_native_coin_type("0xabc::wal::WAL"));
        assert!(!is_native_coin_type("0x2::coin::Coin<0x2::sui::SUI>"));
    }

    #[test]
    fn test_short_label() {
        assert_eq!(short_label("0xabc::wal::WAL"), "wal::WAL");
        assert_eq!(short_label("nolabel"), "nolabel");
    }

    #[test]
    fn test_move_call_target_round_trip() {
        let target: MoveCallTarget = "0x2::coin::destroy_zero".parse().unwrap();
        assert_eq!(target.module, "coin");
        assert_eq!(target.function, "destroy_zero");
        assert!("0x2::coin".parse::<MoveCallTarget>().is_err());
    }

    #[test]
    fn test_known_burnable_prefix_match() {
        let entry = KnownBurnableEntry {
            type_pattern: "0xabc::token::Token".to_string(),
            target: "0xabc::token::burn".to_string(),
        };
        assert!(entry.matches("0xabc::token::Token"));
        assert!(entry.matches("0xabc::token::Token<0x2::sui::SUI>"));
        assert!(!entry.matches("0xdef::token::Token"));
    }
}
