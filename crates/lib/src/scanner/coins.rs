//! Coin discovery: groups a wallet's coin objects into merge candidates
//! (>= 2 positive-balance coins of one type) and destroy candidates (exactly
//! zero balance).

use crate::{
    action::{ActionKind, CleanupAction, ScanProgress},
    constant::{COIN_TYPE, OWNED_OBJECTS_PAGE_SIZE},
    error::SkittyError,
    fee::FeeUtil,
    move_type::{coin_type_arg, short_label},
    query::{types::OwnedObject, QueryClient},
    scanner::{report, ScanContext},
    types::{ObjectId, SuiAddress},
};
use std::collections::BTreeMap;
use tokio::sync::mpsc;

/// A coin balance as extracted from object contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParsedBalance {
    Zero,
    NonZero(u64),
    /// Could not be confidently parsed. Treated as "has value": a coin with
    /// an unknown balance must never be offered for destruction.
    Unknown,
}

impl ParsedBalance {
    pub(crate) fn display_mist(self) -> u64 {
        match self {
            ParsedBalance::Zero => 0,
            ParsedBalance::NonZero(value) => value,
            ParsedBalance::Unknown => 1,
        }
    }
}

/// Extract a coin balance from content JSON. The balance may be a bare
/// string or a `{ value: "..." }` wrapper; anything else degrades to
/// [`ParsedBalance::Unknown`].
pub(crate) fn coin_balance_from_content(content: Option<&serde_json::Value>) -> ParsedBalance {
    let Some(content) = content else {
        return ParsedBalance::Unknown;
    };
    let Some(balance) = content.get("balance") else {
        return ParsedBalance::Unknown;
    };
    let raw = match balance {
        serde_json::Value::String(s) => s.as_str(),
        serde_json::Value::Object(map) => match map.get("value") {
            Some(serde_json::Value::String(s)) => s.as_str(),
            _ => return ParsedBalance::Unknown,
        },
        _ => return ParsedBalance::Unknown,
    };
    match raw.parse::<u64>() {
        Ok(0) => ParsedBalance::Zero,
        Ok(value) => ParsedBalance::NonZero(value),
        Err(_) => ParsedBalance::Unknown,
    }
}

struct CoinGroup {
    object_ids: Vec<ObjectId>,
    balances: Vec<u64>,
    storage_rebate_total: u64,
}

pub async fn find_coin_actions(
    client: &dyn QueryClient,
    context: &ScanContext,
    address: &SuiAddress,
    progress: &Option<mpsc::UnboundedSender<ScanProgress>>,
) -> Result<Vec<CleanupAction>, SkittyError> {
    report(progress, "fetching coins", 0, 1);

    let mut coins: Vec<OwnedObject> = Vec::new();
    let mut cursor: Option<String> = None;
    let mut page_count = 0usize;
    loop {
        let page = client
            .get_owned_objects(address, Some(COIN_TYPE), cursor, OWNED_OBJECTS_PAGE_SIZE)
            .await?;
        coins.extend(page.data);
        page_count += 1;
        report(progress, "fetching coins", page_count, page_count + 1);
        if !page.has_next_page || page.next_cursor.is_none() {
            break;
        }
        cursor = page.next_cursor;
    }

    report(progress, "analyzing coins", 0, coins.len());

    let mut coins_by_type: BTreeMap<String, CoinGroup> = BTreeMap::new();
    let mut zero_balance_coins: Vec<(ObjectId, String, u64)> = Vec::new();

    for (index, coin) in coins.iter().enumerate() {
        if (index + 1) % 10 == 0 {
            report(progress, "analyzing coins", index + 1, coins.len());
        }
        let Some(coin_type) = &coin.object_type else {
            continue;
        };
        let balance = coin_balance_from_content(coin.content_fields.as_ref());
        if balance == ParsedBalance::Zero {
            zero_balance_coins.push((coin.object_id, coin_type.clone(), coin.storage_rebate));
        } else {
            let group = coins_by_type.entry(coin_type.clone()).or_insert_with(|| CoinGroup {
                object_ids: Vec::new(),
                balances: Vec::new(),
                storage_rebate_total: 0,
            });
            group.object_ids.push(coin.object_id);
            group.balances.push(balance.display_mist());
            group.storage_rebate_total =
                group.storage_rebate_total.checked_add(coin.storage_rebate).ok_or_else(|| {
                    SkittyError::ValidationError("Storage rebate overflow".to_string())
                })?;
        }
    }

    let mut actions = Vec::new();

    for (coin_type, group) in coins_by_type {
        // a single coin has nothing to merge with
        if group.object_ids.len() <= 1 {
            continue;
        }
        let type_arg = coin_type_arg(&coin_type);
        if context.coin_blocklist.contains(&type_arg) {
            continue;
        }
        let Some(economics) = FeeUtil::viable_economics(
            ActionKind::MergeCoins,
            group.object_ids.len(),
            group.storage_rebate_total,
        ) else {
            continue;
        };
        actions.push(CleanupAction::MergeCoins {
            coin_type,
            object_ids: group.object_ids,
            object_balances: group.balances,
            economics,
            label: short_label(&type_arg),
        });
    }

    for (object_id, coin_type, storage_rebate) in zero_balance_coins {
        let type_arg = coin_type_arg(&coin_type);
        if context.coin_blocklist.contains(&type_arg) {
            continue;
        }
        let Some(economics) =
            FeeUtil::viable_economics(ActionKind::DestroyZero, 1, storage_rebate)
        else {
            continue;
        };
        actions.push(CleanupAction::DestroyZero {
            coin_type,
            object_id,
            economics,
            label: short_label(&type_arg),
        });
    }

    Ok(actions)
}
