use crate::{
    move_type::MoveCallTarget,
    types::{ObjectId, SuiAddress},
};
use serde::{Deserialize, Serialize};

/// The four kinds of reclaim work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    MergeCoins,
    DestroyZero,
    CloseKiosk,
    Burn,
}

/// Money math attached to every action, all in mist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEconomics {
    /// sum of storage rebates (raw) for involved objects
    pub storage_rebate_total: u64,
    /// user rebate = floor(storage_rebate_total * 99 / 100)
    pub user_rebate_mist: u64,
    /// estimated gas for this action, before simulation
    pub estimated_gas_mist: u64,
    /// user_rebate - estimated_gas - fee; negative = not worth it
    pub net_gain_mist: i64,
}

/// The atomic unit of reclaim work produced by a scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CleanupAction {
    /// >= 2 coin objects of the same type with nonzero balance, merged into the first
    MergeCoins {
        coin_type: String,
        object_ids: Vec<ObjectId>,
        /// per-object balance (mist) for display; order matches object_ids
        object_balances: Vec<u64>,
        economics: ActionEconomics,
        label: String,
    },
    /// A coin object with exactly zero balance
    DestroyZero {
        coin_type: String,
        object_id: ObjectId,
        economics: ActionEconomics,
        label: String,
    },
    /// An empty kiosk closable via the wallet's matching owner cap
    CloseKiosk {
        kiosk_id: ObjectId,
        owner_cap_id: ObjectId,
        economics: ActionEconomics,
        label: String,
    },
    /// Objects of one type with a known or discovered destructive entry point
    Burn {
        object_type: String,
        move_target: MoveCallTarget,
        /// true when the target was found via module introspection rather than the static table
        discovered: bool,
        object_ids: Vec<ObjectId>,
        economics: ActionEconomics,
        label: String,
    },
}

impl CleanupAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            CleanupAction::MergeCoins { .. } => ActionKind::MergeCoins,
            CleanupAction::DestroyZero { .. } => ActionKind::DestroyZero,
            CleanupAction::CloseKiosk { .. } => ActionKind::CloseKiosk,
            CleanupAction::Burn { .. } => ActionKind::Burn,
        }
    }

    pub fn economics(&self) -> &ActionEconomics {
        match self {
            CleanupAction::MergeCoins { economics, .. }
            | CleanupAction::DestroyZero { economics, .. }
            | CleanupAction::CloseKiosk { economics, .. }
            | CleanupAction::Burn { economics, .. } => economics,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CleanupAction::MergeCoins { label, .. }
            | CleanupAction::DestroyZero { label, .. }
            | CleanupAction::CloseKiosk { label, .. }
            | CleanupAction::Burn { label, .. } => label,
        }
    }

    /// The on-chain objects this action touches. Never empty.
    pub fn object_ids(&self) -> Vec<ObjectId> {
        match self {
            CleanupAction::MergeCoins { object_ids, .. } => object_ids.clone(),
            CleanupAction::DestroyZero { object_id, .. } => vec![*object_id],
            CleanupAction::CloseKiosk { kiosk_id, .. } => vec![*kiosk_id],
            CleanupAction::Burn { object_ids, .. } => object_ids.clone(),
        }
    }

    /// Stable identity used to match executed actions against in-memory state
    pub fn action_key(&self) -> String {
        let mut ids: Vec<String> =
            self.object_ids().iter().map(|id| id.to_hex()).collect();
        ids.sort();
        format!("{:?}:{}", self.kind(), ids.join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProgress {
    pub phase: String,
    pub current: usize,
    pub total: usize,
}

impl ScanProgress {
    pub fn new(phase: &str, current: usize, total: usize) -> Self {
        Self { phase: phase.to_string(), current, total }
    }
}

/// The result of one full scan of an address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub actions: Vec<CleanupAction>,
    /// total estimated user rebate (mist) across all actions
    pub total_user_rebate_mist: u64,
    pub scanned_address: SuiAddress,
}
