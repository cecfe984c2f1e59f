//! Pure reclaim economics. No I/O, integer mist throughout; fractions are
//! applied as integer ratios so every result floors exactly.

use crate::{
    action::{ActionEconomics, ActionKind},
    constant::{
        BPS_DENOMINATOR, ESTIMATED_GAS_BURN_PER_OBJECT, ESTIMATED_GAS_CLOSE_KIOSK,
        ESTIMATED_GAS_DESTROY_ZERO, ESTIMATED_GAS_MERGE_COINS, FEE_RATE_BPS,
        GAS_RESERVE_FOR_FEE_MIST, REBATE_DENOMINATOR, REBATE_NUMERATOR,
    },
};

pub struct FeeUtil {}

impl FeeUtil {
    /// Protocol fee (mist): 13.69% of the total storage rebate
    pub fn compute_fee_mist(total_storage_rebate_mist: u64) -> u64 {
        if total_storage_rebate_mist == 0 {
            return 0;
        }
        (total_storage_rebate_mist as u128 * FEE_RATE_BPS as u128 / BPS_DENOMINATOR as u128) as u64
    }

    /// User share of a storage rebate: floor(total * 99 / 100)
    pub fn user_rebate_mist(storage_rebate_total: u64) -> u64 {
        (storage_rebate_total as u128 * REBATE_NUMERATOR as u128 / REBATE_DENOMINATOR as u128)
            as u64
    }

    /// Net gain (mist). A negative simulated gas cost (a refund) never
    /// inflates the deduction.
    pub fn net_gain_mist(user_rebate_mist: u64, gas_cost_mist: i64, fee_mist: u64) -> i64 {
        let deduction = gas_cost_mist.max(0) as i128 + fee_mist as i128;
        (user_rebate_mist as i128 - deduction).clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }

    /// Minimum-viability check: the rebate must cover gas plus fee
    pub fn is_viable(user_rebate_mist: u64, gas_cost_mist: u64, fee_mist: u64) -> bool {
        user_rebate_mist as u128 >= gas_cost_mist as u128 + fee_mist as u128
    }

    /// Cap a fee taken from the gas coin so the split cannot starve gas:
    /// min(fee, max(0, balance - reserve))
    pub fn cap_fee_for_gas_coin(
        fee_mist: u64,
        gas_coin_balance_mist: u64,
        gas_reserve_mist: u64,
    ) -> u64 {
        fee_mist.min(gas_coin_balance_mist.saturating_sub(gas_reserve_mist))
    }

    /// The reserve left on the gas coin when taking a fee from it
    pub fn gas_reserve_mist(estimated_gas_mist: u64) -> u64 {
        if estimated_gas_mist > 0 {
            estimated_gas_mist
        } else {
            GAS_RESERVE_FOR_FEE_MIST
        }
    }

    /// Pre-simulation gas estimate for an action. Burns scale with object
    /// count; the other kinds are flat.
    pub fn estimated_gas_mist(kind: ActionKind, object_count: usize) -> u64 {
        match kind {
            ActionKind::MergeCoins => ESTIMATED_GAS_MERGE_COINS,
            ActionKind::DestroyZero => ESTIMATED_GAS_DESTROY_ZERO,
            ActionKind::CloseKiosk => ESTIMATED_GAS_CLOSE_KIOSK,
            ActionKind::Burn => {
                ESTIMATED_GAS_BURN_PER_OBJECT.saturating_mul(object_count as u64)
            }
        }
    }

    /// Actual gas cost from simulation effects: computation + storage - rebate.
    /// Negative when the rebate exceeds what the transaction consumes.
    pub fn gas_cost_from_simulation(
        computation_cost: u64,
        storage_cost: u64,
        storage_rebate: u64,
    ) -> i64 {
        let cost = computation_cost as i128 + storage_cost as i128 - storage_rebate as i128;
        cost.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }

    /// Amount the sponsor recoups for gas: the simulated cost when positive,
    /// otherwise the pre-simulation estimate (a refund must not zero the
    /// recoupment).
    pub fn recoup_gas_mist(simulated_cost_mist: i64, estimated_gas_mist: u64) -> u64 {
        if simulated_cost_mist > 0 {
            simulated_cost_mist as u64
        } else {
            estimated_gas_mist
        }
    }

    /// Full economics for a candidate action, or None when it is not worth
    /// executing. Economically unviable candidates are dropped at discovery
    /// time, not merely flagged.
    pub fn viable_economics(
        kind: ActionKind,
        object_count: usize,
        storage_rebate_total: u64,
    ) -> Option<ActionEconomics> {
        let user_rebate_mist = Self::user_rebate_mist(storage_rebate_total);
        let fee_mist = Self::compute_fee_mist(storage_rebate_total);
        let estimated_gas_mist = Self::estimated_gas_mist(kind, object_count);
        if !Self::is_viable(user_rebate_mist, estimated_gas_mist, fee_mist) {
            return None;
        }
        Some(ActionEconomics {
            storage_rebate_total,
            user_rebate_mist,
            estimated_gas_mist,
            net_gain_mist: Self::net_gain_mist(user_rebate_mist, estimated_gas_mist as i64, fee_mist),
        })
    }
}
