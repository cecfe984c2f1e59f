//! Batch transaction construction: packs selected cleanup actions into one
//! programmable transaction, then appends the fee/gas settlement transfers.

use crate::{
    action::CleanupAction,
    constant::{
        COIN_DESTROY_ZERO_TARGET, KIOSK_CLOSE_TARGET, MAX_ACTIONS_PER_BATCH, MAX_MERGES_PER_BATCH,
    },
    error::SkittyError,
    fee::FeeUtil,
    move_type::{coin_type_arg, MoveCallTarget},
    transaction::ptb::{Argument, TransactionKind},
    types::{ObjectId, SuiAddress},
};
use std::{
    collections::{BTreeMap, HashSet},
    str::FromStr,
};

#[cfg(not(test))]
use crate::state::get_config;

#[cfg(test)]
use crate::tests::config_mock::mock_state::get_config;

/// Settlement options for a gas-sponsored batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SponsorOptions {
    /// The original sender, who receives the user share of the rebates
    pub sender: SuiAddress,
}

/// Build one transaction batching up to [`MAX_ACTIONS_PER_BATCH`] actions.
///
/// The gas and fee coins are never consumed by merge or destroy operations.
/// Excess actions beyond the cap are silently excluded; the caller batches
/// them separately.
///
/// Sponsored settlement splits the gas coin (which collects every storage
/// rebate) into a house share (`estimated_gas + fee`, recouping the sponsor)
/// and a user share (`user_rebate - house`). A batch whose rebate cannot
/// cover the house share is refused outright.
pub fn build_batch_transaction(
    actions: &[CleanupAction],
    gas_coin_id: Option<&ObjectId>,
    total_storage_rebate_mist: u64,
    fee_coin_id: Option<&ObjectId>,
    estimated_gas_mist: u64,
    gas_coin_balance_mist: Option<u64>,
    sponsor: Option<&SponsorOptions>,
) -> Result<TransactionKind, SkittyError> {
    let config = get_config()?;
    let fee_recipient = config.reclaim.fee_recipient_address()?;

    let kiosk_close_target =
        MoveCallTarget::from_str(KIOSK_CLOSE_TARGET).expect("kiosk close target is valid");
    let destroy_zero_target =
        MoveCallTarget::from_str(COIN_DESTROY_ZERO_TARGET).expect("destroy zero target is valid");

    let mut tx = TransactionKind::new();
    let mut merge_coins_by_type: BTreeMap<String, Vec<ObjectId>> = BTreeMap::new();
    let mut action_count = 0usize;
    let cap = MAX_ACTIONS_PER_BATCH;

    let exclude_from_coins: HashSet<ObjectId> =
        [gas_coin_id, fee_coin_id].into_iter().flatten().copied().collect();

    for action in actions {
        if action_count >= cap {
            break;
        }
        match action {
            CleanupAction::MergeCoins { coin_type, object_ids, .. } => {
                let ids: Vec<ObjectId> = object_ids
                    .iter()
                    .filter(|id| !exclude_from_coins.contains(*id))
                    .copied()
                    .collect();
                if ids.len() <= 1 {
                    continue;
                }
                merge_coins_by_type.entry(coin_type.clone()).or_default().extend(ids);
                action_count += 1;
            }
            CleanupAction::DestroyZero { coin_type, object_id, .. } => {
                if exclude_from_coins.contains(object_id) {
                    continue;
                }
                let type_arg = coin_type_arg(coin_type);
                let type_arguments =
                    if type_arg == *coin_type { vec![] } else { vec![type_arg] };
                let coin = tx.obj(*object_id);
                tx.move_call(&destroy_zero_target, type_arguments, vec![coin]);
                action_count += 1;
            }
            CleanupAction::CloseKiosk { kiosk_id, owner_cap_id, .. } => {
                let kiosk = tx.obj(*kiosk_id);
                let cap_arg = tx.obj(*owner_cap_id);
                // close_and_withdraw returns the kiosk's profits as a coin;
                // it must not be left dangling, so fold it into gas
                let withdrawn = tx.move_call(&kiosk_close_target, vec![], vec![kiosk, cap_arg]);
                tx.merge_coins(Argument::GasCoin, vec![withdrawn]);
                action_count += 1;
            }
            CleanupAction::Burn { move_target, object_ids, .. } => {
                for object_id in object_ids {
                    if action_count >= cap {
                        break;
                    }
                    let obj = tx.obj(*object_id);
                    tx.move_call(move_target, vec![], vec![obj]);
                    action_count += 1;
                }
            }
        }
    }

    for ids in merge_coins_by_type.values() {
        let mut seen = HashSet::new();
        let unique: Vec<ObjectId> =
            ids.iter().filter(|id| seen.insert(**id)).copied().collect();
        let batch = &unique[..unique.len().min(MAX_MERGES_PER_BATCH)];
        if batch.len() <= 1 {
            continue;
        }
        let primary = tx.obj(batch[0]);
        let sources: Vec<Argument> = batch[1..].iter().map(|id| tx.obj(*id)).collect();
        tx.merge_coins(primary, sources);
    }

    let fee_mist = FeeUtil::compute_fee_mist(total_storage_rebate_mist);

    match sponsor {
        Some(options) => {
            let user_rebate_mist = FeeUtil::user_rebate_mist(total_storage_rebate_mist);
            let house_mist = estimated_gas_mist.checked_add(fee_mist).ok_or_else(|| {
                SkittyError::ValidationError("House amount overflow".to_string())
            })?;
            if user_rebate_mist < house_mist {
                return Err(SkittyError::InfeasibleSponsorship {
                    user_rebate_mist,
                    required_mist: house_mist,
                });
            }
            let user_mist = user_rebate_mist - house_mist;

            // zero-valued splits are omitted
            let payouts = [(house_mist, fee_recipient), (user_mist, options.sender)];
            for (amount, recipient) in payouts.into_iter().filter(|(amount, _)| *amount > 0) {
                let amount_arg = tx.pure_u64(amount)?;
                let parts = tx.split_coins(Argument::GasCoin, vec![amount_arg]);
                let recipient_arg = tx.pure_address(&recipient)?;
                tx.transfer_objects(parts, recipient_arg);
            }
        }
        None => {
            // Legacy unsponsored path: fee from a distinct fee coin when
            // supplied, else from the gas coin, capped so the gas coin keeps
            // its reserve
            let distinct_fee_coin = fee_coin_id.filter(|fee| Some(**fee) != gas_coin_id.copied());
            let fee_mist = match (distinct_fee_coin, gas_coin_balance_mist) {
                (Some(_), _) => fee_mist,
                (None, Some(balance)) => FeeUtil::cap_fee_for_gas_coin(
                    fee_mist,
                    balance,
                    FeeUtil::gas_reserve_mist(estimated_gas_mist),
                ),
                (None, None) => fee_mist,
            };
            if fee_mist > 0 {
                let coin_arg = match distinct_fee_coin {
                    Some(fee_coin) => tx.obj(*fee_coin),
                    None => Argument::GasCoin,
                };
                let amount_arg = tx.pure_u64(fee_mist)?;
                let parts = tx.split_coins(coin_arg, vec![amount_arg]);
                let recipient_arg = tx.pure_address(&fee_recipient)?;
                tx.transfer_objects(parts, recipient_arg);
            }
        }
    }

    Ok(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        action::{ActionEconomics, CleanupAction},
        constant::DEFAULT_FEE_RECIPIENT,
        tests::{
            config_mock::ConfigMockBuilder,
            object_mock::{economics, oid, oid_n},
        },
        transaction::ptb::{Command, Input},
    };

    fn merge_action(coin_type: &str, ids: Vec<ObjectId>) -> CleanupAction {
        let balances = vec![10; ids.len()];
        CleanupAction::MergeCoins {
            coin_type: coin_type.to_string(),
            object_ids: ids,
            object_balances: balances,
            economics: economics(5_000_000, 500),
            label: "test".to_string(),
        }
    }

    fn destroy_action(id: ObjectId) -> CleanupAction {
        CleanupAction::DestroyZero {
            coin_type: "0x2::coin::Coin<0xabc::wal::WAL>".to_string(),
            object_id: id,
            economics: economics(2_000, 300),
            label: "wal::WAL".to_string(),
        }
    }

    fn burn_action(ids: Vec<ObjectId>) -> CleanupAction {
        let economics = ActionEconomics {
            storage_rebate_total: 2_000_000,
            user_rebate_mist: 1_980_000,
            estimated_gas_mist: 1_200_000 * ids.len() as u64,
            net_gain_mist: 0,
        };
        CleanupAction::Burn {
            object_type: "0xabc::nft::Nft".to_string(),
            move_target: "0xabc::nft::burn".parse().unwrap(),
            discovered: true,
            object_ids: ids,
            economics,
            label: "nft::Nft".to_string(),
        }
    }

    fn count_commands(tx: &TransactionKind, pred: impl Fn(&Command) -> bool) -> usize {
        tx.commands.iter().filter(|c| pred(c)).count()
    }

    #[test]
    fn test_merge_groups_accumulate_per_type() {
        let _m = ConfigMockBuilder::new().build_and_setup();
        let actions = vec![
            merge_action("0x2::coin::Coin<0x2::sui::SUI>", vec![oid(1), oid(2)]),
            merge_action("0x2::coin::Coin<0x2::sui::SUI>", vec![oid(3), oid(4)]),
            merge_action("0x2::coin::Coin<0xabc::wal::WAL>", vec![oid(5), oid(6)]),
        ];
        let tx =
            build_batch_transaction(&actions, None, 0, None, 0, None, None).unwrap();
        // one merge command per coin type, ids accumulated
        assert_eq!(count_commands(&tx, |c| matches!(c, Command::MergeCoins { .. })), 2);
        let merge_sizes: Vec<usize> = tx
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::MergeCoins { sources, .. } => Some(sources.len()),
                _ => None,
            })
            .collect();
        assert!(merge_sizes.contains(&3)); // 4 SUI coins -> primary + 3 sources
        assert!(merge_sizes.contains(&1)); // 2 WAL coins -> primary + 1 source
    }

    #[test]
    fn test_gas_and_fee_coins_never_merged() {
        let _m = ConfigMockBuilder::new().build_and_setup();
        let gas = oid(1);
        let fee = oid(2);
        let actions = vec![merge_action("0x2::coin::Coin<0x2::sui::SUI>", vec![gas, fee, oid(3), oid(4)])];
        let tx = build_batch_transaction(
            &actions,
            Some(&gas),
            0,
            Some(&fee),
            0,
            None,
            None,
        )
        .unwrap();
        for input in &tx.inputs {
            if let Input::Object(id) = input {
                assert_ne!(*id, gas);
                assert_ne!(*id, fee);
            }
        }
    }

    #[test]
    fn test_merge_group_dropped_when_exclusion_leaves_one() {
        let _m = ConfigMockBuilder::new().build_and_setup();
        let gas = oid(1);
        let actions = vec![merge_action("0x2::coin::Coin<0x2::sui::SUI>", vec![gas, oid(2)])];
        let tx =
            build_batch_transaction(&actions, Some(&gas), 0, None, 0, None, None).unwrap();
        assert_eq!(tx.command_count(), 0);
    }

    #[test]
    fn test_merge_caps_at_protocol_limit() {
        let _m = ConfigMockBuilder::new().build_and_setup();
        let ids: Vec<ObjectId> = (1..=150u16).map(oid_n).collect();
        let actions = vec![merge_action("0x2::coin::Coin<0x2::sui::SUI>", ids)];
        let tx = build_batch_transaction(&actions, None, 0, None, 0, None, None).unwrap();
        let sources_len = tx
            .commands
            .iter()
            .find_map(|c| match c {
                Command::MergeCoins { sources, .. } => Some(sources.len()),
                _ => None,
            })
            .unwrap();
        // 100 unique coins max per type: primary + 99 sources
        assert_eq!(sources_len, MAX_MERGES_PER_BATCH - 1);
    }

    #[test]
    fn test_duplicate_merge_ids_deduped() {
        let _m = ConfigMockBuilder::new().build_and_setup();
        let actions = vec![
            merge_action("0x2::coin::Coin<0x2::sui::SUI>", vec![oid(1), oid(2)]),
            merge_action("0x2::coin::Coin<0x2::sui::SUI>", vec![oid(2), oid(3)]),
        ];
        let tx = build_batch_transaction(&actions, None, 0, None, 0, None, None).unwrap();
        let sources_len = tx
            .commands
            .iter()
            .find_map(|c| match c {
                Command::MergeCoins { sources, .. } => Some(sources.len()),
                _ => None,
            })
            .unwrap();
        // 3 unique ids -> primary + 2 sources
        assert_eq!(sources_len, 2);
    }

    #[test]
    fn test_destroy_zero_carries_type_argument() {
        let _m = ConfigMockBuilder::new().build_and_setup();
        let actions = vec![destroy_action(oid(7))];
        let tx = build_batch_transaction(&actions, None, 0, None, 0, None, None).unwrap();
        match &tx.commands[0] {
            Command::MoveCall { function, type_arguments, .. } => {
                assert_eq!(function, "destroy_zero");
                assert_eq!(type_arguments, &vec!["0xabc::wal::WAL".to_string()]);
            }
            other => panic!("Expected MoveCall, got {other:?}"),
        }
    }

    #[test]
    fn test_close_kiosk_merges_withdrawal_into_gas() {
        let _m = ConfigMockBuilder::new().build_and_setup();
        let actions = vec![CleanupAction::CloseKiosk {
            kiosk_id: oid(10),
            owner_cap_id: oid(11),
            economics: economics(500_000, 2_000),
            label: "kiosk".to_string(),
        }];
        let tx = build_batch_transaction(&actions, None, 0, None, 0, None, None).unwrap();
        assert!(matches!(&tx.commands[0], Command::MoveCall { function, .. } if function == "close_and_withdraw"));
        match &tx.commands[1] {
            Command::MergeCoins { destination, sources } => {
                assert_eq!(*destination, Argument::GasCoin);
                assert_eq!(sources, &vec![Argument::Result(0)]);
            }
            other => panic!("Expected MergeCoins into gas, got {other:?}"),
        }
    }

    #[test]
    fn test_batch_cap_limits_burn_fanout() {
        let _m = ConfigMockBuilder::new().build_and_setup();
        let ids: Vec<ObjectId> = (1..=80u16).map(oid_n).collect();
        let actions = vec![burn_action(ids)];
        let tx = build_batch_transaction(&actions, None, 0, None, 0, None, None).unwrap();
        // burn fanout stops at the action cap
        assert_eq!(
            count_commands(&tx, |c| matches!(c, Command::MoveCall { .. })),
            MAX_ACTIONS_PER_BATCH
        );
    }

    #[test]
    fn test_excess_actions_silently_excluded() {
        let _m = ConfigMockBuilder::new().build_and_setup();
        let actions: Vec<CleanupAction> =
            (1..=60u16).map(|i| destroy_action(oid_n(i))).collect();
        let tx = build_batch_transaction(&actions, None, 0, None, 0, None, None).unwrap();
        assert_eq!(
            count_commands(&tx, |c| matches!(c, Command::MoveCall { .. })),
            MAX_ACTIONS_PER_BATCH
        );
    }

    #[test]
    fn test_sponsored_settlement_splits_house_and_user() {
        let _m = ConfigMockBuilder::new().build_and_setup();
        let sender = oid(42);
        let total_rebate = 5_000_000u64; // user rebate 4_950_000, fee 684_500
        let estimated_gas = 10_000u64;
        let tx = build_batch_transaction(
            &[destroy_action(oid(7))],
            None,
            total_rebate,
            None,
            estimated_gas,
            None,
            Some(&SponsorOptions { sender }),
        )
        .unwrap();

        // two splits from gas, two transfers
        assert_eq!(count_commands(&tx, |c| matches!(c, Command::SplitCoins { coin: Argument::GasCoin, .. })), 2);
        assert_eq!(count_commands(&tx, |c| matches!(c, Command::TransferObjects { .. })), 2);

        // house amount then user amount among the pure inputs
        let house = 10_000 + 684_500u64;
        let user = 4_950_000 - house;
        let pure_u64s: Vec<u64> = tx
            .inputs
            .iter()
            .filter_map(|input| match input {
                Input::Pure(bytes) if bytes.len() == 8 => bcs::from_bytes(bytes).ok(),
                _ => None,
            })
            .collect();
        assert!(pure_u64s.contains(&house));
        assert!(pure_u64s.contains(&user));
    }

    #[test]
    fn test_sponsored_zero_user_share_omits_split() {
        let _m = ConfigMockBuilder::new().build_and_setup();
        // user rebate exactly equals house amount -> no user transfer
        let total_rebate = 1_000_000u64;
        let user_rebate = FeeUtil::user_rebate_mist(total_rebate);
        let fee = FeeUtil::compute_fee_mist(total_rebate);
        let estimated_gas = user_rebate - fee;
        let tx = build_batch_transaction(
            &[destroy_action(oid(7))],
            None,
            total_rebate,
            None,
            estimated_gas,
            None,
            Some(&SponsorOptions { sender: oid(42) }),
        )
        .unwrap();
        assert_eq!(count_commands(&tx, |c| matches!(c, Command::SplitCoins { .. })), 1);
        assert_eq!(count_commands(&tx, |c| matches!(c, Command::TransferObjects { .. })), 1);
    }

    #[test]
    fn test_sponsored_infeasible_is_hard_error() {
        let _m = ConfigMockBuilder::new().build_and_setup();
        // Scenario C: rebate 1_000_000 -> user 990_000 < estimated gas 2_000_000
        let result = build_batch_transaction(
            &[destroy_action(oid(7))],
            None,
            1_000_000,
            None,
            2_000_000,
            None,
            Some(&SponsorOptions { sender: oid(42) }),
        );
        match result {
            Err(SkittyError::InfeasibleSponsorship { user_rebate_mist, required_mist }) => {
                assert_eq!(user_rebate_mist, 990_000);
                assert_eq!(required_mist, 2_000_000 + FeeUtil::compute_fee_mist(1_000_000));
            }
            other => panic!("Expected InfeasibleSponsorship, got {other:?}"),
        }
    }

    #[test]
    fn test_unsponsored_fee_from_gas_is_capped() {
        let _m = ConfigMockBuilder::new().build_and_setup();
        let total_rebate = 5_000_000u64; // fee 684_500
        let gas = oid(1);
        // gas coin holds 700_000 with a 100_000 reserve -> fee capped to 600_000
        let tx = build_batch_transaction(
            &[destroy_action(oid(7))],
            Some(&gas),
            total_rebate,
            None,
            100_000,
            Some(700_000),
            None,
        )
        .unwrap();
        let pure_u64s: Vec<u64> = tx
            .inputs
            .iter()
            .filter_map(|input| match input {
                Input::Pure(bytes) if bytes.len() == 8 => bcs::from_bytes(bytes).ok(),
                _ => None,
            })
            .collect();
        assert!(pure_u64s.contains(&600_000));
        assert!(!pure_u64s.contains(&684_500));
    }

    #[test]
    fn test_unsponsored_distinct_fee_coin_uncapped() {
        let _m = ConfigMockBuilder::new().build_and_setup();
        let gas = oid(1);
        let fee_coin = oid(2);
        let tx = build_batch_transaction(
            &[destroy_action(oid(7))],
            Some(&gas),
            5_000_000,
            Some(&fee_coin),
            100_000,
            Some(700_000),
            None,
        )
        .unwrap();
        // fee split comes from the fee coin input, full amount
        let split_from_input = tx
            .commands
            .iter()
            .any(|c| matches!(c, Command::SplitCoins { coin: Argument::Input(_), .. }));
        assert!(split_from_input);
        let pure_u64s: Vec<u64> = tx
            .inputs
            .iter()
            .filter_map(|input| match input {
                Input::Pure(bytes) if bytes.len() == 8 => bcs::from_bytes(bytes).ok(),
                _ => None,
            })
            .collect();
        assert!(pure_u64s.contains(&684_500));
    }

    #[test]
    fn test_zero_fee_emits_no_settlement() {
        let _m = ConfigMockBuilder::new().build_and_setup();
        let tx =
            build_batch_transaction(&[destroy_action(oid(7))], None, 0, None, 0, None, None)
                .unwrap();
        assert_eq!(count_commands(&tx, |c| matches!(c, Command::SplitCoins { .. })), 0);
    }

    #[test]
    fn test_identical_inputs_identical_output() {
        let _m = ConfigMockBuilder::new().build_and_setup();
        let actions = vec![
            merge_action("0x2::coin::Coin<0x2::sui::SUI>", vec![oid(1), oid(2)]),
            destroy_action(oid(7)),
            burn_action(vec![oid(8)]),
        ];
        let build = || {
            build_batch_transaction(
                &actions,
                None,
                5_000_000,
                None,
                10_000,
                None,
                Some(&SponsorOptions { sender: oid(42) }),
            )
            .unwrap()
            .to_bytes()
            .unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_fee_recipient_comes_from_config() {
        let _m = ConfigMockBuilder::new().build_and_setup();
        let expected: SuiAddress = DEFAULT_FEE_RECIPIENT.parse().unwrap();
        let tx = build_batch_transaction(
            &[destroy_action(oid(7))],
            None,
            5_000_000,
            None,
            10_000,
            None,
            Some(&SponsorOptions { sender: oid(42) }),
        )
        .unwrap();
        let recipient_inputs: Vec<SuiAddress> = tx
            .inputs
            .iter()
            .filter_map(|input| match input {
                Input::Pure(bytes) => bcs::from_bytes::<SuiAddress>(bytes).ok(),
                _ => None,
            })
            .collect();
        assert!(recipient_inputs.contains(&expected));
    }
}
