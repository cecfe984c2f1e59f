//! Burn discovery: find owned object types with a known or discoverable
//! destructive entry point. The static known-burnable table is checked first;
//! otherwise the type's defining module is introspected for an exposed
//! function named burn/delete/destroy whose first parameter takes exactly
//! this struct (by value or reference).

use crate::{
    action::{ActionKind, CleanupAction, ScanProgress},
    constant::{BURN_FUNCTION_NAMES, OWNED_OBJECTS_PAGE_SIZE},
    error::SkittyError,
    fee::FeeUtil,
    move_type::{is_protected_type, short_label, MoveCallTarget, MoveTypeTag},
    query::{types::NormalizedModule, QueryClient},
    scanner::{report, ScanContext},
    types::SuiAddress,
};
use std::{collections::BTreeMap, str::FromStr};
use tokio::sync::mpsc;

/// Find an exposed function that destroys `object_type`: named like a burn
/// and taking the struct itself as its first parameter.
fn find_burn_function(module: &NormalizedModule, object_type: &MoveTypeTag) -> Option<String> {
    for name in BURN_FUNCTION_NAMES {
        let Some(function) = module.exposed_functions.get(name) else {
            continue;
        };
        let Some(first_param) = function.parameters.first() else {
            continue;
        };
        let Some((address, param_module, param_name)) = first_param.struct_root() else {
            continue;
        };
        let Ok(param_package) = SuiAddress::from_str(address) else {
            continue;
        };
        if param_package == object_type.package
            && param_module == object_type.module
            && param_name == object_type.name
        {
            return Some(name.to_string());
        }
    }
    None
}

pub async fn find_burn_actions(
    client: &dyn QueryClient,
    context: &ScanContext,
    address: &SuiAddress,
    progress: &Option<mpsc::UnboundedSender<ScanProgress>>,
) -> Result<Vec<CleanupAction>, SkittyError> {
    report(progress, "fetching objects", 0, 1);

    let mut objects = Vec::new();
    let mut cursor: Option<String> = None;
    let mut page_count = 0usize;
    loop {
        let page = client
            .get_owned_objects(address, None, cursor, OWNED_OBJECTS_PAGE_SIZE)
            .await?;
        objects.extend(page.data);
        page_count += 1;
        report(progress, "fetching objects", page_count, page_count + 1);
        if !page.has_next_page || page.next_cursor.is_none() {
            break;
        }
        cursor = page.next_cursor;
    }

    // group burn candidates by exact type string
    let mut by_type: BTreeMap<String, Vec<&crate::query::types::OwnedObject>> = BTreeMap::new();
    for object in &objects {
        let Some(object_type) = &object.object_type else {
            continue;
        };
        let Ok(tag) = MoveTypeTag::parse(object_type) else {
            continue;
        };
        if tag.is_coin() || tag.is_kiosk() || tag.is_kiosk_owner_cap() {
            continue;
        }
        if is_protected_type(object_type) {
            continue;
        }
        by_type.entry(object_type.clone()).or_default().push(object);
    }

    let total_types = by_type.len();
    report(progress, "discovering burn", 0, total_types);

    let mut actions = Vec::new();
    for (index, (object_type, group)) in by_type.iter().enumerate() {
        report(progress, "discovering burn", index + 1, total_types);

        if context.object_blocklist.contains(object_type) {
            continue;
        }

        let mut move_target: Option<MoveCallTarget> = None;
        let mut discovered = false;

        if let Some(known) =
            context.known_burnable.iter().find(|entry| entry.matches(object_type))
        {
            match MoveCallTarget::from_str(&known.target) {
                Ok(target) => move_target = Some(target),
                Err(_) => {
                    log::warn!("Ignoring malformed known-burnable target {}", known.target);
                }
            }
        } else if let Ok(tag) = MoveTypeTag::parse(object_type) {
            if let Some(module) = context.module_cache.get(&tag.package, &tag.module).await {
                if let Some(function) = find_burn_function(&module, &tag) {
                    move_target = Some(MoveCallTarget::new(tag.package, &tag.module, &function));
                    discovered = true;
                }
            }
        }

        let Some(move_target) = move_target else {
            continue;
        };

        let storage_rebate_total = group.iter().try_fold(0u64, |sum, object| {
            sum.checked_add(object.storage_rebate).ok_or_else(|| {
                SkittyError::ValidationError("Storage rebate overflow".to_string())
            })
        })?;
        let Some(economics) =
            FeeUtil::viable_economics(ActionKind::Burn, group.len(), storage_rebate_total)
        else {
            continue;
        };
        actions.push(CleanupAction::Burn {
            object_type: object_type.clone(),
            move_target,
            discovered,
            object_ids: group.iter().map(|object| object.object_id).collect(),
            economics,
            label: short_label(object_type),
        });
    }

    Ok(actions)
}
