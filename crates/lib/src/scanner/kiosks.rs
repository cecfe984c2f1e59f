//! Empty-kiosk discovery. A close action is only offered for a kiosk whose
//! owner cap the wallet holds, and only when the kiosk holds zero items;
//! closing one we don't own the cap for is impossible, and closing a
//! non-empty one would strand its contents.

use crate::{
    action::{ActionKind, CleanupAction, ScanProgress},
    constant::{KIOSK_OWNER_CAP_TYPE, KIOSK_TYPE, OWNED_OBJECTS_PAGE_SIZE},
    error::SkittyError,
    fee::FeeUtil,
    query::QueryClient,
    scanner::{report, ScanContext},
    types::{ObjectId, SuiAddress},
};
use tokio::sync::mpsc;

pub async fn find_close_kiosk_actions(
    client: &dyn QueryClient,
    context: &ScanContext,
    address: &SuiAddress,
    progress: &Option<mpsc::UnboundedSender<ScanProgress>>,
) -> Result<Vec<CleanupAction>, SkittyError> {
    report(progress, "fetching kiosk caps", 0, 1);

    if context.object_blocklist.contains(KIOSK_TYPE) {
        return Ok(Vec::new());
    }

    let caps = client
        .get_owned_objects(address, Some(KIOSK_OWNER_CAP_TYPE), None, OWNED_OBJECTS_PAGE_SIZE)
        .await?
        .data;

    report(progress, "checking kiosks", 0, caps.len());

    let mut actions = Vec::new();
    for (index, cap) in caps.iter().enumerate() {
        report(progress, "checking kiosks", index + 1, caps.len());

        // the cap's `for` field references the kiosk it controls
        let Some(kiosk_id) = cap
            .content_fields
            .as_ref()
            .and_then(|fields| fields.get("for"))
            .and_then(serde_json::Value::as_str)
            .and_then(|raw| raw.parse::<ObjectId>().ok())
        else {
            continue;
        };

        match client.get_dynamic_field_count(&kiosk_id).await {
            Ok(0) => {}
            Ok(_) => continue,
            Err(e) => {
                log::warn!("Emptiness check failed for kiosk {}: {e}", kiosk_id.short());
                continue;
            }
        }

        let Some(economics) =
            FeeUtil::viable_economics(ActionKind::CloseKiosk, 1, cap.storage_rebate)
        else {
            continue;
        };
        actions.push(CleanupAction::CloseKiosk {
            kiosk_id,
            owner_cap_id: cap.object_id,
            economics,
            label: kiosk_id.to_hex(),
        });
    }

    Ok(actions)
}
