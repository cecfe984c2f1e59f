//! Scan and reclaim command handlers.

use skitty_lib::{
    action::{CleanupAction, ScanOutcome, ScanProgress},
    constant::{MIST_PER_SUI, USER_PRIVATE_KEY_ENV},
    error::SkittyError,
    fee::FeeUtil,
    flow::ReclaimFlow,
    names::{is_name_domain, NameResolver},
    query::QueryClient,
    rpc::get_query_client,
    scanner::{ScanContext, Scanner},
    signer::{LocalSigner, UserSigner},
    sponsor::LocalSponsor,
    state::get_config,
    types::SuiAddress,
};
use std::sync::Arc;
use tokio::sync::mpsc;

pub fn mist_to_sui(mist: i128) -> f64 {
    mist as f64 / MIST_PER_SUI as f64
}

fn print_action(index: usize, action: &CleanupAction) {
    let economics = action.economics();
    let fee = FeeUtil::compute_fee_mist(economics.storage_rebate_total);
    println!(
        "{:>3}. [{:?}] {} | objects: {} | rebate: {:.4} SUI | est. gas: {:.4} SUI | fee: {:.4} SUI | net: {:.4} SUI",
        index + 1,
        action.kind(),
        action.label(),
        action.object_ids().len(),
        mist_to_sui(economics.user_rebate_mist as i128),
        mist_to_sui(economics.estimated_gas_mist as i128),
        mist_to_sui(fee as i128),
        mist_to_sui(economics.net_gain_mist as i128),
    );
}

fn print_outcome(outcome: &ScanOutcome) {
    if outcome.actions.is_empty() {
        println!("No reclaimable objects found.");
        return;
    }
    for (index, action) in outcome.actions.iter().enumerate() {
        print_action(index, action);
    }
    println!(
        "TOTAL: {} actions, est. user rebate {:.4} SUI",
        outcome.actions.len(),
        mist_to_sui(outcome.total_user_rebate_mist as i128),
    );
}

/// Resolve a raw CLI target (hex address or name-service domain)
pub async fn resolve_target(
    client: Arc<dyn QueryClient>,
    input: &str,
) -> Result<SuiAddress, SkittyError> {
    if is_name_domain(input) {
        let mut fallback: Option<Arc<dyn QueryClient>> = None;
        if let Ok(config) = get_config() {
            if let Some(url) = &config.network.fallback_rpc_url {
                if let Ok(fallback_client) = get_query_client(url) {
                    fallback = Some(fallback_client);
                }
            }
        }
        let resolver = NameResolver::new(client, fallback);
        resolver.resolve(input).await.ok_or_else(|| {
            SkittyError::ValidationError(format!("Could not resolve {input}"))
        })
    } else {
        input.parse()
    }
}

async fn run_scan(
    client: Arc<dyn QueryClient>,
    address: &SuiAddress,
) -> Result<ScanOutcome, SkittyError> {
    let context = ScanContext::initialize(client.clone()).await;
    let scanner = Scanner::new(client, context);

    let (tx, mut rx) = mpsc::unbounded_channel::<ScanProgress>();
    let progress_task = tokio::spawn(async move {
        while let Some(progress) = rx.recv().await {
            println!("  {} {}/{}", progress.phase, progress.current, progress.total);
        }
    });

    let outcome = scanner.scan(address, Some(tx)).await;
    let _ = progress_task.await;
    outcome
}

pub async fn handle_scan(client: Arc<dyn QueryClient>, target: &str) -> Result<(), SkittyError> {
    let address = resolve_target(client.clone(), target).await?;
    println!("Scanning {address} ...");
    let outcome = run_scan(client, &address).await?;
    print_outcome(&outcome);
    Ok(())
}

pub async fn handle_reclaim(
    client: Arc<dyn QueryClient>,
    target: &str,
    execute: bool,
) -> Result<(), SkittyError> {
    let address = resolve_target(client.clone(), target).await?;
    println!("Scanning {address} ...");
    let outcome = run_scan(client.clone(), &address).await?;
    print_outcome(&outcome);
    if outcome.actions.is_empty() {
        return Ok(());
    }

    let flow = ReclaimFlow::new(client.clone(), Arc::new(LocalSponsor::new(client)));

    let draft = flow.prepare(&outcome.actions, &address)?;
    let sponsored = flow.sponsor_draft(&draft).await?;
    let simulation = flow.simulate(&sponsored).await?;
    let recoup_mist = ReclaimFlow::check_viability(&draft.totals, &simulation)?;
    println!(
        "Simulated gas cost: {:.4} SUI (recouping {:.4} SUI); expected user net: {:.4} SUI",
        mist_to_sui(simulation.gas_cost_mist as i128),
        mist_to_sui(recoup_mist as i128),
        mist_to_sui(FeeUtil::net_gain_mist(
            draft.totals.user_rebate_mist,
            recoup_mist as i64,
            draft.totals.fee_mist,
        ) as i128),
    );

    if !execute {
        println!("Dry run only. Re-run with --execute to submit.");
        return Ok(());
    }

    let user_signer = LocalSigner::from_env(USER_PRIVATE_KEY_ENV)?;
    if user_signer.address() != address {
        return Err(SkittyError::ValidationError(
            "The local user key does not match the scanned address".to_string(),
        ));
    }

    let ready = flow.finalize(&outcome.actions, &draft, recoup_mist).await?;
    let receipt = flow.execute(&ready, &user_signer).await?;
    println!(
        "Executed {} | sponsor net: {:+.4} SUI",
        receipt.digest,
        mist_to_sui(receipt.sponsor_net_mist),
    );
    Ok(())
}
