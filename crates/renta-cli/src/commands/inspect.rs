//! Fixture-backed inspection commands.

use anyhow::{Context, Result};
use serde_json::json;

use renta_hub::{DeviceHub, HttpDeviceHub};
use renta_ledger::FeatureCache;
use renta_registry::resolve_url;
use renta_renting::{Device, RentCheck, RentCheckArgs, RentingEngine};
use renta_testkit::{FixtureLedger, LedgerFixture};

use super::{effective_root, effective_token, load_config, parse_address};

fn load_ledger(path: &str) -> Result<FixtureLedger> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read fixture: {path}"))?;
    let fixture = LedgerFixture::from_json(&raw)
        .with_context(|| format!("invalid fixture document: {path}"))?;
    Ok(FixtureLedger::from_fixture(&fixture))
}

/// Hub client from the configuration; `None` when no endpoint is set.
fn load_hub(config: &renta_config::Config) -> Option<HttpDeviceHub> {
    HttpDeviceHub::from_config(config.services.hub.as_deref()).ok()
}

pub async fn resolve(
    url: &str,
    fixture: &str,
    config_paths: &[String],
    root: Option<&str>,
) -> Result<()> {
    let ledger = load_ledger(fixture)?;
    let config = load_config(config_paths)?;
    let root = effective_root(&config, root)?;
    let resolved = resolve_url(&ledger, root, url).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "url": resolved.url,
            "contract": resolved.contract.to_string(),
            "deviceId": resolved.parsed.device_id.to_string(),
            "node": resolved.parsed.node_id.to_string(),
        }))?
    );
    Ok(())
}

pub async fn state(
    url: &str,
    fixture: &str,
    config_paths: &[String],
    user: Option<&str>,
    root: Option<&str>,
) -> Result<()> {
    let ledger = load_ledger(fixture)?;
    let config = load_config(config_paths)?;
    let root = effective_root(&config, root)?;
    let user = parse_address(user, "--user")?;
    let resolved = resolve_url(&ledger, root, url).await?;
    let device = Device::from_resolved(&resolved, user, effective_token(&config, None)?);

    let hub = load_hub(&config);
    let cache = FeatureCache::new();
    let engine = RentingEngine::new(&ledger, hub.as_ref().map(|h| h as &dyn DeviceHub), &cache);
    let state = engine.renting_state(&device, true).await?;
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn quote(
    url: &str,
    fixture: &str,
    config_paths: &[String],
    user: &str,
    seconds: Option<u64>,
    amount: Option<u128>,
    token: Option<&str>,
    root: Option<&str>,
) -> Result<()> {
    let ledger = load_ledger(fixture)?;
    let config = load_config(config_paths)?;
    let root = effective_root(&config, root)?;
    let user = parse_address(Some(user), "--user")?;
    let token = effective_token(&config, token)?;
    let resolved = resolve_url(&ledger, root, url).await?;
    let device = Device::from_resolved(&resolved, user, token);

    let hub = load_hub(&config);
    let cache = FeatureCache::new();
    let engine = RentingEngine::new(&ledger, hub.as_ref().map(|h| h as &dyn DeviceHub), &cache);
    let check = engine
        .check_rent(
            &device,
            RentCheckArgs {
                seconds,
                amount,
                ..RentCheckArgs::default()
            },
        )
        .await?;

    match check {
        RentCheck::Quote(q) => println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "outcome": "quote",
                "seconds": q.seconds,
                "amount": q.amount,
                "balance": q.balance,
                "receiver": q.receiver.to_string(),
                "rentedUntilAfter": q.post.rented_until,
            }))?
        ),
        RentCheck::Conflict(reason) => println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "outcome": "conflict",
                "errkey": reason.key(),
                "reason": format!("{reason:?}"),
            }))?
        ),
        RentCheck::Invalid(reason) => println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "outcome": "invalid",
                "errkey": reason.key(),
                "reason": format!("{reason:?}"),
            }))?
        ),
    }
    Ok(())
}
