//! Ramp Engine demo
//!
//! Replays a keypad script through one amount session wired to the simulated
//! pricing and transaction services, then prints the result view as JSON.
//!
//! ```text
//! ramp_engine [-e dev] [--keys 12.5] [--kind buy|sell|transfer]
//!             [--address 0x..] [--bank 42] [--crypto]
//! ```

use std::sync::Arc;

use anyhow::{Context, bail};
use rust_decimal::Decimal;

use ramp_engine::address::ChainFamily;
use ramp_engine::config::AppConfig;
use ramp_engine::simulated::{FixedRatePricing, SimulatedGateway};
use ramp_engine::{AmountSession, EditingMode, KeypadKey, Selection, Token, TransactionKind};

const DEMO_USER: u64 = 1001;
const DEMO_PROVIDER: u32 = 1;
const DEMO_FIAT: u32 = 840;
const DEMO_TOKEN: u32 = 7;

fn get_arg(names: &[&str]) -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if names.contains(&args[i].as_str()) && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

fn has_flag(name: &str) -> bool {
    std::env::args().any(|a| a == name)
}

fn get_env() -> String {
    get_arg(&["--env", "-e"]).unwrap_or_else(|| "dev".to_string())
}

fn get_kind() -> anyhow::Result<TransactionKind> {
    match get_arg(&["--kind"]).as_deref().unwrap_or("buy") {
        "buy" => Ok(TransactionKind::Buy),
        "sell" => Ok(TransactionKind::Sell),
        "transfer" => Ok(TransactionKind::Transfer),
        other => bail!("unknown --kind {}, expected buy, sell or transfer", other),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env)?;
    let _log_guard = ramp_engine::logging::init_logging(&app_config)?;

    tracing::info!(
        git_hash = env!("GIT_HASH"),
        "Starting Ramp Engine demo in {} mode",
        env
    );

    let kind = get_kind()?;
    let keys = get_arg(&["--keys"]).unwrap_or_else(|| "12.5".to_string());

    let pricing = Arc::new(
        FixedRatePricing::new().with_price(DEMO_FIAT, DEMO_TOKEN, Decimal::new(3_625_12, 2)),
    );
    let gateway = Arc::new(SimulatedGateway::default());

    let mut selection = Selection::new(
        DEMO_USER,
        DEMO_PROVIDER,
        Token::new(DEMO_TOKEN, "ETH", ChainFamily::EVM),
    );
    if let Some(address) = get_arg(&["--address"]) {
        selection = selection.with_destination(address);
    }
    if let Some(bank) = get_arg(&["--bank"]) {
        let bank = bank.parse().context("--bank must be a numeric account id")?;
        selection = selection.with_bank_account(bank);
    }

    let session = AmountSession::new(
        pricing,
        gateway,
        selection,
        DEMO_FIAT,
        app_config.engine.session_settings(),
    );
    if has_flag("--crypto") {
        session.switch_mode(EditingMode::Crypto);
    }

    for c in keys.chars() {
        let Some(key) = KeypadKey::from_char(c) else {
            bail!("unsupported key {:?} in --keys", c);
        };
        let changed = session.press(key);
        let amounts = session.amounts();
        tracing::debug!(key = ?key, changed, fiat = %amounts.fiat, crypto = %amounts.crypto, "Key pressed");
    }

    if let Some(applied) = session.wait_for_quote().await {
        tracing::info!(result = ?applied, "Quote settled");
    }
    let amounts = session.amounts();
    println!("{}", serde_json::to_string_pretty(&amounts)?);

    let display = session.continue_with(kind).await;
    println!("{}", serde_json::to_string_pretty(&display)?);

    session.acknowledge();
    session.close();
    Ok(())
}
