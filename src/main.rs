//! tickbook - line-oriented exchange host
//!
//! Usage: `tickbook [config.json]`
//!
//! Reads `<sender> <calldata>` lines from stdin, applies each frame and
//! prints one JSON line per frame with its receipt (one outcome per
//! element), its events and its fills in token units. Without a
//! config a single demo market is created and two accounts are funded.
//! Logs go to stderr, filtered by `RUST_LOG`.

use std::io::{self, BufRead, Write};

use serde_json::json;
use tracing_subscriber::EnvFilter;

use tickbook::config::ExchangeConfig;
use tickbook::router::Frame;
use tickbook::{Address, Event, InMemoryLedger};

const DEMO_CONFIG: &str = r#"{
    "markets": [{
        "id": 0,
        "symbol": "BASE_QUOTE",
        "base_token": "0x000000000000000000000000000000000000000b",
        "quote_token": "0x000000000000000000000000000000000000000c",
        "base_decimals": 0,
        "quote_decimals": 0,
        "size_tick_exp": 0,
        "price_tick_exp": 0
    }],
    "deposits": [
        { "account": "0x0000000000000000000000000000000000000001", "market": 0, "base": "1000000", "quote": "1000000" },
        { "account": "0x0000000000000000000000000000000000000002", "market": 0, "base": "1000000", "quote": "1000000" }
    ]
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ExchangeConfig::from_path(&path)?,
        None => {
            tracing::info!("no config given, using the demo market");
            ExchangeConfig::from_json_str(DEMO_CONFIG)?
        }
    };

    let ledger = InMemoryLedger::new();
    config.seed(&ledger)?;
    let mut exchange = config.build(ledger)?;
    tracing::info!(markets = config.markets.len(), "exchange ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let output = match process(&mut exchange, &config, line) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(%err, line, "frame rejected");
                json!({ "error": err.to_string() })
            }
        };
        writeln!(stdout, "{output}")?;
    }
    Ok(())
}

fn process(
    exchange: &mut tickbook::Exchange<InMemoryLedger>,
    config: &ExchangeConfig,
    line: &str,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let mut parts = line.split_whitespace();
    let (Some(sender), Some(calldata), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err("expected `<sender> <calldata>`".into());
    };
    let sender: Address = sender.parse()?;
    let frame = Frame::from_hex(calldata)?;

    let receipt = exchange.execute_frame(sender, &frame)?;
    let events = exchange
        .market_mut(frame.market_id)
        .map(|m| m.take_events())
        .unwrap_or_default();

    let fills: Vec<_> = match config.market(frame.market_id) {
        Some(market) => events
            .iter()
            .filter_map(Event::as_swap)
            .filter_map(|swap| market.human_fill(swap))
            .collect(),
        None => Vec::new(),
    };

    Ok(json!({ "receipt": receipt, "events": events, "fills": fills }))
}
