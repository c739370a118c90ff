//! Tests for the engine scheduler.

use super::*;
use crate::fees::FeeEngine;
use crate::ledger::BalanceLedger;
use crate::ports::{SimulatedExecution, SimulatedFeed};
use crate::scanner::ScannerConfig;
use crate::storage::MemoryStorage;
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn test_config() -> Config {
    let yaml = r#"
app:
  name: testengine
  env: development

fees:
  credit_unit_value: "0.5"

arbitrage:
  symbols:
    - BTC/USDT
  exchanges:
    - a
    - b
  min_profit_percent: "1"
  scan_interval: 10ms
"#;
    serde_yaml::from_str(yaml).unwrap()
}

async fn engine_with_feed(feed: Arc<SimulatedFeed>) -> Engine {
    let cfg = test_config();
    let storage = Arc::new(MemoryStorage::new());
    let ledger = Arc::new(BalanceLedger::new(storage.clone()));
    let opportunities = Arc::new(OpportunityStore::new());

    let scanner = ArbitrageScanner::new(
        feed,
        ScannerConfig {
            volume_fraction: cfg.arbitrage.volume_fraction,
            opportunity_ttl: cfg.arbitrage.opportunity_ttl(),
        },
    );

    let lifecycle = Arc::new(OrderLifecycle::new(
        FeeEngine::from_config(&cfg.fees),
        ledger,
        storage,
        Arc::new(SimulatedExecution::new()),
        opportunities.clone(),
        Duration::from_millis(50),
    ));

    Engine::new(cfg, scanner, opportunities, lifecycle)
}

#[tokio::test]
async fn test_scan_cycle_stores_opportunities() {
    let feed = Arc::new(SimulatedFeed::new());
    feed.set_quote("a", "BTC/USDT", dec("100"), dec("1000")).await;
    feed.set_quote("b", "BTC/USDT", dec("102"), dec("1000")).await;

    let engine = engine_with_feed(feed).await;
    engine.scan_cycle().await;

    let stats = engine.stats().await;
    assert_eq!(stats.scan_cycles, 1);
    assert_eq!(stats.opportunities_detected, 1);

    let live = engine.opportunities().list().await;
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].buy_exchange, "a");
}

#[tokio::test]
async fn test_scan_cycle_without_quotes_detects_nothing() {
    let engine = engine_with_feed(Arc::new(SimulatedFeed::new())).await;
    engine.scan_cycle().await;

    let stats = engine.stats().await;
    assert_eq!(stats.scan_cycles, 1);
    assert_eq!(stats.opportunities_detected, 0);
    assert!(engine.opportunities().list().await.is_empty());
}

#[tokio::test]
async fn test_start_refuses_double_start_and_stops() {
    let feed = Arc::new(SimulatedFeed::new());
    feed.set_quote("a", "BTC/USDT", dec("100"), dec("1000")).await;
    feed.set_quote("b", "BTC/USDT", dec("103"), dec("1000")).await;

    let engine = Arc::new(engine_with_feed(feed).await);

    let runner = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.start().await })
    };

    // Let a few 10ms ticks elapse.
    tokio::time::sleep(Duration::from_millis(80)).await;

    assert!(engine.is_running().await);
    assert!(matches!(
        engine.start().await,
        Err(EngineError::AlreadyRunning)
    ));

    engine.stop().await.unwrap();
    runner.await.unwrap().unwrap();

    assert!(!engine.is_running().await);
    let stats = engine.stats().await;
    assert!(stats.scan_cycles >= 1);
    assert!(stats.opportunities_detected >= 1);
}
