mod config;
mod domain;
mod engine;
mod fees;
mod ledger;
mod lifecycle;
mod ports;
mod scanner;
mod storage;
mod store;

use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

use config::Config;
use engine::Engine;
use fees::FeeEngine;
use ledger::BalanceLedger;
use lifecycle::OrderLifecycle;
use ports::{SimulatedExecution, SimulatedFeed};
use scanner::{ArbitrageScanner, ScannerConfig};
use storage::{MemoryStorage, Persistence, SqliteStorage, SqliteStorageConfig};
use store::OpportunityStore;

const DEFAULT_CONFIG_PATH: &str = "configs/config.yaml";

fn parse_config_path() -> String {
    for arg in env::args().skip(1) {
        if let Some(path) = arg.strip_prefix("--config=") {
            return path.to_string();
        }
    }
    DEFAULT_CONFIG_PATH.to_string()
}

fn init_tracing(log_level: Option<&str>) {
    let level = match log_level {
        Some("debug") => Level::DEBUG,
        Some("info") => Level::INFO,
        Some("warn") | Some("warning") => Level::WARN,
        Some("error") => Level::ERROR,
        Some("trace") => Level::TRACE,
        _ => Level::INFO,
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config_path = parse_config_path();

    let cfg = match Config::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return;
        }
    };

    init_tracing(cfg.app.log_level.as_deref());

    info!(config = %config_path, app = %cfg.app.name, "Configuration loaded");

    let persistence: Arc<dyn Persistence> = match cfg.storage.as_ref() {
        Some(storage_cfg) if storage_cfg.enabled => {
            let sqlite_cfg = SqliteStorageConfig {
                path: storage_cfg
                    .path
                    .clone()
                    .unwrap_or_else(|| SqliteStorageConfig::default().path),
                ..Default::default()
            };
            match SqliteStorage::new(sqlite_cfg).await {
                Ok(storage) => Arc::new(storage),
                Err(e) => {
                    error!(error = %e, "Failed to initialize SQLite storage");
                    return;
                }
            }
        }
        _ => {
            info!("Storage disabled, using in-memory persistence");
            Arc::new(MemoryStorage::new())
        }
    };

    // Live exchange connectors plug in through the PriceFeedPort and
    // ExecutionPort traits; this binary wires the simulated ports.
    let feed = Arc::new(SimulatedFeed::new());
    let execution = Arc::new(SimulatedExecution::new());

    if cfg.app.env == "development" {
        seed_demo_quotes(&feed, &cfg).await;
    } else {
        warn!("No live feed connector wired; scans will find no quotes");
    }

    let ledger = Arc::new(BalanceLedger::new(Arc::clone(&persistence)));
    let opportunities = Arc::new(OpportunityStore::new());

    let scanner = ArbitrageScanner::new(
        feed,
        ScannerConfig {
            volume_fraction: cfg.arbitrage.volume_fraction,
            opportunity_ttl: cfg.arbitrage.opportunity_ttl(),
        },
    );

    let execution_timeout = cfg
        .execution
        .clone()
        .unwrap_or_default()
        .timeout();

    let lifecycle = Arc::new(OrderLifecycle::new(
        FeeEngine::from_config(&cfg.fees),
        ledger,
        Arc::clone(&persistence),
        execution,
        Arc::clone(&opportunities),
        execution_timeout,
    ));

    let engine = Arc::new(Engine::new(cfg, scanner, opportunities, lifecycle));

    let runner = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            if let Err(e) = engine.start().await {
                error!(error = %e, "Engine error");
            }
        })
    };

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }

    info!("Shutdown signal received");
    if let Err(e) = engine.stop().await {
        error!(error = %e, "Engine stop error");
    }
    let _ = tokio::time::timeout(Duration::from_secs(5), runner).await;

    if let Err(e) = persistence.close().await {
        error!(error = %e, "Failed to close storage");
    }
}

/// Seeds the simulated feed with static development quotes so scans have
/// something to chew on.
async fn seed_demo_quotes(feed: &SimulatedFeed, cfg: &Config) {
    let base_price = Decimal::from_str("100").unwrap_or(Decimal::ONE_HUNDRED);
    let volume = Decimal::from_str("1000").unwrap_or(Decimal::ONE_HUNDRED);

    for symbol in &cfg.arbitrage.symbols {
        for (i, exchange) in cfg.arbitrage.exchanges.iter().enumerate() {
            // Spread exchange prices ~1% apart so spreads exist.
            let price = base_price + Decimal::from(i as u64);
            feed.set_quote(exchange, symbol, price, volume).await;
        }
    }

    info!("Seeded simulated feed with development quotes");
}
