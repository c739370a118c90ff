//! Engine coordination: the periodic scan scheduler and shared wiring.
//!
//! The engine owns the scan cadence. Order placement runs concurrently
//! through the lifecycle handle; the only mutual exclusion the two paths
//! share is the ledger's per-user lock.

mod error;
mod stats;

pub use error::EngineError;
pub use stats::Stats;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use crate::config::Config;
use crate::lifecycle::OrderLifecycle;
use crate::scanner::ArbitrageScanner;
use crate::store::OpportunityStore;

/// Engine drives periodic arbitrage scans and the stale-order watchdog,
/// and hands out the lifecycle and store to request-serving callers.
pub struct Engine {
    cfg: Config,
    scanner: ArbitrageScanner,
    opportunities: Arc<OpportunityStore>,
    lifecycle: Arc<OrderLifecycle>,

    // Runtime state
    started_at: Mutex<Option<Instant>>,
    running: Mutex<bool>,
    stats: Mutex<Stats>,
    shutdown_tx: watch::Sender<bool>,
}

impl Engine {
    /// Creates a new Engine around pre-wired components.
    pub fn new(
        cfg: Config,
        scanner: ArbitrageScanner,
        opportunities: Arc<OpportunityStore>,
        lifecycle: Arc<OrderLifecycle>,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            cfg,
            scanner,
            opportunities,
            lifecycle,
            started_at: Mutex::new(None),
            running: Mutex::new(false),
            stats: Mutex::new(Stats::default()),
            shutdown_tx,
        }
    }

    /// The lifecycle handle for order placement and cancellation.
    pub fn lifecycle(&self) -> Arc<OrderLifecycle> {
        Arc::clone(&self.lifecycle)
    }

    /// The opportunity store, for listing current opportunities.
    pub fn opportunities(&self) -> Arc<OpportunityStore> {
        Arc::clone(&self.opportunities)
    }

    /// Starts the periodic scan loop. Returns when `stop` is called.
    pub async fn start(&self) -> Result<(), EngineError> {
        {
            let mut running = self.running.lock().await;
            if *running {
                return Err(EngineError::AlreadyRunning);
            }
            *running = true;
        }

        {
            let mut started_at = self.started_at.lock().await;
            *started_at = Some(Instant::now());
        }

        info!(
            app = %self.cfg.app.name,
            env = %self.cfg.app.env,
            symbols = ?self.cfg.arbitrage.symbols,
            exchanges = ?self.cfg.arbitrage.exchanges,
            scan_interval = ?self.cfg.arbitrage.scan_interval(),
            "Starting arbitrage engine"
        );

        self.run_scan_loop().await;

        Ok(())
    }

    /// Signals the scan loop to stop and marks the engine stopped.
    pub async fn stop(&self) -> Result<(), EngineError> {
        {
            let mut running = self.running.lock().await;
            if !*running {
                return Ok(());
            }
            *running = false;
        }

        let _ = self.shutdown_tx.send(true);

        let uptime = self.uptime().await;
        info!(uptime = ?uptime, "Engine stopped");

        Ok(())
    }

    /// Returns a copy of the current statistics.
    pub async fn stats(&self) -> Stats {
        self.stats.lock().await.clone()
    }

    /// Returns true if the engine is currently running.
    pub async fn is_running(&self) -> bool {
        *self.running.lock().await
    }

    /// Returns how long the engine has been running.
    pub async fn uptime(&self) -> Duration {
        self.started_at
            .lock()
            .await
            .map(|s| s.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// Scan scheduler: ticks at the configured interval until shutdown.
    async fn run_scan_loop(&self) {
        let mut interval = tokio::time::interval(self.cfg.arbitrage.scan_interval());
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if !self.is_running().await {
                        break;
                    }
                    self.scan_cycle().await;
                }
                _ = shutdown_rx.changed() => {
                    break;
                }
            }
        }
    }

    /// Runs one cycle: scan, store new opportunities, sweep expired ones,
    /// and time out stale pending orders.
    pub async fn scan_cycle(&self) {
        let detected = self
            .scanner
            .scan(
                &self.cfg.arbitrage.symbols,
                &self.cfg.arbitrage.exchanges,
                self.cfg.arbitrage.min_profit_percent,
            )
            .await;

        let detected_count = detected.len();
        for opp in detected {
            self.opportunities.put(opp).await;
        }

        let expired = self.opportunities.sweep_expired().await;

        let max_pending_age = self
            .cfg
            .execution
            .clone()
            .unwrap_or_default()
            .max_pending_age();
        let timed_out = match self.lifecycle.sweep_stale_orders(max_pending_age).await {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "Stale-order sweep failed");
                0
            }
        };

        let cycles = {
            let mut stats = self.stats.lock().await;
            stats.scan_cycles += 1;
            stats.opportunities_detected += detected_count as u64;
            stats.opportunities_expired += expired as u64;
            stats.stale_orders_timed_out += timed_out as u64;
            stats.scan_cycles
        };

        // Log every 10 cycles at Info level to keep the loop quiet.
        if cycles % 10 == 1 || detected_count > 0 {
            info!(
                cycle = cycles,
                detected = detected_count,
                expired,
                timed_out,
                "Scan cycle completed"
            );
        }
    }
}

#[cfg(test)]
mod tests;
