//! Runtime statistics for the engine.

/// Runtime statistics for the engine.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub scan_cycles: u64,
    pub opportunities_detected: u64,
    pub opportunities_expired: u64,
    pub stale_orders_timed_out: u64,
}
