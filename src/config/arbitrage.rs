//! Arbitrage detection configuration.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

use super::duration;

/// Arbitrage scan settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ArbitrageConfig {
    /// Symbols to scan (e.g., "BTC/USDT").
    pub symbols: Vec<String>,
    /// Exchanges to compare; at least two are required.
    pub exchanges: Vec<String>,
    /// Minimum spread, in percent, for a pair to count as an opportunity
    /// (default: 0.5).
    #[serde(default = "default_min_profit_percent")]
    pub min_profit_percent: Decimal,
    /// Fraction of each side's 24h volume considered tradable
    /// (default: 0.001, i.e. 0.1%).
    #[serde(default = "default_volume_fraction")]
    pub volume_fraction: Decimal,
    /// How long a detected opportunity stays executable (default: 5m).
    #[serde(default, with = "duration")]
    pub opportunity_ttl: Duration,
    /// Interval between scan cycles (default: 30s).
    #[serde(default, with = "duration")]
    pub scan_interval: Duration,
}

impl ArbitrageConfig {
    /// Opportunity TTL with the default applied when unset.
    pub fn opportunity_ttl(&self) -> Duration {
        if self.opportunity_ttl.is_zero() {
            Duration::from_secs(300)
        } else {
            self.opportunity_ttl
        }
    }

    /// Scan interval with the default applied when unset.
    pub fn scan_interval(&self) -> Duration {
        if self.scan_interval.is_zero() {
            Duration::from_secs(30)
        } else {
            self.scan_interval
        }
    }
}

fn default_min_profit_percent() -> Decimal {
    // 0.5%
    Decimal::new(5, 1)
}

fn default_volume_fraction() -> Decimal {
    // 0.1% of each side's 24h volume
    Decimal::new(1, 3)
}
