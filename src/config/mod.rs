//! Configuration loading and validation for the arbitrage engine.
//!
//! Uses serde_yaml to load YAML configuration files. Durations are written
//! as strings ("30s", "5m") and decimals as quoted strings to avoid float
//! round-tripping.

mod app;
mod arbitrage;
mod duration;
mod error;
mod execution;
mod fees;
mod storage;

pub use app::AppConfig;
pub use arbitrage::ArbitrageConfig;
pub use error::ConfigError;
pub use execution::ExecutionConfig;
pub use fees::FeesConfig;
pub use storage::StorageConfig;

use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs;

/// Root configuration structure for the engine.
///
/// Required sections: app, fees, arbitrage.
/// Optional sections: execution, storage.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Application-level settings like name and environment.
    pub app: AppConfig,
    /// Commission rates, discount tiers, and credit conversion.
    pub fees: FeesConfig,
    /// Scan cadence, profit threshold, and opportunity TTL.
    pub arbitrage: ArbitrageConfig,
    /// Execution timeouts and the pending-order watchdog (optional).
    pub execution: Option<ExecutionConfig>,
    /// Order and balance persistence (optional; in-memory when absent).
    pub storage: Option<StorageConfig>,
}

impl Config {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Loads environment variables from a `.env` file first (if present),
    /// then parses and validates the YAML.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let content = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.app.name.is_empty() {
            return Err(ConfigError::Validation("app.name is required".into()));
        }

        if self.arbitrage.symbols.is_empty() {
            return Err(ConfigError::Validation(
                "at least one symbol is required".into(),
            ));
        }

        if self.arbitrage.exchanges.len() < 2 {
            return Err(ConfigError::Validation(
                "at least two exchanges are required for cross-exchange arbitrage".into(),
            ));
        }

        if self.arbitrage.min_profit_percent < Decimal::ZERO {
            return Err(ConfigError::Validation(
                "arbitrage.min_profit_percent must not be negative".into(),
            ));
        }

        if self.arbitrage.volume_fraction <= Decimal::ZERO
            || self.arbitrage.volume_fraction > Decimal::ONE
        {
            return Err(ConfigError::Validation(
                "arbitrage.volume_fraction must be in (0, 1]".into(),
            ));
        }

        if self.fees.credit_unit_value <= Decimal::ZERO {
            return Err(ConfigError::Validation(
                "fees.credit_unit_value must be positive".into(),
            ));
        }

        if self.fees.default_commission_rate < Decimal::ZERO
            || self.fees.default_commission_rate >= Decimal::ONE
        {
            return Err(ConfigError::Validation(
                "fees.default_commission_rate must be in [0, 1)".into(),
            ));
        }

        for (exchange, rate) in &self.fees.exchange_rates {
            if *rate < Decimal::ZERO || *rate >= Decimal::ONE {
                return Err(ConfigError::Validation(format!(
                    "fees.exchange_rates.{}: rate must be in [0, 1)",
                    exchange
                )));
            }
        }

        for (tier, discount) in &self.fees.discount_tiers {
            if *discount < Decimal::ZERO || *discount > Decimal::ONE {
                return Err(ConfigError::Validation(format!(
                    "fees.discount_tiers.{}: discount must be in [0, 1]",
                    tier
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
