//! Commission and platform-credit math.
//!
//! The fee engine is pure: given a prospective trade it derives the
//! notional, the commission after any discount tier, and the platform
//! credit required to cover that commission. All arithmetic is decimal;
//! commissions are rounded half-up to the smallest currency unit.

use crate::config::FeesConfig;
use crate::domain::FeeBreakdown;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;
use thiserror::Error;

/// Fee computation errors.
#[derive(Debug, Error)]
pub enum FeeError {
    /// Amount or price was zero or negative.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The requested discount tier is not configured.
    #[error("unknown discount tier: {0}")]
    UnknownTier(String),
}

/// FeeEngine converts a prospective trade into a cost breakdown.
#[derive(Debug, Clone)]
pub struct FeeEngine {
    default_rate: Decimal,
    exchange_rates: HashMap<String, Decimal>,
    discount_tiers: HashMap<String, Decimal>,
    credit_unit_value: Decimal,
    currency_scale: u32,
}

impl FeeEngine {
    /// Builds a fee engine from validated configuration.
    pub fn from_config(cfg: &FeesConfig) -> Self {
        Self {
            default_rate: cfg.default_commission_rate,
            exchange_rates: cfg.exchange_rates.clone(),
            discount_tiers: cfg.discount_tiers.clone(),
            credit_unit_value: cfg.credit_unit_value,
            currency_scale: cfg.currency_scale,
        }
    }

    /// Returns the commission rate for an exchange, falling back to the
    /// default rate when no override is configured.
    pub fn base_rate(&self, exchange: &str) -> Decimal {
        self.exchange_rates
            .get(exchange)
            .copied()
            .unwrap_or(self.default_rate)
    }

    /// Computes the cost breakdown for a trade of `amount` at `price` on
    /// `exchange`, optionally applying a discount tier.
    ///
    /// Deterministic and side-effect free. Fails only on non-positive
    /// amount or price, or an unconfigured tier name.
    pub fn quote(
        &self,
        amount: Decimal,
        price: Decimal,
        exchange: &str,
        discount_tier: Option<&str>,
    ) -> Result<FeeBreakdown, FeeError> {
        if amount <= Decimal::ZERO {
            return Err(FeeError::InvalidInput(format!(
                "amount must be positive, got {}",
                amount
            )));
        }
        if price <= Decimal::ZERO {
            return Err(FeeError::InvalidInput(format!(
                "price must be positive, got {}",
                price
            )));
        }

        let discount = match discount_tier {
            Some(tier) => self
                .discount_tiers
                .get(tier)
                .copied()
                .ok_or_else(|| FeeError::UnknownTier(tier.to_string()))?,
            None => Decimal::ZERO,
        };

        let total = amount * price;
        let commission = (total * self.base_rate(exchange) * (Decimal::ONE - discount))
            .round_dp_with_strategy(self.currency_scale, RoundingStrategy::MidpointAwayFromZero);
        let credit_required = (commission / self.credit_unit_value)
            .round_dp_with_strategy(self.currency_scale, RoundingStrategy::MidpointAwayFromZero);

        Ok(FeeBreakdown {
            total,
            commission,
            credit_required,
        })
    }
}

#[cfg(test)]
mod tests;
