//! Fee and credit configuration.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

/// Commission rates, discount tiers, and platform-credit conversion.
///
/// Rates and discounts are decimal fractions (e.g., "0.001" for 0.1%).
/// Write decimals as quoted strings in YAML so they parse exactly.
#[derive(Debug, Clone, Deserialize)]
pub struct FeesConfig {
    /// Commission rate applied when no exchange-specific override exists
    /// (default: 0.1%).
    #[serde(default = "default_commission_rate")]
    pub default_commission_rate: Decimal,
    /// Per-exchange commission rate overrides, keyed by exchange name.
    #[serde(default)]
    pub exchange_rates: HashMap<String, Decimal>,
    /// Discount tiers, keyed by tier name, mapping to the fraction taken
    /// off the commission (default: "holder" at 25%).
    #[serde(default = "default_discount_tiers")]
    pub discount_tiers: HashMap<String, Decimal>,
    /// Value of one platform credit in quote currency.
    pub credit_unit_value: Decimal,
    /// Decimal places of the smallest currency unit commissions are
    /// rounded to (default: 8).
    #[serde(default = "default_currency_scale")]
    pub currency_scale: u32,
}

fn default_commission_rate() -> Decimal {
    // 0.1%
    Decimal::new(1, 3)
}

fn default_discount_tiers() -> HashMap<String, Decimal> {
    let mut tiers = HashMap::new();
    tiers.insert("holder".to_string(), Decimal::new(25, 2));
    tiers
}

fn default_currency_scale() -> u32 {
    8
}
