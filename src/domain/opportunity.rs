//! Arbitrage opportunity domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// ArbitrageOpportunity represents a detected cross-exchange price spread.
///
/// Invariant: `buy_price < sell_price`, and `profit_percent` is
/// `(sell_price - buy_price) / buy_price * 100`. Instances are created by
/// the scanner, owned by the opportunity store, and handed out as clones;
/// an opportunity is unexecutable once `expires_at` has passed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    /// Unique identifier for this opportunity.
    pub id: String,
    /// Traded symbol in "BASE/QUOTE" format (e.g., "BTC/USDT").
    pub symbol: String,
    /// Exchange where to buy (the cheaper side).
    pub buy_exchange: String,
    /// Exchange where to sell (the dearer side).
    pub sell_exchange: String,
    /// Price on the buy exchange.
    pub buy_price: Decimal,
    /// Price on the sell exchange.
    pub sell_price: Decimal,
    /// Spread as a percentage of the buy price.
    pub profit_percent: Decimal,
    /// Conservative estimate of the tradable size, in base units.
    pub available_volume: Decimal,
    /// When this opportunity was detected.
    pub created_at: DateTime<Utc>,
    /// When this opportunity becomes stale.
    pub expires_at: DateTime<Utc>,
}

impl ArbitrageOpportunity {
    /// Returns true if the opportunity has expired at the given instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Returns true if the opportunity has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::str::FromStr;

    fn sample() -> ArbitrageOpportunity {
        ArbitrageOpportunity {
            id: "abc".to_string(),
            symbol: "BTC/USDT".to_string(),
            buy_exchange: "binance".to_string(),
            sell_exchange: "kraken".to_string(),
            buy_price: Decimal::from_str("100").unwrap(),
            sell_price: Decimal::from_str("102").unwrap(),
            profit_percent: Decimal::from_str("2").unwrap(),
            available_volume: Decimal::from_str("0.5").unwrap(),
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::minutes(5),
        }
    }

    #[test]
    fn test_not_expired_within_ttl() {
        assert!(!sample().is_expired());
    }

    #[test]
    fn test_expired_past_ttl() {
        let mut opp = sample();
        opp.expires_at = Utc::now() - Duration::seconds(1);
        assert!(opp.is_expired());
    }
}
