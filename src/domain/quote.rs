//! Price quote snapshot from an exchange feed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// PriceQuote is a point-in-time price observation for a symbol on one
/// exchange. Quotes are ephemeral: they live for the scan cycle that
/// fetched them and are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Exchange that produced the quote (e.g., "binance").
    pub exchange: String,
    /// Traded symbol in "BASE/QUOTE" format (e.g., "BTC/USDT").
    pub symbol: String,
    /// Last observed price.
    pub price: Decimal,
    /// Trailing 24h traded volume in base units.
    pub volume_24h: Decimal,
    /// When the quote was observed.
    pub observed_at: DateTime<Utc>,
}
