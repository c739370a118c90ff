//! Cross-exchange arbitrage detection.
//!
//! One scan cycle fetches a quote per (exchange, symbol) from the price
//! feed port, compares every exchange pair per symbol, and emits ranked,
//! time-bounded opportunities. A failed quote skips that exchange for the
//! symbol; it never aborts the cycle.

use crate::domain::{short_id, ArbitrageOpportunity, PriceQuote};
use crate::ports::PriceFeedPort;
use chrono::Utc;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Scanner tuning knobs, taken from `ArbitrageConfig`.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Fraction of each side's 24h volume considered tradable.
    pub volume_fraction: Decimal,
    /// How long detected opportunities stay executable.
    pub opportunity_ttl: Duration,
}

/// ArbitrageScanner detects price spreads across exchanges.
pub struct ArbitrageScanner {
    feed: Arc<dyn PriceFeedPort>,
    cfg: ScannerConfig,
}

impl ArbitrageScanner {
    /// Creates a scanner reading quotes from the given feed port.
    pub fn new(feed: Arc<dyn PriceFeedPort>, cfg: ScannerConfig) -> Self {
        Self { feed, cfg }
    }

    /// Runs one scan cycle over the given symbols and exchanges.
    ///
    /// Returns opportunities at or above `min_profit_percent`, sorted
    /// descending by profit, ties broken by higher available volume.
    pub async fn scan(
        &self,
        symbols: &[String],
        exchanges: &[String],
        min_profit_percent: Decimal,
    ) -> Vec<ArbitrageOpportunity> {
        let mut opportunities = Vec::new();

        for symbol in symbols {
            let quotes = self.collect_quotes(symbol, exchanges).await;
            if quotes.len() < 2 {
                debug!(symbol = %symbol, quotes = quotes.len(), "Not enough quotes for symbol");
                continue;
            }

            for i in 0..quotes.len() {
                for j in (i + 1)..quotes.len() {
                    if let Some(opp) =
                        self.compare(symbol, &quotes[i], &quotes[j], min_profit_percent)
                    {
                        opportunities.push(opp);
                    }
                }
            }
        }

        opportunities.sort_by(|a, b| {
            match b.profit_percent.cmp(&a.profit_percent) {
                Ordering::Equal => b.available_volume.cmp(&a.available_volume),
                other => other,
            }
        });

        opportunities
    }

    /// Fetches quotes for one symbol from every exchange, skipping
    /// exchanges whose feed fails or returns an unusable price.
    async fn collect_quotes(&self, symbol: &str, exchanges: &[String]) -> Vec<PriceQuote> {
        let mut quotes = Vec::with_capacity(exchanges.len());

        for exchange in exchanges {
            match self.feed.get_quote(exchange, symbol).await {
                Ok(quote) => {
                    if quote.price <= Decimal::ZERO {
                        warn!(
                            exchange = %exchange,
                            symbol = %symbol,
                            price = %quote.price,
                            "Skipping quote with non-positive price"
                        );
                        continue;
                    }
                    quotes.push(quote);
                }
                Err(e) => {
                    warn!(
                        exchange = %exchange,
                        symbol = %symbol,
                        error = %e,
                        "Quote unavailable, skipping exchange for this symbol"
                    );
                }
            }
        }

        quotes
    }

    /// Compares two quotes for the same symbol and builds an opportunity
    /// if the spread clears the threshold. Equal prices yield nothing.
    fn compare(
        &self,
        symbol: &str,
        a: &PriceQuote,
        b: &PriceQuote,
        min_profit_percent: Decimal,
    ) -> Option<ArbitrageOpportunity> {
        let (buy, sell) = match a.price.cmp(&b.price) {
            Ordering::Less => (a, b),
            Ordering::Greater => (b, a),
            Ordering::Equal => return None,
        };

        let profit_percent = (sell.price - buy.price) / buy.price * Decimal::ONE_HUNDRED;
        if profit_percent < min_profit_percent {
            return None;
        }

        let available_volume = std::cmp::min(
            self.cfg.volume_fraction * buy.volume_24h,
            self.cfg.volume_fraction * sell.volume_24h,
        );

        let now = Utc::now();
        let expires_at = now + chrono::Duration::from_std(self.cfg.opportunity_ttl).ok()?;

        let opp = ArbitrageOpportunity {
            id: short_id(&[
                symbol,
                &buy.exchange,
                &sell.exchange,
                &buy.price.to_string(),
                &sell.price.to_string(),
                &now.timestamp_nanos_opt().unwrap_or_default().to_string(),
            ]),
            symbol: symbol.to_string(),
            buy_exchange: buy.exchange.clone(),
            sell_exchange: sell.exchange.clone(),
            buy_price: buy.price,
            sell_price: sell.price,
            profit_percent,
            available_volume,
            created_at: now,
            expires_at,
        };

        debug!(
            symbol = %symbol,
            buy_exchange = %opp.buy_exchange,
            sell_exchange = %opp.sell_exchange,
            profit_percent = %opp.profit_percent,
            "Opportunity detected"
        );

        Some(opp)
    }
}
