//! Deterministic in-process port implementations.
//!
//! Used by the binary in development mode and by tests. Quotes come from a
//! table the caller maintains; executions fill at the requested price.

use super::{ExecError, ExecutionPort, FeedError, PriceFeedPort};
use crate::domain::{Fill, Order, PriceQuote};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// SimulatedFeed serves quotes from an in-memory table keyed by
/// (exchange, symbol).
#[derive(Default)]
pub struct SimulatedFeed {
    quotes: RwLock<HashMap<(String, String), (Decimal, Decimal)>>,
}

impl SimulatedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the price and 24h volume served for a symbol on an exchange.
    pub async fn set_quote(&self, exchange: &str, symbol: &str, price: Decimal, volume_24h: Decimal) {
        let mut quotes = self.quotes.write().await;
        quotes.insert((exchange.to_string(), symbol.to_string()), (price, volume_24h));
    }

    /// Removes a quote so subsequent fetches fail, simulating an outage.
    pub async fn clear_quote(&self, exchange: &str, symbol: &str) {
        let mut quotes = self.quotes.write().await;
        quotes.remove(&(exchange.to_string(), symbol.to_string()));
    }
}

#[async_trait]
impl PriceFeedPort for SimulatedFeed {
    async fn get_quote(&self, exchange: &str, symbol: &str) -> Result<PriceQuote, FeedError> {
        let quotes = self.quotes.read().await;
        match quotes.get(&(exchange.to_string(), symbol.to_string())) {
            Some((price, volume_24h)) => Ok(PriceQuote {
                exchange: exchange.to_string(),
                symbol: symbol.to_string(),
                price: *price,
                volume_24h: *volume_24h,
                observed_at: Utc::now(),
            }),
            None => Err(FeedError::Unavailable {
                exchange: exchange.to_string(),
                symbol: symbol.to_string(),
                reason: "no quote configured".to_string(),
            }),
        }
    }
}

/// SimulatedExecution fills every order at its requested amount and price.
#[derive(Default)]
pub struct SimulatedExecution;

impl SimulatedExecution {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExecutionPort for SimulatedExecution {
    async fn execute(&self, order: &Order) -> Result<Fill, ExecError> {
        Ok(Fill {
            filled_amount: order.amount,
            filled_price: order.price,
        })
    }
}
