//! External collaborator interfaces: market data and order execution.
//!
//! Exchange connectivity is supplied from outside the engine. These traits
//! are the only surface the engine sees; implementations are injected at
//! construction time so tests can script outcomes deterministically.

mod sim;

pub use sim::{SimulatedExecution, SimulatedFeed};

use crate::domain::{Fill, Order, PriceQuote};
use async_trait::async_trait;
use thiserror::Error;

/// Errors from a price feed port.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The feed could not produce a quote for (exchange, symbol).
    #[error("feed unavailable for {exchange}/{symbol}: {reason}")]
    Unavailable {
        exchange: String,
        symbol: String,
        reason: String,
    },
}

/// Errors from an execution port.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The counterparty reported the order as not filled.
    #[error("execution failed: {0}")]
    Failed(String),
}

/// PriceFeedPort supplies current price and volume for a symbol on an
/// exchange.
#[async_trait]
pub trait PriceFeedPort: Send + Sync {
    /// Fetches the current quote for a symbol on an exchange.
    /// Returns FeedError::Unavailable if the exchange cannot serve the
    /// symbol right now; callers treat that as a skippable condition.
    async fn get_quote(&self, exchange: &str, symbol: &str) -> Result<PriceQuote, FeedError>;
}

/// ExecutionPort submits an order for execution on its target exchange.
///
/// The engine treats implementations as unreliable: every call is wrapped
/// in a timeout, and a call may be retried for the same order, so
/// implementations must tolerate duplicate submissions of one order id.
#[async_trait]
pub trait ExecutionPort: Send + Sync {
    /// Executes the order and resolves to the fill details, or to
    /// ExecError::Failed with the counterparty's reason.
    async fn execute(&self, order: &Order) -> Result<Fill, ExecError>;
}
