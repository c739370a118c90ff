//! Domain models for the arbitrage and settlement engine.

mod ids;
mod opportunity;
mod order;
mod quote;

pub use ids::short_id;
pub use opportunity::ArbitrageOpportunity;
pub use order::{FeeBreakdown, Fill, Order, OrderSide, OrderStatus};
pub use quote::PriceQuote;
