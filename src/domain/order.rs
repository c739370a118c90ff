//! Order and fee settlement entities.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// OrderSide represents the direction of an order (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// Buy the base asset.
    Buy,
    /// Sell the base asset.
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

impl std::str::FromStr for OrderSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(OrderSide::Buy),
            "sell" => Ok(OrderSide::Sell),
            _ => Err(format!("unknown order side: {}", s)),
        }
    }
}

/// OrderStatus represents the current state of an order.
///
/// Orders are created in `Pending` and make exactly one terminal
/// transition, to `Filled`, `Rejected`, or `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created, execution not yet resolved.
    Pending,
    /// Execution succeeded; the platform credit was consumed.
    Filled,
    /// Execution failed or timed out; the platform credit was refunded.
    Rejected,
    /// Cancelled by the caller before execution resolved; credit refunded.
    Cancelled,
}

impl OrderStatus {
    /// Returns true for states from which no further transition is allowed.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Filled => write!(f, "filled"),
            OrderStatus::Rejected => write!(f, "rejected"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "filled" => Ok(OrderStatus::Filled),
            "rejected" => Ok(OrderStatus::Rejected),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(format!("unknown order status: {}", s)),
        }
    }
}

/// FeeBreakdown is the cost decomposition of a prospective trade.
///
/// Derived deterministically by the fee engine; never mutated after
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    /// Notional value of the trade (amount * price).
    pub total: Decimal,
    /// Commission after any discount tier, in quote currency.
    pub commission: Decimal,
    /// Platform credit required to cover the commission.
    pub credit_required: Decimal,
}

/// Fill carries the execution result reported by an execution port.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// Amount actually filled, in base units.
    pub filled_amount: Decimal,
    /// Average fill price.
    pub filled_price: Decimal,
}

/// Order represents a trade request and its settlement state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier assigned by the engine.
    pub id: String,
    /// Owner of the order and of the debited credit balance.
    pub user_id: String,
    /// Exchange the order targets.
    pub exchange: String,
    /// Traded symbol in "BASE/QUOTE" format.
    pub symbol: String,
    /// Buy or sell.
    pub side: OrderSide,
    /// Amount of base currency to trade.
    pub amount: Decimal,
    /// Requested price.
    pub price: Decimal,
    /// Notional value (amount * price).
    pub total: Decimal,
    /// Commission charged, in quote currency.
    pub commission: Decimal,
    /// Platform credit debited to cover the commission.
    pub credit_used: Decimal,
    /// Current lifecycle state.
    pub status: OrderStatus,
    /// Amount filled, set when the order reaches Filled.
    pub filled_amount: Option<Decimal>,
    /// Fill price, set when the order reaches Filled.
    pub filled_price: Option<Decimal>,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}
