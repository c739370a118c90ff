//! Persistence interfaces and implementations for orders and balances.

mod memory;
mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::{SqliteStorage, SqliteStorageConfig};

use crate::domain::{Fill, Order, OrderStatus};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Persistence defines the storage interface the engine consumes for
/// orders and user credit balances.
///
/// Balance rows are only ever written through the balance ledger, which
/// provides the per-user serialization; implementations just need plain
/// get/set semantics. Order status changes go through `transition_order`,
/// which is conditional so that exactly one caller wins a race to settle
/// an order.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Persists a newly created order.
    async fn save_order(&self, order: &Order) -> Result<(), StorageError>;

    /// Retrieves an order by id.
    async fn get_order(&self, id: &str) -> Result<Option<Order>, StorageError>;

    /// Moves an order from Pending to the given terminal status,
    /// recording fill details when present.
    ///
    /// Returns true if this call performed the transition; false if the
    /// order was no longer Pending. Unknown ids return false.
    async fn transition_order(
        &self,
        id: &str,
        to: OrderStatus,
        fill: Option<Fill>,
    ) -> Result<bool, StorageError>;

    /// Lists orders currently in the given status, oldest first.
    async fn list_orders_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, StorageError>;

    /// Returns the user's credit balance; unknown users have zero.
    async fn get_balance(&self, user_id: &str) -> Result<Decimal, StorageError>;

    /// Sets the user's credit balance.
    async fn set_balance(&self, user_id: &str, amount: Decimal) -> Result<(), StorageError>;

    /// Closes the storage backend.
    async fn close(&self) -> Result<(), StorageError>;
}

/// StorageError represents errors from persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
