//! In-memory Persistence backend for tests and dry runs.

use super::{Persistence, StorageError};
use crate::domain::{Fill, Order, OrderStatus};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// MemoryStorage keeps orders and balances in process memory.
#[derive(Default)]
pub struct MemoryStorage {
    orders: RwLock<HashMap<String, Order>>,
    balances: RwLock<HashMap<String, Decimal>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Persistence for MemoryStorage {
    async fn save_order(&self, order: &Order) -> Result<(), StorageError> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id.clone(), order.clone());
        Ok(())
    }

    async fn get_order(&self, id: &str) -> Result<Option<Order>, StorageError> {
        let orders = self.orders.read().await;
        Ok(orders.get(id).cloned())
    }

    async fn transition_order(
        &self,
        id: &str,
        to: OrderStatus,
        fill: Option<Fill>,
    ) -> Result<bool, StorageError> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(id) {
            Some(order) if order.status == OrderStatus::Pending => {
                order.status = to;
                order.updated_at = Utc::now();
                if let Some(fill) = fill {
                    order.filled_amount = Some(fill.filled_amount);
                    order.filled_price = Some(fill.filled_price);
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_orders_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, StorageError> {
        let orders = self.orders.read().await;
        let mut matching: Vec<Order> = orders
            .values()
            .filter(|o| o.status == status)
            .cloned()
            .collect();
        matching.sort_by_key(|o| o.created_at);
        Ok(matching)
    }

    async fn get_balance(&self, user_id: &str) -> Result<Decimal, StorageError> {
        let balances = self.balances.read().await;
        Ok(balances.get(user_id).copied().unwrap_or(Decimal::ZERO))
    }

    async fn set_balance(&self, user_id: &str, amount: Decimal) -> Result<(), StorageError> {
        let mut balances = self.balances.write().await;
        balances.insert(user_id.to_string(), amount);
        Ok(())
    }

    async fn close(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
