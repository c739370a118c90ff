//! SQLite implementation of Persistence.

use super::{Persistence, StorageError};
use crate::domain::{Fill, Order, OrderSide, OrderStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use tracing::info;

/// SqliteStorage implements Persistence using SQLite.
pub struct SqliteStorage {
    pool: Pool<Sqlite>,
}

/// SqliteStorageConfig holds SQLite storage configuration.
#[derive(Debug, Clone)]
pub struct SqliteStorageConfig {
    /// Path to the SQLite database file.
    pub path: String,
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
}

impl Default for SqliteStorageConfig {
    fn default() -> Self {
        Self {
            path: "crossarb.db".to_string(),
            max_connections: 5,
        }
    }
}

impl SqliteStorage {
    /// Creates a new SQLite storage instance.
    pub async fn new(config: SqliteStorageConfig) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", config.path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        let storage = Self { pool };

        storage.migrate().await?;

        info!(path = %config.path, "SQLite storage initialized");
        Ok(storage)
    }

    /// Runs database migrations to create the schema.
    async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                exchange TEXT NOT NULL,
                symbol TEXT NOT NULL,
                side TEXT NOT NULL,
                amount TEXT NOT NULL,
                price TEXT NOT NULL,
                total TEXT NOT NULL,
                commission TEXT NOT NULL,
                credit_used TEXT NOT NULL,
                status TEXT NOT NULL,
                filled_amount TEXT,
                filled_price TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS balances (
                user_id TEXT PRIMARY KEY,
                credit_balance TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl Persistence for SqliteStorage {
    async fn save_order(&self, order: &Order) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, exchange, symbol, side, amount, price, total,
                commission, credit_used, status, filled_amount, filled_price,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(&order.exchange)
        .bind(&order.symbol)
        .bind(order.side.to_string())
        .bind(order.amount.to_string())
        .bind(order.price.to_string())
        .bind(order.total.to_string())
        .bind(order.commission.to_string())
        .bind(order.credit_used.to_string())
        .bind(order.status.to_string())
        .bind(order.filled_amount.map(|d| d.to_string()))
        .bind(order.filled_price.map(|d| d.to_string()))
        .bind(order.created_at.to_rfc3339())
        .bind(order.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_order(&self, id: &str) -> Result<Option<Order>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, exchange, symbol, side, amount, price, total,
                commission, credit_used, status, filled_amount, filled_price,
                created_at, updated_at
            FROM orders WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(parse_order_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn transition_order(
        &self,
        id: &str,
        to: OrderStatus,
        fill: Option<Fill>,
    ) -> Result<bool, StorageError> {
        // The status guard in the WHERE clause makes the transition
        // conditional: a concurrent settle/cancel/watchdog race is decided
        // by whichever UPDATE lands first.
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = ?1,
                filled_amount = COALESCE(?2, filled_amount),
                filled_price = COALESCE(?3, filled_price),
                updated_at = ?4
            WHERE id = ?5 AND status = 'pending'
            "#,
        )
        .bind(to.to_string())
        .bind(fill.map(|f| f.filled_amount.to_string()))
        .bind(fill.map(|f| f.filled_price.to_string()))
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_orders_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, exchange, symbol, side, amount, price, total,
                commission, credit_used, status, filled_amount, filled_price,
                created_at, updated_at
            FROM orders WHERE status = ? ORDER BY created_at ASC
            "#,
        )
        .bind(status.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(parse_order_row).collect()
    }

    async fn get_balance(&self, user_id: &str) -> Result<Decimal, StorageError> {
        let row = sqlx::query("SELECT credit_balance FROM balances WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let balance_str: String = row.try_get("credit_balance")?;
                parse_decimal(&balance_str, "credit_balance")
            }
            None => Ok(Decimal::ZERO),
        }
    }

    async fn set_balance(&self, user_id: &str, amount: Decimal) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO balances (user_id, credit_balance) VALUES (?1, ?2)
            ON CONFLICT(user_id) DO UPDATE SET credit_balance = ?2
            "#,
        )
        .bind(user_id)
        .bind(amount.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.pool.close().await;
        Ok(())
    }
}

fn parse_decimal(s: &str, field: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(s)
        .map_err(|e| StorageError::InvalidData(format!("Invalid {}: {}", field, e)))
}

fn parse_timestamp(s: &str, field: &str) -> Result<DateTime<Utc>, StorageError> {
    Ok(DateTime::parse_from_rfc3339(s)
        .map_err(|e| StorageError::InvalidData(format!("Invalid {}: {}", field, e)))?
        .with_timezone(&Utc))
}

/// Parses an order from a database row.
fn parse_order_row(row: &sqlx::sqlite::SqliteRow) -> Result<Order, StorageError> {
    let side_str: String = row.try_get("side")?;
    let side =
        OrderSide::from_str(&side_str).map_err(StorageError::InvalidData)?;

    let status_str: String = row.try_get("status")?;
    let status = OrderStatus::from_str(&status_str).map_err(StorageError::InvalidData)?;

    let amount_str: String = row.try_get("amount")?;
    let price_str: String = row.try_get("price")?;
    let total_str: String = row.try_get("total")?;
    let commission_str: String = row.try_get("commission")?;
    let credit_used_str: String = row.try_get("credit_used")?;

    let filled_amount: Option<String> = row.try_get("filled_amount")?;
    let filled_amount = filled_amount
        .map(|s| parse_decimal(&s, "filled_amount"))
        .transpose()?;

    let filled_price: Option<String> = row.try_get("filled_price")?;
    let filled_price = filled_price
        .map(|s| parse_decimal(&s, "filled_price"))
        .transpose()?;

    let created_at_str: String = row.try_get("created_at")?;
    let updated_at_str: String = row.try_get("updated_at")?;

    Ok(Order {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        exchange: row.try_get("exchange")?,
        symbol: row.try_get("symbol")?,
        side,
        amount: parse_decimal(&amount_str, "amount")?,
        price: parse_decimal(&price_str, "price")?,
        total: parse_decimal(&total_str, "total")?,
        commission: parse_decimal(&commission_str, "commission")?,
        credit_used: parse_decimal(&credit_used_str, "credit_used")?,
        status,
        filled_amount,
        filled_price,
        created_at: parse_timestamp(&created_at_str, "created_at")?,
        updated_at: parse_timestamp(&updated_at_str, "updated_at")?,
    })
}
