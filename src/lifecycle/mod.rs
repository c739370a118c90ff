//! Order lifecycle state machine and two-leg arbitrage execution.
//!
//! An order is born Pending and makes exactly one terminal transition:
//! Filled, Rejected, or Cancelled. The platform credit debited at creation
//! is consumed on Filled and refunded on Rejected/Cancelled. The refund is
//! gated by the conditional Pending -> terminal transition in storage, so
//! retries, cancels, and the watchdog can race without double-refunding.

use crate::domain::{short_id, Order, OrderSide, OrderStatus};
use crate::fees::{FeeEngine, FeeError};
use crate::ledger::{BalanceLedger, LedgerError};
use crate::ports::{ExecError, ExecutionPort};
use crate::storage::{Persistence, StorageError};
use crate::store::{OpportunityStore, StoreError};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Order lifecycle errors. Every variant leaves balances consistent with
/// the persisted order state by the time it is returned.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// Non-positive amount or price, or an unknown discount tier.
    /// Rejected synchronously; nothing was mutated.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Credit debit refused; no order was created.
    #[error("insufficient balance: available {available}, required {required}")]
    InsufficientBalance {
        available: Decimal,
        required: Decimal,
    },

    /// The opportunity id was unknown or past its TTL at execution time.
    /// No state was mutated.
    #[error("opportunity {0} is expired or unknown")]
    OpportunityExpired(String),

    /// The execution port reported the order as not filled. The order is
    /// Rejected and the credit has been refunded.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The execution port did not answer within the timeout. The order is
    /// Rejected and the credit has been refunded.
    #[error("execution timed out")]
    ExecutionTimeout,

    /// No order with the given id.
    #[error("order {0} not found")]
    NotFound(String),

    /// Cancellation is only permitted while the order is Pending.
    #[error("order {id} is {status} and cannot be cancelled")]
    NotCancellable { id: String, status: OrderStatus },

    /// One leg of a two-leg arbitrage settled and the other did not,
    /// leaving a single-sided position. The filled leg is not unwound.
    #[error("partial arbitrage failure on {opportunity_id}: {filled_side} leg filled (order {filled_order_id}), {failed_side} leg failed: {reason}")]
    PartialArbitrageFailure {
        opportunity_id: String,
        filled_side: OrderSide,
        filled_order_id: String,
        failed_side: OrderSide,
        reason: String,
    },

    /// Underlying storage failure.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<FeeError> for OrderError {
    fn from(e: FeeError) -> Self {
        OrderError::InvalidInput(e.to_string())
    }
}

impl From<LedgerError> for OrderError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InsufficientBalance {
                available,
                required,
            } => OrderError::InsufficientBalance {
                available,
                required,
            },
            LedgerError::InvalidAmount(a) => {
                OrderError::InvalidInput(format!("invalid amount: {}", a))
            }
            LedgerError::Storage(e) => OrderError::Storage(e),
        }
    }
}

/// A trade intent entering the lifecycle.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub user_id: String,
    pub exchange: String,
    pub symbol: String,
    pub side: OrderSide,
    pub amount: Decimal,
    pub price: Decimal,
    /// Discount tier name, when the user qualifies for one.
    pub discount_tier: Option<String>,
}

/// Result of a completed two-leg arbitrage execution.
#[derive(Debug, Clone)]
pub struct ArbitrageExecution {
    pub opportunity_id: String,
    pub buy_order: Order,
    pub sell_order: Order,
}

/// OrderLifecycle drives orders from intent to a terminal state,
/// coordinating the fee engine, the balance ledger, persistence, and the
/// external execution port.
pub struct OrderLifecycle {
    fees: FeeEngine,
    ledger: Arc<BalanceLedger>,
    storage: Arc<dyn Persistence>,
    execution: Arc<dyn ExecutionPort>,
    opportunities: Arc<OpportunityStore>,
    execution_timeout: Duration,
}

impl OrderLifecycle {
    pub fn new(
        fees: FeeEngine,
        ledger: Arc<BalanceLedger>,
        storage: Arc<dyn Persistence>,
        execution: Arc<dyn ExecutionPort>,
        opportunities: Arc<OpportunityStore>,
        execution_timeout: Duration,
    ) -> Self {
        Self {
            fees,
            ledger,
            storage,
            execution,
            opportunities,
            execution_timeout,
        }
    }

    /// Places an order: computes fees, debits the platform credit,
    /// persists the order Pending, and drives it to a terminal state
    /// through the execution port.
    ///
    /// On success the returned order is Filled and the credit stays
    /// consumed. On execution failure or timeout the order ends Rejected,
    /// the credit is refunded, and the corresponding error is returned.
    pub async fn place_order(&self, req: OrderRequest) -> Result<Order, OrderError> {
        let breakdown = self.fees.quote(
            req.amount,
            req.price,
            &req.exchange,
            req.discount_tier.as_deref(),
        )?;

        // A zero commission (rate 0) needs no debit and nothing to refund.
        if breakdown.credit_required > Decimal::ZERO {
            self.ledger
                .debit(&req.user_id, breakdown.credit_required)
                .await?;
        }

        let now = Utc::now();
        let order = Order {
            id: short_id(&[
                &req.user_id,
                &req.exchange,
                &req.symbol,
                &req.side.to_string(),
                &now.timestamp_nanos_opt().unwrap_or_default().to_string(),
            ]),
            user_id: req.user_id.clone(),
            exchange: req.exchange.clone(),
            symbol: req.symbol.clone(),
            side: req.side,
            amount: req.amount,
            price: req.price,
            total: breakdown.total,
            commission: breakdown.commission,
            credit_used: breakdown.credit_required,
            status: OrderStatus::Pending,
            filled_amount: None,
            filled_price: None,
            created_at: now,
            updated_at: now,
        };

        self.storage.save_order(&order).await?;

        info!(
            order = %order.id,
            user = %order.user_id,
            exchange = %order.exchange,
            symbol = %order.symbol,
            side = %order.side,
            credit_used = %order.credit_used,
            "Order created, dispatching to execution port"
        );

        match tokio::time::timeout(self.execution_timeout, self.execution.execute(&order)).await {
            Ok(Ok(fill)) => {
                if self
                    .storage
                    .transition_order(&order.id, OrderStatus::Filled, Some(fill))
                    .await?
                {
                    info!(order = %order.id, filled_price = %fill.filled_price, "Order filled");
                } else {
                    // Lost the race to a concurrent cancel; the credit was
                    // already refunded there.
                    warn!(order = %order.id, "Fill arrived after order left Pending");
                }
                match self.storage.get_order(&order.id).await? {
                    Some(order) => Ok(order),
                    None => Err(OrderError::NotFound(order.id.clone())),
                }
            }
            Ok(Err(ExecError::Failed(reason))) => {
                self.reject_and_refund(&order, &reason).await?;
                Err(OrderError::ExecutionFailed(reason))
            }
            Err(_) => {
                self.reject_and_refund(&order, "execution timed out").await?;
                Err(OrderError::ExecutionTimeout)
            }
        }
    }

    /// Cancels a Pending order and refunds its credit. Terminal orders are
    /// refused with `NotCancellable`.
    pub async fn cancel_order(&self, order_id: &str) -> Result<Order, OrderError> {
        let order = self
            .storage
            .get_order(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;

        if self
            .storage
            .transition_order(order_id, OrderStatus::Cancelled, None)
            .await?
        {
            self.refund(&order).await?;
            info!(order = %order_id, "Order cancelled, credit refunded");
            match self.storage.get_order(order_id).await? {
                Some(order) => Ok(order),
                None => Err(OrderError::NotFound(order_id.to_string())),
            }
        } else {
            // The order reached a terminal state first; re-read it for the
            // error detail.
            let current = self
                .storage
                .get_order(order_id)
                .await?
                .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;
            Err(OrderError::NotCancellable {
                id: order_id.to_string(),
                status: current.status,
            })
        }
    }

    /// Executes a stored opportunity as two linked orders: a buy on the
    /// cheap exchange, then a sell on the dear one.
    ///
    /// A stale or unknown opportunity fails with `OpportunityExpired` and
    /// mutates nothing. If the sell leg fails after the buy leg filled,
    /// the buy leg is not unwound; the outcome is surfaced as
    /// `PartialArbitrageFailure`.
    pub async fn execute_opportunity(
        &self,
        opportunity_id: &str,
        user_id: &str,
        amount: Decimal,
    ) -> Result<ArbitrageExecution, OrderError> {
        let opp = match self.opportunities.get(opportunity_id).await {
            Ok(opp) => opp,
            Err(StoreError::NotFound(id)) | Err(StoreError::Expired(id)) => {
                return Err(OrderError::OpportunityExpired(id));
            }
        };

        if amount <= Decimal::ZERO {
            return Err(OrderError::InvalidInput(format!(
                "amount must be positive, got {}",
                amount
            )));
        }

        // Consume the opportunity so it cannot be executed twice.
        self.opportunities.remove(opportunity_id).await;

        info!(
            opportunity = %opportunity_id,
            user = %user_id,
            symbol = %opp.symbol,
            buy_exchange = %opp.buy_exchange,
            sell_exchange = %opp.sell_exchange,
            amount = %amount,
            "Executing arbitrage opportunity"
        );

        let buy_order = self
            .place_order(OrderRequest {
                user_id: user_id.to_string(),
                exchange: opp.buy_exchange.clone(),
                symbol: opp.symbol.clone(),
                side: OrderSide::Buy,
                amount,
                price: opp.buy_price,
                discount_tier: None,
            })
            .await?;

        let sell_result = self
            .place_order(OrderRequest {
                user_id: user_id.to_string(),
                exchange: opp.sell_exchange.clone(),
                symbol: opp.symbol.clone(),
                side: OrderSide::Sell,
                amount,
                price: opp.sell_price,
                discount_tier: None,
            })
            .await;

        match sell_result {
            Ok(sell_order) => Ok(ArbitrageExecution {
                opportunity_id: opportunity_id.to_string(),
                buy_order,
                sell_order,
            }),
            Err(e) => {
                warn!(
                    opportunity = %opportunity_id,
                    buy_order = %buy_order.id,
                    error = %e,
                    "Sell leg failed after buy leg filled"
                );
                Err(OrderError::PartialArbitrageFailure {
                    opportunity_id: opportunity_id.to_string(),
                    filled_side: OrderSide::Buy,
                    filled_order_id: buy_order.id,
                    failed_side: OrderSide::Sell,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Watchdog sweep: force-times-out orders stuck Pending longer than
    /// `max_pending_age`, refunding their credit. Returns how many orders
    /// were timed out.
    pub async fn sweep_stale_orders(&self, max_pending_age: Duration) -> Result<usize, OrderError> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(max_pending_age)
                .map_err(|e| OrderError::InvalidInput(e.to_string()))?;

        let pending = self
            .storage
            .list_orders_by_status(OrderStatus::Pending)
            .await?;

        let mut timed_out = 0;
        for order in pending {
            if order.created_at >= cutoff {
                continue;
            }
            if self
                .storage
                .transition_order(&order.id, OrderStatus::Rejected, None)
                .await?
            {
                self.refund(&order).await?;
                warn!(
                    order = %order.id,
                    age = %(Utc::now() - order.created_at),
                    "Force-timed-out stale pending order"
                );
                timed_out += 1;
            }
        }

        Ok(timed_out)
    }

    /// Moves the order to Rejected and refunds its credit, if this call
    /// wins the terminal transition.
    async fn reject_and_refund(&self, order: &Order, reason: &str) -> Result<(), OrderError> {
        if self
            .storage
            .transition_order(&order.id, OrderStatus::Rejected, None)
            .await?
        {
            self.refund(order).await?;
            info!(order = %order.id, reason = %reason, "Order rejected, credit refunded");
        }
        Ok(())
    }

    /// Returns the order's debited credit to its owner.
    async fn refund(&self, order: &Order) -> Result<(), OrderError> {
        if order.credit_used > Decimal::ZERO {
            self.ledger.credit(&order.user_id, order.credit_used).await?;
        }
        Ok(())
    }
}
