//! Platform-credit balance ledger.
//!
//! The ledger is the sole mutator of user credit balances. Check-and-
//! decrement runs under a per-user mutex, so concurrent debits against the
//! same user serialize while unrelated users proceed in parallel. That
//! per-user lock is the engine's only mutual-exclusion boundary.

use crate::storage::{Persistence, StorageError};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Ledger errors.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Debit refused: the balance does not cover the amount. Nothing was
    /// decremented.
    #[error("insufficient balance: available {available}, required {required}")]
    InsufficientBalance {
        available: Decimal,
        required: Decimal,
    },

    /// Debit and credit amounts must be positive.
    #[error("invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// Underlying storage failure.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// BalanceLedger holds user credit balances behind atomic debit/credit
/// operations, writing through to the persistence backend.
pub struct BalanceLedger {
    storage: Arc<dyn Persistence>,
    user_locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl BalanceLedger {
    pub fn new(storage: Arc<dyn Persistence>) -> Self {
        Self {
            storage,
            user_locks: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the lock guarding one user's balance, creating it on first
    /// use.
    async fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        {
            let locks = self.user_locks.read().await;
            if let Some(lock) = locks.get(user_id) {
                return Arc::clone(lock);
            }
        }
        let mut locks = self.user_locks.write().await;
        Arc::clone(
            locks
                .entry(user_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Atomically checks and decrements the user's balance.
    ///
    /// Refuses with `InsufficientBalance` if the balance does not cover
    /// the amount; there is no partial debit.
    pub async fn debit(&self, user_id: &str, amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let balance = self.storage.get_balance(user_id).await?;
        if balance < amount {
            return Err(LedgerError::InsufficientBalance {
                available: balance,
                required: amount,
            });
        }

        self.storage.set_balance(user_id, balance - amount).await?;
        debug!(user = %user_id, amount = %amount, balance = %(balance - amount), "Debited credit");
        Ok(())
    }

    /// Increments the user's balance. Always succeeds for positive
    /// amounts.
    pub async fn credit(&self, user_id: &str, amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let balance = self.storage.get_balance(user_id).await?;
        self.storage.set_balance(user_id, balance + amount).await?;
        debug!(user = %user_id, amount = %amount, balance = %(balance + amount), "Credited credit");
        Ok(())
    }

    /// Returns the user's current balance; unknown users have zero.
    pub async fn balance(&self, user_id: &str) -> Result<Decimal, LedgerError> {
        Ok(self.storage.get_balance(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    async fn ledger_with_balance(user: &str, balance: &str) -> BalanceLedger {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_balance(user, dec(balance)).await.unwrap();
        BalanceLedger::new(storage)
    }

    #[tokio::test]
    async fn test_debit_then_credit_round_trip() {
        let ledger = ledger_with_balance("user-1", "100").await;

        ledger.debit("user-1", dec("0.2")).await.unwrap();
        assert_eq!(ledger.balance("user-1").await.unwrap(), dec("99.8"));

        ledger.credit("user-1", dec("0.2")).await.unwrap();
        assert_eq!(ledger.balance("user-1").await.unwrap(), dec("100"));
    }

    #[tokio::test]
    async fn test_debit_insufficient_balance() {
        let ledger = ledger_with_balance("user-1", "1").await;

        let err = ledger.debit("user-1", dec("2")).await.unwrap_err();
        match err {
            LedgerError::InsufficientBalance {
                available,
                required,
            } => {
                assert_eq!(available, dec("1"));
                assert_eq!(required, dec("2"));
            }
            other => panic!("unexpected error: {}", other),
        }

        // Nothing was decremented.
        assert_eq!(ledger.balance("user-1").await.unwrap(), dec("1"));
    }

    #[tokio::test]
    async fn test_debit_rejects_non_positive_amount() {
        let ledger = ledger_with_balance("user-1", "100").await;

        assert!(matches!(
            ledger.debit("user-1", dec("0")).await,
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(matches!(
            ledger.debit("user-1", dec("-5")).await,
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_user_has_zero_balance() {
        let storage = Arc::new(MemoryStorage::new());
        let ledger = BalanceLedger::new(storage);

        assert_eq!(ledger.balance("nobody").await.unwrap(), Decimal::ZERO);
        assert!(matches!(
            ledger.debit("nobody", dec("1")).await,
            Err(LedgerError::InsufficientBalance { .. })
        ));
    }

    #[tokio::test]
    async fn test_concurrent_debits_exactly_one_succeeds() {
        // Balance 100, two concurrent debits of 60: their sum exceeds the
        // balance, so exactly one may pass.
        let ledger = Arc::new(ledger_with_balance("user-1", "100").await);

        let a = {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(async move { ledger.debit("user-1", dec("60")).await })
        };
        let b = {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(async move { ledger.debit("user-1", dec("60")).await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();

        assert_eq!(successes, 1);
        assert_eq!(ledger.balance("user-1").await.unwrap(), dec("40"));
    }

    #[tokio::test]
    async fn test_distinct_users_do_not_interfere() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_balance("alice", dec("10")).await.unwrap();
        storage.set_balance("bob", dec("10")).await.unwrap();
        let ledger = BalanceLedger::new(storage);

        ledger.debit("alice", dec("4")).await.unwrap();
        ledger.debit("bob", dec("7")).await.unwrap();

        assert_eq!(ledger.balance("alice").await.unwrap(), dec("6"));
        assert_eq!(ledger.balance("bob").await.unwrap(), dec("3"));
    }
}
