//! In-memory TTL store for detected opportunities.
//!
//! The store is the sole owner of opportunity lifetime state. Expiry is
//! enforced at read time, not only by the periodic sweep, so a caller can
//! never be handed an opportunity that is already stale.

use crate::domain::ArbitrageOpportunity;
use chrono::Utc;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// Opportunity store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No opportunity with the given id.
    #[error("opportunity {0} not found")]
    NotFound(String),

    /// The opportunity exists but its TTL has elapsed.
    #[error("opportunity {0} has expired")]
    Expired(String),
}

/// OpportunityStore holds detected opportunities until they expire or are
/// consumed by execution.
#[derive(Default)]
pub struct OpportunityStore {
    entries: RwLock<HashMap<String, ArbitrageOpportunity>>,
}

impl OpportunityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an opportunity.
    pub async fn put(&self, opp: ArbitrageOpportunity) {
        let mut entries = self.entries.write().await;
        entries.insert(opp.id.clone(), opp);
    }

    /// Returns a copy of the opportunity if it exists and is still live.
    ///
    /// Expiry is re-validated here: an expired entry is removed and
    /// reported as `Expired` even if the sweep has not run yet.
    pub async fn get(&self, id: &str) -> Result<ArbitrageOpportunity, StoreError> {
        let mut entries = self.entries.write().await;
        match entries.get(id) {
            Some(opp) if opp.is_expired() => {
                entries.remove(id);
                Err(StoreError::Expired(id.to_string()))
            }
            Some(opp) => Ok(opp.clone()),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    /// Removes an opportunity, returning it if it was present.
    pub async fn remove(&self, id: &str) -> Option<ArbitrageOpportunity> {
        let mut entries = self.entries.write().await;
        entries.remove(id)
    }

    /// Returns all live opportunities, sorted descending by profit.
    /// Expired entries are filtered out even before the sweep runs.
    pub async fn list(&self) -> Vec<ArbitrageOpportunity> {
        let now = Utc::now();
        let entries = self.entries.read().await;
        let mut live: Vec<ArbitrageOpportunity> = entries
            .values()
            .filter(|opp| !opp.is_expired_at(now))
            .cloned()
            .collect();
        live.sort_by(|a, b| b.profit_percent.cmp(&a.profit_percent));
        live
    }

    /// Removes all expired entries and returns how many were dropped.
    pub async fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, opp| !opp.is_expired_at(now));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, remaining = entries.len(), "Swept expired opportunities");
        }
        removed
    }

    /// Number of entries currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
