use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::errors::AgentError;
use crate::models::{CopyTrade, TradeStatus};

/// Length of the shortened hash used as a payment identifier.
const PAYMENT_ID_LEN: usize = 10;

/// Process-wide registry of in-flight copy-trade fee requests, keyed by
/// payment identifier.
///
/// A single coarse lock guards the map; contention is one write per trade
/// per poll tick. A trade is only ever mutated by its own payment watcher,
/// but reads (status queries) may come from the request-handling path.
#[derive(Clone, Default)]
pub struct TradeRegistry {
    inner: Arc<Mutex<HashMap<String, CopyTrade>>>,
}

impl TradeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new trade in `watching` state and return it.
    ///
    /// The payment id is derived from the token, wallet and current time,
    /// then shortened. Collisions are only theoretically possible; if one
    /// occurs the id is regenerated with a salt until it is unique.
    pub async fn create(
        &self,
        token_symbol: &str,
        user_wallet: &str,
        fee_smallest_unit: u64,
    ) -> CopyTrade {
        let created_at = Utc::now();
        let mut trades = self.inner.lock().await;

        let mut attempt = 0u32;
        let payment_id = loop {
            let id = derive_payment_id(
                token_symbol,
                user_wallet,
                created_at.timestamp_micros(),
                attempt,
            );
            if !trades.contains_key(&id) {
                break id;
            }
            attempt += 1;
        };

        let trade = CopyTrade {
            payment_id: payment_id.clone(),
            token_symbol: token_symbol.to_string(),
            user_wallet: user_wallet.to_string(),
            fee_smallest_unit,
            status: TradeStatus::Watching,
            created_at,
        };
        trades.insert(payment_id, trade.clone());
        trade
    }

    pub async fn get(&self, payment_id: &str) -> Option<CopyTrade> {
        self.inner.lock().await.get(payment_id).cloned()
    }

    /// Transition a trade `watching -> completed`.
    ///
    /// Returns `Ok(true)` if this call performed the transition, `Ok(false)`
    /// if the trade was already completed (idempotent no-op). Completing an
    /// expired or unknown trade is an error.
    pub async fn complete(&self, payment_id: &str) -> Result<bool, AgentError> {
        let mut trades = self.inner.lock().await;
        let trade = trades
            .get_mut(payment_id)
            .ok_or_else(|| AgentError::NotFound(payment_id.to_string()))?;

        match trade.status {
            TradeStatus::Watching => {
                trade.status = TradeStatus::Completed;
                Ok(true)
            }
            TradeStatus::Completed => Ok(false),
            TradeStatus::Expired => Err(AgentError::AlreadyTerminal {
                payment_id: payment_id.to_string(),
                status: TradeStatus::Expired,
            }),
        }
    }

    /// Remove an unpaid trade from the registry.
    ///
    /// Only trades still in `watching` state are removed; a trade that
    /// completed in the race between its watcher's poll-match and timeout
    /// check is left untouched. Returns whether a trade was removed.
    pub async fn expire(&self, payment_id: &str) -> bool {
        let mut trades = self.inner.lock().await;
        match trades.get(payment_id) {
            Some(trade) if trade.status == TradeStatus::Watching => {
                trades.remove(payment_id);
                true
            }
            _ => false,
        }
    }

    /// Number of currently registered trades (watching or completed).
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

fn derive_payment_id(token_symbol: &str, user_wallet: &str, micros: i64, attempt: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token_symbol.as_bytes());
    hasher.update(user_wallet.as_bytes());
    hasher.update(micros.to_be_bytes());
    if attempt > 0 {
        hasher.update(attempt.to_be_bytes());
    }
    hex::encode(hasher.finalize())[..PAYMENT_ID_LEN].to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET: &str = "0x1111111111111111111111111111111111111111";

    #[tokio::test]
    async fn create_registers_watching_trade() {
        let registry = TradeRegistry::new();
        let trade = registry.create("PEPE", WALLET, 10_000).await;

        assert_eq!(trade.payment_id.len(), PAYMENT_ID_LEN);
        assert_eq!(trade.status, TradeStatus::Watching);
        assert_eq!(trade.fee_smallest_unit, 10_000);

        let stored = registry.get(&trade.payment_id).await.unwrap();
        assert_eq!(stored.token_symbol, "PEPE");
    }

    #[tokio::test]
    async fn payment_ids_are_unique() {
        let registry = TradeRegistry::new();
        let a = registry.create("PEPE", WALLET, 1_000).await;
        let b = registry.create("PEPE", WALLET, 1_000).await;
        let c = registry.create("PEPE", WALLET, 1_000).await;

        assert_ne!(a.payment_id, b.payment_id);
        assert_ne!(b.payment_id, c.payment_id);
        assert_eq!(registry.len().await, 3);
    }

    #[tokio::test]
    async fn complete_transitions_once_then_noops() {
        let registry = TradeRegistry::new();
        let trade = registry.create("LINK", WALLET, 5_000).await;

        assert!(registry.complete(&trade.payment_id).await.unwrap());
        // Second completion is an idempotent no-op, not an error.
        assert!(!registry.complete(&trade.payment_id).await.unwrap());

        let stored = registry.get(&trade.payment_id).await.unwrap();
        assert_eq!(stored.status, TradeStatus::Completed);
    }

    #[tokio::test]
    async fn complete_unknown_id_is_not_found() {
        let registry = TradeRegistry::new();
        let err = registry.complete("deadbeef00").await.unwrap_err();
        assert!(matches!(err, AgentError::NotFound(_)));
    }

    #[tokio::test]
    async fn expire_removes_watching_trade() {
        let registry = TradeRegistry::new();
        let trade = registry.create("UNI", WALLET, 2_000).await;

        assert!(registry.expire(&trade.payment_id).await);
        assert!(registry.get(&trade.payment_id).await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn expire_is_noop_on_completed_trade() {
        let registry = TradeRegistry::new();
        let trade = registry.create("UNI", WALLET, 2_000).await;
        registry.complete(&trade.payment_id).await.unwrap();

        // The completed trade must survive an expire attempt.
        assert!(!registry.expire(&trade.payment_id).await);
        let stored = registry.get(&trade.payment_id).await.unwrap();
        assert_eq!(stored.status, TradeStatus::Completed);
    }

    #[tokio::test]
    async fn complete_after_expire_is_rejected() {
        let registry = TradeRegistry::new();
        let trade = registry.create("UNI", WALLET, 2_000).await;
        registry.expire(&trade.payment_id).await;

        // The trade was deleted, so this surfaces as NotFound.
        let err = registry.complete(&trade.payment_id).await.unwrap_err();
        assert!(matches!(err, AgentError::NotFound(_)));
    }
}
