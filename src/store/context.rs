use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

/// How long an analysis context stays usable for subsequent copy-trade
/// commands.
pub const CONTEXT_TTL_SECS: i64 = 600;

/// Chain context recorded by the most recent successful analysis.
#[derive(Debug, Clone)]
pub struct ChainContext {
    pub chain_id: u64,
    pub chain_name: String,
    pub analyzed_at: DateTime<Utc>,
}

/// Single-slot, process-wide cache of the last analyzed chain.
#[derive(Clone, Default)]
pub struct AnalysisContext {
    inner: Arc<Mutex<Option<ChainContext>>>,
}

impl AnalysisContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn store(&self, chain_id: u64, chain_name: &str) {
        let mut slot = self.inner.lock().await;
        *slot = Some(ChainContext {
            chain_id,
            chain_name: chain_name.to_string(),
            analyzed_at: Utc::now(),
        });
    }

    /// The current context, if one exists and has not gone stale.
    pub async fn fresh(&self) -> Option<ChainContext> {
        let slot = self.inner.lock().await;
        slot.as_ref()
            .filter(|ctx| Utc::now() - ctx.analyzed_at < Duration::seconds(CONTEXT_TTL_SECS))
            .cloned()
    }

    #[cfg(test)]
    async fn backdate(&self, secs: i64) {
        let mut slot = self.inner.lock().await;
        if let Some(ctx) = slot.as_mut() {
            ctx.analyzed_at -= Duration::seconds(secs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_context_is_not_fresh() {
        let ctx = AnalysisContext::new();
        assert!(ctx.fresh().await.is_none());
    }

    #[tokio::test]
    async fn stored_context_is_fresh() {
        let ctx = AnalysisContext::new();
        ctx.store(137, "polygon").await;

        let chain = ctx.fresh().await.unwrap();
        assert_eq!(chain.chain_id, 137);
        assert_eq!(chain.chain_name, "polygon");
    }

    #[tokio::test]
    async fn stale_context_is_rejected() {
        let ctx = AnalysisContext::new();
        ctx.store(1, "ethereum").await;
        ctx.backdate(CONTEXT_TTL_SECS + 1).await;

        assert!(ctx.fresh().await.is_none());
    }

    #[tokio::test]
    async fn restore_overwrites_previous_slot() {
        let ctx = AnalysisContext::new();
        ctx.store(1, "ethereum").await;
        ctx.store(137, "polygon").await;

        assert_eq!(ctx.fresh().await.unwrap().chain_id, 137);
    }
}
