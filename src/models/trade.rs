use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a copy-trade fee request.
///
/// `Completed` and `Expired` are terminal: once a trade reaches either,
/// no further transition is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Watching,
    Completed,
    Expired,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Watching => "watching",
            TradeStatus::Completed => "completed",
            TradeStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TradeStatus::Completed | TradeStatus::Expired)
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pending or resolved copy-trade fee request.
///
/// The fee is fixed at creation and never recomputed. The trade is mutated
/// only by its own payment watcher; other paths read it for status queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyTrade {
    pub payment_id: String,
    pub token_symbol: String,
    pub user_wallet: String,
    /// Fee in the payment token's smallest unit (6-decimal USDC).
    pub fee_smallest_unit: u64,
    pub status: TradeStatus,
    pub created_at: DateTime<Utc>,
}

impl CopyTrade {
    /// Fee expressed in USD for display (6-decimal USDC semantics).
    pub fn fee_usd(&self) -> f64 {
        self.fee_smallest_unit as f64 / 1_000_000.0
    }
}
