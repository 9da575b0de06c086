use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use tokio::time::{sleep, Instant};

use crate::errors::AgentError;
use crate::etherscan::{EtherscanError, TokenTransfer};
use crate::models::CopyTrade;
use crate::settlement::Settlement;
use crate::store::{MessageLog, TradeRegistry};
use crate::AGENT_NAME;

/// Ledger query seam used by watchers: the most recent token transfers to
/// the service's receiving address, newest first.
#[async_trait]
pub trait LedgerQuery: Send + Sync {
    async fn recent_transfers(&self) -> Result<Vec<TokenTransfer>, EtherscanError>;
}

/// Timing parameters for one payment watch.
#[derive(Debug, Clone, Copy)]
pub struct WatcherConfig {
    /// Interval between ledger polls.
    pub poll_interval: Duration,
    /// Wall-clock bound on the whole watch.
    pub timeout: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(15),
            timeout: Duration::from_secs(300),
        }
    }
}

/// Watch the ledger for the fee payment of one trade.
///
/// Spawned detached per trade; the request handler never awaits it. Results
/// flow out only through the registry and the message log. The loop exits on
/// the first matching transfer or when the timeout elapses, whichever comes
/// first. A failed poll is logged and retried on the next tick; one
/// explorer hiccup must not expire a legitimate in-flight trade.
pub async fn watch_for_payment(
    registry: TradeRegistry,
    messages: MessageLog,
    ledger: Arc<dyn LedgerQuery>,
    settlement: Arc<dyn Settlement>,
    payment_address: String,
    payment_id: String,
    config: WatcherConfig,
) {
    let Some(trade) = registry.get(&payment_id).await else {
        tracing::warn!(payment_id = %payment_id, "Watcher started for unknown trade");
        return;
    };

    tracing::info!(
        payment_id = %payment_id,
        user_wallet = %trade.user_wallet,
        fee_smallest_unit = trade.fee_smallest_unit,
        "Watching for payment"
    );

    let started = Instant::now();
    let created_ts = trade.created_at.timestamp();

    while started.elapsed() < config.timeout {
        match ledger.recent_transfers().await {
            Ok(transfers) => {
                // First match in the returned (descending-time) order wins;
                // no attempt to pick a "best" transfer.
                let matched = transfers
                    .iter()
                    .find(|tx| matches_payment(tx, &payment_address, &trade, created_ts));

                if let Some(tx) = matched {
                    handle_payment_detected(&registry, &messages, &settlement, &trade, &tx.hash)
                        .await;
                    return;
                }
            }
            Err(e) => {
                tracing::warn!(
                    payment_id = %payment_id,
                    error = %e,
                    "Ledger poll failed — retrying next tick"
                );
            }
        }

        sleep(config.poll_interval).await;
    }

    if registry.expire(&payment_id).await {
        counter!("copy_trades_expired_total").increment(1);
        tracing::info!(payment_id = %payment_id, "Payment request expired");
        messages
            .push(
                AGENT_NAME,
                format!("Your copy trade request `{payment_id}` has expired."),
            )
            .await;
    }
}

/// Does a transfer satisfy every payment criterion for this trade?
///
/// Recipient and sender compare case-insensitively, the amount must equal
/// the fee exactly, and the on-chain timestamp must be strictly after the
/// trade was created.
fn matches_payment(
    tx: &TokenTransfer,
    payment_address: &str,
    trade: &CopyTrade,
    created_ts: i64,
) -> bool {
    let Some(value) = tx.value_smallest_unit() else {
        return false;
    };
    let Some(timestamp) = tx.timestamp() else {
        return false;
    };

    tx.to.eq_ignore_ascii_case(payment_address)
        && tx.from.eq_ignore_ascii_case(&trade.user_wallet)
        && value == u128::from(trade.fee_smallest_unit)
        && timestamp > created_ts
}

async fn handle_payment_detected(
    registry: &TradeRegistry,
    messages: &MessageLog,
    settlement: &Arc<dyn Settlement>,
    trade: &CopyTrade,
    payment_tx_hash: &str,
) {
    match registry.complete(&trade.payment_id).await {
        Ok(true) => {}
        Ok(false) => {
            // Already completed; never settle twice.
            return;
        }
        Err(e) => {
            tracing::warn!(
                payment_id = %trade.payment_id,
                error = %e,
                "Payment detected but trade could not be completed"
            );
            return;
        }
    }

    counter!("copy_trades_completed_total").increment(1);
    tracing::info!(
        payment_id = %trade.payment_id,
        tx_hash = %payment_tx_hash,
        "Payment detected"
    );

    let short_hash = &payment_tx_hash[..10.min(payment_tx_hash.len())];
    let notice = match settlement.send_reward(&trade.user_wallet).await {
        Ok(reward_tx) => format!(
            "**Payment received.** Your fee for trade `{}` was confirmed in tx `{}...`. \
             I have sent you 1 mock {} token. Tx: `{}`",
            trade.payment_id, short_hash, trade.token_symbol, reward_tx
        ),
        Err(e) => {
            // The fee was genuinely paid; a failed reward transfer is
            // recorded but never reverts the completed status.
            let err = AgentError::from(e);
            tracing::error!(
                payment_id = %trade.payment_id,
                error = %err,
                "Reward settlement failed after confirmed payment"
            );
            format!(
                "**Payment received.** Your fee for trade `{}` was confirmed in tx `{}...`, \
                 but the reward transfer failed: {}",
                trade.payment_id, short_hash, err
            )
        }
    };

    messages.push(AGENT_NAME, notice).await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
