pub mod analysis;
pub mod copy_trade;

use crate::intent::{parse_intent, ChatIntent};
use crate::models::TradeStatus;
use crate::AppState;

/// Dispatch one inbound chat message to the matching flow and return the
/// prose reply. Every failure path resolves to a short textual response;
/// there is no error-code surface at the chat boundary.
pub async fn handle_message(state: &AppState, message: &str) -> String {
    match parse_intent(message) {
        ChatIntent::Analyze { wallet } => analysis::handle_analysis(state, message, &wallet).await,
        ChatIntent::CopyTrade {
            token_symbol,
            user_wallet,
            volume_usd,
        } => copy_trade::handle_copy_trade(state, &token_symbol, &user_wallet, volume_usd).await,
        ChatIntent::TradeStatus { payment_id } => handle_status(state, &payment_id).await,
        ChatIntent::Unknown => "Sorry, I didn't understand. Try 'analyze {address} on {chain}' \
            or 'copytrade {TOKEN} with address {YOUR_ADDRESS}'."
            .into(),
    }
}

/// Status query against the registry. Reading a completed trade reports it
/// as done; it never re-triggers settlement.
async fn handle_status(state: &AppState, payment_id: &str) -> String {
    match state.registry.get(payment_id).await {
        Some(trade) => match trade.status {
            TradeStatus::Watching => format!(
                "Trade `{payment_id}` is waiting for your payment of {:.4} USDC. \
                 It expires 5 minutes after creation.",
                trade.fee_usd()
            ),
            TradeStatus::Completed => format!(
                "Trade `{payment_id}` is completed — your payment was received and \
                 the reward token was sent to `{}`.",
                trade.user_wallet
            ),
            TradeStatus::Expired => format!("Trade `{payment_id}` has expired."),
        },
        None => format!(
            "I don't have a trade with payment id `{payment_id}`. It may have expired."
        ),
    }
}
