use metrics::counter;

use crate::chains::{usdc_address, DEFAULT_CHAIN_ID, DEFAULT_CHAIN_NAME};
use crate::errors::AgentError;
use crate::fees::copy_trade_fee;
use crate::services::payment_watcher::watch_for_payment;
use crate::AppState;

/// Run the copy-trade initiation flow: locate the token, derive the fee,
/// register the trade and spawn its payment watcher.
///
/// The watcher is detached: this handler returns as soon as the trade is
/// registered, and the watcher reports through the registry and message log.
pub async fn handle_copy_trade(
    state: &AppState,
    token_symbol: &str,
    user_wallet: &str,
    volume_usd: Option<f64>,
) -> String {
    // A fresh analysis context supplies the chain; an explicitly supplied
    // wallet is always accepted, falling back to the default chain when no
    // recent analysis exists.
    let (chain_id, chain_name) = match state.context.fresh().await {
        Some(ctx) => {
            tracing::info!(
                chain = %ctx.chain_name,
                chain_id = ctx.chain_id,
                "Using analysis context for copy trade"
            );
            (ctx.chain_id, ctx.chain_name)
        }
        None => (DEFAULT_CHAIN_ID, DEFAULT_CHAIN_NAME.to_string()),
    };

    let token = match state.portfolio.search_token(chain_id, token_symbol).await {
        Ok(Some(token)) => token,
        Ok(None) => {
            return format!(
                "Sorry, I couldn't find a contract address for '{token_symbol}' on \
                 {chain_name} using the token API."
            );
        }
        Err(e) => {
            let err = AgentError::from(e);
            tracing::error!(error = %err, token_symbol, "Token search failed");
            return format!(
                "Error looking up '{token_symbol}' on {chain_name}. Please try again later."
            );
        }
    };

    tracing::info!(
        token_symbol,
        token_address = %token.address,
        chain = %chain_name,
        "Resolved token for copy trade"
    );

    let Some(usdc) = usdc_address(chain_id) else {
        return format!("Sorry, I don't have the USDC address for {chain_name} to check the price.");
    };

    let amount_usd = match volume_usd {
        Some(volume) => volume,
        None => match state
            .portfolio
            .token_price_usd(&token.address, chain_id, usdc)
            .await
        {
            Ok(price) => price,
            Err(e) => {
                let err = AgentError::from(e);
                tracing::warn!(error = %err, token_symbol, "Price lookup failed");
                return format!(
                    "Could not fetch the price for {token_symbol} on {chain_name}. \
                     Please try again."
                );
            }
        },
    };

    let fee = match copy_trade_fee(amount_usd) {
        Ok(fee) => fee,
        Err(e) => return format!("Cannot quote a fee for that trade: {e}."),
    };

    let trade = state
        .registry
        .create(token_symbol, user_wallet, fee.smallest_unit)
        .await;
    counter!("copy_trades_created_total").increment(1);

    tokio::spawn(watch_for_payment(
        state.registry.clone(),
        state.messages.clone(),
        state.ledger.clone(),
        state.settlement.clone(),
        state.config.payment_address.clone(),
        trade.payment_id.clone(),
        state.watcher_config,
    ));

    let trade_size = match volume_usd {
        Some(volume) => format!("{volume:.2} USD"),
        None => "1 token".into(),
    };

    format!(
        "**Copy Trade Initiated**\n\
         **Mock Trade:** {trade_size} of {token_symbol}\n\
         **Service Fee:** {fee_usd:.4} USDC\n\
         **Payment ID:** `{payment_id}`\n\n\
         I am now watching for a payment of **{fee_usd:.4} USDC** from your address \
         `{user_wallet}` to my address `{payment_address}` on **Polygon Amoy**. \
         Please send the funds to proceed. This request will expire in 5 minutes.",
        fee_usd = fee.usd,
        payment_id = trade.payment_id,
        payment_address = state.config.payment_address,
    )
}
