use metrics::counter;

use crate::chains::{chain_id_for_name, supported_chain_names};
use crate::errors::AgentError;
use crate::intent::chain_name_fallback;
use crate::llm::LlmClient;
use crate::oneinch::PortfolioOverview;
use crate::AppState;

/// Upper bound on the serialized portfolio payload embedded in the analyst
/// prompt.
const ANALYST_PAYLOAD_LIMIT: usize = 12_000;

/// Stablecoins excluded from performer rankings.
const STABLECOINS: &[&str] = &["usdc", "usdt", "dai"];

/// Run the portfolio analysis flow: resolve the chain, fan out the four
/// aggregator calls, store the analysis context and summarize via the LLM.
///
/// Partial failure of any aggregator call fails the whole analysis.
pub async fn handle_analysis(state: &AppState, original_message: &str, wallet: &str) -> String {
    let chain_name = resolve_chain(&state.llm, original_message).await;
    let Some(chain_id) = chain_id_for_name(&chain_name) else {
        return format!("Sorry, '{chain_name}' is not a supported chain.");
    };

    tracing::info!(wallet, chain = %chain_name, chain_id, "Analyzing wallet");
    counter!("analyses_total").increment(1);

    let wallets = [wallet];
    let joined = tokio::try_join!(
        state.portfolio.erc20_pnl(&wallets, chain_id),
        state.portfolio.current_value(&wallets, chain_id),
        state.portfolio.token_details(&wallets, chain_id),
        state.portfolio.token_balances(wallet, chain_id),
    );

    let (pnl, value, details, balances) = match joined {
        Ok(data) => data,
        Err(e) => {
            let err = AgentError::from(e);
            tracing::error!(error = %err, wallet, "Portfolio fetch failed — aborting analysis");
            return "Error fetching portfolio data from 1inch. Please try again later.".into();
        }
    };

    state.context.store(chain_id, &chain_name).await;

    let overview = PortfolioOverview {
        pnl,
        value,
        details,
        balances,
    };
    summarize(state, wallet, &chain_name, &overview).await
}

/// Resolve the chain named in the message: LLM first, regex fallback,
/// "ethereum" as the default.
async fn resolve_chain(llm: &LlmClient, message: &str) -> String {
    if llm.has_api_key() {
        let chains = supported_chain_names().join(", ");
        let prompt = format!(
            "From the user's request, identify the blockchain network. \
             The request is: \"{message}\"\n\
             Choose ONLY from the following list: {chains}. \
             Default to \"ethereum\" if unsure. Return ONLY the chain name."
        );
        match llm.complete(&prompt, 0.0).await {
            Ok(choice) => {
                let choice = choice.trim().to_lowercase();
                if chain_id_for_name(&choice).is_some() {
                    return choice;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Chain resolution via LLM failed — using regex fallback");
            }
        }
    }

    if let Some(name) = chain_name_fallback(message) {
        if chain_id_for_name(&name).is_some() {
            return name;
        }
    }

    "ethereum".into()
}

async fn summarize(
    state: &AppState,
    wallet: &str,
    chain_name: &str,
    overview: &PortfolioOverview,
) -> String {
    if !state.llm.has_api_key() {
        return "ASI:One API key not configured — portfolio data was fetched but cannot be \
                summarized."
            .into();
    }

    let suggestion = top_performer_suggestion(&overview.pnl).unwrap_or_default();

    let mut payload = serde_json::to_string(overview).unwrap_or_default();
    if payload.len() > ANALYST_PAYLOAD_LIMIT {
        truncate_at_char_boundary(&mut payload, ANALYST_PAYLOAD_LIMIT);
        payload.push_str("... (data truncated)");
    }

    let prompt = analyst_prompt(wallet, chain_name, &payload);
    match state.llm.complete(&prompt, 0.2).await {
        Ok(summary) => format!("{summary}{suggestion}"),
        Err(e) => format!("Error analyzing data with LLM: {e}"),
    }
}

/// Pick the strongest non-stablecoin performer out of the raw PnL payload.
/// Returns a ready-to-append suggestion block, or `None` when no token has
/// positive PnL.
fn top_performer_suggestion(pnl: &serde_json::Value) -> Option<String> {
    let tokens = pnl.get("erc20")?.as_array()?;

    let top = tokens
        .iter()
        .filter_map(|token| {
            let symbol = token.get("symbol")?.as_str()?;
            let pnl_usd = token.get("pnl_usd")?.as_f64()?;
            if STABLECOINS.contains(&symbol.to_lowercase().as_str()) {
                return None;
            }
            Some((symbol, pnl_usd))
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))?;

    if top.1 <= 0.0 {
        return None;
    }

    Some(format!(
        "\n\n---\n**Copy Trade Suggestion**\n\
         This wallet's top performer is **{symbol}**.\n\
         To copy this trade, type: `copytrade {symbol} with address YOUR_WALLET_ADDRESS`",
        symbol = top.0
    ))
}

fn analyst_prompt(wallet: &str, chain_name: &str, payload: &str) -> String {
    format!(
        "You are an expert DeFi portfolio analyst. Interpret the combined data from the \
         1inch Portfolio and Balance APIs for a user's wallet and provide a clear, concise, \
         actionable summary.\n\n\
         USER'S WALLET: {wallet}\n\
         CHAIN: {chain_name}\n\n\
         RAW 1inch PORTFOLIO & BALANCE DATA (JSON):\n{payload}\n\n\
         ANALYSIS INSTRUCTIONS:\n\
         1. Use `balances` for current holdings and `pnl` for historical performance.\n\
         2. A token with a zero balance is a past trade; do not list it under current holdings.\n\
         3. Start with total portfolio value and PnL, explaining that PnL mixes realized and \
         unrealized gains.\n\
         4. Do not list USDC, USDT or DAI as top performers or underperformers.\n\
         5. Structure the answer as \"Top Performers (Currently Held)\", \
         \"Top Underperformers (Currently Held)\" and \
         \"Successful Past Trades (Realized Gains)\".\n\
         6. Base trade insights on the most significant positions.\n\n\
         Provide your analysis based on the data."
    )
}

/// Truncate in place to at most `limit` bytes without splitting a UTF-8
/// character.
fn truncate_at_char_boundary(s: &mut String, limit: usize) {
    let mut end = limit.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn suggestion_names_best_non_stablecoin() {
        let pnl = json!({
            "erc20": [
                {"symbol": "USDC", "pnl_usd": 900.0},
                {"symbol": "PEPE", "pnl_usd": 120.5},
                {"symbol": "LINK", "pnl_usd": 80.0},
            ]
        });
        let text = top_performer_suggestion(&pnl).unwrap();
        assert!(text.contains("**PEPE**"));
        assert!(text.contains("copytrade PEPE with address"));
    }

    #[test]
    fn no_suggestion_without_positive_pnl() {
        let pnl = json!({
            "erc20": [
                {"symbol": "PEPE", "pnl_usd": -12.0},
            ]
        });
        assert!(top_performer_suggestion(&pnl).is_none());
    }

    #[test]
    fn no_suggestion_on_malformed_payload() {
        assert!(top_performer_suggestion(&json!({"error": "nope"})).is_none());
        assert!(top_performer_suggestion(&json!(null)).is_none());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let mut s = "héllo wörld".to_string();
        truncate_at_char_boundary(&mut s, 2);
        assert_eq!(s, "h");

        let mut s = "plain ascii".to_string();
        truncate_at_char_boundary(&mut s, 5);
        assert_eq!(s, "plain");
    }
}
