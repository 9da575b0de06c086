use serde::{Deserialize, Serialize};

/// Token metadata returned by the 1inch token-search API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenInfo {
    pub address: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub decimals: Option<u32>,
}

/// Combined portfolio payload fed to the analyst prompt.
///
/// The aggregator responses are treated as opaque JSON interpreted by the
/// analyst model; only the PnL section is inspected locally for the
/// copy-trade suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioOverview {
    pub pnl: serde_json::Value,
    pub value: serde_json::Value,
    pub details: serde_json::Value,
    pub balances: serde_json::Value,
}
