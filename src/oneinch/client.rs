use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

use super::types::TokenInfo;

/// Timeout for aggregator calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum PortfolioClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// Client for the 1inch Portfolio, Balance, Price and Token APIs, reached
/// through a configured proxy that injects authentication.
#[derive(Debug, Clone)]
pub struct PortfolioClient {
    http: Client,
    portfolio_base: String,
    balance_base: String,
    price_base: String,
    token_base: String,
}

impl PortfolioClient {
    pub fn new(http: Client, proxy_url: &str) -> Self {
        let proxy_url = proxy_url.trim_end_matches('/');
        Self {
            http,
            portfolio_base: format!("{proxy_url}/portfolio/portfolio/v4"),
            balance_base: format!("{proxy_url}/balance/v1.2"),
            price_base: format!("{proxy_url}/price"),
            token_base: format!("{proxy_url}/token"),
        }
    }

    async fn overview(
        &self,
        endpoint: &str,
        addresses: &[&str],
        chain_id: u64,
    ) -> Result<serde_json::Value, PortfolioClientError> {
        let url = format!("{}{endpoint}", self.portfolio_base);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("addresses", addresses.join(",")),
                ("chain_id", chain_id.to_string()),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        Ok(resp.json().await?)
    }

    /// Historical ERC-20 profit and loss for a set of wallets.
    pub async fn erc20_pnl(
        &self,
        addresses: &[&str],
        chain_id: u64,
    ) -> Result<serde_json::Value, PortfolioClientError> {
        self.overview("/overview/erc20/profit_and_loss", addresses, chain_id)
            .await
    }

    /// Current ERC-20 portfolio value for a set of wallets.
    pub async fn current_value(
        &self,
        addresses: &[&str],
        chain_id: u64,
    ) -> Result<serde_json::Value, PortfolioClientError> {
        self.overview("/overview/erc20/current_value", addresses, chain_id)
            .await
    }

    /// Per-token detail rows for a set of wallets.
    pub async fn token_details(
        &self,
        addresses: &[&str],
        chain_id: u64,
    ) -> Result<serde_json::Value, PortfolioClientError> {
        self.overview("/overview/erc20/details", addresses, chain_id)
            .await
    }

    /// Raw token balances for a single wallet.
    pub async fn token_balances(
        &self,
        address: &str,
        chain_id: u64,
    ) -> Result<serde_json::Value, PortfolioClientError> {
        let url = format!("{}/{chain_id}/balances/{address}", self.balance_base);
        let resp = self
            .http
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        Ok(resp.json().await?)
    }

    /// Best-effort symbol match on a chain. Prefers an exact symbol match
    /// over the ranking returned by the API, falling back to the first
    /// result when no exact match exists.
    pub async fn search_token(
        &self,
        chain_id: u64,
        query: &str,
    ) -> Result<Option<TokenInfo>, PortfolioClientError> {
        let url = format!("{}/v1.4/{chain_id}/search", self.token_base);
        let resp = self
            .http
            .get(&url)
            .query(&[("query", query), ("limit", "5")])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let results: Vec<TokenInfo> = resp.json().await?;

        let exact = results
            .iter()
            .find(|token| token.symbol.eq_ignore_ascii_case(query))
            .cloned();
        Ok(exact.or_else(|| results.into_iter().next()))
    }

    /// Price of `token_address` in USD, derived from the spot-price API by
    /// dividing the token's native-denominated price by USDC's.
    pub async fn token_price_usd(
        &self,
        token_address: &str,
        chain_id: u64,
        usdc_address: &str,
    ) -> Result<f64, PortfolioClientError> {
        let url = format!(
            "{}/v1.1/{chain_id}/{token_address},{usdc_address}",
            self.price_base
        );
        let resp = self
            .http
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let prices: serde_json::Value = resp.json().await?;

        let native_price = |address: &str| -> Option<f64> {
            prices
                .get(address.to_lowercase())
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse::<f64>().ok())
        };

        let token_native = native_price(token_address);
        let usdc_native = native_price(usdc_address);

        match (token_native, usdc_native) {
            (Some(token), Some(usdc)) if usdc > 0.0 => Ok(token / usdc),
            _ => Err(PortfolioClientError::Unexpected(
                "missing price for token or USDC".into(),
            )),
        }
    }
}
