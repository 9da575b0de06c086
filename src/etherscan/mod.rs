use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::chains::AMOY_CHAIN_ID;
use crate::services::payment_watcher::LedgerQuery;

/// Etherscan V2 universal API endpoint, routed by `chainid`.
const ETHERSCAN_V2_API: &str = "https://api.etherscan.io/v2/api";

/// USDC contract on Polygon Amoy.
pub const AMOY_USDC_CONTRACT: &str = "0x41E94Eb019C0762f9Bfcf9Fb1E58725BfB0e7582";

/// How many of the most recent transfers to fetch per poll.
const TRANSFER_PAGE_SIZE: u32 = 10;

/// Timeout for explorer calls, bounded so a hung request cannot block a
/// watcher's poll slot indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum EtherscanError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// One ERC-20 transfer event as reported by the explorer. All numeric
/// fields arrive as decimal strings.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenTransfer {
    pub from: String,
    pub to: String,
    pub value: String,
    #[serde(rename = "timeStamp")]
    pub time_stamp: String,
    pub hash: String,
}

impl TokenTransfer {
    pub fn value_smallest_unit(&self) -> Option<u128> {
        self.value.parse().ok()
    }

    pub fn timestamp(&self) -> Option<i64> {
        self.time_stamp.parse().ok()
    }
}

#[derive(Debug, Deserialize)]
struct TokenTxResponse {
    status: String,
    #[serde(default)]
    result: serde_json::Value,
}

/// Client for the token-transfer listing used by payment watchers.
///
/// Scoped at construction to one chain, one token contract and one
/// receiving account; every query returns the newest transfers first.
#[derive(Debug, Clone)]
pub struct EtherscanClient {
    http: Client,
    base_url: String,
    api_key: String,
    chain_id: u64,
    contract_address: String,
    account: String,
}

impl EtherscanClient {
    pub fn new(http: Client, api_key: String, account: String) -> Self {
        Self {
            http,
            base_url: ETHERSCAN_V2_API.into(),
            api_key,
            chain_id: AMOY_CHAIN_ID,
            contract_address: AMOY_USDC_CONTRACT.into(),
            account,
        }
    }

    /// Fetch the most recent token transfers touching the watched account,
    /// newest first. A `status != "1"` reply means no transfers were found
    /// and yields an empty list; a payload that fails to decode is an error.
    pub async fn token_transfers(&self) -> Result<Vec<TokenTransfer>, EtherscanError> {
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[
                ("chainid", self.chain_id.to_string()),
                ("module", "account".into()),
                ("action", "tokentx".into()),
                ("contractaddress", self.contract_address.clone()),
                ("address", self.account.clone()),
                ("page", "1".into()),
                ("offset", TRANSFER_PAGE_SIZE.to_string()),
                ("startblock", "0".into()),
                ("endblock", "99999999".into()),
                ("sort", "desc".into()),
                ("apikey", self.api_key.clone()),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let body: TokenTxResponse = resp.json().await?;

        if body.status != "1" {
            // "No transactions found" and throttle replies both come back
            // with status "0"; treat them as an empty page and let the
            // watcher retry on its next tick.
            return Ok(Vec::new());
        }

        serde_json::from_value(body.result).map_err(|e| EtherscanError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl LedgerQuery for EtherscanClient {
    async fn recent_transfers(&self) -> Result<Vec<TokenTransfer>, EtherscanError> {
        self.token_transfers().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_fields_parse() {
        let tx = TokenTransfer {
            from: "0xABC".into(),
            to: "0xDEF".into(),
            value: "10000".into(),
            time_stamp: "1700000000".into(),
            hash: "0x1234".into(),
        };
        assert_eq!(tx.value_smallest_unit(), Some(10_000));
        assert_eq!(tx.timestamp(), Some(1_700_000_000));
    }

    #[test]
    fn garbage_numeric_fields_parse_to_none() {
        let tx = TokenTransfer {
            from: String::new(),
            to: String::new(),
            value: "not-a-number".into(),
            time_stamp: "".into(),
            hash: String::new(),
        };
        assert_eq!(tx.value_smallest_unit(), None);
        assert_eq!(tx.timestamp(), None);
    }

    #[test]
    fn no_transactions_reply_is_empty_page() {
        let body: TokenTxResponse = serde_json::from_str(
            r#"{"status":"0","message":"No transactions found","result":[]}"#,
        )
        .unwrap();
        assert_eq!(body.status, "0");
    }
}
