use std::env;

use crate::llm::DEFAULT_ASI_URL;
use crate::settlement::DEFAULT_AMOY_RPC_URL;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    /// Proxy in front of the 1inch APIs (injects authentication).
    pub oneinch_proxy_url: String,

    /// ASI:One chat completions. Analysis degrades to a configuration
    /// notice when the key is absent.
    pub asi_api_key: Option<String>,
    pub asi_url: String,

    /// Address that receives copy-trade fee payments.
    pub payment_address: String,
    /// Key used to sign reward settlement transfers.
    pub agent_private_key: String,
    /// Etherscan V2 API key for the payment-watch ledger queries.
    pub etherscan_api_key: String,
    pub amoy_rpc_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT").unwrap_or_else(|_| "8100".into()).parse()?,

            oneinch_proxy_url: env::var("ONEINCH_PROXY_URL")
                .map_err(|_| anyhow::anyhow!("ONEINCH_PROXY_URL must be set"))?,

            asi_api_key: env::var("ASI_ONE_API_KEY").ok(),
            asi_url: env::var("ASI_ONE_URL").unwrap_or_else(|_| DEFAULT_ASI_URL.into()),

            payment_address: env::var("PAYMENT_ADDRESS")
                .map_err(|_| anyhow::anyhow!("PAYMENT_ADDRESS must be set"))?,
            agent_private_key: env::var("AGENT_PRIVATE_KEY")
                .map_err(|_| anyhow::anyhow!("AGENT_PRIVATE_KEY must be set"))?,
            etherscan_api_key: env::var("ETHERSCAN_API_KEY")
                .map_err(|_| anyhow::anyhow!("ETHERSCAN_API_KEY must be set"))?,
            amoy_rpc_url: env::var("AMOY_RPC_URL")
                .unwrap_or_else(|_| DEFAULT_AMOY_RPC_URL.into()),
        })
    }
}
