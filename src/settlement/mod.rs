use async_trait::async_trait;
use thiserror::Error;

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use alloy::sol;

use crate::chains::AMOY_CHAIN_ID;

/// Mock reward token contract on Polygon Amoy.
pub const MOCK_TOKEN_ADDRESS: &str = "0x33432627F302E9C6a3f62ACf7CB581AD57E109dB";

/// Default Amoy RPC endpoint.
pub const DEFAULT_AMOY_RPC_URL: &str = "https://rpc-amoy.polygon.technology";

/// Reward amount: 1 token at 18 decimals.
const REWARD_AMOUNT_WEI: u128 = 1_000_000_000_000_000_000;

/// Gas limit for the reward transfer.
const REWARD_GAS_LIMIT: u64 = 70_000;

sol! {
    #[sol(rpc)]
    interface IMockToken {
        function transfer(address to, uint256 value) external returns (bool);
    }
}

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("invalid recipient address: {0}")]
    InvalidAddress(String),

    #[error("transfer failed: {0}")]
    Transfer(String),
}

/// Reward settlement seam. Invoked exactly once per trade, by the watcher
/// that detected the matching payment.
#[async_trait]
pub trait Settlement: Send + Sync {
    /// Send the fixed reward amount to `user_wallet`, returning the
    /// transaction hash.
    async fn send_reward(&self, user_wallet: &str) -> Result<String, SettlementError>;
}

/// On-chain settlement against the mock reward contract, signed with the
/// service's own key. Gas price and nonce come from the provider; the gas
/// limit is fixed.
pub struct ChainSettler {
    provider: DynProvider,
    token: Address,
}

impl ChainSettler {
    pub fn new(rpc_url: &str, private_key: &str) -> anyhow::Result<Self> {
        let signer: PrivateKeySigner = private_key
            .parse::<PrivateKeySigner>()?
            .with_chain_id(Some(AMOY_CHAIN_ID));
        let wallet = EthereumWallet::from(signer);

        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(rpc_url.parse()?)
            .erased();

        let token: Address = MOCK_TOKEN_ADDRESS.to_lowercase().parse()?;

        Ok(Self { provider, token })
    }
}

#[async_trait]
impl Settlement for ChainSettler {
    async fn send_reward(&self, user_wallet: &str) -> Result<String, SettlementError> {
        // Lowercase before parsing so mixed-case input is not rejected by
        // checksum validation.
        let to: Address = user_wallet
            .to_lowercase()
            .parse()
            .map_err(|_| SettlementError::InvalidAddress(user_wallet.to_string()))?;

        let token = IMockToken::new(self.token, self.provider.clone());
        let pending = token
            .transfer(to, U256::from(REWARD_AMOUNT_WEI))
            .gas(REWARD_GAS_LIMIT)
            .send()
            .await
            .map_err(|e| SettlementError::Transfer(e.to_string()))?;

        let tx_hash = format!("{:#x}", pending.tx_hash());
        tracing::info!(tx_hash = %tx_hash, to = %user_wallet, "Reward transfer sent");
        Ok(tx_hash)
    }
}
