use crate::models::TradeStatus;

/// Domain error taxonomy for the copy-trade workflow.
///
/// These never surface as HTTP status codes; the chat boundary renders
/// every failure as prose. They drive internal handling: `UpstreamUnavailable`
/// is retried when it happens inside a payment watcher poll and aborts the
/// request when it happens during analysis; `SettlementFailed` is recorded
/// without reverting a completed trade.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("unknown payment id: {0}")]
    NotFound(String),

    #[error("trade {payment_id} is already {status}")]
    AlreadyTerminal {
        payment_id: String,
        status: TradeStatus,
    },

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("settlement failed: {0}")]
    SettlementFailed(String),
}

impl From<crate::oneinch::PortfolioClientError> for AgentError {
    fn from(e: crate::oneinch::PortfolioClientError) -> Self {
        AgentError::UpstreamUnavailable(e.to_string())
    }
}

impl From<crate::etherscan::EtherscanError> for AgentError {
    fn from(e: crate::etherscan::EtherscanError) -> Self {
        AgentError::UpstreamUnavailable(e.to_string())
    }
}

impl From<crate::llm::LlmError> for AgentError {
    fn from(e: crate::llm::LlmError) -> Self {
        AgentError::UpstreamUnavailable(e.to_string())
    }
}

impl From<crate::settlement::SettlementError> for AgentError {
    fn from(e: crate::settlement::SettlementError) -> Self {
        AgentError::SettlementFailed(e.to_string())
    }
}
