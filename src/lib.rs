pub mod agent;
pub mod api;
pub mod chains;
pub mod config;
pub mod errors;
pub mod etherscan;
pub mod fees;
pub mod intent;
pub mod llm;
pub mod metrics;
pub mod models;
pub mod oneinch;
pub mod services;
pub mod settlement;
pub mod store;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::llm::LlmClient;
use crate::oneinch::PortfolioClient;
use crate::services::payment_watcher::{LedgerQuery, WatcherConfig};
use crate::settlement::Settlement;
use crate::store::{AnalysisContext, MessageLog, TradeRegistry};

/// Name under which the agent writes to the message log.
pub const AGENT_NAME: &str = "copybot";

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub registry: TradeRegistry,
    pub messages: MessageLog,
    pub context: AnalysisContext,
    pub portfolio: Arc<PortfolioClient>,
    pub llm: Arc<LlmClient>,
    pub ledger: Arc<dyn LedgerQuery>,
    pub settlement: Arc<dyn Settlement>,
    pub watcher_config: WatcherConfig,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
