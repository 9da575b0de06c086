use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tokio::sync::Mutex;

use copybot::config::AppConfig;
use copybot::etherscan::{EtherscanError, TokenTransfer};
use copybot::llm::LlmClient;
use copybot::oneinch::PortfolioClient;
use copybot::services::payment_watcher::{LedgerQuery, WatcherConfig};
use copybot::settlement::{Settlement, SettlementError};
use copybot::store::{AnalysisContext, MessageLog, TradeRegistry};
use copybot::AppState;

/// Service address used across tests.
#[allow(dead_code)]
pub const SERVICE_ADDRESS: &str = "0xAAAAaaaaAAAAaaaaAAAAaaaaAAAAaaaaAAAAaaaa";

/// Payer wallet used across tests.
#[allow(dead_code)]
pub const USER_WALLET: &str = "0xBBBBbbbbBBBBbbbbBBBBbbbbBBBBbbbbBBBBbbbb";

/// Ledger stub that replays a fixed script of poll results, then returns
/// empty pages forever.
pub struct ScriptedLedger {
    polls: Mutex<VecDeque<Result<Vec<TokenTransfer>, EtherscanError>>>,
}

impl ScriptedLedger {
    #[allow(dead_code)]
    pub fn new(polls: Vec<Result<Vec<TokenTransfer>, EtherscanError>>) -> Arc<Self> {
        Arc::new(Self {
            polls: Mutex::new(polls.into()),
        })
    }

    /// A ledger that never reports any transfers.
    #[allow(dead_code)]
    pub fn empty() -> Arc<Self> {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl LedgerQuery for ScriptedLedger {
    async fn recent_transfers(&self) -> Result<Vec<TokenTransfer>, EtherscanError> {
        self.polls
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Settlement stub that counts invocations and optionally fails.
pub struct RecordingSettlement {
    calls: AtomicUsize,
    fail: bool,
}

impl RecordingSettlement {
    #[allow(dead_code)]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: false,
        })
    }

    #[allow(dead_code)]
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: true,
        })
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Settlement for RecordingSettlement {
    async fn send_reward(&self, _user_wallet: &str) -> Result<String, SettlementError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(SettlementError::Transfer("rpc unreachable".into()))
        } else {
            Ok("0xreward00000000".into())
        }
    }
}

/// Build a transfer paying `value` from `from` to the service address.
#[allow(dead_code)]
pub fn transfer(from: &str, to: &str, value: u64, timestamp: i64) -> TokenTransfer {
    serde_json::from_value(serde_json::json!({
        "from": from,
        "to": to,
        "value": value.to_string(),
        "timeStamp": timestamp.to_string(),
        "hash": "0xfeedbeefcafe",
    }))
    .expect("valid transfer json")
}

// Only one Prometheus recorder can exist per process.
static METRICS: OnceLock<metrics_exporter_prometheus::PrometheusHandle> = OnceLock::new();

#[allow(dead_code)]
pub fn test_metrics_handle() -> metrics_exporter_prometheus::PrometheusHandle {
    METRICS.get_or_init(copybot::metrics::init_metrics).clone()
}

/// Minimal app state wired to scripted collaborators; no outbound calls are
/// made unless a test drives an analysis or token lookup.
#[allow(dead_code)]
pub fn build_test_state(
    ledger: Arc<ScriptedLedger>,
    settlement: Arc<RecordingSettlement>,
) -> AppState {
    let http = reqwest::Client::new();

    let config = AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        oneinch_proxy_url: "http://localhost:9".into(),
        asi_api_key: None,
        asi_url: "http://localhost:9".into(),
        payment_address: SERVICE_ADDRESS.into(),
        agent_private_key:
            "0x0000000000000000000000000000000000000000000000000000000000000001".into(),
        etherscan_api_key: "test-key".into(),
        amoy_rpc_url: "http://localhost:9".into(),
    };

    AppState {
        portfolio: Arc::new(PortfolioClient::new(http.clone(), &config.oneinch_proxy_url)),
        llm: Arc::new(LlmClient::new(http, config.asi_url.clone(), None)),
        config,
        registry: TradeRegistry::new(),
        messages: MessageLog::new(),
        context: AnalysisContext::new(),
        ledger,
        settlement,
        watcher_config: WatcherConfig::default(),
        metrics_handle: test_metrics_handle(),
    }
}
