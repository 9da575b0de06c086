use std::sync::Arc;

use copybot::api::router::create_router;
use copybot::config::AppConfig;
use copybot::etherscan::EtherscanClient;
use copybot::llm::LlmClient;
use copybot::oneinch::PortfolioClient;
use copybot::services::payment_watcher::WatcherConfig;
use copybot::settlement::ChainSettler;
use copybot::store::{AnalysisContext, MessageLog, TradeRegistry};
use copybot::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    let http = reqwest::Client::new();

    let portfolio = Arc::new(PortfolioClient::new(http.clone(), &config.oneinch_proxy_url));
    let llm = Arc::new(LlmClient::new(
        http.clone(),
        config.asi_url.clone(),
        config.asi_api_key.clone(),
    ));
    let ledger = Arc::new(EtherscanClient::new(
        http,
        config.etherscan_api_key.clone(),
        config.payment_address.clone(),
    ));
    let settlement = Arc::new(ChainSettler::new(
        &config.amoy_rpc_url,
        &config.agent_private_key,
    )?);

    if !llm.has_api_key() {
        tracing::warn!("No ASI_ONE_API_KEY — analyses will not be summarized");
    }
    tracing::info!(
        payment_address = %config.payment_address,
        "Copy-trade payment detection configured"
    );

    let metrics_handle = copybot::metrics::init_metrics();

    let state = AppState {
        config,
        registry: TradeRegistry::new(),
        messages: MessageLog::new(),
        context: AnalysisContext::new(),
        portfolio,
        llm,
        ledger,
        settlement,
        watcher_config: WatcherConfig::default(),
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
