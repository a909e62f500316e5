//! Portfolio Advisor HTTP Server
//!
//! Axum-based server exposing the analysis and report pipeline.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use llm_core::{LlmProvider, TextCompletion};
use llm_runtime::{OllamaConfig, OllamaProvider, OpenAiConfig, OpenAiProvider};
use portfolio_advisor::{
    AdvisorConfig, LlmProviderKind, LlmSettings, OracleKind, PriceOracle, Recommender, ReportComposer, ReportPipeline,
    StaticPriceOracle, SymbolResolver, YahooPriceOracle, report::PageLayout,
};

use crate::handlers::{analysis_handler, health_check, report_handler, resolve_symbol_handler};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();
    let config = AdvisorConfig::from_env()?;

    // Initialize LLM provider
    let provider = build_provider(&config.llm)?;
    let info = provider.info();
    match provider.health_check().await {
        Ok(true) => tracing::info!("✓ Connected to {} (model {})", info.name, info.default_model),
        Ok(false) | Err(_) => tracing::warn!("⚠ {} not reachable - recommendations will fail", info.name),
    }

    // Initialize price oracle
    let oracle: Arc<dyn PriceOracle> = match config.prices.oracle {
        OracleKind::Yahoo => Arc::new(YahooPriceOracle::new(config.prices.timeout())?),
        OracleKind::Static => {
            tracing::warn!("Using static demo prices");
            Arc::new(StaticPriceOracle::demo())
        }
    };
    tracing::info!(
        oracle = oracle.name(),
        policy = ?config.prices.policy,
        concurrency = config.prices.concurrency,
        "Price oracle ready"
    );

    // Build pipeline
    let completion = TextCompletion::with_default_model(provider.clone(), config.llm.timeout());
    let pipeline = ReportPipeline::new(
        oracle,
        Recommender::new(completion.clone()),
        ReportComposer::new(completion.clone(), PageLayout::default()),
        config.prices.pipeline_config(),
    );

    let state = AppState {
        provider,
        pipeline: Arc::new(pipeline),
        resolver: Arc::new(SymbolResolver::new(completion)),
    };

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;

    tracing::info!("🚀 portfolio advisor running on http://{}", config.server.bind_addr);
    tracing::info!("  GET  /health              - Health check");
    tracing::info!("  POST /api/analysis        - Price and analyze holdings");
    tracing::info!("  POST /api/report          - Generate PDF report");
    tracing::info!("  POST /api/resolve-symbol  - Company name to ticker");

    axum::serve(listener, app(state)).await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/analysis", post(analysis_handler))
        .route("/api/report", post(report_handler))
        .route("/api/resolve-symbol", post(resolve_symbol_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_provider(settings: &LlmSettings) -> anyhow::Result<Arc<dyn LlmProvider>> {
    let timeout_secs = settings.timeout_secs;
    let provider: Arc<dyn LlmProvider> = match settings.provider {
        LlmProviderKind::OpenAi => {
            let mut config = OpenAiConfig::new(settings.api_key.clone().unwrap_or_default());
            if let Some(base_url) = &settings.base_url {
                config.base_url.clone_from(base_url);
            }
            if let Some(model) = &settings.model {
                config.default_model.clone_from(model);
            }
            config.timeout_secs = timeout_secs;
            Arc::new(OpenAiProvider::from_config(config)?)
        }
        LlmProviderKind::Ollama => {
            let mut config = OllamaConfig {
                host: settings.ollama_host.clone(),
                port: settings.ollama_port,
                timeout_secs,
                ..OllamaConfig::default()
            };
            if let Some(model) = &settings.model {
                config.default_model.clone_from(model);
            }
            Arc::new(OllamaProvider::from_config(config)?)
        }
    };
    Ok(provider)
}
