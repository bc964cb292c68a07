//! SDKGen API /v1: REST endpoints over the generation pipeline.
pub mod config;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod middleware;

pub use config::{ConfigError, ServiceConfig};
pub use logging::LogFormat;
pub use metrics::Metrics;

use axum::routing::{get, post};
use axum::Router;
use sdkgen_core::GenerationOrchestrator;
use sdkgen_events::{sink_for, DecisionClient, EventSink};
use sdkgen_pipeline::PipelineHandler;
use sdkgen_templates::TemplateOrchestrator;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

/// Shared by every request. Nothing here is mutated per request.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<PipelineHandler>,
    pub metrics: Arc<Metrics>,
    pub execution_budget: Option<Duration>,
    pub sink_name: &'static str,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<dyn GenerationOrchestrator>,
        sink: Arc<dyn EventSink>,
        config: &ServiceConfig,
    ) -> Result<Self, prometheus::Error> {
        let sink_name = sink.name();
        Ok(Self {
            pipeline: Arc::new(
                PipelineHandler::new(orchestrator, sink).with_config(config.pipeline_config()),
            ),
            metrics: Arc::new(Metrics::new()?),
            execution_budget: config.execution_budget(),
            sink_name,
        })
    }

    /// Production wiring: template orchestrator plus the configured event sink.
    pub fn from_config(config: &ServiceConfig) -> anyhow::Result<Self> {
        let orchestrator = Arc::new(TemplateOrchestrator::new()?);
        let sink: Arc<dyn EventSink> =
            Arc::from(sink_for(config.collector_url.as_deref(), config.collector_timeout())?);
        Ok(Self::new(orchestrator, sink, config)?)
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/v1/generate", post(handlers::generate))
        .route("/v1/health", get(handlers::health))
        .route("/v1/languages", get(handlers::languages))
        .route("/metrics", get(handlers::metrics))
        .layer(axum::middleware::from_fn(middleware::agent_headers))
        .layer(middleware::cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Logs the collector's health. A failing probe never stops startup.
pub async fn probe_collector(config: &ServiceConfig) {
    let Some(url) = config.collector_url.as_deref() else {
        tracing::info!("no collector configured, decision events go to the log");
        return;
    };
    let client = match DecisionClient::new(url, config.collector_timeout()) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(collector = url, error = %e, "cannot build collector client");
            return;
        }
    };
    match client.ensure_healthy().await {
        Ok(status) => tracing::info!(collector = url, status = ?status, "collector reachable"),
        Err(e) => tracing::warn!(collector = url, error = %e, "collector health check failed"),
    }
}

pub async fn run(config: ServiceConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    probe_collector(&config).await;

    let app = create_app(AppState::from_config(&config)?);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(%addr, "SDKGen API listening");
    axum::serve(listener, app).await?;
    Ok(())
}
