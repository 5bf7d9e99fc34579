mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod routes;
mod scouting;
mod state;
mod workbook;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::scouting::generator::LlmDrafter;
use crate::scouting::jobs::BatchJobs;
use crate::scouting::match_scoring::HeuristicScorer;
use crate::state::AppState;
use crate::workbook::PgWorkbook;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Scout API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL-backed workbook
    let pool = create_pool(&config.database_url).await?;
    ensure_schema(&pool).await?;
    let workbook = Arc::new(PgWorkbook::new(pool));

    // Initialize LLM client
    let llm = LlmClient::new(
        config.llm_api_url.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )?;
    info!("LLM client initialized (endpoint: {})", llm.api_url());

    let state = AppState {
        workbook,
        scorer: Arc::new(HeuristicScorer),
        drafter: Arc::new(LlmDrafter::new(llm)),
        jobs: BatchJobs::new(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
