mod auth;
mod config;
mod errors;
mod extraction;
mod llm_client;
mod recommendation;
mod routes;
mod state;
mod validation;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::deepseek::DeepSeekBackend;
use crate::llm_client::gemini::GeminiBackend;
use crate::llm_client::usage_log::UsageLog;
use crate::llm_client::{GenerationClient, GenerationOptions, REQUEST_TIMEOUT_SECS};
use crate::routes::build_router;
use crate::state::AppState;

/// Output budget and temperature for full-document extraction.
const EXTRACTION_OPTIONS: GenerationOptions = GenerationOptions {
    max_tokens: 4096,
    temperature: 0.0,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting {} API v{}", config.app_name, env!("CARGO_PKG_VERSION"));

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .context("Failed to build HTTP client")?;

    // Recommendations go to DeepSeek
    let generator = GenerationClient::new(Arc::new(DeepSeekBackend::new(
        http.clone(),
        &config.deepseek_api_url,
        config.deepseek_api_key.clone(),
        config.deepseek_model.clone(),
    )));
    info!("Generation client initialized (model: {})", generator.model());

    // Full-document extraction goes to Gemini
    let extractor = GenerationClient::new(Arc::new(GeminiBackend::new(
        http,
        config.google_api_key.clone(),
        config.gemini_model.clone(),
    )))
    .with_options(EXTRACTION_OPTIONS);
    info!("Extraction client initialized (model: {})", extractor.model());

    let usage_log = UsageLog::new(config.token_usage_log_dir.clone());
    match usage_log.file_path() {
        Some(path) => info!("Token usage log: {}", path.display()),
        None => info!("Token usage log: tracing only"),
    }

    let state = AppState {
        config: config.clone(),
        generator,
        extractor,
        usage_log,
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()), // TODO: restrict CORS origins once the frontend host is fixed
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
