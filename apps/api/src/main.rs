mod config;
mod errors;
mod hr;
mod intake;
mod llm_client;
mod matching;
mod models;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::intake::extract::OcrClient;
use crate::llm_client::LlmClient;
use crate::matching::ai_merge::{AiScorer, LlmAiScorer};
use crate::matching::registry::SkillProfileRegistry;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Recruit API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Redis (the key-value store for jobs and applications)
    let redis = redis::Client::open(config.redis_url.clone())?;
    info!("Redis client initialized");

    // Skill profile registry: built-in tracks, optionally extended from a file
    let registry = match &config.skill_profiles_path {
        Some(path) => SkillProfileRegistry::from_file(path)?,
        None => SkillProfileRegistry::with_defaults(),
    };
    info!(
        "Skill profile registry ready ({} templates)",
        registry.templates().len()
    );

    // Optional AI scorer (keyword-only when no API key is configured)
    let ai_scorer: Option<Arc<dyn AiScorer>> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone(), config.ai_scoring_timeout)?;
            info!(
                "AI scorer enabled (model: {}, timeout: {}s)",
                llm_client::MODEL,
                config.ai_scoring_timeout.as_secs()
            );
            let scorer: Arc<dyn AiScorer> = Arc::new(LlmAiScorer(llm));
            Some(scorer)
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; AI scoring disabled");
            None
        }
    };

    // Optional OCR collaborator for image resumes
    let ocr = match (&config.ocr_api_url, &config.ocr_api_key) {
        (Some(url), Some(key)) => {
            info!("OCR client initialized ({url})");
            Some(OcrClient::new(url.clone(), key.clone())?)
        }
        _ => {
            warn!("OCR_API_URL/OCR_API_KEY not set; image resumes will not be read");
            None
        }
    };

    // Build app state
    let state = AppState {
        store: Store::new(redis),
        config: config.clone(),
        registry: Arc::new(registry),
        ai_scorer,
        ocr,
        write_lock: Arc::new(Mutex::new(())),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the portal's origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
