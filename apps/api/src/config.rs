use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub redis_url: String,
    /// AI scoring is disabled when unset.
    pub anthropic_api_key: Option<String>,
    pub ai_scoring_timeout: Duration,
    /// Image OCR is disabled unless both URL and key are set.
    pub ocr_api_url: Option<String>,
    pub ocr_api_key: Option<String>,
    pub skill_profiles_path: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            redis_url: require_env("REDIS_URL")?,
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            ai_scoring_timeout: Duration::from_secs(
                std::env::var("AI_SCORING_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "15".to_string())
                    .parse::<u64>()
                    .context("AI_SCORING_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            ocr_api_url: optional_env("OCR_API_URL"),
            ocr_api_key: optional_env("OCR_API_KEY"),
            skill_profiles_path: optional_env("SKILL_PROFILES_PATH").map(PathBuf::from),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
