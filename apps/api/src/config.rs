use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::llm_client::{deepseek, gemini};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    /// Shared secret every request must present in `x-api-key`.
    pub api_key: String,
    pub google_api_key: String,
    pub gemini_model: String,
    pub deepseek_api_key: String,
    pub deepseek_api_url: String,
    pub deepseek_model: String,
    pub token_usage_log_dir: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            app_name: optional_env("APP_NAME").unwrap_or_else(|| "CVParser".to_string()),
            api_key: require_env("X_API_KEY")?,
            google_api_key: require_env("GOOGLE_API_KEY")?,
            gemini_model: optional_env("GEMINI_MODEL")
                .unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string()),
            deepseek_api_key: require_env("DEEPSEEK_API_KEY")?,
            deepseek_api_url: optional_env("DEEPSEEK_API_URL")
                .unwrap_or_else(|| deepseek::DEFAULT_API_URL.to_string()),
            deepseek_model: optional_env("DEEPSEEK_MODEL")
                .unwrap_or_else(|| deepseek::DEFAULT_MODEL.to_string()),
            token_usage_log_dir: optional_env("TOKEN_USAGE_LOG_DIR").map(PathBuf::from),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "9001".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    optional_env(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Treats an empty variable the same as an unset one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
impl Config {
    /// Configuration for in-process tests; never reads the environment.
    pub fn for_tests(api_key: &str) -> Self {
        Config {
            app_name: "CVParser".to_string(),
            api_key: api_key.to_string(),
            google_api_key: "test-google-key".to_string(),
            gemini_model: gemini::DEFAULT_MODEL.to_string(),
            deepseek_api_key: "test-deepseek-key".to_string(),
            deepseek_api_url: deepseek::DEFAULT_API_URL.to_string(),
            deepseek_model: deepseek::DEFAULT_MODEL.to_string(),
            token_usage_log_dir: None,
            port: 0,
            rust_log: "info".to_string(),
        }
    }
}
