use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_GATEWAY_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
///
/// The LLM key is optional at startup: without it every analysis request
/// fails with "AI service not configured" instead of the process refusing
/// to boot.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: Option<String>,
    pub llm_gateway_url: String,
    pub llm_model: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            llm_api_key: optional_env("LLM_API_KEY"),
            llm_gateway_url: optional_env("LLM_GATEWAY_URL")
                .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string()),
            llm_model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
