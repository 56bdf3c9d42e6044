use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;
const DEFAULT_TEMPERATURE: f32 = 0.0;
const DEFAULT_MAX_TOKENS: u32 = 2000;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Application configuration loaded from environment variables.
/// Only `PORT` is validated strictly; other numeric settings fall back to defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// `.env`-style file consulted by the credential resolver.
    pub env_file: PathBuf,
    /// TOML secrets file consulted by the credential resolver.
    pub secrets_file: PathBuf,
    /// When set, only requests whose Host header ends with this suffix are served.
    pub allowed_host_suffix: Option<String>,
    pub default_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub openai_api_base: String,
    pub anthropic_api_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            env_file: PathBuf::from(".env"),
            secrets_file: PathBuf::from("secrets.toml"),
            allowed_host_suffix: None,
            default_model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            openai_api_base: crate::llm_client::openai::DEFAULT_API_BASE.to_string(),
            anthropic_api_base: crate::llm_client::anthropic::DEFAULT_API_BASE.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_env_vars()
    }

    fn from_env_vars() -> Result<Self> {
        let defaults = Self::default();

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            env_file: optional_env("ENV_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.env_file),
            secrets_file: optional_env("SECRETS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.secrets_file),
            allowed_host_suffix: optional_env("ALLOWED_HOST_SUFFIX"),
            default_model: optional_env("DEFAULT_MODEL").unwrap_or(defaults.default_model),
            temperature: optional_env("LLM_TEMPERATURE")
                .and_then(|t| t.parse::<f32>().ok())
                .filter(|t| (0.0..=1.0).contains(t))
                .unwrap_or(defaults.temperature),
            max_tokens: parsed_env("LLM_MAX_TOKENS")
                .filter(|t| *t > 0)
                .unwrap_or(defaults.max_tokens),
            request_timeout_secs: parsed_env("LLM_REQUEST_TIMEOUT")
                .unwrap_or(defaults.request_timeout_secs),
            max_upload_bytes: parsed_env("MAX_UPLOAD_BYTES").unwrap_or(defaults.max_upload_bytes),
            openai_api_base: optional_env("OPENAI_API_BASE").unwrap_or(defaults.openai_api_base),
            anthropic_api_base: optional_env("ANTHROPIC_API_BASE")
                .unwrap_or(defaults.anthropic_api_base),
        })
    }
}

/// Returns the variable's value unless it is unset or blank.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    optional_env(key).and_then(|v| v.parse::<T>().ok())
}
