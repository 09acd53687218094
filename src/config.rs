//! Configuration management for little-things.
//!
//! Configuration can be set via environment variables (empty values count as unset):
//! - `LLM_PROVIDER` - Optional. Generator provider id. Defaults to `openai`.
//! - `LLM_API_KEY` - Optional. Without it every task comes from the local pool.
//! - `LLM_BASE_URL` - Optional. OpenAI-compatible API root. Defaults to `https://api.openai.com/v1`.
//! - `LLM_MODEL` - Optional. Model name. Defaults to `gpt-4o`.
//! - `LLM_TEMPERATURE` - Optional. Sampling temperature. Defaults to `0.8`.
//! - `LLM_TIMEOUT_SECS` - Optional. Bound on a single generation call. Defaults to `15`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `TASK_ENDPOINT` - Optional. URL of a running `POST /api/generate-task` for the terminal app.
//! - `FETCH_TIMEOUT_SECS` - Optional. Bound on an endpoint call. Defaults to `20`.
//! - `DATA_DIR` - Optional. Directory holding the local store. Defaults to `$HOME/.little-things`.
//! - `TASK_POOL_FILE` - Optional. JSON file replacing the built-in local task pool.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Remote generator configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Provider id looked up in the provider registry
    pub provider: String,

    /// Credential; `None` selects local-only behaviour
    pub api_key: Option<String>,

    /// OpenAI-compatible API root (without `/chat/completions`)
    pub base_url: String,

    pub model: String,

    pub temperature: f64,

    /// Upper bound for one generation call
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.8,
            timeout: Duration::from_secs(15),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Generator settings
    pub llm: LlmConfig,

    /// Generation endpoint used by the terminal app instead of calling the provider directly
    pub task_endpoint: Option<String>,

    /// Upper bound for one endpoint call
    pub fetch_timeout: Duration,

    /// Directory for the device-local store
    pub data_dir: PathBuf,

    /// Replacement for the built-in local pool
    pub task_pool_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = LlmConfig::default();

        let llm = LlmConfig {
            provider: var("LLM_PROVIDER").unwrap_or(defaults.provider),
            api_key: var("LLM_API_KEY"),
            base_url: var("LLM_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            model: var("LLM_MODEL").unwrap_or(defaults.model),
            temperature: parse_or("LLM_TEMPERATURE", var("LLM_TEMPERATURE"), defaults.temperature)?,
            timeout: Duration::from_secs(parse_or("LLM_TIMEOUT_SECS", var("LLM_TIMEOUT_SECS"), 15)?),
        };

        let host = var("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or("PORT", var("PORT"), 3000)?;

        let fetch_timeout =
            Duration::from_secs(parse_or("FETCH_TIMEOUT_SECS", var("FETCH_TIMEOUT_SECS"), 20)?);

        let data_dir = var("DATA_DIR").map(PathBuf::from).unwrap_or_else(|| {
            let home = var("HOME").unwrap_or_else(|| ".".to_string());
            PathBuf::from(home).join(".little-things")
        });

        Ok(Self {
            host,
            port,
            llm,
            task_endpoint: var("TASK_ENDPOINT"),
            fetch_timeout,
            data_dir,
            task_pool_file: var("TASK_POOL_FILE").map(PathBuf::from),
        })
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        None => Ok(default),
    }
}
