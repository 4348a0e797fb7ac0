//! Client configuration loaded from environment variables.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use validator::Validate;

use crate::embedder::gemini::DEFAULT_MODEL;
use crate::embedder::protocol::model_id;
use crate::embedder::transport::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::errors::{EmbedderError, Result};
use crate::rate_limiter::DEFAULT_MIN_INTERVAL_MS;
use crate::utils::is_blank;

/// Settings for [`GeminiEmbedder::from_config`](crate::GeminiEmbedder::from_config).
#[derive(Debug, Clone, Validate)]
pub struct EmbedderConfig {
    /// Generative Language API key. Never logged.
    pub api_key: SecretString,

    /// Embedding model id.
    #[validate(length(min = 1))]
    pub model: String,

    /// Minimum spacing between outbound calls, process-wide.
    #[validate(range(min = 0))]
    pub min_interval_ms: i64,

    /// Service root, e.g. `https://generativelanguage.googleapis.com`.
    #[validate(url)]
    pub base_url: String,

    /// Per-request HTTP timeout in seconds.
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            api_key: SecretString::from(String::new()),
            model: DEFAULT_MODEL.to_string(),
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl EmbedderConfig {
    /// Defaults with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` first (non-fatal if `.env` is absent).
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `GEMINI_API_KEY` | required |
    /// | `GEMINI_EMBEDDING_MODEL` | [`DEFAULT_MODEL`] |
    /// | `GEMINI_MIN_INTERVAL_MS` | `20000` |
    /// | `GEMINI_BASE_URL` | [`DEFAULT_BASE_URL`] |
    /// | `GEMINI_TIMEOUT_SECS` | `30` |
    ///
    /// # Errors
    /// [`EmbedderError::Configuration`] if the key is missing or blank, a
    /// number does not parse, or a value is out of range (negative interval,
    /// zero timeout, malformed URL).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            EmbedderError::Configuration("GEMINI_API_KEY is required".to_string())
        })?;

        let model =
            std::env::var("GEMINI_EMBEDDING_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let min_interval_ms = parse_env("GEMINI_MIN_INTERVAL_MS", DEFAULT_MIN_INTERVAL_MS)?;

        let base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let timeout_secs = parse_env("GEMINI_TIMEOUT_SECS", DEFAULT_TIMEOUT.as_secs())?;

        let config = Self {
            api_key: SecretString::from(api_key),
            model,
            min_interval_ms,
            base_url,
            timeout_secs,
        };
        config.check()?;

        Ok(config)
    }

    /// Validate every field.
    pub fn check(&self) -> Result<()> {
        if is_blank(self.api_key.expose_secret()) {
            return Err(EmbedderError::Configuration(
                "API key must not be empty".to_string(),
            ));
        }
        if is_blank(model_id(&self.model)) {
            return Err(EmbedderError::Configuration(format!(
                "model must not be empty, got {:?}",
                self.model
            )));
        }
        self.validate()
            .map_err(|e| EmbedderError::Configuration(e.to_string()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(val) => val.trim().parse::<T>().map_err(|_| {
            EmbedderError::Configuration(format!("{name} must be an integer, got {val:?}"))
        }),
        Err(_) => Ok(default),
    }
}
