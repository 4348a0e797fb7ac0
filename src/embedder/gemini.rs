//! Rate-limited Gemini embedding client.
//!
//! Every call goes: validate → [`RateLimiter::acquire`] →
//! [`build_request`] → [`HttpTransport::send`] → [`parse_response`].
//! Failures are returned as-is; nothing is retried.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::debug;

use crate::config::EmbedderConfig;
use crate::embedder::cached::{CacheConfig, CachedEmbedder};
use crate::embedder::protocol::{build_request, model_id, parse_response, TaskType};
use crate::embedder::transport::{HttpTransport, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::embedder::{Embedder, Embedding};
use crate::errors::{EmbedderError, Result};
use crate::rate_limiter::RateLimiter;
use crate::utils::is_blank;

/// Default embedding model.
pub const DEFAULT_MODEL: &str = "text-embedding-004";

/// Embedding client for the Generative Language API.
///
/// Clients are cheap to clone and safe to share between tasks. All clients
/// that hold the same [`RateLimiter`] are spaced against each other.
#[derive(Debug, Clone)]
pub struct GeminiEmbedder {
    api_key: SecretString,
    model: String,
    task_type: TaskType,
    transport: HttpTransport,
    limiter: Arc<RateLimiter>,
}

impl GeminiEmbedder {
    /// Create a client using the process-wide [`RateLimiter::global`].
    ///
    /// # Arguments
    /// * `api_key` – Generative Language API key.
    /// * `model`   – Model id; `None` selects [`DEFAULT_MODEL`].
    ///
    /// # Errors
    /// [`EmbedderError::Configuration`] if the key or an explicit model is blank.
    pub fn new(api_key: impl Into<String>, model: Option<&str>) -> Result<Self> {
        let api_key = api_key.into();
        if is_blank(&api_key) {
            return Err(EmbedderError::Configuration(
                "API key must not be empty".to_string(),
            ));
        }

        let model = model.unwrap_or(DEFAULT_MODEL);
        if is_blank(model_id(model)) {
            return Err(EmbedderError::Configuration(
                "model must not be empty".to_string(),
            ));
        }

        Ok(Self {
            api_key: SecretString::from(api_key),
            model: model.to_string(),
            task_type: TaskType::default(),
            transport: HttpTransport::new(DEFAULT_BASE_URL, DEFAULT_TIMEOUT)?,
            limiter: RateLimiter::global(),
        })
    }

    /// Create a client from a loaded [`EmbedderConfig`].
    ///
    /// The configured interval is applied to the process-wide limiter via
    /// [`RateLimiter::configure_global`].
    pub fn from_config(config: &EmbedderConfig) -> Result<Self> {
        config.check()?;

        let limiter = RateLimiter::configure_global(config.min_interval_ms)?;
        let transport = HttpTransport::new(config.base_url.clone(), config.timeout())?;

        Ok(Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            task_type: TaskType::default(),
            transport,
            limiter,
        })
    }

    /// Use `limiter` instead of the process-wide one.
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    /// Send requests through `transport` (custom base URL or timeout).
    pub fn with_transport(mut self, transport: HttpTransport) -> Self {
        self.transport = transport;
        self
    }

    /// Point the client at another service root, keeping the default timeout.
    pub fn with_base_url(self, base_url: impl Into<String>) -> Result<Self> {
        let transport = HttpTransport::new(base_url, DEFAULT_TIMEOUT)?;
        Ok(self.with_transport(transport))
    }

    /// Override the task-type hint (default [`TaskType::SemanticSimilarity`]).
    pub fn with_task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = task_type;
        self
    }

    /// Wrap this client in an in-memory [`CachedEmbedder`].
    pub fn cached(self, cache_config: CacheConfig) -> CachedEmbedder<Self> {
        let namespace = format!("{}:{:?}", model_id(&self.model), self.task_type);
        CachedEmbedder::new(self, namespace, cache_config)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn task_type(&self) -> TaskType {
        self.task_type
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Embed one document.
    ///
    /// Waits for the rate limiter before sending. A rejected or failed call
    /// still uses up its slot.
    ///
    /// # Errors
    /// - [`EmbedderError::Validation`] for an empty or whitespace-only
    ///   document, before any waiting or network activity.
    /// - [`EmbedderError::Transport`] / [`EmbedderError::Parse`] from the call.
    pub async fn get_vector(&self, document: &str) -> Result<Embedding> {
        if is_blank(document) {
            return Err(EmbedderError::Validation(
                "document must not be empty or whitespace".to_string(),
            ));
        }

        self.limiter.acquire().await;

        let request = build_request(document, &self.model)?.with_task_type(self.task_type);
        debug!(model = %self.model, chars = document.chars().count(), "embedding document");

        let body = self.transport.send(&request, &self.api_key, &self.model).await?;
        let vector = parse_response(&body)?;

        debug!(dim = vector.len(), "embedding received");
        Ok(vector)
    }

    /// Embed `documents` one after another, in order.
    ///
    /// Calls are never issued concurrently. The first failure aborts the
    /// batch and is returned as [`EmbedderError::Document`], carrying the
    /// index of the failing document.
    pub async fn get_vectors<S: AsRef<str>>(&self, documents: &[S]) -> Result<Vec<Embedding>> {
        let mut vectors = Vec::with_capacity(documents.len());
        for (index, document) in documents.iter().enumerate() {
            let document = document.as_ref();
            let vector = self
                .get_vector(document)
                .await
                .map_err(|e| EmbedderError::in_document(index, document, e))?;
            vectors.push(vector);
        }
        Ok(vectors)
    }
}

impl Embedder for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        self.get_vector(text).await
    }

    async fn embed_many(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        self.get_vectors(texts).await
    }
}
