//! HTTP transport for `embedContent`.
//!
//! One POST per call, no retries. Non-success statuses and network failures
//! both surface as [`TransportError`].

use std::time::Duration;

use bytes::Bytes;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::embedder::protocol::{model_id, EmbedContentRequest};
use crate::errors::{EmbedderError, Result, TransportError};
use crate::utils::truncate_with_ellipsis;

/// Public Generative Language endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest error body kept in [`TransportError::Status`], in characters.
pub const MAX_ERROR_BODY_CHARS: usize = 2_048;

/// Sends serialized requests to the embedding endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for `base_url` (scheme + host, optional path
    /// prefix) with a per-request `timeout`.
    ///
    /// # Errors
    /// [`EmbedderError::Configuration`] if the base URL is blank or the HTTP
    /// client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(EmbedderError::Configuration(
                "base URL must not be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbedderError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint URL for `model`, without the `key` query parameter.
    pub fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:embedContent",
            self.base_url,
            model_id(model)
        )
    }

    /// POST `request` and return the raw body of a 2xx response.
    ///
    /// # Errors
    /// - [`TransportError::Status`] with the status and response body (capped
    ///   at [`MAX_ERROR_BODY_CHARS`]) for any non-success status.
    /// - [`TransportError::Network`] for DNS, connect, timeout, or body read
    ///   failures.
    pub async fn send(
        &self,
        request: &EmbedContentRequest,
        api_key: &SecretString,
        model: &str,
    ) -> Result<Bytes> {
        let url = self.endpoint(model);
        debug!(url = %url, "POST embedContent");

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key.expose_secret())])
            .json(request)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {}>", e.without_url()));
            let body = truncate_with_ellipsis(&body, MAX_ERROR_BODY_CHARS);
            warn!(status = status.as_u16(), url = %url, "embedding request rejected");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        response.bytes().await.map_err(network_error)
    }
}

/// Strip the request URL (which carries the API key) before keeping the error.
fn network_error(err: reqwest::Error) -> EmbedderError {
    TransportError::Network(err.without_url()).into()
}
