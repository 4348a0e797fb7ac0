//! Error types for gemini-embedder.

use crate::utils::text::{normalize_whitespace, truncate_with_ellipsis};

/// Alias for Results returning [`EmbedderError`].
pub type Result<T> = std::result::Result<T, EmbedderError>;

/// Maximum number of characters of a failing document echoed back in errors.
const PREVIEW_CHARS: usize = 48;

/// Top-level error type for gemini-embedder.
#[derive(Debug, thiserror::Error)]
pub enum EmbedderError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Parse error: {0}")]
    Parse(String),

    /// A document inside a batch failed; `source` is the underlying error.
    #[error("Document #{index} ({preview:?}) failed: {source}")]
    Document {
        index: usize,
        preview: String,
        source: Box<EmbedderError>,
    },
}

/// Transport-level failures talking to the embedding endpoint.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// DNS, connect, reset, timeout, or body read failure. The request URL is
    /// stripped so the API key never ends up in a message.
    #[error("network failure: {0}")]
    Network(#[source] reqwest::Error),
}

/// Coarse classification of an [`EmbedderError`], independent of batch context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Validation,
    Transport,
    Parse,
}

impl EmbedderError {
    /// Wrap `source` with the position and a short preview of the batch
    /// document that produced it.
    pub fn in_document(index: usize, document: &str, source: EmbedderError) -> Self {
        Self::Document {
            index,
            preview: truncate_with_ellipsis(&normalize_whitespace(document), PREVIEW_CHARS),
            source: Box::new(source),
        }
    }

    /// The kind of the underlying failure, looking through batch context.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Parse(_) => ErrorKind::Parse,
            Self::Document { source, .. } => source.kind(),
        }
    }

    /// HTTP status of a rejected request, if that is what went wrong.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(TransportError::Status { status, .. }) => Some(*status),
            Self::Document { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Index of the failing document for errors raised by a batch call.
    pub fn document_index(&self) -> Option<usize> {
        match self {
            Self::Document { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for EmbedderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
