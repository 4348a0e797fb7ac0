//! # gemini-embedder
//!
//! Rate-limited client turning text into embedding vectors through the Google
//! Generative Language `embedContent` API.
//!
//! ## Architecture
//!
//! - **Shared rate limiter**: one [`RateLimiter`] spaces every outbound call in
//!   the process (or every call of the clients it is injected into)
//! - **Wire protocol**: request building and response parsing in
//!   [`embedder::protocol`]
//! - **Transport**: single-shot HTTP POST, no retries, status and network
//!   failures kept apart from parse failures
//! - **Batching**: [`GeminiEmbedder::get_vectors`] embeds sequentially, in
//!   input order, and stops at the first failing document
//!
//! ```rust,no_run
//! use gemini_embedder::{EmbedderConfig, GeminiEmbedder};
//!
//! # async fn example() -> gemini_embedder::Result<()> {
//! let embedder = GeminiEmbedder::from_config(&EmbedderConfig::from_env()?)?;
//! let vector = embedder.get_vector("hello").await?;
//! let vectors = embedder.get_vectors(&["first", "second"]).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod embedder;
pub mod errors;
pub mod rate_limiter;
pub mod utils;

pub use config::EmbedderConfig;
pub use embedder::cached::{CacheConfig, CachedEmbedder};
pub use embedder::gemini::{GeminiEmbedder, DEFAULT_MODEL};
pub use embedder::protocol::TaskType;
pub use embedder::transport::HttpTransport;
pub use embedder::{Embedder, Embedding};
pub use errors::{EmbedderError, ErrorKind, Result, TransportError};
pub use rate_limiter::RateLimiter;
