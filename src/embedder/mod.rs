//! Text-to-vector embedding.
//!
//! [`gemini::GeminiEmbedder`] is the rate-limited client for the Generative
//! Language `embedContent` method; [`cached::CachedEmbedder`] memoises any
//! [`Embedder`]. The pieces a call goes through live in [`protocol`]
//! (request/response wire types) and [`transport`] (HTTP).

pub mod cached;
pub mod gemini;
pub mod protocol;
pub mod transport;

use crate::errors::Result;

/// A vector embedding. Its length is whatever the model produces.
pub type Embedding = Vec<f64>;

/// Capability handed to whatever indexes or queries the vectors.
#[allow(async_fn_in_trait)]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Embed several texts, returning one vector per input in input order.
    ///
    /// Stops at the first failure; the error names the failing document.
    async fn embed_many(&self, texts: &[&str]) -> Result<Vec<Embedding>>;
}
