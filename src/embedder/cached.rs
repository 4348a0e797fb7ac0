//! In-process embedding cache.
//!
//! Uses `moka` for a bounded, TTL-evicting async cache keyed by an MD5 of
//! `namespace + text`. A hit returns the stored vector without touching the
//! inner embedder (so no rate-limiter slot is spent). Errors are never cached.

use std::time::Duration;

use md5::{Digest, Md5};
use moka::future::Cache;
use tracing::debug;

use crate::embedder::{Embedder, Embedding};
use crate::errors::{EmbedderError, Result};

// ── Cache configuration ───────────────────────────────────────────────────────

/// Configuration for the in-process embedding cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of vectors held in memory.
    pub max_capacity: u64,
    /// How long each vector lives before eviction.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            ttl: Duration::from_secs(24 * 3_600),
        }
    }
}

// ── Wrapper ───────────────────────────────────────────────────────────────────

/// Memoising wrapper around any [`Embedder`].
pub struct CachedEmbedder<E> {
    inner: E,
    /// Distinguishes vectors from different models / task types.
    namespace: String,
    cache: Cache<String, Embedding>,
}

impl<E: Embedder> CachedEmbedder<E> {
    /// Wrap `inner`. `namespace` must differ between embedders whose vectors
    /// are not interchangeable (e.g. model id + task type).
    pub fn new(inner: E, namespace: impl Into<String>, config: CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl)
            .build();

        Self {
            inner,
            namespace: namespace.into(),
            cache,
        }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Drop every cached vector.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    fn cache_key(&self, text: &str) -> String {
        let mut h = Md5::new();
        h.update(self.namespace.as_bytes());
        h.update([0u8]);
        h.update(text.as_bytes());
        format!("{:x}", h.finalize())
    }
}

impl<E: Embedder> Embedder for CachedEmbedder<E> {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let key = self.cache_key(text);

        if let Some(hit) = self.cache.get(&key).await {
            debug!(namespace = %self.namespace, "embedding cache hit");
            return Ok(hit);
        }

        let vector = self.inner.embed(text).await?;
        self.cache.insert(key, vector.clone()).await;
        Ok(vector)
    }

    async fn embed_many(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for (index, text) in texts.iter().enumerate() {
            let vector = self
                .embed(text)
                .await
                .map_err(|e| EmbedderError::in_document(index, text, e))?;
            vectors.push(vector);
        }
        Ok(vectors)
    }
}
