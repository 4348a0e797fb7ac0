//! End-to-end tests for `GeminiEmbedder` against a mocked embedding service.

use std::sync::Arc;
use std::time::{Duration, Instant};

use gemini_embedder::{
    CacheConfig, Embedder, EmbedderError, ErrorKind, GeminiEmbedder, RateLimiter, TransportError,
};
use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const ENDPOINT: &str = "/v1beta/models/text-embedding-004:embedContent";

fn client(server: &MockServer, limiter: Arc<RateLimiter>) -> GeminiEmbedder {
    GeminiEmbedder::new("test-key", None)
        .expect("valid key")
        .with_base_url(server.uri())
        .expect("valid base URL")
        .with_rate_limiter(limiter)
}

fn unlimited() -> Arc<RateLimiter> {
    Arc::new(RateLimiter::new(Duration::ZERO))
}

/// Respond to `text` with the given vector.
async fn mount_vector(server: &MockServer, text: &str, values: &[f64]) {
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({ "content": { "parts": [{ "text": text }] } })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "embedding": { "values": values } })),
        )
        .mount(server)
        .await;
}

async fn mount_any(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(template)
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Single document
// ---------------------------------------------------------------------------

#[tokio::test]
async fn hello_returns_mocked_vector() {
    let server = MockServer::start().await;
    mount_vector(&server, "hello", &[0.1, 0.2, 0.3]).await;

    let vector = client(&server, unlimited()).get_vector("hello").await.unwrap();
    assert_eq!(vector, vec![0.1, 0.2, 0.3]);
}

#[tokio::test]
async fn blank_documents_fail_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let embedder = client(&server, unlimited());
    for doc in ["", "   ", "\n\t "] {
        let err = embedder.get_vector(doc).await.unwrap_err();
        assert!(matches!(err, EmbedderError::Validation(_)), "doc {doc:?}: {err:?}");
    }
}

#[tokio::test]
async fn malformed_body_is_parse_error() {
    let server = MockServer::start().await;
    mount_any(&server, ResponseTemplate::new(200).set_body_json(json!({ "foo": 1 }))).await;

    let err = client(&server, unlimited()).get_vector("hello").await.unwrap_err();
    assert!(matches!(err, EmbedderError::Parse(_)), "got {err:?}");
}

#[tokio::test]
async fn non_json_body_is_parse_error() {
    let server = MockServer::start().await;
    mount_any(&server, ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;

    let err = client(&server, unlimited()).get_vector("hello").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[tokio::test]
async fn rejected_calls_carry_status_and_still_use_a_slot() {
    for status in [429_u16, 500] {
        let server = MockServer::start().await;
        mount_any(
            &server,
            ResponseTemplate::new(status).set_body_json(json!({
                "error": { "code": status, "message": "nope", "status": "RESOURCE_EXHAUSTED" }
            })),
        )
        .await;

        let limiter = unlimited();
        assert!(limiter.last_granted().is_none());

        let err = client(&server, limiter.clone()).get_vector("hello").await.unwrap_err();
        match &err {
            EmbedderError::Transport(TransportError::Status { status: s, body }) => {
                assert_eq!(*s, status);
                assert!(body.contains("nope"));
            }
            e => panic!("expected Status error, got {:?}", e),
        }
        assert!(limiter.last_granted().is_some(), "failed attempt must count");
    }
}

#[tokio::test]
async fn failed_call_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server, unlimited()).get_vector("hello").await.unwrap_err();
    assert_eq!(err.status(), Some(503));
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_vectors_matches_sequential_get_vector() {
    let server = MockServer::start().await;
    mount_vector(&server, "d1", &[1.0, 0.0, 0.0]).await;
    mount_vector(&server, "d2", &[0.0, 1.0, 0.0]).await;
    mount_vector(&server, "d3", &[0.0, 0.0, 1.0]).await;

    let embedder = client(&server, unlimited());
    let batch = embedder.get_vectors(&["d1", "d2", "d3"]).await.unwrap();

    let mut sequential = Vec::new();
    for d in ["d1", "d2", "d3"] {
        sequential.push(embedder.get_vector(d).await.unwrap());
    }

    assert_eq!(batch.len(), 3);
    assert_eq!(batch, sequential);
    assert_eq!(batch[1], vec![0.0, 1.0, 0.0]);
}

#[tokio::test]
async fn get_vectors_accepts_owned_strings() {
    let server = MockServer::start().await;
    mount_vector(&server, "owned", &[4.0]).await;

    let docs = vec!["owned".to_string(), "owned".to_string()];
    let out = client(&server, unlimited()).get_vectors(&docs).await.unwrap();
    assert_eq!(out, vec![vec![4.0], vec![4.0]]);
}

#[tokio::test]
async fn get_vectors_stops_at_first_failure() {
    let server = MockServer::start().await;
    mount_vector(&server, "good", &[1.0]).await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_partial_json(json!({ "content": { "parts": [{ "text": "bad" }] } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "embedding": {} })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_partial_json(json!({ "content": { "parts": [{ "text": "never" }] } })))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server, unlimited())
        .get_vectors(&["good", "bad", "never"])
        .await
        .unwrap_err();

    assert_eq!(err.document_index(), Some(1));
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(err.to_string().contains("bad"));
}

// ---------------------------------------------------------------------------
// Shared rate limiting
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 3)]
async fn separate_clients_share_one_limiter() {
    let server = MockServer::start().await;
    mount_vector(&server, "x", &[1.0]).await;

    let interval = Duration::from_millis(50);
    let limiter = Arc::new(RateLimiter::new(interval));

    let start = Instant::now();
    let handles: Vec<_> = (0..3)
        .map(|_| {
            let embedder = client(&server, limiter.clone());
            tokio::spawn(async move { embedder.get_vectors(&["x", "x"]).await })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), vec![vec![1.0], vec![1.0]]);
    }

    // Six calls need at least five full intervals between the first and last.
    assert!(start.elapsed() >= interval * 5, "took {:?}", start.elapsed());
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cached_client_calls_service_once_per_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "embedding": { "values": [0.7] } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let cached = client(&server, unlimited()).cached(CacheConfig::default());
    assert_eq!(cached.embed("same").await.unwrap(), vec![0.7]);
    assert_eq!(
        cached.embed_many(&["same", "same"]).await.unwrap(),
        vec![vec![0.7], vec![0.7]]
    );
}
