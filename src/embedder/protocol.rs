//! Wire types for the Generative Language `embedContent` method.
//!
//! Request:
//! ```json
//! {"model": "models/text-embedding-004",
//!  "content": {"parts": [{"text": "..."}]},
//!  "taskType": "SEMANTIC_SIMILARITY"}
//! ```
//! Response: `{"embedding": {"values": [0.1, ...]}}`.

use serde::{Deserialize, Serialize};

use crate::embedder::Embedding;
use crate::errors::{EmbedderError, Result};
use crate::utils::is_blank;

const MODEL_PREFIX: &str = "models/";

/// Hint telling the service what the embedding will be used for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    RetrievalQuery,
    RetrievalDocument,
    #[default]
    SemanticSimilarity,
    Classification,
    Clustering,
}

/// Body of a single `embedContent` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedContentRequest {
    /// Model resource name, always `models/{id}`.
    pub model: String,
    pub content: Content,
    pub task_type: TaskType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Part {
    pub text: String,
}

impl EmbedContentRequest {
    /// Replace the task-type hint.
    pub fn with_task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = task_type;
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct EmbedContentResponse {
    pub embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
pub struct ContentEmbedding {
    pub values: Vec<f64>,
}

/// Bare model id (`text-embedding-004`), as used in the endpoint path.
pub fn model_id(model: &str) -> &str {
    model.strip_prefix(MODEL_PREFIX).unwrap_or(model)
}

/// Fully-qualified model resource (`models/text-embedding-004`).
pub fn model_resource(model: &str) -> String {
    format!("{MODEL_PREFIX}{}", model_id(model))
}

/// Build the request body embedding `document` with `model`.
///
/// The document is sent as the only content part, with the
/// [`TaskType::SemanticSimilarity`] hint.
///
/// # Errors
/// [`EmbedderError::Validation`] if `document` or `model` is blank.
pub fn build_request(document: &str, model: &str) -> Result<EmbedContentRequest> {
    if is_blank(document) {
        return Err(EmbedderError::Validation(
            "document must not be empty or whitespace".to_string(),
        ));
    }
    if is_blank(model_id(model)) {
        return Err(EmbedderError::Validation(
            "model must not be empty".to_string(),
        ));
    }

    Ok(EmbedContentRequest {
        model: model_resource(model),
        content: Content {
            parts: vec![Part {
                text: document.to_string(),
            }],
        },
        task_type: TaskType::SemanticSimilarity,
    })
}

/// Decode a successful response body into its embedding values, in the order
/// the service returned them.
///
/// # Errors
/// [`EmbedderError::Parse`] if the body is not JSON or lacks a numeric
/// `embedding.values` array.
pub fn parse_response(body: &[u8]) -> Result<Embedding> {
    let response: EmbedContentResponse = serde_json::from_slice(body)?;
    Ok(response.embedding.values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use serde_json::json;

    #[test]
    fn request_serializes_to_wire_shape() {
        let request = build_request("hello world", "text-embedding-004").unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "models/text-embedding-004",
                "content": { "parts": [{ "text": "hello world" }] },
                "taskType": "SEMANTIC_SIMILARITY",
            })
        );
    }

    #[test]
    fn prefixed_model_is_not_prefixed_twice() {
        let request = build_request("x", "models/embedding-001").unwrap();
        assert_eq!(request.model, "models/embedding-001");
        assert_eq!(model_id("models/embedding-001"), "embedding-001");
    }

    #[test]
    fn document_text_is_sent_verbatim() {
        let doc = "  leading and trailing\nwhitespace kept  ";
        let request = build_request(doc, "m").unwrap();
        assert_eq!(request.content.parts.len(), 1);
        assert_eq!(request.content.parts[0].text, doc);
    }

    #[test]
    fn blank_document_is_rejected() {
        for doc in ["", "   ", "\n\t"] {
            let err = build_request(doc, "m").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "document {doc:?}");
        }
    }

    #[test]
    fn blank_model_is_rejected() {
        assert_eq!(build_request("x", "").unwrap_err().kind(), ErrorKind::Validation);
        assert_eq!(build_request("x", "models/").unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn task_type_override() {
        let request = build_request("x", "m")
            .unwrap()
            .with_task_type(TaskType::RetrievalQuery);
        assert_eq!(
            serde_json::to_value(&request).unwrap()["taskType"],
            "RETRIEVAL_QUERY"
        );
    }

    #[test]
    fn parse_preserves_order() {
        let body = br#"{"embedding":{"values":[0.3,-0.1,0.2,1e-3]}}"#;
        assert_eq!(parse_response(body).unwrap(), vec![0.3, -0.1, 0.2, 0.001]);
    }

    #[test]
    fn parse_accepts_integers_and_extra_fields() {
        let body = br#"{"embedding":{"values":[1,0,-2]},"metadata":{"tokens":3}}"#;
        assert_eq!(parse_response(body).unwrap(), vec![1.0, 0.0, -2.0]);
    }

    #[test]
    fn parse_empty_values_is_ok() {
        assert!(parse_response(br#"{"embedding":{"values":[]}}"#).unwrap().is_empty());
    }

    #[test]
    fn parse_rejects_wrong_shapes() {
        let bodies: [&[u8]; 6] = [
            br#"{"foo": 1}"#,
            br#"{"embedding": {}}"#,
            br#"{"embedding": {"values": "0.1,0.2"}}"#,
            br#"{"embedding": {"values": [0.1, "x"]}}"#,
            br#"{"embedding": {"values": null}}"#,
            b"not json",
        ];
        for body in bodies {
            let err = parse_response(body).unwrap_err();
            assert_eq!(
                err.kind(),
                ErrorKind::Parse,
                "body {:?}",
                String::from_utf8_lossy(body)
            );
        }
    }
}
