use std::time::Duration;

use thiserror::Error;

/// Failure of a single attribute embedding request.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("embedding service unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("embedding service returned status {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("malformed embedding response: {reason}")]
    MalformedResponse { reason: String },

    #[error("embedding is empty for attribute")]
    EmptyVector,
}

impl EmbeddingError {
    /// Classifies a transport error from a request sent with `timeout`.
    pub fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            EmbeddingError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            }
        } else if err.is_decode() {
            EmbeddingError::MalformedResponse {
                reason: err.to_string(),
            }
        } else {
            EmbeddingError::Unavailable {
                reason: err.to_string(),
            }
        }
    }
}
