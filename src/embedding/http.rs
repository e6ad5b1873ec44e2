use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::DEFAULT_EMBED_TIMEOUT_MS;

use super::{AttributeEmbedder, EmbeddingError};

/// Connection settings for [`HttpEmbedder`].
#[derive(Debug, Clone)]
pub struct HttpEmbedderConfig {
    /// Endpoint accepting `{"input": "..."}` and answering `{"embedding": [...]}`.
    pub url: String,
    /// Client-side request timeout.
    pub timeout: Duration,
    /// Expected vector length; responses of another length are rejected.
    pub expected_dim: Option<usize>,
}

impl HttpEmbedderConfig {
    /// Creates a config for `url` with the default timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_millis(DEFAULT_EMBED_TIMEOUT_MS),
            expected_dim: None,
        }
    }

    /// Overrides the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the expected dimension.
    pub fn expected_dim(mut self, dim: usize) -> Self {
        self.expected_dim = Some(dim);
        self
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// Embedding gateway backed by a remote HTTP service.
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    config: HttpEmbedderConfig,
    http: HttpClient,
}

impl HttpEmbedder {
    /// Builds the client.
    pub fn new(config: HttpEmbedderConfig) -> Result<Self, EmbeddingError> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::Unavailable {
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self { config, http })
    }

    /// Returns the active config.
    pub fn config(&self) -> &HttpEmbedderConfig {
        &self.config
    }
}

#[async_trait]
impl AttributeEmbedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let response = self
            .http
            .post(&self.config.url)
            .json(&EmbedRequest { input: text })
            .send()
            .await
            .map_err(|e| EmbeddingError::from_transport(e, self.config.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::from_transport(e, self.config.timeout))?;
        debug!(dim = parsed.embedding.len(), "Received embedding");

        if parsed.embedding.is_empty() {
            return Err(EmbeddingError::EmptyVector);
        }
        if let Some(expected) = self.config.expected_dim
            && parsed.embedding.len() != expected
        {
            return Err(EmbeddingError::MalformedResponse {
                reason: format!(
                    "expected {} dimensions, got {}",
                    expected,
                    parsed.embedding.len()
                ),
            });
        }
        if parsed.embedding.iter().any(|x| !x.is_finite()) {
            return Err(EmbeddingError::MalformedResponse {
                reason: "non-finite component".to_string(),
            });
        }

        Ok(parsed.embedding)
    }

    fn dimension(&self) -> Option<usize> {
        self.config.expected_dim
    }

    fn mode(&self) -> &'static str {
        "http"
    }
}
