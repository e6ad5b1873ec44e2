//! Attribute embedding gateway.
//!
//! The core treats embedding as an opaque, side-effect-free call returning a
//! fixed-length vector per short text attribute. Implementations:
//!
//! - [`HashingEmbedder`]: deterministic local feature hashing (default, no network).
//! - [`HttpEmbedder`]: remote embedding service over HTTP.
//! - `MockEmbedder`: fixed vectors for tests (behind `cfg(any(test, feature = "mock"))`).

mod error;
/// Local BLAKE3 feature-hashing embedder.
pub mod hashing;
/// Remote embedding service client.
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use error::EmbeddingError;
pub use hashing::HashingEmbedder;
pub use http::{HttpEmbedder, HttpEmbedderConfig};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbedder;

use async_trait::async_trait;

#[async_trait]
/// Turns one short text attribute into a fixed-dimension vector.
pub trait AttributeEmbedder: Send + Sync {
    /// Embeds `text`. Must be deterministic for identical input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Output dimension, when known up front.
    fn dimension(&self) -> Option<usize> {
        None
    }

    /// Short label for logs and readiness output.
    fn mode(&self) -> &'static str;
}
