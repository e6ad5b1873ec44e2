use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{AttributeEmbedder, EmbeddingError, HashingEmbedder};

/// Test embedder returning fixed vectors, with injectable failures.
///
/// Texts without a fixed vector fall back to [`HashingEmbedder`] output.
#[derive(Default)]
pub struct MockEmbedder {
    vectors: RwLock<HashMap<String, Vec<f32>>>,
    failing: RwLock<HashSet<String>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    fallback: HashingEmbedder,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every call (for timeout tests).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Pins the vector returned for `text`.
    pub fn insert(&self, text: &str, vector: Vec<f32>) {
        self.vectors.write().insert(text.to_string(), vector);
    }

    /// Makes every call for `text` fail.
    pub fn fail_on(&self, text: &str) {
        self.failing.write().insert(text.to_string());
    }

    /// Number of `embed` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Highest number of `embed` calls observed running at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::Acquire)
    }

    async fn respond(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.read().contains(text) {
            return Err(EmbeddingError::Unavailable {
                reason: format!("mock failure for '{}'", text),
            });
        }

        if let Some(vector) = self.vectors.read().get(text) {
            return Ok(vector.clone());
        }

        self.fallback.embed(text).await
    }
}

#[async_trait]
impl AttributeEmbedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        // Calls cancelled by a timeout never decrement; only the peak is asserted on.
        let running = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::AcqRel);

        let result = self.respond(text).await;
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
        result
    }

    fn mode(&self) -> &'static str {
        "mock"
    }
}
