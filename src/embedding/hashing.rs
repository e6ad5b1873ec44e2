use async_trait::async_trait;

use crate::constants::DEFAULT_HASHING_DIM;
use crate::hashing::hash_feature;

use super::{AttributeEmbedder, EmbeddingError};

const WORD_NAMESPACE: &str = "w";
const TRIGRAM_NAMESPACE: &str = "g";
const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Deterministic embedder built from hashed word and character-trigram features.
///
/// Shared words and spellings produce overlapping buckets, so "ML" and
/// "ML Engineer" land closer together than "ML" and "Accounting". Useful when no
/// embedding service is configured and as a reproducible fixture.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
}

impl HashingEmbedder {
    /// Creates an embedder with the default dimension.
    pub fn new() -> Self {
        Self::with_dim(DEFAULT_HASHING_DIM)
    }

    /// Creates an embedder producing `dim`-wide vectors (minimum 1).
    pub fn with_dim(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    /// Computes the vector synchronously.
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        let normalized = text.trim().to_lowercase();

        for word in normalized
            .split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
            .filter(|w| !w.is_empty())
        {
            let (bucket, sign) = hash_feature(WORD_NAMESPACE, word, self.dim);
            vector[bucket] += sign * WORD_WEIGHT;

            let padded: Vec<char> = format!(" {} ", word).chars().collect();
            for gram in padded.windows(3) {
                let gram: String = gram.iter().collect();
                let (bucket, sign) = hash_feature(TRIGRAM_NAMESPACE, &gram, self.dim);
                vector[bucket] += sign * TRIGRAM_WEIGHT;
            }
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AttributeEmbedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let vector = self.embed_sync(text);
        if vector.iter().all(|x| *x == 0.0) {
            return Err(EmbeddingError::EmptyVector);
        }
        Ok(vector)
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dim)
    }

    fn mode(&self) -> &'static str {
        "hashing"
    }
}
