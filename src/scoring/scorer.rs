use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::debug;

use super::error::ScoringError;
use super::types::{CategoryContribution, CategoryWeights, SimilarityScore};
use crate::constants::DEFAULT_TOP_K;
use crate::graph::{AttributeNode, CategoryGraph};

/// Cosine similarity of two vectors.
///
/// Returns 0 for mismatched dimensions, zero-norm inputs, or non-finite results.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let sim = (dot / (norm_a.sqrt() * norm_b.sqrt())) as f32;
    if sim.is_finite() { sim } else { 0.0 }
}

/// kNN graph-similarity scorer.
///
/// Scoring is driven from the role side: every role node is matched against
/// its `top_k` most similar candidate nodes. Swapping the profiles therefore
/// generally changes the score.
#[derive(Debug, Clone)]
pub struct SimilarityScorer {
    top_k: usize,
}

impl SimilarityScorer {
    /// Creates a scorer with [`DEFAULT_TOP_K`].
    pub fn new() -> Self {
        Self { top_k: DEFAULT_TOP_K }
    }

    /// Creates a scorer averaging the `top_k` nearest candidate nodes.
    pub fn with_top_k(top_k: usize) -> Result<Self, ScoringError> {
        if top_k == 0 {
            return Err(ScoringError::InvalidTopK);
        }
        Ok(Self { top_k })
    }

    /// Returns `k`.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Scores category graphs and combines them with `weights`.
    ///
    /// One-sided categories (no role nodes or no candidate nodes) score 0 and
    /// are left out of the weighted denominator.
    pub fn score(&self, graphs: &[CategoryGraph], weights: &CategoryWeights) -> SimilarityScore {
        let mut breakdown = BTreeMap::new();
        let mut weighted_sum = 0.0f64;
        let mut total_weight = 0.0f64;

        for graph in graphs {
            let weight = weights.get(graph.category);
            let similarity = self.category_similarity(graph);
            let counted = similarity.is_some() && weight > 0.0;

            if let Some(sim) = similarity
                && counted
            {
                weighted_sum += weight * sim;
                total_weight += weight;
            }

            breakdown.insert(
                graph.category,
                CategoryContribution {
                    similarity: similarity.unwrap_or(0.0),
                    weight,
                    contribution: 0.0,
                    role_nodes: graph.role.len(),
                    candidate_nodes: graph.candidate.len(),
                    counted,
                },
            );
        }

        let value = if total_weight > 0.0 {
            (weighted_sum / total_weight).clamp(0.0, 1.0)
        } else {
            0.0
        };

        if total_weight > 0.0 {
            for c in breakdown.values_mut().filter(|c| c.counted) {
                c.contribution = c.weight * c.similarity / total_weight;
            }
        }

        debug!(
            score = value,
            categories = breakdown.len(),
            top_k = self.top_k,
            "Similarity scored"
        );

        SimilarityScore { value, breakdown }
    }

    /// Mean over role nodes of their top-k candidate similarity, or `None`
    /// for a one-sided category.
    pub fn category_similarity(&self, graph: &CategoryGraph) -> Option<f64> {
        if graph.is_one_sided() {
            return None;
        }

        let total: f64 = graph
            .role
            .iter()
            .map(|role_node| self.best_match(role_node, &graph.candidate))
            .sum();

        Some((total / graph.role.len() as f64).clamp(0.0, 1.0))
    }

    /// Average of the `top_k` highest similarities between `node` and `candidates`.
    ///
    /// Uses every candidate when fewer than `top_k` are available. Negative
    /// similarities count as 0.
    pub fn best_match(&self, node: &AttributeNode, candidates: &[AttributeNode]) -> f64 {
        if candidates.is_empty() {
            return 0.0;
        }

        let mut sims: Vec<f64> = candidates
            .iter()
            .map(|c| (cosine_similarity(&node.embedding, &c.embedding) as f64).clamp(0.0, 1.0))
            .collect();
        sims.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));

        let k = self.top_k.min(sims.len());
        sims[..k].iter().sum::<f64>() / k as f64
    }
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self::new()
    }
}
