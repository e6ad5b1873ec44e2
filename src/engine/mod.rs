//! Matching engine: profile scoring feeding a warm-started bandit pool.
//!
//! [`MatchEngine`] is the explicitly owned entry point. It holds one
//! [`BanditPool`] behind an `Arc`, so the same pool can be shared with the
//! [`LifecycleManager`](crate::lifecycle::LifecycleManager) that persists it.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::bandit::{
    ArmId, BanditArm, BanditError, BanditPool, PoolSnapshot, RestoreReport, WarmStartPrior,
};
use crate::config::Config;
use crate::constants::DEFAULT_WARM_START_CONFIDENCE;
use crate::embedding::AttributeEmbedder;
use crate::graph::{BuildReport, GraphBuilder, GraphBuilderConfig};
use crate::profile::Profile;
use crate::scoring::{CategoryWeights, ScoringError, SimilarityScore, SimilarityScorer};

/// A score together with the degradation report of the build behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub score: SimilarityScore,
    pub report: BuildReport,
}

/// Scores profile pairs and drives arm selection and learning.
pub struct MatchEngine {
    builder: GraphBuilder,
    scorer: SimilarityScorer,
    weights: CategoryWeights,
    confidence: f64,
    pool: Arc<BanditPool>,
}

impl MatchEngine {
    /// Engine with default limits, equal weights and an empty pool.
    pub fn new(embedder: Arc<dyn AttributeEmbedder>) -> Self {
        Self {
            builder: GraphBuilder::new(embedder),
            scorer: SimilarityScorer::new(),
            weights: CategoryWeights::default(),
            confidence: DEFAULT_WARM_START_CONFIDENCE,
            pool: Arc::new(BanditPool::new()),
        }
    }

    /// Engine configured from [`Config`].
    pub fn from_config(
        config: &Config,
        embedder: Arc<dyn AttributeEmbedder>,
    ) -> Result<Self, ScoringError> {
        let builder = GraphBuilder::with_config(
            embedder,
            GraphBuilderConfig {
                concurrency: config.embed_concurrency,
                timeout: config.embed_timeout,
            },
        );
        Ok(Self {
            builder,
            scorer: SimilarityScorer::with_top_k(config.top_k)?,
            weights: config.category_weights.clone(),
            confidence: config.warm_start_confidence,
            pool: Arc::new(BanditPool::new()),
        })
    }

    /// Replaces the pool (e.g. with one shared with a lifecycle manager).
    pub fn with_pool(mut self, pool: Arc<BanditPool>) -> Self {
        self.pool = pool;
        self
    }

    pub fn with_weights(mut self, weights: CategoryWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_scorer(mut self, scorer: SimilarityScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn pool(&self) -> &Arc<BanditPool> {
        &self.pool
    }

    pub fn weights(&self) -> &CategoryWeights {
        &self.weights
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn embedder_mode(&self) -> &'static str {
        self.builder.embedder().mode()
    }

    /// Builds and scores the pair, keeping the build report.
    pub async fn compute_match(
        &self,
        candidate: &Profile,
        role: &Profile,
        weights: Option<&CategoryWeights>,
    ) -> MatchResult {
        let built = self.builder.build(candidate, role).await;
        let score = self
            .scorer
            .score(&built.graphs, weights.unwrap_or(&self.weights));
        debug!(
            candidate = %candidate.name,
            role = %role.name,
            score = score.value,
            dropped = built.report.dropped.len(),
            "Match scored"
        );
        MatchResult {
            score,
            report: built.report,
        }
    }

    /// Score in `[0, 1]` for `candidate` against `role`.
    ///
    /// Attributes the embedder fails on are dropped, never raised.
    pub async fn compute_match_score(
        &self,
        candidate: &Profile,
        role: &Profile,
        weights: Option<&CategoryWeights>,
    ) -> SimilarityScore {
        self.compute_match(candidate, role, weights).await.score
    }

    /// Creates `id` (warm if `similarity` is given, cold otherwise).
    ///
    /// An existing arm is returned unchanged.
    pub fn initialize_arm(&self, id: &ArmId, similarity: Option<f64>) -> BanditArm {
        let prior = similarity.map_or_else(WarmStartPrior::cold, |s| {
            WarmStartPrior::derive(s, self.confidence)
        });
        self.pool.initialize_arm(id, prior)
    }

    /// Scores the pair and seeds `id` from the result in one call.
    pub async fn initialize_arm_from_profiles(
        &self,
        id: &ArmId,
        candidate: &Profile,
        role: &Profile,
        weights: Option<&CategoryWeights>,
    ) -> (BanditArm, SimilarityScore) {
        let score = self.compute_match_score(candidate, role, weights).await;
        let arm = self.initialize_arm(id, Some(score.value));
        (arm, score)
    }

    /// Thompson-sampling choice among `candidates`.
    pub fn choose_best_arm(&self, candidates: &[ArmId]) -> Result<ArmId, BanditError> {
        self.pool.select_arm(candidates)
    }

    /// Applies one outcome; unknown arms are created cold first.
    pub fn record_outcome(&self, id: &ArmId, success: bool) -> BanditArm {
        self.pool.record_outcome(id, success)
    }

    pub fn get_arm(&self, id: &ArmId) -> Option<BanditArm> {
        self.pool.get_arm(id)
    }

    pub fn export_snapshot(&self) -> PoolSnapshot {
        self.pool.snapshot()
    }

    /// Serializes the whole pool to its JSON exchange form.
    pub fn export_pool_state(&self) -> Result<String, BanditError> {
        self.export_snapshot().to_json()
    }

    /// Parses a JSON snapshot and merges it into the pool.
    ///
    /// Arms that already recorded outcomes in this process keep their state.
    pub fn import_pool_state(&self, json: &str) -> Result<RestoreReport, BanditError> {
        let snapshot = PoolSnapshot::from_json(json)?;
        self.import_snapshot(&snapshot)
    }

    pub fn import_snapshot(&self, snapshot: &PoolSnapshot) -> Result<RestoreReport, BanditError> {
        let report = self.pool.restore(snapshot)?;
        info!(arms = snapshot.len(), "Pool state imported");
        Ok(report)
    }
}

impl std::fmt::Debug for MatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchEngine")
            .field("builder", &self.builder)
            .field("top_k", &self.scorer.top_k())
            .field("weights", &self.weights)
            .field("confidence", &self.confidence)
            .field("pool", &self.pool)
            .finish()
    }
}
