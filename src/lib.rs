//! Affinity library crate (used by the server and integration tests).
//!
//! # Public API Surface
//!
//! ## Matching
//! - [`Profile`], [`Category`] - Candidate and role descriptions
//! - [`GraphBuilder`] - Per-category attribute embedding
//! - [`SimilarityScorer`], [`SimilarityScore`], [`CategoryWeights`] - kNN graph similarity
//!
//! ## Learning
//! - [`WarmStartPrior`] - Similarity score to Beta prior
//! - [`BanditPool`], [`BanditArm`], [`ArmId`] - Thompson-sampling arms
//! - [`MatchEngine`] - Facade combining scoring and the pool
//!
//! ## Persistence
//! - [`ArmStore`], [`FileArmStore`] - Durable pool snapshots
//! - [`LifecycleManager`] - Hydrate at startup, dehydrate periodically and on shutdown
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod bandit;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod engine;
pub mod gateway;
pub mod graph;
pub mod hashing;
pub mod lifecycle;
pub mod profile;
pub mod scoring;
pub mod storage;

pub use bandit::{
    ArmId, ArmRecord, BanditArm, BanditError, BanditPool, PoolSnapshot, RestoreReport,
    WarmStartPrior,
};
pub use config::{Config, ConfigError};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbedder;
pub use embedding::{
    AttributeEmbedder, EmbeddingError, HashingEmbedder, HttpEmbedder, HttpEmbedderConfig,
};
pub use engine::{MatchEngine, MatchResult};
pub use graph::{BuildReport, BuiltGraph, CategoryGraph, GraphBuilder, GraphBuilderConfig};
pub use hashing::{fingerprint, hash_to_u64};
pub use lifecycle::{
    DehydrationResult, HydrationResult, LifecycleConfig, LifecycleError, LifecycleManager,
    LifecycleResult,
};
pub use profile::{Category, Profile};
pub use scoring::{
    CategoryWeights, ScoringError, SimilarityScore, SimilarityScorer, cosine_similarity,
};
#[cfg(any(test, feature = "mock"))]
pub use storage::MockArmStore;
pub use storage::{ArmStore, FileArmStore, StorageError, StorageResult};
