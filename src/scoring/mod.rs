//! Graph similarity scoring.
//!
//! Each [`CategoryGraph`](crate::graph::CategoryGraph) is scored by kNN
//! aggregation (role node → its `k` nearest candidate nodes by cosine
//! similarity), then categories are combined with [`CategoryWeights`] into a
//! [`SimilarityScore`] in `[0, 1]`. Scoring is pure: identical graphs and
//! weights always produce the identical score.

pub mod error;
pub mod scorer;
pub mod types;


pub use error::ScoringError;
pub use scorer::{SimilarityScorer, cosine_similarity};
pub use types::{CategoryContribution, CategoryWeights, SimilarityScore};
