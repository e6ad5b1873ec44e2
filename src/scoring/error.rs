use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("invalid category weight entry '{entry}': {reason}")]
    InvalidWeight { entry: String, reason: String },

    #[error("invalid top_k: must be at least 1")]
    InvalidTopK,
}
