use thiserror::Error;

use super::arm::ArmId;

#[derive(Debug, Error)]
pub enum BanditError {
    #[error("no candidate arms supplied for selection")]
    NoCandidates,

    #[error("invalid Beta parameters for arm {id}: alpha={alpha}, beta={beta}")]
    InvalidParameters { id: ArmId, alpha: f64, beta: f64 },

    #[error("invalid snapshot: {reason}")]
    InvalidSnapshot { reason: String },
}
