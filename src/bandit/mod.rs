//! Online Beta-Bernoulli bandit with warm-started priors.
//!
//! - [`WarmStartPrior`] turns a similarity score into an informative `(alpha0, beta0)`.
//! - [`BanditPool`] owns the arms, selects with Thompson sampling, and applies outcomes.
//! - [`PoolSnapshot`] is the persisted/exported form of a pool.
//!
//! Arm lifecycle: created (cold or warm) on first use → sampled/updated
//! repeatedly → snapshotted and restored across restarts. Arms are never deleted.

pub mod arm;
pub mod error;
pub mod pool;
pub mod prior;
pub mod snapshot;


pub use arm::{ArmId, BanditArm};
pub use error::BanditError;
pub use pool::BanditPool;
pub use prior::WarmStartPrior;
pub use snapshot::{ArmRecord, PoolSnapshot, RestoreReport};
