//! Arm state persistence.
//!
//! The core depends only on the [`ArmStore`] contract: save a whole
//! [`PoolSnapshot`] under a scope key, and load it back. Merging a loaded
//! snapshot into a live pool is [`BanditPool::restore`](crate::bandit::BanditPool::restore).

pub mod error;
pub mod file;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod model;

pub use error::{StorageError, StorageResult};
pub use file::{FileArmStore, is_valid_scope};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockArmStore;
pub use model::{StoredArm, StoredPool};

use async_trait::async_trait;

use crate::bandit::PoolSnapshot;

#[async_trait]
/// Durable load/save of bandit pool state.
pub trait ArmStore: Send + Sync {
    /// Persists every arm of `snapshot` under `scope`, replacing the previous copy.
    async fn save_all(&self, scope: &str, snapshot: &PoolSnapshot) -> StorageResult<()>;

    /// Loads the snapshot saved under `scope`; `Ok(None)` if nothing was saved.
    ///
    /// Returns [`StorageError::CorruptSnapshot`] if data exists but is unreadable.
    async fn load_all(&self, scope: &str) -> StorageResult<Option<PoolSnapshot>>;

    /// Human-readable backend description for logs.
    fn describe(&self) -> String;
}
