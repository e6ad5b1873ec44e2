use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::{StorageError, StorageResult};
use super::ArmStore;
use crate::bandit::PoolSnapshot;

/// In-memory [`ArmStore`] with injectable failures.
#[derive(Default)]
pub struct MockArmStore {
    snapshots: RwLock<HashMap<String, PoolSnapshot>>,
    failing_saves: AtomicUsize,
    loads_unavailable: AtomicBool,
    loads_corrupt: AtomicBool,
    save_calls: AtomicUsize,
    delay: RwLock<Duration>,
}

impl MockArmStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the next `n` saves with [`StorageError::Unavailable`].
    pub fn fail_next_saves(&self, n: usize) {
        self.failing_saves.store(n, Ordering::SeqCst);
    }

    /// Makes loads fail with [`StorageError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.loads_unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes loads fail with [`StorageError::CorruptSnapshot`].
    pub fn set_corrupt(&self, corrupt: bool) {
        self.loads_corrupt.store(corrupt, Ordering::SeqCst);
    }

    /// Delays every call by `delay` (for timeout tests).
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.write() = delay;
    }

    async fn wait(&self) {
        let delay = *self.delay.read();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Seeds a snapshot directly.
    pub fn insert(&self, scope: &str, snapshot: PoolSnapshot) {
        self.snapshots.write().insert(scope.to_string(), snapshot);
    }

    /// Last saved snapshot for `scope`.
    pub fn get(&self, scope: &str) -> Option<PoolSnapshot> {
        self.snapshots.read().get(scope).cloned()
    }

    /// Number of `save_all` calls, including failed ones.
    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArmStore for MockArmStore {
    async fn save_all(&self, scope: &str, snapshot: &PoolSnapshot) -> StorageResult<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        self.wait().await;

        let should_fail = self
            .failing_saves
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(StorageError::Unavailable("mock save failure".to_string()));
        }

        self.insert(scope, snapshot.clone());
        Ok(())
    }

    async fn load_all(&self, scope: &str) -> StorageResult<Option<PoolSnapshot>> {
        self.wait().await;
        if self.loads_unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("mock store offline".to_string()));
        }
        if self.loads_corrupt.load(Ordering::SeqCst) {
            return Err(StorageError::CorruptSnapshot {
                location: format!("mock:{}", scope),
                reason: "injected corruption".to_string(),
            });
        }
        Ok(self.get(scope))
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
