use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};

use super::config::LifecycleConfig;
use super::error::LifecycleResult;
use super::types::{DehydrationResult, HydrationResult};
use crate::bandit::{BanditPool, PoolSnapshot};
use crate::storage::{ArmStore, StorageError, StorageResult};

/// Moves a [`BanditPool`] between memory and an [`ArmStore`].
///
/// Hydration happens once at startup, dehydration periodically and at
/// shutdown. Store failures degrade durability but never take the pool down.
pub struct LifecycleManager {
    config: LifecycleConfig,
    pool: Arc<BanditPool>,
    store: Arc<dyn ArmStore>,
    durability_degraded: AtomicBool,
    shutdown_initiated: AtomicBool,
    snapshot_running: AtomicBool,
    stop: Notify,
}

impl LifecycleManager {
    pub fn new(config: LifecycleConfig, pool: Arc<BanditPool>, store: Arc<dyn ArmStore>) -> Self {
        Self {
            config,
            pool,
            store,
            durability_degraded: AtomicBool::new(false),
            shutdown_initiated: AtomicBool::new(false),
            snapshot_running: AtomicBool::new(false),
            stop: Notify::new(),
        }
    }

    /// Returns the active config.
    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn pool(&self) -> &Arc<BanditPool> {
        &self.pool
    }

    /// Returns `true` if the last dehydration exhausted its retries.
    pub fn is_durability_degraded(&self) -> bool {
        // Acquire: pairs with the Release store in dehydrate()
        self.durability_degraded.load(Ordering::Acquire)
    }

    /// Returns `true` if shutdown has been initiated.
    pub fn is_shutdown_initiated(&self) -> bool {
        // Acquire: ensures we see all writes that happened before the Release store
        // that set this flag to true
        self.shutdown_initiated.load(Ordering::Acquire)
    }

    async fn load_once(&self) -> StorageResult<Option<PoolSnapshot>> {
        let timeout = self.config.store_timeout;
        time::timeout(timeout, self.store.load_all(&self.config.scope))
            .await
            .map_err(|_| StorageError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            })?
    }

    async fn save_once(&self, snapshot: &PoolSnapshot) -> StorageResult<()> {
        let timeout = self.config.store_timeout;
        time::timeout(timeout, self.store.save_all(&self.config.scope, snapshot))
            .await
            .map_err(|_| StorageError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            })?
    }

    /// Loads the configured scope and merges it into the pool.
    ///
    /// An unreachable store leaves the pool cold and reports
    /// [`HydrationResult::Unavailable`]; corrupt data is an error.
    pub async fn hydrate(&self) -> LifecycleResult<HydrationResult> {
        let snapshot = match self.load_once().await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                info!(scope = %self.config.scope, "No saved pool state; starting cold");
                return Ok(HydrationResult::NotFound);
            }
            Err(e) if e.is_transient() => {
                warn!(
                    scope = %self.config.scope,
                    store = %self.store.describe(),
                    error = %e,
                    "State store unavailable; starting with a cold pool"
                );
                return Ok(HydrationResult::Unavailable {
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let report = self.pool.restore(&snapshot)?;
        info!(
            scope = %self.config.scope,
            arms = snapshot.len(),
            "Pool hydrated"
        );
        Ok(HydrationResult::Restored { report })
    }

    /// Snapshots the pool and saves it, retrying with exponential backoff.
    ///
    /// Exhausted retries set the degraded flag and return
    /// [`DehydrationResult::Degraded`]; the next successful save clears it.
    pub async fn dehydrate(&self) -> LifecycleResult<DehydrationResult> {
        let snapshot = self.pool.snapshot();
        let arms = snapshot.len();
        let attempts = self.config.save_retries.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            let backoff = self.config.backoff_for(attempt);
            if !backoff.is_zero() {
                time::sleep(backoff).await;
            }

            match self.save_once(&snapshot).await {
                Ok(()) => {
                    // AcqRel: read the previous state and publish the recovery
                    if self.durability_degraded.swap(false, Ordering::AcqRel) {
                        info!(scope = %self.config.scope, "Durability restored");
                    }
                    debug!(scope = %self.config.scope, arms, attempt, "Pool saved");
                    return Ok(DehydrationResult::Saved { arms });
                }
                Err(e) if e.is_transient() => {
                    warn!(
                        scope = %self.config.scope,
                        attempt,
                        max_attempts = attempts,
                        error = %e,
                        "Pool save failed"
                    );
                    last_error = e.to_string();
                }
                Err(e) => {
                    // Release: a save that can never succeed still degrades durability
                    self.durability_degraded.store(true, Ordering::Release);
                    error!(
                        scope = %self.config.scope,
                        attempt,
                        error = %e,
                        "Pool save failed permanently; durability degraded"
                    );
                    return Err(e.into());
                }
            }
        }

        // Release: makes the failed attempts visible to is_durability_degraded()
        self.durability_degraded.store(true, Ordering::Release);
        warn!(
            scope = %self.config.scope,
            attempts,
            error = %last_error,
            "Pool save retries exhausted; durability degraded"
        );
        Ok(DehydrationResult::Degraded {
            attempts,
            reason: last_error,
        })
    }

    /// Starts the periodic snapshot task (no-op if already running).
    pub fn start_snapshot_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        // AcqRel: swap needs both load and store semantics to ensure only one
        // snapshot task starts
        if self.is_shutdown_initiated() || self.snapshot_running.swap(true, Ordering::AcqRel) {
            return tokio::spawn(async {});
        }

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let period = manager.config.snapshot_interval;
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    _ = manager.stop.notified() => break,
                }
                if manager.is_shutdown_initiated() {
                    break;
                }
                if let Err(e) = manager.dehydrate().await {
                    warn!(error = %e, "Periodic snapshot failed");
                }
            }
            debug!("Snapshot task stopped");
            // Release: a later start_snapshot_task() with Acquire sees the task has ended
            manager.snapshot_running.store(false, Ordering::Release);
        })
    }

    /// Stops the snapshot task and runs one final dehydration.
    ///
    /// Idempotent: returns `Ok(None)` if shutdown already ran.
    pub async fn shutdown(&self) -> LifecycleResult<Option<DehydrationResult>> {
        // AcqRel: swap needs both semantics - Acquire to see if already shut down,
        // Release to publish shutdown state so the snapshot task sees it
        if self.shutdown_initiated.swap(true, Ordering::AcqRel) {
            return Ok(None);
        }
        self.stop.notify_waiters();
        self.dehydrate().await.map(Some)
    }
}

impl std::fmt::Debug for LifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("config", &self.config)
            .field("store", &self.store.describe())
            .field("degraded", &self.is_durability_degraded())
            .finish()
    }
}
