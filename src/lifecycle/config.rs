use std::env;
use std::time::Duration;

use super::error::{LifecycleError, LifecycleResult};
use crate::constants::DEFAULT_POOL_SCOPE;

/// Default period between background snapshots.
pub const DEFAULT_SNAPSHOT_INTERVAL_SECS: u64 = 60;
/// Default number of save attempts before reporting degraded durability.
pub const DEFAULT_SAVE_RETRIES: u32 = 3;
/// Default initial backoff between save attempts (doubles each retry).
pub const DEFAULT_SAVE_BACKOFF_MS: u64 = 250;
/// Default timeout applied to every store call.
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone)]
/// Lifecycle configuration for hydration, dehydration and periodic snapshots.
pub struct LifecycleConfig {
    /// Store key the pool is saved under.
    pub scope: String,
    /// Period of the background snapshot task.
    pub snapshot_interval: Duration,
    /// Total save attempts per dehydration (at least 1).
    pub save_retries: u32,
    /// Backoff before the second attempt; doubled for each later attempt.
    pub save_backoff: Duration,
    /// Timeout applied to each `save_all`/`load_all` call.
    pub store_timeout: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            scope: DEFAULT_POOL_SCOPE.to_string(),
            snapshot_interval: Duration::from_secs(DEFAULT_SNAPSHOT_INTERVAL_SECS),
            save_retries: DEFAULT_SAVE_RETRIES,
            save_backoff: Duration::from_millis(DEFAULT_SAVE_BACKOFF_MS),
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
        }
    }
}

impl LifecycleConfig {
    const ENV_SNAPSHOT_INTERVAL_SECS: &'static str = "AFFINITY_SNAPSHOT_INTERVAL_SECS";
    const ENV_SAVE_RETRIES: &'static str = "AFFINITY_SAVE_RETRIES";
    const ENV_SAVE_BACKOFF_MS: &'static str = "AFFINITY_SAVE_BACKOFF_MS";
    const ENV_STORE_TIMEOUT_MS: &'static str = "AFFINITY_STORE_TIMEOUT_MS";

    /// Loads config from environment variables (with defaults).
    pub fn from_env() -> LifecycleResult<Self> {
        let defaults = Self::default();

        let snapshot_interval = env::var(Self::ENV_SNAPSHOT_INTERVAL_SECS)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.snapshot_interval);
        let save_retries = env::var(Self::ENV_SAVE_RETRIES)
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(defaults.save_retries);
        let save_backoff = env::var(Self::ENV_SAVE_BACKOFF_MS)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.save_backoff);
        let store_timeout = env::var(Self::ENV_STORE_TIMEOUT_MS)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.store_timeout);

        let config = Self {
            scope: defaults.scope,
            snapshot_interval,
            save_retries,
            save_backoff,
            store_timeout,
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the store scope.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn validate(&self) -> LifecycleResult<()> {
        if self.save_retries == 0 {
            return Err(LifecycleError::Config(
                "save_retries must be at least 1".to_string(),
            ));
        }
        if self.snapshot_interval.is_zero() {
            return Err(LifecycleError::Config(
                "snapshot_interval must be non-zero".to_string(),
            ));
        }
        if self.store_timeout.is_zero() {
            return Err(LifecycleError::Config(
                "store_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Backoff before attempt `attempt` (1-based; attempt 1 has none).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        self.save_backoff
            .saturating_mul(1u32 << (attempt - 2).min(16))
    }

    #[cfg(any(test, feature = "mock"))]
    pub fn for_testing(scope: &str) -> Self {
        Self {
            scope: scope.to_string(),
            snapshot_interval: Duration::from_millis(20),
            save_retries: 3,
            save_backoff: Duration::from_millis(1),
            store_timeout: Duration::from_millis(500),
        }
    }
}
