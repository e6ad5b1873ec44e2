//! Pool persistence lifecycle (hydrate at startup, periodic and final dehydrate).

pub mod config;
pub mod error;
pub mod manager;
pub mod types;


pub use config::{
    DEFAULT_SAVE_BACKOFF_MS, DEFAULT_SAVE_RETRIES, DEFAULT_SNAPSHOT_INTERVAL_SECS,
    DEFAULT_STORE_TIMEOUT_MS, LifecycleConfig,
};
pub use error::{LifecycleError, LifecycleResult};
pub use manager::LifecycleManager;
pub use types::{DehydrationResult, HydrationResult};
