use std::path::PathBuf;
use std::sync::Arc;

use crate::engine::MatchEngine;
use crate::lifecycle::LifecycleManager;

#[derive(Clone)]
pub struct HandlerState {
    pub engine: Arc<MatchEngine>,

    /// Absent when the service runs without persistence.
    pub lifecycle: Option<Arc<LifecycleManager>>,

    pub storage_path: PathBuf,
}

impl HandlerState {
    pub fn new(
        engine: Arc<MatchEngine>,
        lifecycle: Option<Arc<LifecycleManager>>,
        storage_path: PathBuf,
    ) -> Self {
        Self {
            engine,
            lifecycle,
            storage_path,
        }
    }

    pub fn is_durability_degraded(&self) -> bool {
        self.lifecycle
            .as_ref()
            .is_some_and(|l| l.is_durability_degraded())
    }

    pub fn is_shutting_down(&self) -> bool {
        self.lifecycle
            .as_ref()
            .is_some_and(|l| l.is_shutdown_initiated())
    }
}
