use thiserror::Error;

use crate::bandit::BanditError;
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("store error: {0}")]
    Store(#[from] StorageError),

    #[error("snapshot rejected: {0}")]
    Snapshot(#[from] BanditError),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
