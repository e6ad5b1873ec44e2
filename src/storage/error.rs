use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
/// Errors returned by arm state stores.
pub enum StorageError {
    /// IO error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error while writing a snapshot.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Persisted snapshot exists but cannot be decoded or fails validation.
    #[error("corrupt snapshot at {location}: {reason}")]
    CorruptSnapshot {
        /// File path or store key.
        location: String,
        /// Decoder/validation message.
        reason: String,
    },

    /// Scope key that cannot be mapped to a storage location.
    #[error("invalid scope key '{scope}'")]
    InvalidScope {
        /// Offending scope.
        scope: String,
    },

    /// Storage root path is missing/unavailable.
    #[error("storage path unavailable: {path}")]
    StorageUnavailable {
        /// Path that was unavailable.
        path: PathBuf,
    },

    /// Backend is unreachable.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Backend call exceeded its timeout.
    #[error("store call timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout that elapsed.
        timeout_ms: u64,
    },
}

impl StorageError {
    /// Returns `true` for errors that mean "data is bad" rather than "store is down".
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StorageError::CorruptSnapshot { .. })
    }

    /// Returns `true` for errors worth retrying (backend down, slow, or I/O).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StorageError::Io(_)
                | StorageError::StorageUnavailable { .. }
                | StorageError::Unavailable(_)
                | StorageError::Timeout { .. }
        )
    }
}

/// Convenience result type for store operations.
pub type StorageResult<T> = Result<T, StorageError>;
