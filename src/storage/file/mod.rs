//! File-backed arm store (one rkyv archive per scope).


use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use rkyv::rancor::Error as RkyvError;
use rkyv::util::AlignedVec;
use rkyv::{from_bytes, to_bytes};
use tracing::debug;

use super::error::{StorageError, StorageResult};
use super::model::StoredPool;
use super::ArmStore;
use crate::bandit::PoolSnapshot;

const ARCHIVE_EXTENSION: &str = "arms";

const TEMP_EXTENSION: &str = "arms.tmp";

#[derive(Debug, Clone)]
/// Stores each scope's pool at `<root>/<scope>.arms`.
///
/// Writes go to a temp file that is fsynced and renamed into place, so a crash
/// mid-write leaves the previous archive intact.
pub struct FileArmStore {
    storage_path: PathBuf,
}

impl FileArmStore {
    /// Creates a store rooted at `storage_path`.
    pub fn new(storage_path: PathBuf) -> Self {
        Self { storage_path }
    }

    /// Returns the root storage directory.
    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    /// Ensures the root storage directory exists.
    pub fn ensure_storage_path(&self) -> StorageResult<()> {
        if !self.storage_path.exists() {
            fs::create_dir_all(&self.storage_path).map_err(|_| {
                StorageError::StorageUnavailable {
                    path: self.storage_path.clone(),
                }
            })?;
        }
        Ok(())
    }

    fn archive_path(&self, scope: &str) -> StorageResult<PathBuf> {
        let scope = sanitize_scope(scope)?;
        Ok(self
            .storage_path
            .join(format!("{}.{}", scope, ARCHIVE_EXTENSION)))
    }

    fn temp_path(&self, scope: &str) -> StorageResult<PathBuf> {
        let scope = sanitize_scope(scope)?;
        Ok(self.storage_path.join(format!("{}.{}", scope, TEMP_EXTENSION)))
    }

    /// Writes `snapshot` for `scope` synchronously.
    pub fn write_snapshot(&self, scope: &str, snapshot: &PoolSnapshot) -> StorageResult<u64> {
        self.ensure_storage_path()?;

        let stored = StoredPool::from_snapshot(scope, snapshot, Utc::now().timestamp_millis());
        let bytes = to_bytes::<RkyvError>(&stored)
            .map_err(|e| StorageError::Serialization(format!("{:?}", e)))?;

        let temp_path = self.temp_path(scope)?;
        let final_path = self.archive_path(scope)?;

        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &final_path)?;
        debug!(
            path = %final_path.display(),
            arms = snapshot.len(),
            bytes = bytes.len(),
            "Snapshot written"
        );
        Ok(bytes.len() as u64)
    }

    /// Reads the snapshot for `scope` synchronously (`None` if absent).
    pub fn read_snapshot(&self, scope: &str) -> StorageResult<Option<PoolSnapshot>> {
        let path = self.archive_path(scope)?;
        if !path.exists() {
            return Ok(None);
        }

        let raw = fs::read(&path)?;
        let mut aligned = AlignedVec::<16>::with_capacity(raw.len());
        aligned.extend_from_slice(&raw);

        let corrupt = |reason: String| StorageError::CorruptSnapshot {
            location: path.display().to_string(),
            reason,
        };

        let stored = from_bytes::<StoredPool, RkyvError>(&aligned)
            .map_err(|e| corrupt(format!("{}", e)))?;

        if stored.scope != scope {
            return Err(corrupt(format!(
                "scope mismatch: expected {}, found {}",
                scope, stored.scope
            )));
        }

        let snapshot = stored.into_snapshot().map_err(corrupt)?;
        snapshot.validate().map_err(|e| corrupt(e.to_string()))?;
        Ok(Some(snapshot))
    }
}

/// Returns `true` if `scope` can name an archive file: 1-128 ASCII
/// alphanumerics, `-`, `_` or `.`, not starting with `.`.
pub fn is_valid_scope(scope: &str) -> bool {
    !scope.is_empty()
        && scope.len() <= 128
        && !scope.starts_with('.')
        && scope
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn sanitize_scope(scope: &str) -> StorageResult<&str> {
    if is_valid_scope(scope) {
        Ok(scope)
    } else {
        Err(StorageError::InvalidScope {
            scope: scope.to_string(),
        })
    }
}

#[async_trait]
impl ArmStore for FileArmStore {
    async fn save_all(&self, scope: &str, snapshot: &PoolSnapshot) -> StorageResult<()> {
        let store = self.clone();
        let scope = scope.to_string();
        let snapshot = snapshot.clone();

        tokio::task::spawn_blocking(move || store.write_snapshot(&scope, &snapshot))
            .await
            .map_err(|e| StorageError::Unavailable(format!("writer task failed: {}", e)))?
            .map(|_| ())
    }

    async fn load_all(&self, scope: &str) -> StorageResult<Option<PoolSnapshot>> {
        let store = self.clone();
        let scope = scope.to_string();

        tokio::task::spawn_blocking(move || store.read_snapshot(&scope))
            .await
            .map_err(|e| StorageError::Unavailable(format!("reader task failed: {}", e)))?
    }

    fn describe(&self) -> String {
        format!("file:{}", self.storage_path.display())
    }
}
