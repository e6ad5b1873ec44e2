//! On-disk snapshot model.

use chrono::DateTime;
use rkyv::{Archive, Deserialize, Serialize};

use crate::bandit::{ArmId, ArmRecord, PoolSnapshot};

/// One arm as archived by [`super::FileArmStore`].
#[derive(Archive, Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct StoredArm {
    pub id: String,
    pub alpha: f64,
    pub beta: f64,
    pub pulls: u64,
    /// Unix timestamp (milliseconds) of the last update.
    pub last_updated_ms: i64,
    pub alpha0: f64,
    pub beta0: f64,
}

/// Whole-pool archive for one scope.
#[derive(Archive, Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct StoredPool {
    pub version: u32,
    pub scope: String,
    /// Unix timestamp (milliseconds) when the archive was written.
    pub saved_at_ms: i64,
    pub arms: Vec<StoredArm>,
}

impl StoredPool {
    pub fn from_snapshot(scope: &str, snapshot: &PoolSnapshot, saved_at_ms: i64) -> Self {
        Self {
            version: snapshot.version,
            scope: scope.to_string(),
            saved_at_ms,
            arms: snapshot
                .arms
                .iter()
                .map(|(id, r)| StoredArm {
                    id: id.as_str().to_string(),
                    alpha: r.alpha,
                    beta: r.beta,
                    pulls: r.pulls,
                    last_updated_ms: r.last_updated.timestamp_millis(),
                    alpha0: r.alpha0,
                    beta0: r.beta0,
                })
                .collect(),
        }
    }

    /// Converts back; fails on an unrepresentable timestamp.
    pub fn into_snapshot(self) -> Result<PoolSnapshot, String> {
        let mut snapshot = PoolSnapshot::new();
        snapshot.version = self.version;
        for arm in self.arms {
            let last_updated = DateTime::from_timestamp_millis(arm.last_updated_ms)
                .ok_or_else(|| format!("arm {} has invalid timestamp", arm.id))?;
            snapshot.arms.insert(
                ArmId::new(arm.id),
                ArmRecord {
                    alpha: arm.alpha,
                    beta: arm.beta,
                    pulls: arm.pulls,
                    last_updated,
                    alpha0: arm.alpha0,
                    beta0: arm.beta0,
                },
            );
        }
        Ok(snapshot)
    }
}
