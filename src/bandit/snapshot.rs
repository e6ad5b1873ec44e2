use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::arm::{ArmId, BanditArm};
use super::error::BanditError;
use super::prior::WarmStartPrior;
use crate::constants::SNAPSHOT_FORMAT_VERSION;

fn default_prior_param() -> f64 {
    1.0
}

/// Persisted form of one arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmRecord {
    pub alpha: f64,
    pub beta: f64,
    pub pulls: u64,
    pub last_updated: DateTime<Utc>,
    #[serde(default = "default_prior_param")]
    pub alpha0: f64,
    #[serde(default = "default_prior_param")]
    pub beta0: f64,
}

impl ArmRecord {
    pub fn from_arm(arm: &BanditArm) -> Self {
        Self {
            alpha: arm.alpha,
            beta: arm.beta,
            pulls: arm.pulls,
            last_updated: arm.last_updated,
            alpha0: arm.prior.alpha0,
            beta0: arm.prior.beta0,
        }
    }

    pub fn prior(&self) -> WarmStartPrior {
        WarmStartPrior {
            alpha0: self.alpha0,
            beta0: self.beta0,
        }
    }

    fn is_valid(&self) -> bool {
        [self.alpha, self.beta, self.alpha0, self.beta0]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }
}

/// Point-in-time copy of a whole pool: arm identity → record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub version: u32,
    pub arms: BTreeMap<ArmId, ArmRecord>,
}

impl PoolSnapshot {
    pub fn new() -> Self {
        Self {
            version: SNAPSHOT_FORMAT_VERSION,
            arms: BTreeMap::new(),
        }
    }

    pub fn from_arms(arms: impl IntoIterator<Item = BanditArm>) -> Self {
        Self {
            version: SNAPSHOT_FORMAT_VERSION,
            arms: arms
                .into_iter()
                .map(|arm| (arm.id.clone(), ArmRecord::from_arm(&arm)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.arms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    /// Rejects unknown versions and non-positive or non-finite parameters.
    pub fn validate(&self) -> Result<(), BanditError> {
        if self.version != SNAPSHOT_FORMAT_VERSION {
            return Err(BanditError::InvalidSnapshot {
                reason: format!(
                    "unsupported snapshot version {} (expected {})",
                    self.version, SNAPSHOT_FORMAT_VERSION
                ),
            });
        }
        if let Some((id, _)) = self.arms.iter().find(|(_, r)| !r.is_valid()) {
            return Err(BanditError::InvalidSnapshot {
                reason: format!("arm {} has non-positive Beta parameters", id),
            });
        }
        Ok(())
    }

    /// Serializes to the JSON exchange format.
    pub fn to_json(&self) -> Result<String, BanditError> {
        serde_json::to_string(self).map_err(|e| BanditError::InvalidSnapshot {
            reason: e.to_string(),
        })
    }

    /// Parses and validates the JSON exchange format.
    pub fn from_json(json: &str) -> Result<Self, BanditError> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| BanditError::InvalidSnapshot {
                reason: e.to_string(),
            })?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

impl Default for PoolSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of merging a snapshot into a live pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    /// Arms that did not exist in memory.
    pub inserted: usize,
    /// In-memory arms with no outcomes yet, replaced by the loaded values.
    pub overwritten: usize,
    /// In-memory arms that had already learned; loaded values ignored.
    pub kept_fresher: usize,
}
