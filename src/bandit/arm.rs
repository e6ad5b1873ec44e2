use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::prior::WarmStartPrior;

/// Identity of a trackable decision option.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArmId(String);

impl ArmId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Arm for routing `candidate` to `position`.
    pub fn candidate_position(candidate: &str, position: &str) -> Self {
        Self(format!("cp:{}:{}", candidate, position))
    }

    /// Arm for assigning `interviewer` to `candidate`.
    pub fn interviewer_candidate(interviewer: &str, candidate: &str) -> Self {
        Self(format!("ic:{}:{}", interviewer, candidate))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArmId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ArmId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Consistent copy of one arm's belief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BanditArm {
    pub id: ArmId,
    pub alpha: f64,
    pub beta: f64,
    pub pulls: u64,
    pub last_updated: DateTime<Utc>,
    /// Prior the arm was created with.
    pub prior: WarmStartPrior,
}

impl BanditArm {
    /// Posterior mean `alpha / (alpha + beta)`.
    pub fn expected_value(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    /// Successes recorded since creation.
    pub fn successes(&self) -> f64 {
        self.alpha - self.prior.alpha0
    }

    /// Failures recorded since creation.
    pub fn failures(&self) -> f64 {
        self.beta - self.prior.beta0
    }
}

/// Mutable per-arm record guarded by its own lock inside the pool.
#[derive(Debug, Clone)]
pub(crate) struct ArmState {
    pub alpha: f64,
    pub beta: f64,
    pub pulls: u64,
    pub last_updated: DateTime<Utc>,
    pub prior: WarmStartPrior,
    /// Set once an outcome was recorded in this process.
    pub touched: bool,
}

impl ArmState {
    pub fn from_prior(prior: WarmStartPrior) -> Self {
        Self {
            alpha: prior.alpha0,
            beta: prior.beta0,
            pulls: 0,
            last_updated: Utc::now(),
            prior,
            touched: false,
        }
    }

    pub fn record(&mut self, success: bool) {
        if success {
            self.alpha += 1.0;
        } else {
            self.beta += 1.0;
        }
        self.pulls += 1;
        self.last_updated = Utc::now();
        self.touched = true;
    }

    pub fn to_arm(&self, id: &ArmId) -> BanditArm {
        BanditArm {
            id: id.clone(),
            alpha: self.alpha,
            beta: self.beta,
            pulls: self.pulls,
            last_updated: self.last_updated,
            prior: self.prior,
        }
    }
}
