use serde::{Deserialize, Serialize};
use tracing::warn;

/// Initial `(alpha0, beta0)` for a new arm.
///
/// Derived once from a similarity score `s` and a pseudo-count `c`:
/// `alpha0 = 1 + s*c`, `beta0 = 1 + (1-s)*c`. Both are always `>= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WarmStartPrior {
    pub alpha0: f64,
    pub beta0: f64,
}

impl WarmStartPrior {
    /// Uniform `Beta(1, 1)`.
    pub const fn cold() -> Self {
        Self {
            alpha0: 1.0,
            beta0: 1.0,
        }
    }

    /// Maps a similarity score to a prior worth `confidence` virtual trials.
    ///
    /// Scores outside `[0, 1]` are clamped; a non-finite score yields the cold
    /// prior. Negative or non-finite confidence is treated as 0.
    pub fn derive(similarity: f64, confidence: f64) -> Self {
        if !similarity.is_finite() {
            warn!(similarity, "Non-finite similarity score; using cold prior");
            return Self::cold();
        }
        let s = similarity.clamp(0.0, 1.0);
        let c = if confidence.is_finite() {
            confidence.max(0.0)
        } else {
            0.0
        };

        Self {
            alpha0: 1.0 + s * c,
            beta0: 1.0 + (1.0 - s) * c,
        }
    }

    /// Returns `true` for the uniform prior.
    pub fn is_cold(&self) -> bool {
        self.alpha0 == 1.0 && self.beta0 == 1.0
    }

    /// Prior mean `alpha0 / (alpha0 + beta0)`.
    pub fn mean(&self) -> f64 {
        self.alpha0 / (self.alpha0 + self.beta0)
    }
}

impl Default for WarmStartPrior {
    fn default() -> Self {
        Self::cold()
    }
}
