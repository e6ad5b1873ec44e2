use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ScoringError;
use crate::profile::Category;

/// Per-category weights used to combine category similarities.
///
/// Categories without a weight (or with weight 0) never count towards the
/// final score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryWeights {
    weights: BTreeMap<Category, f64>,
}

impl CategoryWeights {
    /// Weight 1.0 for every known category.
    pub fn equal() -> Self {
        Self {
            weights: Category::ALL.iter().map(|c| (*c, 1.0)).collect(),
        }
    }

    /// No weights at all (every category excluded until set).
    pub fn empty() -> Self {
        Self {
            weights: BTreeMap::new(),
        }
    }

    /// Sets the weight for `category`. Negative and non-finite weights become 0.
    pub fn set(mut self, category: Category, weight: f64) -> Self {
        let weight = if weight.is_finite() { weight.max(0.0) } else { 0.0 };
        self.weights.insert(category, weight);
        self
    }

    /// Weight for `category` (0 if unset).
    pub fn get(&self, category: Category) -> f64 {
        self.weights
            .get(&category)
            .copied()
            .filter(|w| w.is_finite())
            .map_or(0.0, |w| w.max(0.0))
    }

    /// Iterates over explicitly set weights.
    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.weights.iter().map(|(c, w)| (*c, *w))
    }

    /// Parses `"skills=2,experience=1.5,education=1"`.
    pub fn parse(s: &str) -> Result<Self, ScoringError> {
        s.parse()
    }
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self::equal()
    }
}

impl FromStr for CategoryWeights {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut weights = Self::empty();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| ScoringError::InvalidWeight {
                    entry: entry.to_string(),
                    reason: "expected category=weight".to_string(),
                })?;
            let category: Category =
                key.parse()
                    .map_err(|reason: String| ScoringError::InvalidWeight {
                        entry: entry.to_string(),
                        reason,
                    })?;
            let weight: f64 = value
                .trim()
                .parse()
                .map_err(|e: std::num::ParseFloatError| ScoringError::InvalidWeight {
                    entry: entry.to_string(),
                    reason: e.to_string(),
                })?;
            if !weight.is_finite() || weight < 0.0 {
                return Err(ScoringError::InvalidWeight {
                    entry: entry.to_string(),
                    reason: "weight must be a finite, non-negative number".to_string(),
                });
            }
            weights = weights.set(category, weight);
        }
        Ok(weights)
    }
}

/// How one category fed into a [`SimilarityScore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryContribution {
    /// Category similarity in `[0, 1]` (0 when not scored).
    pub similarity: f64,
    /// Configured weight.
    pub weight: f64,
    /// Share of the final score: `weight * similarity / total_weight`.
    pub contribution: f64,
    /// Role-side node count.
    pub role_nodes: usize,
    /// Candidate-side node count.
    pub candidate_nodes: usize,
    /// `false` when the category was excluded from the weighted denominator.
    pub counted: bool,
}

/// Bounded match score between a candidate and a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    /// Final score in `[0, 1]`.
    pub value: f64,
    /// Per-category detail.
    pub breakdown: BTreeMap<Category, CategoryContribution>,
}

impl SimilarityScore {
    /// A zero score with no breakdown (empty profiles).
    pub fn zero() -> Self {
        Self {
            value: 0.0,
            breakdown: BTreeMap::new(),
        }
    }

    /// Contribution for `category`, if it appeared in either profile.
    pub fn category(&self, category: Category) -> Option<&CategoryContribution> {
        self.breakdown.get(&category)
    }
}

impl std::fmt::Display for SimilarityScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}", self.value)?;
        for (category, c) in &self.breakdown {
            if c.counted {
                write!(f, " {}={:.3}", category, c.similarity)?;
            }
        }
        Ok(())
    }
}
