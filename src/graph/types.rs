use serde::Serialize;

use crate::profile::Category;

/// One text attribute with its embedding.
///
/// Owned by the graph-build call that produced it; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeNode {
    /// Attribute text as it appeared in the profile.
    pub text: String,
    /// Embedding returned by the gateway.
    pub embedding: Vec<f32>,
}

impl AttributeNode {
    pub fn new(text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            text: text.into(),
            embedding,
        }
    }
}

/// Candidate-side and role-side nodes of a single category.
///
/// No edges are stored: cross-set comparison happens in the scorer.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGraph {
    pub category: Category,
    pub candidate: Vec<AttributeNode>,
    pub role: Vec<AttributeNode>,
}

impl CategoryGraph {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            candidate: Vec::new(),
            role: Vec::new(),
        }
    }

    /// Returns `true` when either side has no nodes (category cannot be scored).
    pub fn is_one_sided(&self) -> bool {
        self.candidate.is_empty() || self.role.is_empty()
    }
}

/// Which profile an attribute came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Candidate,
    Role,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Candidate => f.write_str("candidate"),
            Side::Role => f.write_str("role"),
        }
    }
}

/// An attribute left out of its category graph because embedding failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedAttribute {
    pub category: Category,
    pub side: Side,
    pub text: String,
    pub reason: String,
}

/// Degradation report for one build. Empty means every attribute was embedded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildReport {
    pub dropped: Vec<DroppedAttribute>,
    /// Distinct texts sent to the gateway.
    pub embedded: usize,
}

impl BuildReport {
    /// Returns `true` if any attribute was dropped.
    pub fn is_degraded(&self) -> bool {
        !self.dropped.is_empty()
    }
}

/// Output of [`super::GraphBuilder::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltGraph {
    pub graphs: Vec<CategoryGraph>,
    pub report: BuildReport,
}
