//! Test fixtures for integration tests.

use std::sync::Arc;

use affinity::{Category, HashingEmbedder, MatchEngine, MockEmbedder, Profile};

pub const DEFAULT_CONFIDENCE: f64 = 10.0;

/// Candidate from the reference matching scenario.
pub fn ml_candidate() -> Profile {
    Profile::new("ml-candidate")
        .with(Category::Skills, ["Python", "CUDA"])
        .with(Category::Experience, ["ML Engineer"])
        .with(Category::Education, ["CS"])
}

/// Role overlapping [`ml_candidate`] in every category.
pub fn ml_role() -> Profile {
    Profile::new("ml-role")
        .with(Category::Skills, ["Python", "PyTorch"])
        .with(Category::Experience, ["ML"])
        .with(Category::Education, ["CS"])
}

/// Role sharing nothing with [`ml_candidate`].
pub fn disjoint_role() -> Profile {
    Profile::new("finance-role")
        .with(Category::Skills, ["Bookkeeping", "Tax law"])
        .with(Category::Experience, ["Auditor"])
        .with(Category::Education, ["Accountancy"])
}

/// Assorted pairs, including empty and one-sided profiles.
pub fn profile_pairs() -> Vec<(Profile, Profile)> {
    let empty = Profile::new("empty");
    let skills_only = Profile::new("skills").with(Category::Skills, ["Rust", "Tokio", "gRPC"]);
    let languages = Profile::new("langs")
        .with(Category::Languages, ["English", "German"])
        .with(Category::Certifications, ["AWS Solutions Architect"]);

    vec![
        (ml_candidate(), ml_role()),
        (ml_candidate(), disjoint_role()),
        (ml_role(), ml_candidate()),
        (empty.clone(), empty.clone()),
        (empty.clone(), ml_role()),
        (ml_candidate(), empty),
        (skills_only.clone(), ml_role()),
        (languages.clone(), skills_only),
        (languages.clone(), languages),
    ]
}

pub fn hashing_engine() -> MatchEngine {
    MatchEngine::new(Arc::new(HashingEmbedder::new())).with_confidence(DEFAULT_CONFIDENCE)
}

/// Unit vector at `angle` radians in the plane of the first two axes.
pub fn unit_at(angle: f32) -> Vec<f32> {
    vec![angle.cos(), angle.sin(), 0.0]
}

pub fn pinned_embedder(pins: &[(&str, Vec<f32>)]) -> Arc<MockEmbedder> {
    let embedder = MockEmbedder::new();
    for (text, vector) in pins {
        embedder.insert(text, vector.clone());
    }
    Arc::new(embedder)
}
