//! End-to-end matching scenario: score, warm start, select, learn.

mod common;

use affinity::{ArmId, Category};
use common::fixtures::{disjoint_role, hashing_engine, ml_candidate, ml_role};

#[tokio::test]
async fn test_overlapping_role_beats_disjoint_role() {
    let engine = hashing_engine();
    let candidate = ml_candidate();

    let matching = engine
        .compute_match_score(&candidate, &ml_role(), None)
        .await;
    let disjoint = engine
        .compute_match_score(&candidate, &disjoint_role(), None)
        .await;

    assert!(
        matching.value > disjoint.value,
        "matching {} <= disjoint {}",
        matching,
        disjoint
    );
    let education = matching.category(Category::Education).unwrap().similarity;
    assert!((education - 1.0).abs() < 1e-6);
    assert_eq!(engine.compute_match_score(&candidate, &ml_role(), None).await, matching);
}

#[tokio::test]
async fn test_warm_started_arms_follow_scores() {
    let engine = hashing_engine();
    let candidate = ml_candidate();
    let good = ArmId::candidate_position("ml-candidate", "ml-role");
    let poor = ArmId::candidate_position("ml-candidate", "finance-role");

    let (good_arm, good_score) = engine
        .initialize_arm_from_profiles(&good, &candidate, &ml_role(), None)
        .await;
    let (poor_arm, poor_score) = engine
        .initialize_arm_from_profiles(&poor, &candidate, &disjoint_role(), None)
        .await;

    assert!(good_score.value > poor_score.value);
    assert!(good_arm.expected_value() > poor_arm.expected_value());
    assert!((good_arm.alpha - (1.0 + good_score.value * 10.0)).abs() < 1e-9);
    assert!((good_arm.beta - (1.0 + (1.0 - good_score.value) * 10.0)).abs() < 1e-9);

    // Feedback can overturn the prior
    for _ in 0..60 {
        engine.record_outcome(&good, false);
        engine.record_outcome(&poor, true);
    }
    let candidates = [good.clone(), poor.clone()];
    let poor_wins = (0..200)
        .filter(|_| engine.choose_best_arm(&candidates).unwrap() == poor)
        .count();
    assert!(poor_wins > 190);
}
