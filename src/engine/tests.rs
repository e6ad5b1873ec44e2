use super::*;
use crate::embedding::MockEmbedder;
use crate::profile::Category;

fn engine_with(embedder: MockEmbedder) -> MatchEngine {
    MatchEngine::new(Arc::new(embedder))
}

fn pinned() -> MockEmbedder {
    let embedder = MockEmbedder::new();
    embedder.insert("Python", vec![1.0, 0.0, 0.0]);
    embedder.insert("CUDA", vec![0.0, 1.0, 0.0]);
    embedder.insert("PhD", vec![0.0, 0.0, 1.0]);
    embedder.insert("MSc", vec![0.0, 0.6, 0.8]);
    embedder
}

#[tokio::test]
async fn test_identical_profiles_score_one() {
    let engine = engine_with(pinned());
    let profile = Profile::new("p").with(Category::Skills, ["Python"]);

    let score = engine.compute_match_score(&profile, &profile, None).await;

    assert!((score.value - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_weights_override_defaults() {
    let engine = engine_with(pinned());
    let candidate = Profile::new("c")
        .with(Category::Skills, ["Python"])
        .with(Category::Education, ["MSc"]);
    let role = Profile::new("r")
        .with(Category::Skills, ["Python"])
        .with(Category::Education, ["PhD"]);

    let equal = engine.compute_match_score(&candidate, &role, None).await;
    assert!((equal.value - 0.9).abs() < 1e-6);

    let skills_only = CategoryWeights::empty().set(Category::Skills, 1.0);
    let score = engine
        .compute_match_score(&candidate, &role, Some(&skills_only))
        .await;
    assert!((score.value - 1.0).abs() < 1e-9);
    assert!(!score.category(Category::Education).unwrap().counted);
}

#[tokio::test]
async fn test_failed_attribute_reported_not_raised() {
    let embedder = pinned();
    embedder.fail_on("CUDA");
    let engine = engine_with(embedder);
    let candidate = Profile::new("c").with(Category::Skills, ["Python", "CUDA"]);
    let role = Profile::new("r").with(Category::Skills, ["Python"]);

    let result = engine.compute_match(&candidate, &role, None).await;

    assert!(result.report.is_degraded());
    assert_eq!(result.report.dropped[0].text, "CUDA");
    assert!((result.score.value - 1.0).abs() < 1e-9);
}

#[test]
fn test_initialize_arm_warm_and_cold() {
    let engine = engine_with(MockEmbedder::new());

    let warm = engine.initialize_arm(&ArmId::new("warm"), Some(0.8));
    assert!((warm.alpha - 9.0).abs() < 1e-12);
    assert!((warm.beta - 3.0).abs() < 1e-12);

    let cold = engine.initialize_arm(&ArmId::new("cold"), None);
    assert_eq!((cold.alpha, cold.beta, cold.pulls), (1.0, 1.0, 0));
}

#[test]
fn test_confidence_zero_is_cold() {
    let engine = engine_with(MockEmbedder::new()).with_confidence(0.0);

    let arm = engine.initialize_arm(&ArmId::new("a"), Some(0.95));

    assert!(arm.prior.is_cold());
}

#[tokio::test]
async fn test_initialize_arm_from_profiles() {
    let engine = engine_with(pinned());
    let profile = Profile::new("p").with(Category::Skills, ["Python"]);
    let id = ArmId::candidate_position("c1", "p1");

    let (arm, score) = engine
        .initialize_arm_from_profiles(&id, &profile, &profile, None)
        .await;

    assert!((score.value - 1.0).abs() < 1e-9);
    assert!((arm.alpha - 11.0).abs() < 1e-9);
    assert!((arm.beta - 1.0).abs() < 1e-9);
    assert_eq!(engine.get_arm(&id), Some(arm));
}

#[test]
fn test_choose_best_arm_empty() {
    let engine = engine_with(MockEmbedder::new());
    assert!(matches!(
        engine.choose_best_arm(&[]),
        Err(BanditError::NoCandidates)
    ));
}

#[test]
fn test_record_outcome_unknown_arm_self_heals() {
    let engine = engine_with(MockEmbedder::new());

    let arm = engine.record_outcome(&ArmId::new("new"), false);

    assert_eq!((arm.alpha, arm.beta, arm.pulls), (1.0, 2.0, 1));
}

#[test]
fn test_export_import_round_trip() {
    let engine = engine_with(MockEmbedder::new());
    engine.initialize_arm(&ArmId::new("a"), Some(0.3));
    engine.record_outcome(&ArmId::new("a"), true);
    engine.record_outcome(&ArmId::new("b"), false);

    let json = engine.export_pool_state().unwrap();

    let restored = engine_with(MockEmbedder::new());
    let report = restored.import_pool_state(&json).unwrap();
    assert_eq!(report.inserted, 2);

    for id in ["a", "b"] {
        let id = ArmId::new(id);
        let before = engine.get_arm(&id).unwrap();
        let after = restored.get_arm(&id).unwrap();
        assert_eq!(
            (before.alpha, before.beta, before.pulls),
            (after.alpha, after.beta, after.pulls)
        );
    }
}

#[test]
fn test_import_rejects_garbage() {
    let engine = engine_with(MockEmbedder::new());
    assert!(engine.import_pool_state("{").is_err());
    assert!(engine.pool().is_empty());
}

#[test]
fn test_from_config_rejects_zero_top_k() {
    let config = Config {
        top_k: 0,
        ..Config::default()
    };
    assert!(MatchEngine::from_config(&config, Arc::new(MockEmbedder::new())).is_err());
}

#[test]
fn test_shared_pool() {
    let pool = Arc::new(BanditPool::new());
    let engine = engine_with(MockEmbedder::new()).with_pool(Arc::clone(&pool));

    engine.record_outcome(&ArmId::new("x"), true);

    assert!(pool.contains(&ArmId::new("x")));
}
