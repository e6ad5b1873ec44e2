//! Integration tests for warm-started Thompson sampling.

mod common;

use std::sync::Arc;

use affinity::{ArmId, BanditPool, WarmStartPrior};
use common::fixtures::{DEFAULT_CONFIDENCE, hashing_engine};
use rand::SeedableRng;
use rand::rngs::StdRng;

const WIN_THRESHOLD: f64 = 0.9;
const MAX_REPLAY: usize = 200;

/// Outcome stream with an 80% success rate.
fn outcome(step: usize) -> bool {
    step % 5 != 4
}

/// Outcomes needed before `arm` beats a fixed Beta(5, 5) reference arm with
/// probability `WIN_THRESHOLD`.
fn outcomes_to_threshold(prior: WarmStartPrior) -> usize {
    let pool = BanditPool::new();
    let arm = ArmId::new("arm");
    let reference = ArmId::new("reference");
    pool.initialize_arm(&arm, prior);
    pool.initialize_arm(&reference, WarmStartPrior::derive(0.5, 8.0));
    let mut rng = StdRng::seed_from_u64(42);

    for step in 0..MAX_REPLAY {
        let probs = pool
            .selection_probability(&[arm.clone(), reference.clone()], 4_000, &mut rng)
            .unwrap();
        if probs[0].1 >= WIN_THRESHOLD {
            return step;
        }
        pool.record_outcome(&arm, outcome(step));
    }
    MAX_REPLAY
}

#[test]
fn test_warm_start_reaches_threshold_sooner() {
    let warm = outcomes_to_threshold(WarmStartPrior::derive(0.95, DEFAULT_CONFIDENCE));
    let cold = outcomes_to_threshold(WarmStartPrior::derive(0.95, 0.0));

    assert!(
        warm < cold,
        "warm arm needed {} outcomes, cold arm {}",
        warm,
        cold
    );
    assert!(cold < MAX_REPLAY);
}

#[test]
fn test_update_conservation_over_replay() {
    let engine = hashing_engine();
    let id = ArmId::candidate_position("c7", "p3");
    let seeded = engine.initialize_arm(&id, Some(0.62));

    let mut successes = 0.0;
    let mut failures = 0.0;
    for step in 0..137 {
        let success = step % 3 != 0;
        engine.record_outcome(&id, success);
        if success {
            successes += 1.0;
        } else {
            failures += 1.0;
        }
    }

    let arm = engine.get_arm(&id).unwrap();
    assert_eq!(arm.alpha, seeded.alpha + successes);
    assert_eq!(arm.beta, seeded.beta + failures);
    assert_eq!(arm.pulls, 137);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_record_outcome_same_arm() {
    let engine = Arc::new(hashing_engine());
    let id = ArmId::interviewer_candidate("i1", "c1");
    let initial = engine.initialize_arm(&id, Some(0.3));

    let handles: Vec<_> = (0..1000)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let id = id.clone();
            tokio::spawn(async move {
                engine.record_outcome(&id, true);
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let arm = engine.get_arm(&id).unwrap();
    assert_eq!(arm.pulls, 1000);
    assert_eq!(arm.alpha, initial.alpha + 1000.0);
    assert_eq!(arm.beta, initial.beta);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_updates_and_selection_across_arms() {
    let engine = Arc::new(hashing_engine());
    let ids: Vec<ArmId> = (0..16).map(|i| ArmId::new(format!("arm-{}", i))).collect();

    let mut handles = Vec::new();
    for round in 0..400 {
        let engine = Arc::clone(&engine);
        let ids = ids.clone();
        handles.push(tokio::spawn(async move {
            let id = &ids[round % ids.len()];
            engine.record_outcome(id, round % 2 == 0);
            let chosen = engine.choose_best_arm(&ids).unwrap();
            assert!(ids.contains(&chosen));
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let total_pulls: u64 = ids.iter().map(|id| engine.get_arm(id).unwrap().pulls).sum();
    assert_eq!(total_pulls, 400);
    for id in &ids {
        let arm = engine.get_arm(id).unwrap();
        assert!(arm.alpha > 0.0 && arm.beta > 0.0);
        assert_eq!(arm.alpha + arm.beta, 2.0 + arm.pulls as f64);
    }
}

#[test]
fn test_selection_favors_warm_arm_initially() {
    let pool = BanditPool::new();
    let warm = ArmId::new("warm");
    let cold = ArmId::new("cold");
    pool.initialize_arm(&warm, WarmStartPrior::derive(0.95, 20.0));
    pool.initialize_arm(&cold, WarmStartPrior::cold());

    let mut rng = StdRng::seed_from_u64(3);
    let candidates = [warm.clone(), cold];
    let warm_wins = (0..1000)
        .filter(|_| pool.select_arm_with_rng(&candidates, &mut rng).unwrap() == warm)
        .count();

    assert!(warm_wins > 800, "warm arm won only {} of 1000", warm_wins);
}
