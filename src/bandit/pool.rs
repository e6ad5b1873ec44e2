use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rand::Rng;
use rand_distr::{Beta, Distribution};
use tracing::{debug, info};

use super::arm::{ArmId, ArmState, BanditArm};
use super::error::BanditError;
use super::prior::WarmStartPrior;
use super::snapshot::{PoolSnapshot, RestoreReport};

type ArmSlot = Arc<Mutex<ArmState>>;

/// Thompson-sampling pool of Beta-Bernoulli arms.
///
/// Locking is per arm: the map lock is only held to find or insert a slot,
/// and every read-modify-write of `(alpha, beta, pulls)` happens under that
/// arm's own mutex. Updates to different arms never contend.
#[derive(Default)]
pub struct BanditPool {
    arms: RwLock<HashMap<ArmId, ArmSlot>>,
}

impl BanditPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of arms.
    pub fn len(&self) -> usize {
        self.arms.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.arms.read().is_empty()
    }

    /// Returns `true` if `id` has been created.
    pub fn contains(&self, id: &ArmId) -> bool {
        self.arms.read().contains_key(id)
    }

    /// Identities of every arm (unordered).
    pub fn ids(&self) -> Vec<ArmId> {
        self.arms.read().keys().cloned().collect()
    }

    fn slot(&self, id: &ArmId) -> Option<ArmSlot> {
        self.arms.read().get(id).cloned()
    }

    /// Returns the slot for `id`, creating it from `prior` if missing.
    fn slot_or_create(&self, id: &ArmId, prior: WarmStartPrior) -> ArmSlot {
        if let Some(slot) = self.slot(id) {
            return slot;
        }

        let mut arms = self.arms.write();
        Arc::clone(arms.entry(id.clone()).or_insert_with(|| {
            debug!(
                arm = %id,
                cold = prior.is_cold(),
                alpha0 = prior.alpha0,
                beta0 = prior.beta0,
                "Creating arm"
            );
            Arc::new(Mutex::new(ArmState::from_prior(prior)))
        }))
    }

    /// Creates `id` from `prior` unless it already exists, and returns its state.
    ///
    /// Existing arms are never re-seeded.
    pub fn initialize_arm(&self, id: &ArmId, prior: WarmStartPrior) -> BanditArm {
        self.slot_or_create(id, prior).lock().to_arm(id)
    }

    /// Pure read of one arm.
    pub fn get_arm(&self, id: &ArmId) -> Option<BanditArm> {
        self.slot(id).map(|slot| slot.lock().to_arm(id))
    }

    /// Posterior mean of `id`, if it exists.
    pub fn expected_value(&self, id: &ArmId) -> Option<f64> {
        self.get_arm(id).map(|arm| arm.expected_value())
    }

    /// Applies one outcome: `alpha += 1` on success, `beta += 1` on failure.
    ///
    /// Unknown arms are created cold first.
    pub fn record_outcome(&self, id: &ArmId, success: bool) -> BanditArm {
        let slot = self.slot_or_create(id, WarmStartPrior::cold());
        let mut state = slot.lock();
        state.record(success);
        debug!(
            arm = %id,
            success,
            alpha = state.alpha,
            beta = state.beta,
            pulls = state.pulls,
            "Outcome recorded"
        );
        state.to_arm(id)
    }

    /// Thompson selection using the thread-local RNG.
    pub fn select_arm(&self, candidates: &[ArmId]) -> Result<ArmId, BanditError> {
        self.select_arm_with_rng(candidates, &mut rand::rng())
    }

    /// Draws `theta ~ Beta(alpha, beta)` per candidate and returns the argmax.
    ///
    /// Equal draws go to the arm with fewer pulls; unknown candidates are
    /// created cold.
    pub fn select_arm_with_rng<R: Rng + ?Sized>(
        &self,
        candidates: &[ArmId],
        rng: &mut R,
    ) -> Result<ArmId, BanditError> {
        let mut best: Option<(&ArmId, f64, u64)> = None;

        for id in candidates {
            let (theta, pulls) = self.sample(id, rng)?;
            let better = match best {
                None => true,
                Some((_, best_theta, best_pulls)) => {
                    theta > best_theta || (theta == best_theta && pulls < best_pulls)
                }
            };
            if better {
                best = Some((id, theta, pulls));
            }
        }

        best.map(|(id, _, _)| id.clone()).ok_or(BanditError::NoCandidates)
    }

    fn sample<R: Rng + ?Sized>(
        &self,
        id: &ArmId,
        rng: &mut R,
    ) -> Result<(f64, u64), BanditError> {
        let (alpha, beta, pulls) = {
            let slot = self.slot_or_create(id, WarmStartPrior::cold());
            let state = slot.lock();
            (state.alpha, state.beta, state.pulls)
        };

        let dist = Beta::new(alpha, beta).map_err(|_| BanditError::InvalidParameters {
            id: id.clone(),
            alpha,
            beta,
        })?;
        Ok((dist.sample(rng), pulls))
    }

    /// Monte-Carlo estimate of how often each candidate would win selection.
    ///
    /// Does not create missing arms: unknown identities are evaluated as cold.
    pub fn selection_probability<R: Rng + ?Sized>(
        &self,
        candidates: &[ArmId],
        draws: usize,
        rng: &mut R,
    ) -> Result<Vec<(ArmId, f64)>, BanditError> {
        if candidates.is_empty() {
            return Err(BanditError::NoCandidates);
        }

        let dists = candidates
            .iter()
            .map(|id| {
                let (alpha, beta) = self
                    .get_arm(id)
                    .map_or((1.0, 1.0), |arm| (arm.alpha, arm.beta));
                Beta::new(alpha, beta).map_err(|_| BanditError::InvalidParameters {
                    id: id.clone(),
                    alpha,
                    beta,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut wins = vec![0usize; candidates.len()];
        for _ in 0..draws.max(1) {
            let mut best = 0;
            let mut best_theta = f64::NEG_INFINITY;
            for (i, dist) in dists.iter().enumerate() {
                let theta = dist.sample(rng);
                if theta > best_theta {
                    best = i;
                    best_theta = theta;
                }
            }
            wins[best] += 1;
        }

        let total = draws.max(1) as f64;
        Ok(candidates
            .iter()
            .cloned()
            .zip(wins.into_iter().map(|w| w as f64 / total))
            .collect())
    }

    /// Copies every arm, one arm lock at a time.
    ///
    /// The map lock is released before any arm is read, so the copy never
    /// blocks selection or recording for longer than a single arm read.
    pub fn snapshot(&self) -> PoolSnapshot {
        let slots: Vec<(ArmId, ArmSlot)> = self
            .arms
            .read()
            .iter()
            .map(|(id, slot)| (id.clone(), Arc::clone(slot)))
            .collect();

        PoolSnapshot::from_arms(slots.iter().map(|(id, slot)| slot.lock().to_arm(id)))
    }

    /// Merges a loaded snapshot into the pool.
    ///
    /// A loaded arm replaces the in-memory one only if the in-memory arm has
    /// not recorded an outcome since process start.
    pub fn restore(&self, snapshot: &PoolSnapshot) -> Result<RestoreReport, BanditError> {
        snapshot.validate()?;

        let mut report = RestoreReport::default();
        for (id, record) in &snapshot.arms {
            let loaded = ArmState {
                alpha: record.alpha,
                beta: record.beta,
                pulls: record.pulls,
                last_updated: record.last_updated,
                prior: record.prior(),
                touched: false,
            };

            let existing = self.slot(id).or_else(|| {
                let mut arms = self.arms.write();
                match arms.get(id) {
                    Some(slot) => Some(Arc::clone(slot)),
                    None => {
                        arms.insert(id.clone(), Arc::new(Mutex::new(loaded.clone())));
                        report.inserted += 1;
                        None
                    }
                }
            });

            if let Some(slot) = existing {
                let mut state = slot.lock();
                if state.touched {
                    report.kept_fresher += 1;
                } else {
                    *state = loaded;
                    report.overwritten += 1;
                }
            }
        }

        info!(
            inserted = report.inserted,
            overwritten = report.overwritten,
            kept_fresher = report.kept_fresher,
            "Pool restored from snapshot"
        );
        Ok(report)
    }
}

impl std::fmt::Debug for BanditPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BanditPool")
            .field("arms", &self.len())
            .finish()
    }
}
