use crate::bandit::RestoreReport;

#[derive(Debug, Clone)]
pub enum HydrationResult {
    Restored { report: RestoreReport },
    NotFound,
    Unavailable { reason: String },
}

#[derive(Debug, Clone)]
pub enum DehydrationResult {
    Saved { arms: usize },
    Degraded { attempts: u32, reason: String },
}

impl DehydrationResult {
    pub fn is_saved(&self) -> bool {
        matches!(self, DehydrationResult::Saved { .. })
    }
}
