//! Scheduler configuration.

use serde::{Deserialize, Serialize};

use crate::error::{SchedulerError, SchedulerResult};

/// Tunables for one simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seed for the tie-break random source.
    pub seed: u64,
    /// Worker threads for per-node evaluation, capped at
    /// [`gridsim_placement::MAX_WORKERS`].
    pub max_workers: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_workers: gridsim_placement::MAX_WORKERS,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> SchedulerResult<()> {
        if self.max_workers == 0 {
            return Err(SchedulerError::InvalidConfig(
                "max_workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
