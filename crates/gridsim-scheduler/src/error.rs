//! Scheduler error types.

use gridsim_placement::PlacementError;
use gridsim_state::LedgerError;
use thiserror::Error;

/// Errors that abort a simulation run.
///
/// None of these are retried. A run that fails produces no report.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("bind of pod {pod} to node {node} failed after filtering: {source}")]
    Bind {
        pod: String,
        node: String,
        #[source]
        source: LedgerError,
    },

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("invalid scheduler config: {0}")]
    InvalidConfig(String),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("placement error: {0}")]
    Placement(#[from] PlacementError),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
