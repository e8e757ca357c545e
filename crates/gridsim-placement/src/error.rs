//! Placement error types.

use gridsim_state::LedgerError;
use thiserror::Error;

/// Errors produced while evaluating a single pod/node pair.
///
/// The pipeline never propagates these out of a scheduling cycle: a node
/// whose evaluation fails is treated as infeasible or scored at minimum.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("invalid resource snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("typical shape weight {0} is outside [0, 1]")]
    InvalidShapeWeight(f64),

    #[error("worker pool error: {0}")]
    WorkerPool(String),
}

pub type PlacementResult<T> = Result<T, PlacementError>;
