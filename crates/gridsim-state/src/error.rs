//! Error types for the resource ledger.

use thiserror::Error;

/// Result type alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors that can occur while registering records or binding pods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("pod {pod} is already bound to node {node}")]
    AlreadyBound { pod: String, node: String },

    #[error("insufficient cpu/memory on node {node} for pod {pod}")]
    InsufficientResource { pod: String, node: String },

    #[error("insufficient gpu milli / gpu slots on node {node} for pod {pod}")]
    InsufficientGpu { pod: String, node: String },

    #[error("gpu milli {milli} requested by pod {pod} is outside [0, 1000]")]
    InvalidGpuMilli { pod: String, milli: u32 },

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("pod not found: {0}")]
    PodNotFound(String),

    #[error("duplicate node: {0}")]
    DuplicateNode(String),

    #[error("duplicate pod: {0}")]
    DuplicatePod(String),
}
