//! gridsim-state: the resource ledger for gridsim.
//!
//! Owns every [`Node`] and [`Pod`] record of a simulation run and is the
//! only component allowed to mutate occupancy. Placement plugins read it
//! through shared references; the scheduler mutates it through
//! [`Ledger::bind`] and [`Ledger::unbind`].
//!
//! # Architecture
//!
//! All indices (node → bound pods, pod → node, per-status pod sets) are
//! ordered collections, so iteration order is stable across runs and
//! every scheduling decision is reproducible.

pub mod error;
pub mod ledger;
pub mod types;

pub use error::{LedgerError, LedgerResult};
pub use ledger::Ledger;
pub use types::*;
