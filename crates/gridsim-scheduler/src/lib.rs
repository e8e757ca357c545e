//! gridsim-scheduler: the event-driven simulation loop.
//!
//! Drives a [`gridsim_state::Ledger`] through simulated time. Pods arrive
//! at their creation time, are placed by the plugin pipeline from
//! `gridsim-placement`, and release their resources when they complete.
//!
//! # Architecture
//!
//! ```text
//! Scheduler
//!   ├── EventQueue (min-heap on (time, seq))
//!   ├── Ledger (nodes registered up front, pods on arrival)
//!   ├── QueueSort → Filter → Score-and-Pick
//!   │     └── WorkerPool (per-node fan-out)
//!   └── SimulationReport (makespan, utilization)
//! ```
//!
//! After every event the scheduler keeps making full passes over the
//! pending queue until a pass binds nothing, so a placement made earlier
//! in an instant can never hide capacity from a pod considered later.

pub mod config;
pub mod error;
pub mod event;
pub mod report;
pub mod scheduler;

pub use config::SchedulerConfig;
pub use error::{SchedulerError, SchedulerResult};
pub use event::{Event, EventKind, EventQueue};
pub use report::SimulationReport;
pub use scheduler::Scheduler;
