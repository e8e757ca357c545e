//! gridsim-cli: scenario files and the `gridsim` commands.
//!
//! The binary is a thin clap front end over this library so that scenario
//! parsing and the run/compare wiring can be exercised from tests.

pub mod commands;
pub mod scenario;

pub use scenario::{NodeRecord, PluginsConfig, PodRecord, QueueSortKind, Scenario, ScoreKind};
