//! gridsim-placement: per-pod placement decisions.
//!
//! This crate decides, for one pending pod, which node it should bind to.
//! It never mutates the ledger: plugins read [`gridsim_state::Ledger`]
//! through shared references and hand a node name back to the scheduler.
//!
//! # Components
//!
//! - **`queue_sort`**: order in which pending pods are considered (FIFO, SJF)
//! - **`filter`**: feasibility screening of every node (resource fit)
//! - **`scorer`**: node scoring and the shared randomized `pick`
//!   (Kubernetes-style spread, bin-packing)
//! - **`drift`**: fragmentation-aware scoring for shared GPUs
//! - **`fragment`**: GPU fragmentation model over resource snapshots
//! - **`snapshot`**: value copies of node/pod resources and typical shapes
//! - **`pool`**: bounded worker pool used to fan out per-node checks

pub mod drift;
pub mod error;
pub mod filter;
pub mod fragment;
pub mod pool;
pub mod queue_sort;
pub mod scorer;
pub mod snapshot;

pub use drift::{Drift, DriftScore};
pub use error::{PlacementError, PlacementResult};
pub use filter::{FilterPlugin, ResourceFit};
pub use fragment::{FragmentAmount, FragmentType, fragment_amount, fragmentation_score};
pub use pool::{MAX_WORKERS, WorkerPool};
pub use queue_sort::{Fifo, QueueSortPlugin, ShortestJobFirst};
pub use scorer::{BinPack, Kubernetes, ScorePlugin};
pub use snapshot::{NodeResourceSnapshot, PodResourceSnapshot, TargetPodShape, typical_shapes_from_pods};
