//! Bounded worker pool for per-node evaluation.
//!
//! Filter and score checks are read-only and independent per node, so they
//! fan out across a small rayon pool. Each task produces an owned result in
//! the slot matching its input index; nothing is shared between tasks.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{PlacementError, PlacementResult};

/// Upper bound on worker threads regardless of configuration.
pub const MAX_WORKERS: usize = 10;

/// A fixed-size pool of at most [`MAX_WORKERS`] threads.
///
/// Rayon never runs more tasks at once than there are items, so a call
/// over `n` candidates uses at most `min(workers, n)` threads.
pub struct WorkerPool {
    pool: ThreadPool,
    workers: usize,
}

impl WorkerPool {
    /// Build a pool with `max_workers` threads, clamped to `1..=MAX_WORKERS`.
    pub fn new(max_workers: usize) -> PlacementResult<Self> {
        let workers = max_workers.clamp(1, MAX_WORKERS);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("gridsim-worker-{i}"))
            .build()
            .map_err(|e| PlacementError::WorkerPool(e.to_string()))?;
        Ok(Self { pool, workers })
    }

    /// Number of threads in the pool.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `task` over every item and return the results in input order.
    pub fn fan_out<T, R, F>(&self, items: &[T], task: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Send + Sync,
    {
        self.pool
            .install(|| items.par_iter().with_max_len(1).map(task).collect())
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers)
            .finish()
    }
}
