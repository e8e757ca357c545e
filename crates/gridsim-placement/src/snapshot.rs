//! Resource snapshots for the fragmentation model.
//!
//! Bridges the ledger's [`Node`] and [`Pod`] records to plain value types
//! that the fragmentation model can copy and mutate freely. A snapshot
//! never refers back to ledger state.

use std::collections::BTreeMap;

use gridsim_state::{GPU_MILLI_PER_GPU, Node, Pod};
use serde::{Deserialize, Serialize};

use crate::error::{PlacementError, PlacementResult};

/// Free resources of a node at one instant.
///
/// CPU and memory are signed so that a hypothetical placement on a node
/// that cannot actually fit the pod still yields a well-defined snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeResourceSnapshot {
    pub free_cpu: i64,
    pub free_memory: i64,
    free_gpu_milli: Vec<u32>,
}

impl NodeResourceSnapshot {
    /// Build a snapshot, rejecting GPUs with more than one device worth of points.
    pub fn new(free_cpu: i64, free_memory: i64, free_gpu_milli: Vec<u32>) -> PlacementResult<Self> {
        if let Some(bad) = free_gpu_milli.iter().find(|&&m| m > GPU_MILLI_PER_GPU) {
            return Err(PlacementError::InvalidSnapshot(format!(
                "gpu free milli {bad} exceeds {GPU_MILLI_PER_GPU}"
            )));
        }
        Ok(Self {
            free_cpu,
            free_memory,
            free_gpu_milli,
        })
    }

    /// Per-GPU free milli-points, in GPU index order.
    pub fn free_gpu_milli(&self) -> &[u32] {
        &self.free_gpu_milli
    }

    /// Sum of free milli-points across all GPUs.
    pub fn total_free_gpu_milli(&self) -> u64 {
        self.free_gpu_milli.iter().map(|&m| u64::from(m)).sum()
    }

    /// A new snapshot with `pod` placed on the given GPU indices.
    ///
    /// GPU indices that cannot hold the pod's per-GPU request are skipped.
    pub fn with_placement(&self, pod: &PodResourceSnapshot, gpus: &[usize]) -> Self {
        let mut next = self.clone();
        next.free_cpu -= pod.cpu_request;
        next.free_memory -= pod.memory_request;
        for &gid in gpus {
            if let Some(free) = next.free_gpu_milli.get_mut(gid) {
                if *free >= pod.gpu_milli {
                    *free -= pod.gpu_milli;
                }
            }
        }
        next
    }
}

impl From<&Node> for NodeResourceSnapshot {
    fn from(node: &Node) -> Self {
        Self {
            free_cpu: node.cpu_milli_free as i64,
            free_memory: node.memory_mib_free as i64,
            free_gpu_milli: node.gpu_free_milli.clone(),
        }
    }
}

/// The resource request of a pod, detached from its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PodResourceSnapshot {
    pub cpu_request: i64,
    pub memory_request: i64,
    pub gpu_count: usize,
    /// Milli-points requested on each GPU.
    pub gpu_milli: u32,
}

impl PodResourceSnapshot {
    /// Whether the shape needs GPU points at all.
    pub fn requests_gpu(&self) -> bool {
        self.gpu_count > 0 && self.gpu_milli > 0
    }
}

impl From<&Pod> for PodResourceSnapshot {
    fn from(pod: &Pod) -> Self {
        Self {
            cpu_request: pod.cpu_milli as i64,
            memory_request: pod.memory_mib as i64,
            gpu_count: pod.num_gpu,
            gpu_milli: pod.gpu_milli,
        }
    }
}

/// A recurring pod shape with its relative frequency in a reference workload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetPodShape {
    pub shape: PodResourceSnapshot,
    weight: f64,
}

impl TargetPodShape {
    /// Build a shape; `weight` must lie in `[0, 1]`.
    pub fn new(shape: PodResourceSnapshot, weight: f64) -> PlacementResult<Self> {
        if !(0.0..=1.0).contains(&weight) {
            return Err(PlacementError::InvalidShapeWeight(weight));
        }
        Ok(Self { shape, weight })
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// Group pods by exact resource signature and weight each group by its share.
///
/// Shapes come back ordered by signature. An empty workload has no shapes.
pub fn typical_shapes_from_pods<'a>(pods: impl IntoIterator<Item = &'a Pod>) -> Vec<TargetPodShape> {
    let mut counts: BTreeMap<PodResourceSnapshot, usize> = BTreeMap::new();
    let mut total = 0usize;
    for pod in pods {
        *counts.entry(PodResourceSnapshot::from(pod)).or_insert(0) += 1;
        total += 1;
    }

    counts
        .into_iter()
        .map(|(shape, count)| TargetPodShape {
            shape,
            weight: count as f64 / total as f64,
        })
        .collect()
}
