//! Domain types held by the ledger.
//!
//! Resource quantities are milli-units: CPU in milli-cores, GPU in
//! milli-points where [`GPU_MILLI_PER_GPU`] is one whole device. Memory is
//! in MiB. Simulated time is integer seconds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Milli-points that make up one whole GPU.
pub const GPU_MILLI_PER_GPU: u32 = 1000;

/// Unique node name.
pub type NodeName = String;

/// Unique pod name.
pub type PodName = String;

/// GPU index on a node → milli-points allocated to a pod.
pub type GpuAllocation = BTreeMap<usize, u32>;

// ── Node ──────────────────────────────────────────────────────────

/// A compute node: CPU, memory and an optional set of (shareable) GPUs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub name: NodeName,
    pub cpu_milli_total: u64,
    pub cpu_milli_free: u64,
    pub memory_mib_total: u64,
    pub memory_mib_free: u64,
    pub gpu_count: usize,
    /// When false, each GPU hosts at most one pod regardless of free points.
    pub gpu_share_enabled: bool,
    /// Remaining milli-points per GPU, length = `gpu_count`.
    pub gpu_free_milli: Vec<u32>,
    /// Per GPU: pod name → allocated milli-points.
    pub gpu_pods: Vec<BTreeMap<PodName, u32>>,
}

impl Node {
    /// Create an idle node with every resource free.
    pub fn new(
        name: impl Into<NodeName>,
        cpu_milli_total: u64,
        memory_mib_total: u64,
        gpu_count: usize,
        gpu_share_enabled: bool,
    ) -> Self {
        Self {
            name: name.into(),
            cpu_milli_total,
            cpu_milli_free: cpu_milli_total,
            memory_mib_total,
            memory_mib_free: memory_mib_total,
            gpu_count,
            gpu_share_enabled,
            gpu_free_milli: vec![GPU_MILLI_PER_GPU; gpu_count],
            gpu_pods: vec![BTreeMap::new(); gpu_count],
        }
    }

    /// Fraction of CPU in use, in `[0, 1]`. Zero for a node without CPU.
    pub fn cpu_utilization(&self) -> f64 {
        if self.cpu_milli_total == 0 {
            return 0.0;
        }
        (self.cpu_milli_total - self.cpu_milli_free) as f64 / self.cpu_milli_total as f64
    }

    /// Fraction of memory in use, in `[0, 1]`. Zero for a node without memory.
    pub fn memory_utilization(&self) -> f64 {
        if self.memory_mib_total == 0 {
            return 0.0;
        }
        (self.memory_mib_total - self.memory_mib_free) as f64 / self.memory_mib_total as f64
    }

    /// Total GPU capacity of this node in milli-points.
    pub fn gpu_milli_total(&self) -> u64 {
        self.gpu_count as u64 * u64::from(GPU_MILLI_PER_GPU)
    }

    /// Number of GPUs that could each host `per_gpu_milli` for a new pod,
    /// honouring the sharing flag.
    pub fn eligible_gpu_count(&self, per_gpu_milli: u32) -> usize {
        (0..self.gpu_count)
            .filter(|&gid| self.gpu_is_eligible(gid, per_gpu_milli))
            .count()
    }

    pub(crate) fn gpu_is_eligible(&self, gid: usize, per_gpu_milli: u32) -> bool {
        let fits = self.gpu_free_milli[gid] >= per_gpu_milli;
        if self.gpu_share_enabled {
            fits
        } else {
            fits && self.gpu_pods[gid].is_empty()
        }
    }
}

// ── Pod ───────────────────────────────────────────────────────────

/// Lifecycle status of a pod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PodStatus {
    Pending,
    Running,
    Completed,
    /// Reserved terminal state; no current policy reaches it.
    Failed,
}

/// A job to be placed: resource request plus lifecycle bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pod {
    pub name: PodName,
    pub cpu_milli: u64,
    pub memory_mib: u64,
    pub num_gpu: usize,
    /// Milli-points requested on each of the `num_gpu` GPUs.
    pub gpu_milli: u32,
    pub bound_node: Option<NodeName>,
    pub gpu_alloc: GpuAllocation,
    pub creation_time: u64,
    pub duration: u64,
    pub scheduled_time: Option<u64>,
    pub completion_time: Option<u64>,
    pub status: PodStatus,
}

impl Pod {
    /// Create a pending, unbound pod.
    pub fn new(
        name: impl Into<PodName>,
        cpu_milli: u64,
        memory_mib: u64,
        num_gpu: usize,
        gpu_milli: u32,
        creation_time: u64,
        duration: u64,
    ) -> Self {
        Self {
            name: name.into(),
            cpu_milli,
            memory_mib,
            num_gpu,
            gpu_milli,
            bound_node: None,
            gpu_alloc: GpuAllocation::new(),
            creation_time,
            duration,
            scheduled_time: None,
            completion_time: None,
            status: PodStatus::Pending,
        }
    }

    /// Whether this pod asks for any GPU at all.
    pub fn requests_gpu(&self) -> bool {
        self.num_gpu > 0
    }

    /// CPU milli-seconds consumed over the pod's full duration.
    pub fn cpu_usage(&self) -> u64 {
        self.cpu_milli * self.duration
    }

    /// GPU milli-point-seconds consumed over the pod's full duration.
    pub fn gpu_usage(&self) -> u64 {
        self.num_gpu as u64 * u64::from(self.gpu_milli) * self.duration
    }
}
