//! GPU fragmentation model.
//!
//! Measures how much of a node's idle GPU capacity cannot cleanly host a
//! reference workload. For each typical pod shape the node is classified
//! into one of the [`FragmentType`] quadrants, and the node's free GPU
//! points are attributed to that quadrant, weighted by how often the shape
//! occurs. Everything outside [`FragmentType::Q3Satisfied`] counts as
//! fragmentation.
//!
//! The model is a pure function of snapshots; it never touches the ledger.

use serde::{Deserialize, Serialize};

use crate::snapshot::{NodeResourceSnapshot, PodResourceSnapshot, TargetPodShape};

/// Why a node can or cannot host a given pod shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentType {
    /// GPU shape, neither GPU nor CPU suffices.
    Q1LackBoth,
    /// GPU shape, CPU suffices but no GPU set can host it.
    Q2LackGpu,
    /// GPU shape that fits.
    Q3Satisfied,
    /// GPU shape, GPUs fit but CPU is short.
    Q4LackCpu,
    /// CPU-only shape that fits.
    XlSatisfied,
    /// CPU-only shape, CPU is short.
    XrLackCpu,
    /// Reserved; no classification currently produces it.
    NoAccess,
}

impl FragmentType {
    pub const ALL: [FragmentType; 7] = [
        FragmentType::Q1LackBoth,
        FragmentType::Q2LackGpu,
        FragmentType::Q3Satisfied,
        FragmentType::Q4LackCpu,
        FragmentType::XlSatisfied,
        FragmentType::XrLackCpu,
        FragmentType::NoAccess,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Weighted GPU points attributed to each fragment type.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FragmentAmount {
    buckets: [f64; 7],
}

impl FragmentAmount {
    pub fn get(&self, kind: FragmentType) -> f64 {
        self.buckets[kind.index()]
    }

    fn add(&mut self, kind: FragmentType, amount: f64) {
        self.buckets[kind.index()] += amount;
    }

    /// Sum of every bucket except `Q3Satisfied`.
    pub fn fragmentation(&self) -> f64 {
        FragmentType::ALL
            .iter()
            .filter(|&&kind| kind != FragmentType::Q3Satisfied)
            .map(|&kind| self.get(kind))
            .sum()
    }
}

/// Whether enough individual GPUs have room for the shape's per-GPU request.
pub fn can_host_on_gpu(node: &NodeResourceSnapshot, pod: &PodResourceSnapshot) -> bool {
    node.free_gpu_milli()
        .iter()
        .filter(|&&free| free >= pod.gpu_milli)
        .take(pod.gpu_count)
        .count()
        >= pod.gpu_count
}

/// Classify `node` against one pod shape.
pub fn classify(node: &NodeResourceSnapshot, pod: &PodResourceSnapshot) -> FragmentType {
    let cpu_ok = node.free_cpu >= pod.cpu_request;
    if !pod.requests_gpu() {
        return if cpu_ok {
            FragmentType::XlSatisfied
        } else {
            FragmentType::XrLackCpu
        };
    }

    match (can_host_on_gpu(node, pod), cpu_ok) {
        (true, true) => FragmentType::Q3Satisfied,
        (true, false) => FragmentType::Q4LackCpu,
        (false, true) => FragmentType::Q2LackGpu,
        (false, false) => FragmentType::Q1LackBoth,
    }
}

/// Free points on GPUs that individually cannot hold the shape's per-GPU request.
fn unusable_gpu_points(node: &NodeResourceSnapshot, pod: &PodResourceSnapshot) -> f64 {
    node.free_gpu_milli()
        .iter()
        .filter(|&&free| free < pod.gpu_milli)
        .map(|&free| f64::from(free))
        .sum()
}

/// Attribute `node`'s free GPU points to fragment types over a weighted workload.
pub fn fragment_amount(node: &NodeResourceSnapshot, shapes: &[TargetPodShape]) -> FragmentAmount {
    let total_free = node.total_free_gpu_milli() as f64;
    let mut amount = FragmentAmount::default();

    for target in shapes {
        let weight = target.weight();
        match classify(node, &target.shape) {
            FragmentType::Q3Satisfied => {
                // Individually too-small GPUs are still lack-GPU fragments.
                let unusable = unusable_gpu_points(node, &target.shape);
                amount.add(FragmentType::Q2LackGpu, weight * unusable);
                amount.add(FragmentType::Q3Satisfied, weight * (total_free - unusable));
            }
            kind => amount.add(kind, weight * total_free),
        }
    }
    amount
}

/// Fragmentation score of `node`: free GPU points that cannot cleanly host the workload.
pub fn fragmentation_score(node: &NodeResourceSnapshot, shapes: &[TargetPodShape]) -> f64 {
    fragment_amount(node, shapes).fragmentation()
}
