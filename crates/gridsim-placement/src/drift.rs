//! Fragmentation-aware scoring.
//!
//! A placement is scored by how much it changes the node's fragmentation
//! against a reference workload. A placement that leaves the node less
//! fragmented scores above 500, one that makes it worse scores below.

use gridsim_state::{GPU_MILLI_PER_GPU, Ledger, Node, Pod};
use serde::Serialize;

use crate::error::PlacementResult;
use crate::fragment::fragmentation_score;
use crate::scorer::ScorePlugin;
use crate::snapshot::{NodeResourceSnapshot, PodResourceSnapshot, TargetPodShape};

/// Outcome of evaluating one pod against one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DriftScore {
    /// In `[0, 1000]`; higher means the placement reduces fragmentation more.
    pub score: i64,
    /// Winning GPU for a single partial-GPU request, `None` otherwise.
    pub gpu_index: Option<usize>,
}

/// Scores placements by the fragmentation they remove.
#[derive(Debug, Clone, Default)]
pub struct Drift {
    shapes: Vec<TargetPodShape>,
}

impl Drift {
    pub fn new(shapes: Vec<TargetPodShape>) -> Self {
        Self { shapes }
    }

    pub fn shapes(&self) -> &[TargetPodShape] {
        &self.shapes
    }

    /// Score placing `pod` on `node`.
    ///
    /// A request for one partial GPU is tried on every GPU that can hold
    /// it and the best GPU wins (the lowest index on equal scores). Every
    /// other request is simulated once, on the first GPUs in index order
    /// with enough free points.
    pub fn evaluate(&self, node: &NodeResourceSnapshot, pod: &PodResourceSnapshot) -> DriftScore {
        let before = fragmentation_score(node, &self.shapes);

        if pod.gpu_count == 1 && pod.gpu_milli < GPU_MILLI_PER_GPU {
            let mut best = DriftScore {
                score: 0,
                gpu_index: None,
            };
            for (gid, &free) in node.free_gpu_milli().iter().enumerate() {
                if free < pod.gpu_milli {
                    continue;
                }
                let score = self.delta(before, &node.with_placement(pod, &[gid]));
                if best.gpu_index.is_none() || score > best.score {
                    best = DriftScore {
                        score,
                        gpu_index: Some(gid),
                    };
                }
            }
            return best;
        }

        let gpus: Vec<usize> = node
            .free_gpu_milli()
            .iter()
            .enumerate()
            .filter(|&(_, &free)| free >= pod.gpu_milli)
            .map(|(gid, _)| gid)
            .take(pod.gpu_count)
            .collect();
        DriftScore {
            score: self.delta(before, &node.with_placement(pod, &gpus)),
            gpu_index: None,
        }
    }

    fn delta(&self, before: f64, after: &NodeResourceSnapshot) -> i64 {
        let after = fragmentation_score(after, &self.shapes);
        (sigmoid((before - after) / 1000.0) * 1000.0).round() as i64
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl ScorePlugin for Drift {
    fn name(&self) -> &'static str {
        "drift"
    }

    fn score(&self, pod: &Pod, node: &Node, _ledger: &Ledger) -> PlacementResult<f64> {
        let node = NodeResourceSnapshot::from(node);
        let pod = PodResourceSnapshot::from(pod);
        Ok(self.evaluate(&node, &pod).score as f64)
    }
}
