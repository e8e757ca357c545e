//! Node scoring and randomized tie-break selection.

use gridsim_state::{Ledger, LedgerError, Node, Pod};
use rand::RngCore;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

use crate::error::PlacementResult;
use crate::pool::WorkerPool;

/// Ranks feasible nodes for a pod. Higher scores are better.
pub trait ScorePlugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// Score placing `pod` on `node`. Must not mutate anything.
    fn score(&self, pod: &Pod, node: &Node, ledger: &Ledger) -> PlacementResult<f64>;

    /// Choose one of `feasible` for `pod`, or `None` if there is nothing to choose.
    ///
    /// Every node is scored on the pool. A node whose score fails (or is NaN)
    /// is ranked at negative infinity. Among the nodes sharing the maximum
    /// score one is drawn uniformly from `rng`.
    fn pick<'a>(
        &self,
        pod: &Pod,
        feasible: &[&'a Node],
        ledger: &Ledger,
        pool: &WorkerPool,
        rng: &mut dyn RngCore,
    ) -> Option<&'a Node> {
        if feasible.is_empty() {
            return None;
        }

        let results = pool.fan_out(feasible, |node| self.score(pod, node, ledger));
        let scores: Vec<f64> = feasible
            .iter()
            .zip(results)
            .map(|(node, result)| match result {
                Ok(score) if !score.is_nan() => score,
                Ok(_) => {
                    warn!(pod = %pod.name, node = %node.name, scorer = self.name(), "score is NaN, ranked last");
                    f64::NEG_INFINITY
                }
                Err(e) => {
                    warn!(pod = %pod.name, node = %node.name, scorer = self.name(), error = %e, "scoring failed, ranked last");
                    f64::NEG_INFINITY
                }
            })
            .collect();

        let best = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let ties: Vec<&'a Node> = feasible
            .iter()
            .zip(&scores)
            .filter(|&(_, &score)| score == best)
            .map(|(&node, _)| node)
            .collect();

        let chosen = ties.choose(rng).copied();
        if let Some(node) = chosen {
            debug!(pod = %pod.name, node = %node.name, score = best, ties = ties.len(), "node picked");
        }
        chosen
    }
}

/// Spreads load: `100 / (1 + pods bound to the node)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Kubernetes;

impl ScorePlugin for Kubernetes {
    fn name(&self) -> &'static str {
        "kubernetes"
    }

    fn score(&self, _pod: &Pod, node: &Node, ledger: &Ledger) -> PlacementResult<f64> {
        let bound = ledger
            .pods_on_node(&node.name)
            .ok_or_else(|| LedgerError::NodeNotFound(node.name.clone()))?
            .len();
        Ok(100.0 / (1.0 + bound as f64))
    }
}

/// Packs tightly: `100 × max(cpu utilization, memory utilization)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinPack;

impl ScorePlugin for BinPack {
    fn name(&self) -> &'static str {
        "binpack"
    }

    fn score(&self, _pod: &Pod, node: &Node, _ledger: &Ledger) -> PlacementResult<f64> {
        Ok(100.0 * node.cpu_utilization().max(node.memory_utilization()))
    }
}
