//! Feasibility filtering.

use gridsim_state::{Ledger, Node, Pod};
use tracing::warn;

use crate::error::PlacementResult;
use crate::pool::WorkerPool;

/// Narrows the node set to those a pod could bind to right now.
pub trait FilterPlugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// Nodes the pod could feasibly bind to, in ledger (name) order.
    ///
    /// A node whose evaluation fails is excluded; the remaining nodes are
    /// still evaluated.
    fn filter<'a>(&self, pod: &Pod, ledger: &'a Ledger, pool: &WorkerPool) -> Vec<&'a Node>;
}

/// Keeps every node for which [`Ledger::check_bindable`] holds.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceFit;

impl ResourceFit {
    fn check(pod: &Pod, node: &Node, ledger: &Ledger) -> PlacementResult<bool> {
        Ok(ledger.check_bindable(&pod.name, &node.name)?)
    }
}

impl FilterPlugin for ResourceFit {
    fn name(&self) -> &'static str {
        "resource_fit"
    }

    fn filter<'a>(&self, pod: &Pod, ledger: &'a Ledger, pool: &WorkerPool) -> Vec<&'a Node> {
        let nodes: Vec<&Node> = ledger.nodes().collect();
        let verdicts = pool.fan_out(&nodes, |node| Self::check(pod, node, ledger));

        nodes
            .into_iter()
            .zip(verdicts)
            .filter_map(|(node, verdict)| match verdict {
                Ok(true) => Some(node),
                Ok(false) => None,
                Err(e) => {
                    warn!(pod = %pod.name, node = %node.name, error = %e, "feasibility check failed, node excluded");
                    None
                }
            })
            .collect()
    }
}
