//! Ledger: single source of truth for node and pod occupancy.
//!
//! Provides read-only feasibility checks for the placement plugins and the
//! atomic [`Ledger::bind`] / [`Ledger::unbind`] transitions used by the
//! scheduler. A failed `bind` leaves every record untouched.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::types::*;

/// In-memory store of nodes, pods and their cross-indices.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    nodes: BTreeMap<NodeName, Node>,
    pods: BTreeMap<PodName, Pod>,
    /// node → names of pods currently bound to it.
    node_pods: BTreeMap<NodeName, BTreeSet<PodName>>,
    /// pod → node it is bound to.
    pod_node: BTreeMap<PodName, NodeName>,
    pending: BTreeSet<PodName>,
    running: BTreeSet<PodName>,
    completed: BTreeSet<PodName>,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Registration ───────────────────────────────────────────────

    /// Register a node. Names must be unique.
    pub fn add_node(&mut self, node: Node) -> LedgerResult<()> {
        if self.nodes.contains_key(&node.name) {
            return Err(LedgerError::DuplicateNode(node.name));
        }
        self.node_pods.insert(node.name.clone(), BTreeSet::new());
        debug!(node = %node.name, gpus = node.gpu_count, "node registered");
        self.nodes.insert(node.name.clone(), node);
        Ok(())
    }

    /// Register a pod. It becomes `Pending` and enters the pending index.
    pub fn add_pod(&mut self, mut pod: Pod) -> LedgerResult<()> {
        if self.pods.contains_key(&pod.name) {
            return Err(LedgerError::DuplicatePod(pod.name));
        }
        pod.status = PodStatus::Pending;
        self.pending.insert(pod.name.clone());
        self.pods.insert(pod.name.clone(), pod);
        Ok(())
    }

    /// Make a registered `Pending` pod eligible for placement.
    ///
    /// Returns `true` if the pod was not tracked as pending before.
    pub fn mark_pending(&mut self, pod_name: &str) -> LedgerResult<bool> {
        let pod = self
            .pods
            .get(pod_name)
            .ok_or_else(|| LedgerError::PodNotFound(pod_name.to_string()))?;
        if pod.status != PodStatus::Pending {
            return Ok(false);
        }
        Ok(self.pending.insert(pod_name.to_string()))
    }

    // ── Queries ────────────────────────────────────────────────────

    pub fn get_node(&self, node_name: &str) -> Option<&Node> {
        self.nodes.get(node_name)
    }

    pub fn get_pod(&self, pod_name: &str) -> Option<&Pod> {
        self.pods.get(pod_name)
    }

    /// All nodes, ordered by name.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &Node> {
        self.nodes.values()
    }

    /// All registered pods, ordered by name.
    pub fn pods(&self) -> impl ExactSizeIterator<Item = &Pod> {
        self.pods.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Names of pods currently bound to `node_name`.
    pub fn pods_on_node(&self, node_name: &str) -> Option<&BTreeSet<PodName>> {
        self.node_pods.get(node_name)
    }

    /// Node a pod is bound to, if any.
    pub fn node_of_pod(&self, pod_name: &str) -> Option<&str> {
        self.pod_node.get(pod_name).map(String::as_str)
    }

    pub fn pending_pods(&self) -> &BTreeSet<PodName> {
        &self.pending
    }

    pub fn running_pods(&self) -> &BTreeSet<PodName> {
        &self.running
    }

    pub fn completed_pods(&self) -> &BTreeSet<PodName> {
        &self.completed
    }

    /// Total CPU capacity across all nodes, in milli-cores.
    pub fn total_cpu_milli(&self) -> u64 {
        self.nodes.values().map(|n| n.cpu_milli_total).sum()
    }

    /// Total GPU capacity across all nodes, in milli-points.
    pub fn total_gpu_milli(&self) -> u64 {
        self.nodes.values().map(Node::gpu_milli_total).sum()
    }

    // ── Feasibility ────────────────────────────────────────────────

    /// Read-only test of whether `pod_name` could bind to `node_name` now.
    ///
    /// Checks CPU and memory, then the GPU request against the node's
    /// sharing mode. No GPU choice is made or committed.
    pub fn check_bindable(&self, pod_name: &str, node_name: &str) -> LedgerResult<bool> {
        let pod = self.pod(pod_name)?;
        let node = self.node(node_name)?;

        if node.cpu_milli_free < pod.cpu_milli || node.memory_mib_free < pod.memory_mib {
            return Ok(false);
        }
        if !pod.requests_gpu() {
            return Ok(true);
        }
        Ok(node.eligible_gpu_count(pod.gpu_milli) >= pod.num_gpu)
    }

    // ── Bind / unbind ──────────────────────────────────────────────

    /// Bind a pod to a node at simulated `time`.
    ///
    /// All checks run before any mutation, so an error leaves the ledger
    /// exactly as it was.
    pub fn bind(&mut self, pod_name: &str, node_name: &str, time: u64) -> LedgerResult<()> {
        let pod = self.pod(pod_name)?;
        let node = self.node(node_name)?;

        if let Some(bound) = &pod.bound_node {
            return Err(LedgerError::AlreadyBound {
                pod: pod_name.to_string(),
                node: bound.clone(),
            });
        }
        if node.cpu_milli_free < pod.cpu_milli || node.memory_mib_free < pod.memory_mib {
            return Err(LedgerError::InsufficientResource {
                pod: pod_name.to_string(),
                node: node_name.to_string(),
            });
        }
        let chosen = select_gpus(node, pod)?;

        // Commit.
        let (cpu, memory) = (pod.cpu_milli, pod.memory_mib);
        let node = self
            .nodes
            .get_mut(node_name)
            .ok_or_else(|| LedgerError::NodeNotFound(node_name.to_string()))?;
        node.cpu_milli_free -= cpu;
        node.memory_mib_free -= memory;
        for (&gid, &milli) in &chosen {
            node.gpu_free_milli[gid] -= milli;
            node.gpu_pods[gid].insert(pod_name.to_string(), milli);
        }

        let pod = self
            .pods
            .get_mut(pod_name)
            .ok_or_else(|| LedgerError::PodNotFound(pod_name.to_string()))?;
        pod.bound_node = Some(node_name.to_string());
        pod.gpu_alloc = chosen;
        pod.status = PodStatus::Running;
        pod.scheduled_time = Some(time);

        self.node_pods
            .entry(node_name.to_string())
            .or_default()
            .insert(pod_name.to_string());
        self.pod_node
            .insert(pod_name.to_string(), node_name.to_string());
        self.pending.remove(pod_name);
        self.running.insert(pod_name.to_string());

        debug!(pod = %pod_name, node = %node_name, time, gpus = ?pod.gpu_alloc, "pod bound");
        Ok(())
    }

    /// Release a pod's resources at simulated `time` and mark it `Completed`.
    ///
    /// A pod without a bound node is left untouched.
    pub fn unbind(&mut self, pod_name: &str, time: u64) -> LedgerResult<()> {
        let pod = self
            .pods
            .get_mut(pod_name)
            .ok_or_else(|| LedgerError::PodNotFound(pod_name.to_string()))?;
        let Some(node_name) = pod.bound_node.take() else {
            return Ok(());
        };
        let alloc = std::mem::take(&mut pod.gpu_alloc);
        pod.status = PodStatus::Completed;
        pod.completion_time = Some(time);
        let (cpu, memory) = (pod.cpu_milli, pod.memory_mib);

        let node = self
            .nodes
            .get_mut(&node_name)
            .ok_or_else(|| LedgerError::NodeNotFound(node_name.clone()))?;
        node.cpu_milli_free += cpu;
        node.memory_mib_free += memory;
        for (gid, milli) in alloc {
            node.gpu_pods[gid].remove(pod_name);
            node.gpu_free_milli[gid] += milli;
        }

        if let Some(bound) = self.node_pods.get_mut(&node_name) {
            bound.remove(pod_name);
        }
        self.pod_node.remove(pod_name);
        self.running.remove(pod_name);
        self.completed.insert(pod_name.to_string());

        debug!(pod = %pod_name, node = %node_name, time, "pod released");
        Ok(())
    }

    // ── Internal helpers ───────────────────────────────────────────

    fn node(&self, node_name: &str) -> LedgerResult<&Node> {
        self.nodes
            .get(node_name)
            .ok_or_else(|| LedgerError::NodeNotFound(node_name.to_string()))
    }

    fn pod(&self, pod_name: &str) -> LedgerResult<&Pod> {
        self.pods
            .get(pod_name)
            .ok_or_else(|| LedgerError::PodNotFound(pod_name.to_string()))
    }
}

/// Choose the GPUs a pod would occupy on `node` without committing anything.
///
/// With sharing, eligible GPUs are ordered by `(free_milli, index)` so the
/// fullest GPU that still fits is taken first. Without sharing, only idle
/// GPUs are eligible and they are taken in index order.
fn select_gpus(node: &Node, pod: &Pod) -> LedgerResult<GpuAllocation> {
    if !pod.requests_gpu() {
        return Ok(GpuAllocation::new());
    }

    let per = pod.gpu_milli;
    if per > GPU_MILLI_PER_GPU {
        return Err(LedgerError::InvalidGpuMilli {
            pod: pod.name.clone(),
            milli: per,
        });
    }

    let mut eligible: Vec<usize> = (0..node.gpu_count)
        .filter(|&gid| node.gpu_is_eligible(gid, per))
        .collect();
    if node.gpu_share_enabled {
        eligible.sort_by_key(|&gid| (node.gpu_free_milli[gid], gid));
    }

    if eligible.len() < pod.num_gpu {
        return Err(LedgerError::InsufficientGpu {
            pod: pod.name.clone(),
            node: node.name.clone(),
        });
    }

    Ok(eligible
        .into_iter()
        .take(pod.num_gpu)
        .map(|gid| (gid, per))
        .collect())
}
