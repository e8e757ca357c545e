//! End-of-run summary.

use std::fmt;

use gridsim_state::Ledger;
use serde::Serialize;

/// Outcome of a completed simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    /// Simulated time of the last event, in seconds.
    pub makespan: u64,
    pub total_pods: usize,
    pub total_nodes: usize,
    pub completed_pods: usize,
    pub cpu_utilization_percent: f64,
    pub gpu_utilization_percent: f64,
    pub queue_sort: String,
    pub score: String,
}

impl SimulationReport {
    /// Summarize `ledger` at the end of a run.
    ///
    /// Utilization is resource-time used by completed pods over
    /// `makespan × capacity`, and zero when either factor is zero.
    pub fn from_ledger(
        ledger: &Ledger,
        makespan: u64,
        total_pods: usize,
        queue_sort: &str,
        score: &str,
    ) -> Self {
        let (cpu_used, gpu_used) = ledger
            .completed_pods()
            .iter()
            .filter_map(|name| ledger.get_pod(name))
            .fold((0u128, 0u128), |(cpu, gpu), pod| {
                (cpu + u128::from(pod.cpu_usage()), gpu + u128::from(pod.gpu_usage()))
            });

        Self {
            makespan,
            total_pods,
            total_nodes: ledger.node_count(),
            completed_pods: ledger.completed_pods().len(),
            cpu_utilization_percent: utilization_percent(cpu_used, makespan, ledger.total_cpu_milli()),
            gpu_utilization_percent: utilization_percent(gpu_used, makespan, ledger.total_gpu_milli()),
            queue_sort: queue_sort.to_string(),
            score: score.to_string(),
        }
    }
}

fn utilization_percent(used: u128, makespan: u64, capacity: u64) -> f64 {
    let available = u128::from(makespan) * u128::from(capacity);
    if available == 0 {
        return 0.0;
    }
    used as f64 / available as f64 * 100.0
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total makespan: {} seconds", self.makespan)?;
        writeln!(f, "Scheduling {} pods in {} nodes", self.total_pods, self.total_nodes)?;
        writeln!(f, "Total completed pods: {} / {}", self.completed_pods, self.total_pods)?;
        writeln!(f, "CPU Utilization: {:.2}%", self.cpu_utilization_percent)?;
        write!(f, "GPU Utilization: {:.2}%", self.gpu_utilization_percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridsim_state::{Node, Pod};

    fn finished_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.add_node(Node::new("n1", 1000, 1024, 1, true)).unwrap();
        ledger.add_pod(Pod::new("p1", 500, 100, 1, 500, 0, 10)).unwrap();
        ledger.add_pod(Pod::new("p2", 500, 100, 0, 0, 0, 5)).unwrap();
        ledger.bind("p1", "n1", 0).unwrap();
        ledger.bind("p2", "n1", 0).unwrap();
        ledger.unbind("p2", 5).unwrap();
        ledger.unbind("p1", 10).unwrap();
        ledger
    }

    #[test]
    fn utilization_over_makespan() {
        let report = SimulationReport::from_ledger(&finished_ledger(), 10, 2, "fifo", "kubernetes");

        assert_eq!(report.completed_pods, 2);
        assert_eq!(report.total_nodes, 1);
        // CPU: (500×10 + 500×5) / (10 × 1000) = 75%.
        assert!((report.cpu_utilization_percent - 75.0).abs() < 1e-9);
        // GPU: (1×500×10) / (10 × 1000) = 50%.
        assert!((report.gpu_utilization_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn zero_makespan_reports_zero_utilization() {
        let report = SimulationReport::from_ledger(&finished_ledger(), 0, 2, "fifo", "binpack");
        assert_eq!(report.cpu_utilization_percent, 0.0);
        assert_eq!(report.gpu_utilization_percent, 0.0);
    }

    #[test]
    fn zero_capacity_reports_zero_utilization() {
        let mut ledger = Ledger::new();
        ledger.add_node(Node::new("cpu-only", 1000, 1024, 0, false)).unwrap();
        let report = SimulationReport::from_ledger(&ledger, 10, 0, "sjf", "drift");
        assert_eq!(report.gpu_utilization_percent, 0.0);
        assert_eq!(report.completed_pods, 0);
    }

    #[test]
    fn text_summary_has_five_lines() {
        let report = SimulationReport::from_ledger(&finished_ledger(), 10, 2, "fifo", "kubernetes");
        let text = report.to_string();

        assert_eq!(text.lines().count(), 5);
        assert!(text.starts_with("Total makespan: 10 seconds"));
        assert!(text.contains("Total completed pods: 2 / 2"));
        assert!(text.contains("CPU Utilization: 75.00%"));
    }
}
