//! Queue ordering of pending pods.

use gridsim_state::{Ledger, Pod};

/// Decides the order in which pending pods are offered to filter and score.
///
/// Implementations must be deterministic given the ledger state.
pub trait QueueSortPlugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// Pending pods in the order they should be considered.
    fn sort<'a>(&self, ledger: &'a Ledger) -> Vec<&'a Pod>;
}

fn pending<'a>(ledger: &'a Ledger) -> Vec<&'a Pod> {
    ledger
        .pending_pods()
        .iter()
        .filter_map(|name| ledger.get_pod(name))
        .collect()
}

/// First in, first out: ascending creation time, then pod name.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fifo;

impl QueueSortPlugin for Fifo {
    fn name(&self) -> &'static str {
        "fifo"
    }

    fn sort<'a>(&self, ledger: &'a Ledger) -> Vec<&'a Pod> {
        let mut pods = pending(ledger);
        pods.sort_by(|a, b| (a.creation_time, &a.name).cmp(&(b.creation_time, &b.name)));
        pods
    }
}

/// Shortest job first: ascending duration, then creation time, then pod name.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortestJobFirst;

impl QueueSortPlugin for ShortestJobFirst {
    fn name(&self) -> &'static str {
        "sjf"
    }

    fn sort<'a>(&self, ledger: &'a Ledger) -> Vec<&'a Pod> {
        let mut pods = pending(ledger);
        pods.sort_by(|a, b| {
            (a.duration, a.creation_time, &a.name).cmp(&(b.duration, b.creation_time, &b.name))
        });
        pods
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridsim_state::Node;

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.add_node(Node::new("n1", 2000, 4096, 4, true)).unwrap();
        ledger.add_node(Node::new("n2", 2000, 4096, 1, false)).unwrap();
        ledger.add_pod(Pod::new("p1", 500, 1024, 1, 1000, 2, 10)).unwrap();
        ledger.add_pod(Pod::new("p2", 500, 1024, 1, 1000, 3, 5)).unwrap();
        ledger.add_pod(Pod::new("p3", 500, 1024, 1, 500, 1, 15)).unwrap();
        ledger
    }

    fn names(pods: &[&Pod]) -> Vec<String> {
        pods.iter().map(|p| p.name.clone()).collect()
    }

    #[test]
    fn fifo_orders_by_creation_time() {
        let ledger = sample_ledger();
        assert_eq!(names(&Fifo.sort(&ledger)), vec!["p3", "p1", "p2"]);
    }

    #[test]
    fn sjf_orders_by_duration() {
        let ledger = sample_ledger();
        assert_eq!(names(&ShortestJobFirst.sort(&ledger)), vec!["p2", "p1", "p3"]);
    }

    #[test]
    fn ties_fall_back_to_name() {
        let mut ledger = Ledger::new();
        ledger.add_pod(Pod::new("b", 1, 1, 0, 0, 0, 7)).unwrap();
        ledger.add_pod(Pod::new("c", 1, 1, 0, 0, 0, 7)).unwrap();
        ledger.add_pod(Pod::new("a", 1, 1, 0, 0, 0, 7)).unwrap();

        assert_eq!(names(&Fifo.sort(&ledger)), vec!["a", "b", "c"]);
        assert_eq!(names(&ShortestJobFirst.sort(&ledger)), vec!["a", "b", "c"]);
    }

    #[test]
    fn sjf_breaks_duration_ties_by_creation_time() {
        let mut ledger = Ledger::new();
        ledger.add_pod(Pod::new("late", 1, 1, 0, 0, 9, 4)).unwrap();
        ledger.add_pod(Pod::new("early", 1, 1, 0, 0, 1, 4)).unwrap();
        assert_eq!(names(&ShortestJobFirst.sort(&ledger)), vec!["early", "late"]);
    }

    #[test]
    fn running_pods_are_not_queued() {
        let mut ledger = sample_ledger();
        ledger.bind("p3", "n1", 0).unwrap();
        assert_eq!(names(&Fifo.sort(&ledger)), vec!["p1", "p2"]);
    }
}
