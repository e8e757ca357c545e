//! Simulation events and the time-ordered event queue.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use gridsim_state::PodName;

/// What happens to a pod at an event's time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The pod becomes eligible for placement.
    Arrival,
    /// The pod finishes and releases its resources.
    Completion,
}

/// A timestamped event in the simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub time: u64,
    /// Insertion sequence; breaks ties between events at the same time.
    pub seq: u64,
    pub kind: EventKind,
    pub pod: PodName,
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        (other.time, other.seq).cmp(&(self.time, self.seq))
    }
}

/// Min-heap of events keyed on `(time, seq)`.
///
/// Events at the same time pop in the order they were pushed.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Event>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, time: u64, kind: EventKind, pod: impl Into<PodName>) {
        self.next_seq += 1;
        self.heap.push(Event {
            time,
            seq: self.next_seq,
            kind,
            pod: pod.into(),
        });
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop()
    }

    pub fn peek_time(&self) -> Option<u64> {
        self.heap.peek().map(|e| e.time)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
