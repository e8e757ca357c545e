//! Scheduler: the event loop that drives a simulation.
//!
//! The `Scheduler`:
//! - Registers nodes with the ledger up front and holds pods back until
//!   their arrival time
//! - Pops events in `(time, seq)` order and applies arrivals and completions
//! - After each event, repeats scheduling passes until one binds nothing
//! - Summarizes the final ledger into a [`SimulationReport`]

use std::collections::BTreeMap;

use gridsim_placement::{FilterPlugin, QueueSortPlugin, ScorePlugin, WorkerPool};
use gridsim_state::{Ledger, LedgerError, Node, NodeName, Pod, PodName, PodStatus};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{Span, debug, info, info_span};

use crate::config::SchedulerConfig;
use crate::error::{SchedulerError, SchedulerResult};
use crate::event::{EventKind, EventQueue};
use crate::report::SimulationReport;

/// Event-driven scheduler over one ledger and one plugin set.
pub struct Scheduler {
    ledger: Ledger,
    /// Pods whose arrival event has not fired yet.
    waiting: BTreeMap<PodName, Pod>,
    /// Node each pod was bound to, kept after the pod completes.
    placements: BTreeMap<PodName, NodeName>,
    total_pods: usize,
    queue_sort: Box<dyn QueueSortPlugin>,
    filter: Box<dyn FilterPlugin>,
    score: Box<dyn ScorePlugin>,
    pool: WorkerPool,
    rng: SmallRng,
    events: EventQueue,
    current_time: u64,
    span: Span,
}

impl Scheduler {
    /// Build a scheduler. Nodes are registered immediately; each pod gets an
    /// arrival event at its creation time.
    pub fn new(
        nodes: Vec<Node>,
        pods: Vec<Pod>,
        queue_sort: Box<dyn QueueSortPlugin>,
        filter: Box<dyn FilterPlugin>,
        score: Box<dyn ScorePlugin>,
        config: SchedulerConfig,
    ) -> SchedulerResult<Self> {
        config.validate()?;

        let mut ledger = Ledger::new();
        for node in nodes {
            ledger.add_node(node)?;
        }

        let total_pods = pods.len();
        let mut events = EventQueue::new();
        let mut waiting = BTreeMap::new();
        for pod in pods {
            if waiting.contains_key(&pod.name) {
                return Err(LedgerError::DuplicatePod(pod.name).into());
            }
            events.push(pod.creation_time, EventKind::Arrival, pod.name.clone());
            waiting.insert(pod.name.clone(), pod);
        }

        Ok(Self {
            ledger,
            waiting,
            placements: BTreeMap::new(),
            total_pods,
            queue_sort,
            filter,
            score,
            pool: WorkerPool::new(config.max_workers)?,
            rng: SmallRng::seed_from_u64(config.seed),
            events,
            current_time: 0,
            span: info_span!("simulation"),
        })
    }

    /// Record every event of this scheduler under `span`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Pod → node for every bind made so far.
    pub fn placements(&self) -> &BTreeMap<PodName, NodeName> {
        &self.placements
    }

    pub fn current_time(&self) -> u64 {
        self.current_time
    }

    /// Run until the event queue is empty and report.
    ///
    /// A bind failure after filtering, or an event for a pod in the wrong
    /// state, aborts the run.
    pub fn run(&mut self) -> SchedulerResult<SimulationReport> {
        let span = self.span.clone();
        let _entered = span.enter();

        info!(
            nodes = self.ledger.node_count(),
            pods = self.total_pods,
            queue_sort = self.queue_sort.name(),
            filter = self.filter.name(),
            score = self.score.name(),
            workers = self.pool.workers(),
            "simulation started"
        );

        while let Some(event) = self.events.pop() {
            self.current_time = event.time;
            match event.kind {
                EventKind::Arrival => self.on_arrival(&event.pod)?,
                EventKind::Completion => self.on_completion(&event.pod)?,
            }

            while self.schedule_pass()? > 0 {}
        }

        let report = SimulationReport::from_ledger(
            &self.ledger,
            self.current_time,
            self.total_pods,
            self.queue_sort.name(),
            self.score.name(),
        );
        info!(
            makespan = report.makespan,
            completed = report.completed_pods,
            total = report.total_pods,
            "simulation finished"
        );
        Ok(report)
    }

    fn on_arrival(&mut self, pod_name: &str) -> SchedulerResult<()> {
        match self.waiting.remove(pod_name) {
            Some(pod) => {
                if pod.status != PodStatus::Pending {
                    return Err(SchedulerError::InvariantViolation(format!(
                        "pod {pod_name} arrived with status {:?}, expected Pending",
                        pod.status
                    )));
                }
                self.ledger.add_pod(pod)?;
            }
            None => {
                let status = self
                    .ledger
                    .get_pod(pod_name)
                    .map(|p| p.status)
                    .ok_or_else(|| {
                        SchedulerError::InvariantViolation(format!("arrival for unknown pod {pod_name}"))
                    })?;
                if status != PodStatus::Pending {
                    return Err(SchedulerError::InvariantViolation(format!(
                        "pod {pod_name} arrived with status {status:?}, expected Pending"
                    )));
                }
                self.ledger.mark_pending(pod_name)?;
            }
        }
        debug!(pod = %pod_name, time = self.current_time, "pod arrived");
        Ok(())
    }

    fn on_completion(&mut self, pod_name: &str) -> SchedulerResult<()> {
        let status = self.ledger.get_pod(pod_name).map(|p| p.status);
        if status != Some(PodStatus::Running) {
            return Err(SchedulerError::InvariantViolation(format!(
                "pod {pod_name} completed with status {status:?}, expected Running"
            )));
        }
        self.ledger.unbind(pod_name, self.current_time)?;
        debug!(pod = %pod_name, time = self.current_time, "pod completed");
        Ok(())
    }

    /// One pass over the current pending queue. Returns the number of binds.
    fn schedule_pass(&mut self) -> SchedulerResult<usize> {
        let queue: Vec<PodName> = self
            .queue_sort
            .sort(&self.ledger)
            .into_iter()
            .map(|pod| pod.name.clone())
            .collect();

        let mut bound = 0;
        for pod_name in queue {
            let Some(node_name) = self.select_node(&pod_name) else {
                continue;
            };
            self.bind(&pod_name, &node_name)?;
            bound += 1;
        }
        Ok(bound)
    }

    fn select_node(&mut self, pod_name: &str) -> Option<NodeName> {
        let pod = self.ledger.get_pod(pod_name)?;
        let feasible = self.filter.filter(pod, &self.ledger, &self.pool);
        if feasible.is_empty() {
            debug!(pod = %pod_name, "no feasible node");
            return None;
        }
        self.score
            .pick(pod, &feasible, &self.ledger, &self.pool, &mut self.rng)
            .map(|node| node.name.clone())
    }

    fn bind(&mut self, pod_name: &str, node_name: &str) -> SchedulerResult<()> {
        let now = self.current_time;
        self.ledger
            .bind(pod_name, node_name, now)
            .map_err(|source| SchedulerError::Bind {
                pod: pod_name.to_string(),
                node: node_name.to_string(),
                source,
            })?;

        let duration = self
            .ledger
            .get_pod(pod_name)
            .map(|p| p.duration)
            .ok_or_else(|| LedgerError::PodNotFound(pod_name.to_string()))?;
        self.events
            .push(now + duration, EventKind::Completion, pod_name);
        self.placements
            .insert(pod_name.to_string(), node_name.to_string());

        debug!(pod = %pod_name, node = %node_name, time = now, finish = now + duration, "pod scheduled");
        Ok(())
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("current_time", &self.current_time)
            .field("queue_sort", &self.queue_sort.name())
            .field("filter", &self.filter.name())
            .field("score", &self.score.name())
            .field("pending_events", &self.events.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridsim_placement::{BinPack, Fifo, Kubernetes, ResourceFit, ShortestJobFirst};

    fn make_scheduler(nodes: Vec<Node>, pods: Vec<Pod>) -> Scheduler {
        Scheduler::new(
            nodes,
            pods,
            Box::new(Fifo),
            Box::new(ResourceFit),
            Box::new(Kubernetes),
            SchedulerConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn empty_run_reports_zeros() {
        let mut scheduler = make_scheduler(vec![Node::new("n1", 1000, 1000, 0, false)], Vec::new());
        let report = scheduler.run().unwrap();

        assert_eq!(report.makespan, 0);
        assert_eq!(report.completed_pods, 0);
        assert_eq!(report.cpu_utilization_percent, 0.0);
    }

    #[test]
    fn pods_wait_for_their_arrival_time() {
        let mut scheduler = make_scheduler(
            vec![Node::new("n1", 1000, 1000, 0, false)],
            vec![Pod::new("late", 100, 100, 0, 0, 50, 10)],
        );
        assert!(scheduler.ledger().get_pod("late").is_none());

        let report = scheduler.run().unwrap();
        let pod = scheduler.ledger().get_pod("late").unwrap();
        assert_eq!(pod.scheduled_time, Some(50));
        assert_eq!(pod.completion_time, Some(60));
        assert_eq!(report.makespan, 60);
    }

    #[test]
    fn completion_frees_room_for_waiting_pod() {
        let mut scheduler = make_scheduler(
            vec![Node::new("n1", 1000, 1000, 0, false)],
            vec![
                Pod::new("a", 800, 100, 0, 0, 0, 10),
                Pod::new("b", 800, 100, 0, 0, 1, 10),
            ],
        );
        let report = scheduler.run().unwrap();

        let b = scheduler.ledger().get_pod("b").unwrap();
        assert_eq!(b.scheduled_time, Some(10));
        assert_eq!(report.makespan, 20);
        assert_eq!(report.completed_pods, 2);
    }

    #[test]
    fn pod_that_never_fits_stays_pending() {
        let mut scheduler = make_scheduler(
            vec![Node::new("n1", 1000, 1000, 0, false)],
            vec![
                Pod::new("fits", 100, 100, 0, 0, 0, 3),
                Pod::new("huge", 5000, 100, 0, 0, 0, 3),
            ],
        );
        let report = scheduler.run().unwrap();

        assert_eq!(report.completed_pods, 1);
        assert_eq!(report.total_pods, 2);
        assert!(scheduler.ledger().pending_pods().contains("huge"));
    }

    #[test]
    fn non_pending_arrival_is_fatal() {
        let mut pod = Pod::new("p", 100, 100, 0, 0, 0, 1);
        pod.status = PodStatus::Completed;
        let mut scheduler = make_scheduler(vec![Node::new("n1", 1000, 1000, 0, false)], vec![pod]);

        assert!(matches!(
            scheduler.run(),
            Err(SchedulerError::InvariantViolation(_))
        ));
    }

    #[test]
    fn duplicate_pod_names_rejected() {
        let result = Scheduler::new(
            vec![Node::new("n1", 1000, 1000, 0, false)],
            vec![Pod::new("p", 1, 1, 0, 0, 0, 1), Pod::new("p", 1, 1, 0, 0, 0, 1)],
            Box::new(Fifo),
            Box::new(ResourceFit),
            Box::new(Kubernetes),
            SchedulerConfig::default(),
        );
        assert!(matches!(
            result,
            Err(SchedulerError::Ledger(LedgerError::DuplicatePod(_)))
        ));
    }

    #[test]
    fn duplicate_node_names_rejected() {
        let result = Scheduler::new(
            vec![Node::new("n1", 1, 1, 0, false), Node::new("n1", 1, 1, 0, false)],
            Vec::new(),
            Box::new(Fifo),
            Box::new(ResourceFit),
            Box::new(Kubernetes),
            SchedulerConfig::default(),
        );
        assert!(matches!(
            result,
            Err(SchedulerError::Ledger(LedgerError::DuplicateNode(_)))
        ));
    }

    #[test]
    fn sjf_runs_short_job_first_on_contended_node() {
        let mut scheduler = Scheduler::new(
            vec![Node::new("n1", 1000, 1000, 0, false)],
            vec![
                Pod::new("blocker", 1000, 100, 0, 0, 0, 5),
                Pod::new("long", 1000, 100, 0, 0, 1, 100),
                Pod::new("short", 1000, 100, 0, 0, 2, 1),
            ],
            Box::new(ShortestJobFirst),
            Box::new(ResourceFit),
            Box::new(BinPack),
            SchedulerConfig::default(),
        )
        .unwrap();
        scheduler.run().unwrap();

        let short = scheduler.ledger().get_pod("short").unwrap();
        let long = scheduler.ledger().get_pod("long").unwrap();
        assert_eq!(short.scheduled_time, Some(5));
        assert_eq!(long.scheduled_time, Some(6));
    }

    #[test]
    fn same_seed_same_placements() {
        let nodes = || -> Vec<Node> {
            (0..4)
                .map(|i| Node::new(format!("n{i}"), 4000, 4096, 0, false))
                .collect()
        };
        let pods = || -> Vec<Pod> {
            (0..12)
                .map(|i| Pod::new(format!("p{i:02}"), 500, 256, 0, 0, i % 3, 7))
                .collect()
        };
        let placements = |seed: u64| -> BTreeMap<PodName, NodeName> {
            let config = SchedulerConfig { seed, max_workers: 4 };
            let mut scheduler = Scheduler::new(
                nodes(),
                pods(),
                Box::new(Fifo),
                Box::new(ResourceFit),
                Box::new(BinPack),
                config,
            )
            .unwrap();
            scheduler.run().unwrap();
            scheduler.placements().clone()
        };

        let first = placements(11);
        assert_eq!(first.len(), 12);
        assert_eq!(first, placements(11));
    }
}
