pub mod compare;
pub mod run;

use clap::{Args, ValueEnum};
use gridsim_placement::ResourceFit;
use gridsim_scheduler::{Scheduler, SimulationReport};
use tracing::info_span;

use crate::scenario::{QueueSortKind, Scenario, ScoreKind};

/// Command-line settings that take precedence over the scenario file.
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    /// Queue ordering policy
    #[arg(long, value_enum)]
    pub queue_sort: Option<QueueSortKind>,
    /// Node scoring policy (ignored by `compare`)
    #[arg(long, value_enum)]
    pub score: Option<ScoreKind>,
    /// Seed for random tie-breaks between equally scored nodes
    #[arg(long)]
    pub seed: Option<u64>,
    /// Worker threads for per-node evaluation (at most 10)
    #[arg(long)]
    pub max_workers: Option<usize>,
    /// Force GPU sharing on (true) or off (false) for every node
    #[arg(long)]
    pub gpu_share: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Run `scenario` once with `score`, applying `overrides` to everything else.
pub fn simulate(
    scenario: &Scenario,
    overrides: &Overrides,
    score: ScoreKind,
) -> anyhow::Result<SimulationReport> {
    let mut config = scenario.scheduler.clone();
    if let Some(seed) = overrides.seed {
        config.seed = seed;
    }
    if let Some(max_workers) = overrides.max_workers {
        config.max_workers = max_workers;
    }
    let queue_sort = overrides.queue_sort.unwrap_or(scenario.plugins.queue_sort);

    let pods = scenario.build_pods();
    let score_plugin = score.plugin(&pods);
    let span = info_span!("simulation", queue_sort = ?queue_sort, score = ?score, seed = config.seed);

    let mut scheduler = Scheduler::new(
        scenario.build_nodes(overrides.gpu_share),
        pods,
        queue_sort.plugin(),
        Box::new(ResourceFit),
        score_plugin,
        config,
    )?
    .with_span(span);
    Ok(scheduler.run()?)
}

pub(crate) fn load(path: &std::path::Path) -> anyhow::Result<Scenario> {
    let scenario = Scenario::from_file(path)?;
    scenario.validate()?;
    Ok(scenario)
}
