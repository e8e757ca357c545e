use std::path::Path;

use gridsim_scheduler::SimulationReport;

use super::{OutputFormat, Overrides, load, simulate};
use crate::scenario::{Scenario, ScoreKind};

/// Run the scenario once per score policy, each on a fresh ledger.
pub fn compare_all(scenario: &Scenario, overrides: &Overrides) -> anyhow::Result<Vec<SimulationReport>> {
    ScoreKind::ALL
        .iter()
        .map(|&score| simulate(scenario, overrides, score))
        .collect()
}

pub fn compare(path: &Path, overrides: &Overrides, format: OutputFormat) -> anyhow::Result<()> {
    let scenario = load(path)?;
    let reports = compare_all(&scenario, overrides)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Text => {
            for report in &reports {
                println!("=== {} ===", report.score);
                println!("{report}");
                println!();
            }
        }
    }
    Ok(())
}
