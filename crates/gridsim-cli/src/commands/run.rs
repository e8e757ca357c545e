use std::path::Path;

use super::{OutputFormat, Overrides, load, simulate};

pub fn run(path: &Path, overrides: &Overrides, format: OutputFormat) -> anyhow::Result<()> {
    let scenario = load(path)?;
    let score = overrides.score.unwrap_or(scenario.plugins.score);
    let report = simulate(&scenario, overrides, score)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => println!("{report}"),
    }
    Ok(())
}
