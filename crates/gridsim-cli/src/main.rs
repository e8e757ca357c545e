use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gridsim_cli::commands::{self, OutputFormat, Overrides};

#[derive(Parser)]
#[command(
    name = "gridsim",
    about = "gridsim: GPU-aware cluster scheduling simulator",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Log every scheduling decision
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a scenario and print its report.
    ///
    /// The scenario is read as TOML or JSON depending on its extension.
    Run {
        /// Scenario file (.toml or .json)
        scenario: PathBuf,
        #[command(flatten)]
        overrides: Overrides,
        /// Output format: text or json
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Simulate a scenario under every score policy (kubernetes, binpack, drift)
    Compare {
        /// Scenario file (.toml or .json)
        scenario: PathBuf,
        #[command(flatten)]
        overrides: Overrides,
        /// Output format: text or json
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose { "gridsim=debug" } else { "gridsim=info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(directive.parse()?)
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::with_default(subscriber, || match cli.command {
        Commands::Run { scenario, overrides, format } => {
            commands::run::run(&scenario, &overrides, format)
        }
        Commands::Compare { scenario, overrides, format } => {
            commands::compare::compare(&scenario, &overrides, format)
        }
    })
}
