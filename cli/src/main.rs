mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{census_stats, rules, run as run_pipeline, simulate};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log to stderr; `RUST_LOG` overrides the `-v` level.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Run(args) => run_pipeline::run(&cli, args),
        Commands::Rules(args) => rules::run(&cli, args),
        Commands::CensusStats(args) => census_stats::run(&cli, args),
        Commands::Simulate(args) => simulate::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
