use anyhow::Context;
use clap::Parser;
use hotel_weather::cli::{run, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = match &cli.command {
        Commands::Run { .. } => "run",
        Commands::Validate { .. } => "validate",
        Commands::Analyze { .. } => "analyze",
    };
    run(cli).with_context(|| format!("hotel-weather {} failed", command))
}
