use crate::models::FailurePolicy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hotel-weather")]
#[command(about = "Per-city temperature extremes for a set of hotel locations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Geocode hotels, fetch weather per city and export the results
    Run {
        #[arg(short, long, help = "Zip archive, directory or CSV file of hotels")]
        input: PathBuf,

        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        #[arg(long, help = "Geocoding workers [default: from config, else CPU count]")]
        workers: Option<usize>,

        #[arg(
            short,
            long,
            help = "Settings file [default: hotel-weather.toml if present]"
        )]
        config: Option<PathBuf>,

        #[arg(long, help = "OpenWeatherMap API key (overrides config and environment)")]
        api_key: Option<String>,

        #[arg(long, help = "What to do when a record or city keeps failing: abort or skip")]
        failure_policy: Option<FailurePolicy>,
    },

    /// Load and clean the hotel records without calling any service
    Validate {
        #[arg(short, long, help = "Zip archive, directory or CSV file of hotels")]
        input: PathBuf,
    },

    /// Recompute the analytics over a previously exported weather.csv
    Analyze {
        #[arg(short = 'O', long)]
        observations: PathBuf,

        #[arg(short, long, help = "Write the analytics CSVs to this directory")]
        output_dir: Option<PathBuf>,
    },
}
