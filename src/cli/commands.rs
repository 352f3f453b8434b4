use crate::analyzers::ClimateAnalyzer;
use crate::cli::args::{Cli, Commands};
use crate::config::Settings;
use crate::error::{ProcessingError, Result};
use crate::models::FailurePolicy;
use crate::processors::Pipeline;
use crate::readers::{ObservationReader, SourceLoader};
use crate::utils::constants::DEFAULT_CONFIG_FILE;
use crate::utils::progress::ProgressReporter;
use crate::writers::CsvExporter;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;
use validator::Validate;

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    // Progress bars would interleave with nothing useful when logs go to a file
    let silent = cli.log_file.is_some();

    match cli.command {
        Commands::Run {
            input,
            output_dir,
            workers,
            config,
            api_key,
            failure_policy,
        } => {
            let settings = load_settings(config, workers, api_key, failure_policy)?;

            println!("Processing hotels...");
            println!("Input: {}", input.display());
            println!("Output directory: {}", output_dir.display());
            println!(
                "Workers: {}, Failure policy: {}",
                settings.workers, settings.failure_policy
            );

            let pipeline = Pipeline::from_settings(&settings)?.with_silent(silent);
            let output = pipeline.run(&input)?;

            let exporter = CsvExporter::new(&output_dir);
            let hotel_files = exporter.export_hotels(&output.hotels)?;
            exporter.export_centroids(&output.centroids)?;
            let observation_files = exporter.export_observations(&output.observations)?;
            exporter.export_analytics(&output.analytics)?;
            if let Some(path) = exporter.export_failures(&output.failures)? {
                tracing::warn!(
                    "{} records or cities were skipped, see {}",
                    output.failures.len(),
                    path.display()
                );
            }

            println!("\n{}", output.summary());
            println!(
                "\nWrote {} hotel files and {} observation files to {}",
                hotel_files.len(),
                observation_files.len(),
                output_dir.display()
            );
            println!("Processing complete!");
        }

        Commands::Validate { input } => {
            println!("Validating hotel records...");
            println!("Input: {}", input.display());

            let progress = ProgressReporter::new_spinner("Loading hotel records...", silent);
            let report = SourceLoader::new().load(&input)?;
            progress.finish_with_message(&format!("Loaded {} records", report.records.len()));
            println!("\n{}", report.summary());

            if report.rows_dropped == 0 {
                println!("✅ All rows passed validation checks");
            } else {
                println!("⚠️  Dropped {} rows with invalid coordinates", report.rows_dropped);
            }
        }

        Commands::Analyze {
            observations,
            output_dir,
        } => {
            println!("Analyzing observations: {}", observations.display());

            let observations = ObservationReader::new().read_observations(&observations)?;
            let result = ClimateAnalyzer::new().analyze(&observations)?;
            println!("\n{}", result.summary());

            if let Some(dir) = output_dir {
                let files = CsvExporter::new(&dir).export_analytics(&result)?;
                println!("Wrote {} analytics files to {}", files.len(), dir.display());
            }
        }
    }

    Ok(())
}

/// Layer command-line overrides on top of file and environment settings
pub fn load_settings(
    config: Option<PathBuf>,
    workers: Option<usize>,
    api_key: Option<String>,
    failure_policy: Option<FailurePolicy>,
) -> Result<Settings> {
    let config = config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut settings = Settings::load(Some(&config))?;

    if let Some(workers) = workers {
        settings.workers = workers;
    }
    if let Some(key) = api_key {
        settings.weather.api_key = key;
    }
    if let Some(policy) = failure_policy {
        settings.failure_policy = policy;
    }

    settings.validate()?;
    Ok(settings)
}

pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    let installed = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    installed.map_err(|e| ProcessingError::Config(format!("Failed to install logger: {}", e)))
}
