//! CLI entry point for the degree-hour tool.
//!
//! Provides subcommands for downloading station weather files, running a
//! single catalog scenario, running the whole catalog, and listing it.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use degree_hours::epw::EpwDecoder;
use degree_hours::fetch::{BasicClient, DownloadOptions, download_all};
use degree_hours::orchestrator::{run_all, run_and_save};
use degree_hours::scenario::{catalog, lookup};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEFAULT_BASE_URL: &str =
    "http://climate.onebuilding.org/WMO_Region_4_North_and_Central_America/CAN_Canada/";

#[derive(Parser)]
#[command(name = "degree_hours")]
#[command(about = "Heating and cooling degree-hour bins from hourly station weather", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DownloadArgs {
    /// Directory to save station archives into
    #[arg(long, env = "WEATHER_DIR", default_value = "data/weather")]
    weather_dir: PathBuf,

    /// Listing page holding the station archive links
    #[arg(long, env = "WEATHER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Only links ending with this suffix are downloaded
    #[arg(long, default_value = "CWEC2016.zip")]
    suffix: String,

    /// Maximum number of concurrent downloads
    #[arg(short, long, default_value_t = 10)]
    concurrency: usize,

    /// Attempts per file before giving up
    #[arg(long, default_value_t = 3)]
    retries: u32,

    /// Whole-request timeout in seconds
    #[arg(long, default_value_t = 300)]
    timeout_secs: u64,
}

#[derive(Args)]
struct RunArgs {
    /// Directory holding station archives (*.zip or *.epw)
    #[arg(long, env = "WEATHER_DIR", default_value = "data/weather")]
    weather_dir: PathBuf,

    /// Directory to write <scenario>.csv and <scenario>.summary.json into
    #[arg(long, env = "RESULTS_DIR", default_value = "results")]
    results_dir: PathBuf,

    /// Worker count (defaults to available parallelism)
    #[arg(short, long, env = "WORKERS")]
    workers: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download every station archive from the listing page
    Download(DownloadArgs),
    /// Run one catalog scenario over all stations
    Run {
        /// Scenario name, e.g. hdh_sc1
        #[arg(value_name = "SCENARIO")]
        scenario: String,

        #[command(flatten)]
        args: RunArgs,
    },
    /// Run all six catalog scenarios
    RunAll {
        #[command(flatten)]
        args: RunArgs,

        /// Download missing station archives first
        #[arg(long, default_value_t = false)]
        download: bool,

        /// Listing page used with --download
        #[arg(long, env = "WEATHER_BASE_URL", default_value = DEFAULT_BASE_URL)]
        base_url: String,
    },
    /// List the scenario catalog
    Scenarios {
        /// Print the catalog as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/degree_hours.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("degree_hours.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Download(args) => {
            download(&args).await?;
        }
        Commands::Run { scenario, args } => {
            let scenario = lookup(&scenario)?;
            let summary = run_and_save(
                &args.weather_dir,
                &args.results_dir,
                Arc::new(EpwDecoder),
                scenario,
                args.workers,
            )
            .await?;
            info!(
                scenario = %summary.scenario,
                succeeded = summary.stations_succeeded,
                failed = summary.stations_failed,
                rows = summary.rows,
                "Scenario complete"
            );
        }
        Commands::RunAll {
            args,
            download: fetch_first,
            base_url,
        } => {
            if fetch_first {
                let defaults = DownloadOptions::default();
                download(&DownloadArgs {
                    weather_dir: args.weather_dir.clone(),
                    base_url,
                    suffix: defaults.suffix,
                    concurrency: defaults.concurrency,
                    retries: defaults.retries,
                    timeout_secs: 300,
                })
                .await?;
            }

            let start = std::time::Instant::now();
            let outcomes = run_all(
                &args.weather_dir,
                &args.results_dir,
                Arc::new(EpwDecoder),
                args.workers,
            )
            .await;

            let failed: Vec<_> = outcomes
                .iter()
                .filter(|(_, outcome)| outcome.is_err())
                .map(|(name, _)| name.as_str())
                .collect();

            info!(
                scenarios = outcomes.len(),
                failed = failed.len(),
                elapsed_secs = start.elapsed().as_secs_f64(),
                "All scenarios finished"
            );
            if !failed.is_empty() {
                error!(failed = ?failed, "Some scenarios produced no results");
                bail!("{} scenario(s) failed: {}", failed.len(), failed.join(", "));
            }
        }
        Commands::Scenarios { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(catalog())?);
            } else {
                for s in catalog() {
                    let (min, max) = s.temp_range();
                    println!(
                        "{:<8} {:<8} daily={:>5}  weekly={:>5}  range=({min}, {max})  bin={}  daily_cond={}  weekly_cond={}",
                        s.name(),
                        s.degree_type().to_string(),
                        s.daily_threshold(),
                        s.weekly_threshold(),
                        s.bin_size(),
                        s.daily_condition(),
                        s.weekly_condition(),
                    );
                }
            }
        }
    }

    Ok(())
}

/// Downloads the station archives described by `args`.
#[tracing::instrument(skip_all, fields(weather_dir = %args.weather_dir.display()))]
async fn download(args: &DownloadArgs) -> Result<()> {
    let client = BasicClient::new(Duration::from_secs(args.timeout_secs))
        .context("failed to build HTTP client")?;
    let options = DownloadOptions {
        suffix: args.suffix.clone(),
        concurrency: args.concurrency,
        retries: args.retries,
        ..DownloadOptions::default()
    };

    let summary = download_all(Arc::new(client), &args.base_url, &args.weather_dir, &options).await?;
    info!(
        downloaded = summary.downloaded,
        skipped = summary.skipped,
        failed = summary.failed,
        "Download finished"
    );
    Ok(())
}
