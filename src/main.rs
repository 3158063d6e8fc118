//! CLI entry point for the bikeshare explorer.
//!
//! Runs the interactive session by default; `stats` and `rows` give one-shot,
//! scriptable access to the same pipeline.

use anyhow::{Context, Result};
use bikeshare_explorer::{
    analyzers::analyzer::analyze,
    config::Config,
    filter::{DayFilter, Filter, MonthFilter},
    loader::load_city,
    model::City,
    output::{print_json, render_report, write_rows},
    session::Session,
};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bikeshare_explorer")]
#[command(about = "Explore US bikeshare trip data", long_about = None)]
struct Cli {
    /// Directory containing chicago.csv, new_york_city.csv and washington.csv
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// JSON config file overriding the data directory or file names
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive exploration (default)
    Explore,
    /// Print statistics for one city and filter
    Stats {
        /// chicago, "new york city" or washington
        #[arg(short, long)]
        city: City,

        /// all, or january through june
        #[arg(short, long, default_value = "all")]
        month: MonthFilter,

        /// all, or monday through sunday
        #[arg(short, long, default_value = "all")]
        day: DayFilter,

        /// Emit JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write the filtered raw trips as CSV
    Rows {
        #[arg(short, long)]
        city: City,

        #[arg(short, long, default_value = "all")]
        month: MonthFilter,

        #[arg(short, long, default_value = "all")]
        day: DayFilter,

        /// Maximum number of rows to write
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/bikeshare_explorer.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bikeshare_explorer.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    // stderr stays quiet by default so it doesn't interleave with the prompts
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        );

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(non_blocking_file)
        .with_filter(
            EnvFilter::try_from_env("RUST_LOG_JSON").unwrap_or_else(|_| EnvFilter::new("debug")),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config_file = cli
        .config
        .or_else(|| std::env::var_os("BIKESHARE_CONFIG").map(PathBuf::from));
    let data_dir = cli
        .data_dir
        .or_else(|| std::env::var_os("BIKESHARE_DATA_DIR").map(PathBuf::from));
    let config = Config::resolve(config_file.as_deref(), data_dir)
        .context("failed to resolve configuration")?;

    match cli.command.unwrap_or(Commands::Explore) {
        Commands::Explore => {
            info!("Starting interactive session");
            let stdin = io::stdin();
            let stdout = io::stdout();
            Session::new(&config, stdin.lock(), stdout.lock()).run()?;
        }
        Commands::Stats {
            city,
            month,
            day,
            json,
        } => {
            let filter = Filter { month, day };
            let report = analyze(&config, city, filter)
                .with_context(|| format!("failed to analyze {city}"))?;
            if json {
                print_json(&report, io::stdout().lock())?;
            } else {
                render_report(&report, io::stdout().lock())?;
            }
        }
        Commands::Rows {
            city,
            month,
            day,
            limit,
        } => {
            let dataset =
                load_city(&config, city).with_context(|| format!("failed to load {city}"))?;
            let filtered = Filter { month, day }.apply(&dataset);
            let trips = filtered.trips();
            let trips = &trips[..limit.unwrap_or(trips.len()).min(trips.len())];
            debug!(rows = trips.len(), "Writing filtered rows");
            write_rows(trips, io::stdout().lock(), true)?;
        }
    }

    Ok(())
}
