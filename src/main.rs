use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use fdm_analyzer::approaches_repo::{ApproachSink, JsonLinesApproachSink, MemoryApproachSink};
use fdm_analyzer::config::AppConfig;
use fdm_analyzer::flight_analyzer::FlightAnalyzer;
use fdm_analyzer::log_format::FlightLogFormat;
use fdm_analyzer::reference_data::ReferenceData;
use fdm_analyzer::runner::{FlightJob, analyze_flights};
use fdm_analyzer::thresholds::ThresholdSet;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser)]
#[command(name = "fdm-analyzer")]
#[command(about = "Segment flight recorder telemetry into takeoffs, approaches and landings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one or more flight telemetry CSV files
    Analyze {
        /// Telemetry files; each file stem becomes the flight id
        #[arg(required = true)]
        flights: Vec<PathBuf>,

        /// Airports CSV (overrides FDM_AIRPORTS_CSV)
        #[arg(long)]
        airports: Option<PathBuf>,

        /// Runways CSV (overrides FDM_RUNWAYS_CSV)
        #[arg(long)]
        runways: Option<PathBuf>,

        /// Thresholds TOML (overrides FDM_THRESHOLDS)
        #[arg(long)]
        thresholds: Option<PathBuf>,

        /// Aircraft type id used to pick per-aircraft thresholds
        #[arg(long = "aircraft-type", default_value = "0")]
        aircraft_type: i32,

        /// Worker threads (overrides FDM_WORKERS)
        #[arg(long)]
        workers: Option<usize>,

        /// JSON Lines results file, appended to
        #[arg(long, default_value = "approaches.jsonl")]
        output: PathBuf,

        /// Analyze without writing results
        #[arg(long = "no-write")]
        no_write: bool,
    },

    /// Show the airport indexed for a position
    Nearest {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Airports CSV (overrides FDM_AIRPORTS_CSV)
        #[arg(long)]
        airports: Option<PathBuf>,

        /// Runways CSV (overrides FDM_RUNWAYS_CSV)
        #[arg(long)]
        runways: Option<PathBuf>,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let format = FlightLogFormat::new(std::io::stderr().is_terminal());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn load_reference(
    config: &AppConfig,
    airports: Option<PathBuf>,
    runways: Option<PathBuf>,
) -> Result<ReferenceData> {
    let Some(airports) = airports.or_else(|| config.airports_csv.clone()) else {
        bail!("No airports file: pass --airports or set FDM_AIRPORTS_CSV");
    };
    let Some(runways) = runways.or_else(|| config.runways_csv.clone()) else {
        bail!("No runways file: pass --runways or set FDM_RUNWAYS_CSV");
    };
    ReferenceData::load(&airports, &runways).context("Loading reference data")
}

#[allow(clippy::too_many_arguments)]
fn handle_analyze(
    config: AppConfig,
    flights: Vec<PathBuf>,
    airports: Option<PathBuf>,
    runways: Option<PathBuf>,
    thresholds: Option<PathBuf>,
    aircraft_type: i32,
    workers: Option<usize>,
    output: PathBuf,
    no_write: bool,
) -> Result<bool> {
    let reference = load_reference(&config, airports, runways)?;
    if !reference.collisions().is_empty() {
        warn!(
            "{} airports are unreachable through the spatial index",
            reference.collisions().len()
        );
    }

    let thresholds = match thresholds.or(config.thresholds.clone()) {
        Some(path) => ThresholdSet::load(&path)?,
        None => ThresholdSet::default(),
    };

    let sink: Box<dyn ApproachSink> = if no_write {
        Box::new(MemoryApproachSink::new())
    } else {
        info!("Writing results to {:?}", output);
        Box::new(JsonLinesApproachSink::create(&output)?)
    };

    let jobs: Vec<FlightJob> = flights
        .into_iter()
        .map(|path| FlightJob::from_path(path, aircraft_type))
        .collect();

    let analyzer = FlightAnalyzer::new(&reference, &thresholds);
    let summary = analyze_flights(&analyzer, sink.as_ref(), &jobs, workers.or(config.workers))?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(summary.flights_failed == 0)
}

fn handle_nearest(
    config: AppConfig,
    lat: f64,
    lon: f64,
    airports: Option<PathBuf>,
    runways: Option<PathBuf>,
) -> Result<bool> {
    let reference = load_reference(&config, airports, runways)?;

    match reference.nearest_airport(lat, lon) {
        Some(airport) => {
            println!(
                "{} {} ({}, {}) elevation {} ft, {} runways",
                airport.code,
                airport.name,
                airport.city,
                airport.state,
                airport.elevation_ft,
                airport.runways.len()
            );
            for runway in &airport.runways {
                println!(
                    "  {} magnetic {} true {}",
                    runway.code, runway.magnetic_heading, runway.true_heading
                );
            }
            Ok(true)
        }
        None => {
            println!("No airport indexed near {}, {}", lat, lon);
            Ok(false)
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let ok = match cli.command {
        Commands::Analyze {
            flights,
            airports,
            runways,
            thresholds,
            aircraft_type,
            workers,
            output,
            no_write,
        } => handle_analyze(
            config,
            flights,
            airports,
            runways,
            thresholds,
            aircraft_type,
            workers,
            output,
            no_write,
        )?,
        Commands::Nearest {
            lat,
            lon,
            airports,
            runways,
        } => handle_nearest(config, lat, lon, airports, runways)?,
    };

    if !ok {
        std::process::exit(2);
    }
    Ok(())
}
