//! Fan-out of many flights over a rayon pool
//!
//! A failing flight is logged and counted; it never stops the others.

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

use crate::approaches_repo::{ApproachRow, ApproachSink};
use crate::flight_analyzer::{FlightAnalysis, FlightAnalyzer};
use crate::telemetry::{TelemetrySample, read_telemetry_csv_file};

#[derive(Debug, Clone)]
pub enum FlightSource {
    File(PathBuf),
    Samples(Vec<TelemetrySample>),
}

#[derive(Debug, Clone)]
pub struct FlightJob {
    pub flight_id: String,
    pub aircraft_type_id: i32,
    pub source: FlightSource,
}

impl FlightJob {
    /// Job for a telemetry file; the flight id is the file stem
    pub fn from_path(path: PathBuf, aircraft_type_id: i32) -> Self {
        let flight_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            flight_id,
            aircraft_type_id,
            source: FlightSource::File(path),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlightFailure {
    pub flight_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub flights_analyzed: usize,
    pub flights_failed: usize,
    pub approaches: usize,
    pub unstable_approaches: usize,
    pub failures: Vec<FlightFailure>,
}

impl RunSummary {
    fn add(&mut self, outcome: Result<FlightAnalysis, FlightFailure>) {
        match outcome {
            Ok(analysis) => {
                self.flights_analyzed += 1;
                self.approaches += analysis.approaches.len();
                self.unstable_approaches += analysis.unstable_approaches();
            }
            Err(failure) => {
                self.flights_failed += 1;
                self.failures.push(failure);
            }
        }
    }
}

/// Analyze and store one flight
fn process_flight(
    analyzer: &FlightAnalyzer<'_>,
    sink: &dyn ApproachSink,
    job: &FlightJob,
) -> Result<FlightAnalysis> {
    let loaded;
    let samples: &[TelemetrySample] = match &job.source {
        FlightSource::File(path) => {
            loaded = read_telemetry_csv_file(path)?;
            &loaded
        }
        FlightSource::Samples(samples) => samples,
    };

    let analysis = analyzer.analyze(&job.flight_id, job.aircraft_type_id, samples)?;
    sink.store_flight(&job.flight_id, &ApproachRow::from_analysis(&analysis))
        .with_context(|| format!("Storing results for flight {}", job.flight_id))?;
    Ok(analysis)
}

/// Analyze every job on a pool of `workers` threads (rayon's default when `None`)
pub fn analyze_flights(
    analyzer: &FlightAnalyzer<'_>,
    sink: &dyn ApproachSink,
    jobs: &[FlightJob],
    workers: Option<usize>,
) -> Result<RunSummary> {
    let started = Instant::now();
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(workers) = workers {
        builder = builder.num_threads(workers);
    }
    let pool = builder.build().context("Building worker pool")?;

    info!(
        "Analyzing {} flights on {} workers",
        jobs.len(),
        pool.current_num_threads()
    );

    let outcomes: Vec<Result<FlightAnalysis, FlightFailure>> = pool.install(|| {
        jobs.par_iter()
            .map(|job| {
                process_flight(analyzer, sink, job).map_err(|e| {
                    error!("Flight {} failed: {:#}", job.flight_id, e);
                    metrics::counter!("runner.flights_failed_total").increment(1);
                    FlightFailure {
                        flight_id: job.flight_id.clone(),
                        error: format!("{:#}", e),
                    }
                })
            })
            .collect()
    });

    let mut summary = RunSummary::default();
    for outcome in outcomes {
        summary.add(outcome);
    }

    metrics::counter!("runner.flights_analyzed_total").increment(summary.flights_analyzed as u64);
    metrics::histogram!("runner.run.duration_seconds").record(started.elapsed().as_secs_f64());

    info!(
        "Run finished in {:.2}s: {} flights analyzed, {} failed, {} approaches ({} unstable)",
        started.elapsed().as_secs_f64(),
        summary.flights_analyzed,
        summary.flights_failed,
        summary.approaches,
        summary.unstable_approaches
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approaches_repo::MemoryApproachSink;
    use crate::reference_data::ReferenceData;
    use crate::thresholds::ThresholdSet;

    #[test]
    fn test_flight_id_from_file_stem() {
        let job = FlightJob::from_path(PathBuf::from("/data/flights/123456.csv"), 4);
        assert_eq!(job.flight_id, "123456");
        assert_eq!(job.aircraft_type_id, 4);
    }

    #[test]
    fn test_failures_do_not_stop_other_flights() {
        let reference = ReferenceData::default();
        let thresholds = ThresholdSet::default();
        let analyzer = FlightAnalyzer::new(&reference, &thresholds);
        let sink = MemoryApproachSink::new();

        let jobs = vec![
            FlightJob {
                flight_id: "empty".to_string(),
                aircraft_type_id: 1,
                source: FlightSource::Samples(vec![]),
            },
            FlightJob::from_path(PathBuf::from("/nonexistent/missing.csv"), 1),
        ];

        let summary = analyze_flights(&analyzer, &sink, &jobs, Some(2)).unwrap();

        assert_eq!(summary.flights_analyzed, 1);
        assert_eq!(summary.flights_failed, 1);
        assert_eq!(summary.failures[0].flight_id, "missing");
        assert!(sink.is_analyzed("empty").unwrap());
        assert!(!sink.is_analyzed("missing").unwrap());
    }
}
