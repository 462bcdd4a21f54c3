use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

use crate::flight_analyzer::{ApproachRecord, FlightAnalysis};
use crate::risk::{RiskParameter, risk_level};

/// Stored form of one approach; value sequences are reduced to their mean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproachRow {
    pub flight_id: String,
    pub approach_id: usize, // 1-based
    pub airport_code: String,
    pub runway_id: Option<i32>,
    pub runway_code: Option<String>,
    pub approach_start: usize,
    pub approach_end: usize,
    pub landing_start: usize,
    pub landing_end: usize,
    pub landing_type: String,
    pub unstable: bool,

    pub turn_start: Option<usize>,
    pub turn_end: Option<usize>,
    pub turn_crosstrack_error: Option<f64>,
    pub turn_error_type: Option<String>,

    pub all_heading: Option<f64>,
    pub f1_heading: Option<f64>,
    pub all_crosstrack: Option<f64>,
    pub f2_crosstrack: Option<f64>,
    pub all_ias: Option<f64>,
    pub a_ias: Option<f64>,
    pub all_vsi: Option<f64>,
    pub s_vsi: Option<f64>,

    pub ias_risk: Option<u8>,
    pub vsi_risk: Option<u8>,
    pub crosstrack_risk: Option<u8>,
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

fn risk(parameter: RiskParameter, average: Option<f64>) -> Option<u8> {
    average
        .and_then(|v| risk_level(parameter, v))
        .map(u8::from)
}

impl ApproachRow {
    pub fn from_record(flight_id: &str, record: &ApproachRecord) -> Self {
        let all_ias = mean(&record.ias);
        let all_vsi = mean(&record.vsi);
        let all_crosstrack = mean(&record.crosstrack);
        let turn = record.turn_to_final.as_ref();

        Self {
            flight_id: flight_id.to_string(),
            approach_id: record.approach_id + 1,
            airport_code: record.airport_code.clone(),
            runway_id: record.runway_id,
            runway_code: record.runway_code.clone(),
            approach_start: record.approach_start,
            approach_end: record.approach_end,
            landing_start: record.landing_start,
            landing_end: record.landing_end,
            landing_type: record.landing_type.to_string(),
            unstable: record.unstable,
            turn_start: turn.map(|t| t.start),
            turn_end: turn.map(|t| t.end),
            turn_crosstrack_error: turn.map(|t| t.crosstrack_error_ft),
            turn_error_type: turn.and_then(|t| t.error_type).map(|e| e.to_string()),
            all_heading: mean(&record.heading),
            f1_heading: mean(&record.f1_heading),
            all_crosstrack,
            f2_crosstrack: mean(&record.f2_crosstrack),
            all_ias,
            a_ias: mean(&record.a_ias),
            all_vsi,
            s_vsi: mean(&record.s_vsi),
            ias_risk: risk(RiskParameter::IndicatedAirspeed, all_ias),
            vsi_risk: risk(RiskParameter::VerticalSpeed, all_vsi),
            crosstrack_risk: risk(RiskParameter::Crosstrack, all_crosstrack),
        }
    }

    pub fn from_analysis(analysis: &FlightAnalysis) -> Vec<Self> {
        analysis
            .approaches
            .values()
            .map(|record| Self::from_record(&analysis.flight_id, record))
            .collect()
    }
}

/// Destination for analysis results
///
/// `store_flight` upserts rows keyed by `(flight_id, approach_id)` and marks
/// the flight analyzed, also when it has no approaches.
pub trait ApproachSink: Send + Sync {
    fn store_flight(&self, flight_id: &str, rows: &[ApproachRow]) -> Result<()>;
}

#[derive(Debug, Default)]
struct MemoryState {
    rows: BTreeMap<(String, usize), ApproachRow>,
    analyzed: BTreeSet<String>,
}

/// In-process sink, used by tests and `--no-write` runs
#[derive(Debug, Default)]
pub struct MemoryApproachSink {
    state: Mutex<MemoryState>,
}

impl MemoryApproachSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MemoryState) -> T) -> Result<T> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow!("approach store lock poisoned"))?;
        Ok(f(&mut state))
    }

    pub fn rows_for(&self, flight_id: &str) -> Result<Vec<ApproachRow>> {
        self.with_state(|state| {
            state
                .rows
                .values()
                .filter(|row| row.flight_id == flight_id)
                .cloned()
                .collect()
        })
    }

    pub fn is_analyzed(&self, flight_id: &str) -> Result<bool> {
        self.with_state(|state| state.analyzed.contains(flight_id))
    }

    pub fn row_count(&self) -> Result<usize> {
        self.with_state(|state| state.rows.len())
    }
}

impl ApproachSink for MemoryApproachSink {
    fn store_flight(&self, flight_id: &str, rows: &[ApproachRow]) -> Result<()> {
        self.with_state(|state| {
            for row in rows {
                state
                    .rows
                    .insert((row.flight_id.clone(), row.approach_id), row.clone());
            }
            state.analyzed.insert(flight_id.to_string());
        })
    }
}

/// One line of a JSON Lines results file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightResultLine {
    pub flight_id: String,
    pub analyzed_at: DateTime<Utc>,
    pub approaches: Vec<ApproachRow>,
}

/// Appends one JSON object per analyzed flight. A later line for the same
/// flight supersedes earlier ones.
pub struct JsonLinesApproachSink {
    writer: Mutex<BufWriter<File>>,
}

impl JsonLinesApproachSink {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::options()
            .create(true)
            .append(true)
            .open(path.as_ref())
            .with_context(|| format!("Opening {:?}", path.as_ref()))?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

impl ApproachSink for JsonLinesApproachSink {
    fn store_flight(&self, flight_id: &str, rows: &[ApproachRow]) -> Result<()> {
        let line = FlightResultLine {
            flight_id: flight_id.to_string(),
            analyzed_at: Utc::now(),
            approaches: rows.to_vec(),
        };
        let json = serde_json::to_string(&line).context("Serializing approach rows")?;

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| anyhow!("results file lock poisoned"))?;
        writeln!(writer, "{}", json).context("Writing approach rows")?;
        writer.flush().context("Flushing approach rows")?;

        debug!("Stored {} approach rows for flight {}", rows.len(), flight_id);
        Ok(())
    }
}

/// Read back a JSON Lines results file, keeping the last line per flight
pub fn read_results_file<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, FlightResultLine>> {
    let contents = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read {:?}", path.as_ref()))?;

    let mut results = BTreeMap::new();
    for (i, line) in contents.lines().enumerate().filter(|(_, l)| !l.trim().is_empty()) {
        let entry: FlightResultLine =
            serde_json::from_str(line).with_context(|| format!("Parsing results line {}", i + 1))?;
        results.insert(entry.flight_id.clone(), entry);
    }
    Ok(results)
}
