//! Flight-data-recorder telemetry samples and their CSV loader

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use crate::geometry::{GeoPoint, normalize_heading};

/// One recorder sample. A flight is a `Vec<TelemetrySample>` addressed by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    #[serde(default)]
    pub time: String, // Recorder timestamp, carried through untouched
    pub latitude: f64,
    pub longitude: f64,
    pub msl_altitude: f64, // Feet above MSL
    #[serde(default)]
    pub radio_altitude_derived: Option<f64>, // Feet AGL, when the recorder provides it
    pub indicated_airspeed: f64, // Knots
    pub vertical_airspeed: f64,  // Feet per minute
    pub heading: f64,            // Degrees magnetic, [0, 360)
    pub roll_attitude: f64,      // Degrees, positive right wing down
    pub engine_rpm: f64,
    pub groundspeed: f64, // Knots
}

impl TelemetrySample {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// CSV row as written by the recorder export. Any value may be blank or
/// unparseable; such rows are dropped before analysis.
#[derive(Debug, Deserialize)]
struct TelemetryRecord {
    #[serde(default)]
    time: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    latitude: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    longitude: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    msl_altitude: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    radio_altitude_derived: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    indicated_airspeed: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    vertical_airspeed: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    heading: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    roll_attitude: Option<f64>,
    #[serde(default, alias = "eng_1_rpm", deserialize_with = "csv::invalid_option")]
    engine_rpm: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    groundspeed: Option<f64>,
}

impl TelemetryRecord {
    /// Complete sample, or `None` when a required value is missing
    fn into_sample(self) -> Option<TelemetrySample> {
        Some(TelemetrySample {
            time: self.time.unwrap_or_default(),
            latitude: self.latitude?,
            longitude: self.longitude?,
            msl_altitude: self.msl_altitude?,
            radio_altitude_derived: self.radio_altitude_derived,
            indicated_airspeed: self.indicated_airspeed?,
            vertical_airspeed: self.vertical_airspeed?,
            heading: self.heading.filter(|h| h.is_finite()).map(normalize_heading)?,
            roll_attitude: self.roll_attitude?,
            engine_rpm: self.engine_rpm?,
            groundspeed: self.groundspeed?,
        })
    }
}

/// Parse telemetry from any CSV reader with a header row
pub fn read_telemetry_csv<R: std::io::Read>(reader: R) -> Result<Vec<TelemetrySample>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut samples = Vec::new();
    let mut dropped = 0usize;

    for (index, record) in csv_reader.deserialize::<TelemetryRecord>().enumerate() {
        let lineno = index + 2;
        let record = record.with_context(|| format!("Parsing CSV line {}", lineno))?;
        match record.into_sample() {
            Some(sample) => samples.push(sample),
            None => {
                debug!("Dropping incomplete telemetry row at line {}", lineno);
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        warn!(
            "Dropped {} incomplete telemetry rows ({} kept)",
            dropped,
            samples.len()
        );
        metrics::counter!("telemetry.rows_dropped_total").increment(dropped as u64);
    }

    Ok(samples)
}

/// Read one flight's telemetry file
pub fn read_telemetry_csv_file<P: AsRef<Path>>(path: P) -> Result<Vec<TelemetrySample>> {
    let f = std::fs::File::open(path.as_ref())
        .with_context(|| format!("Opening {:?}", path.as_ref()))?;
    read_telemetry_csv(f).with_context(|| format!("Reading telemetry from {:?}", path.as_ref()))
}
