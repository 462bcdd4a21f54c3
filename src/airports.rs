use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::geometry::GeoPoint;
use crate::quad_tree::Located;
use crate::runways::Runway;

#[derive(Debug, Clone, Serialize)]
pub struct Airport {
    pub code: String,      // Airport identifier (FAA LID or ICAO)
    pub name: String,      // Official airport name
    pub city: String,      // City served
    pub state: String,     // State or region code
    pub center: GeoPoint,  // Airport reference point
    pub elevation_ft: f64, // Field elevation above MSL in feet
    pub runways: Vec<Runway>,
}

impl Airport {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        center: GeoPoint,
        elevation_ft: f64,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            city: city.into(),
            state: state.into(),
            center,
            elevation_ft,
            runways: Vec::new(),
        }
    }

    /// Runways keep the order in which they were loaded
    pub fn add_runway(&mut self, runway: Runway) {
        self.runways.push(runway);
    }
}

impl Located for Airport {
    fn location(&self) -> GeoPoint {
        self.center
    }
}

/// One row of the airports reference file
/// Expected columns: code, name, city, state, latitude, longitude, elevation
#[derive(Debug, Deserialize)]
struct AirportRecord {
    code: String,
    name: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    state: String,
    latitude: f64,
    longitude: f64,
    elevation: f64,
}

impl TryFrom<AirportRecord> for Airport {
    type Error = anyhow::Error;

    fn try_from(record: AirportRecord) -> Result<Self> {
        let code = record.code.trim().to_string();
        if code.is_empty() {
            return Err(anyhow!("Missing airport identifier in CSV"));
        }

        if !(-90.0..=90.0).contains(&record.latitude) || !(-180.0..=180.0).contains(&record.longitude)
        {
            return Err(anyhow!(
                "Airport {} has invalid coordinates ({}, {})",
                code,
                record.latitude,
                record.longitude
            ));
        }

        Ok(Airport::new(
            code,
            record.name.trim(),
            record.city.trim(),
            record.state.trim(),
            GeoPoint::new(record.latitude, record.longitude),
            record.elevation,
        ))
    }
}

/// Parse airports from any CSV reader with a header row
pub fn read_airports_csv<R: std::io::Read>(reader: R) -> Result<Vec<Airport>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut out = Vec::new();

    for (index, record) in csv_reader.deserialize::<AirportRecord>().enumerate() {
        // +2: one for the header, one for 1-based line numbers
        let lineno = index + 2;
        let record = record.with_context(|| format!("Parsing CSV line {}", lineno))?;
        let airport =
            Airport::try_from(record).with_context(|| format!("Parsing CSV line {}", lineno))?;
        out.push(airport);
    }

    Ok(out)
}

/// Read an airports CSV file and parse all rows.
/// Returns an error on the first malformed line.
pub fn read_airports_csv_file<P: AsRef<Path>>(path: P) -> Result<Vec<Airport>> {
    let f = std::fs::File::open(path.as_ref())
        .with_context(|| format!("Opening {:?}", path.as_ref()))?;
    read_airports_csv(f)
}
