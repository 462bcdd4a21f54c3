use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::geometry::{GeoPoint, normalize_heading};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Runway {
    pub id: i32,               // Reference-store ID
    pub airport_code: String,  // Owning airport (matches airports.code)
    pub elevation_ft: f64,     // Touchdown zone elevation
    pub code: String,          // Runway designator (e.g., "28L")
    pub magnetic_heading: f64, // Runway course in degrees magnetic
    pub true_heading: f64,     // Runway course in degrees true
    pub center: GeoPoint,      // Touchdown point on the centerline
}

impl Runway {
    pub fn new(
        id: i32,
        airport_code: impl Into<String>,
        elevation_ft: f64,
        code: impl Into<String>,
        magnetic_heading: f64,
        true_heading: f64,
        center: GeoPoint,
    ) -> Self {
        Self {
            id,
            airport_code: airport_code.into(),
            elevation_ft,
            code: code.into(),
            magnetic_heading,
            true_heading,
            center,
        }
    }
}

/// One row of the runways reference file
/// Expected columns: id, airport_code, elevation, code, magnetic_heading,
/// true_heading, latitude, longitude
#[derive(Debug, Deserialize)]
struct RunwayRecord {
    id: i32,
    airport_code: String,
    elevation: f64,
    code: String,
    magnetic_heading: f64,
    true_heading: f64,
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RunwayRecord> for Runway {
    type Error = anyhow::Error;

    fn try_from(record: RunwayRecord) -> Result<Self> {
        let airport_code = record.airport_code.trim().to_string();
        if airport_code.is_empty() {
            return Err(anyhow!("Runway {} has no airport identifier", record.id));
        }

        // Published courses run 0..=360; 360 is stored as 0
        for heading in [record.magnetic_heading, record.true_heading] {
            if !(0.0..=360.0).contains(&heading) {
                return Err(anyhow!(
                    "Runway {} at {} has heading {} outside [0, 360]",
                    record.id,
                    airport_code,
                    heading
                ));
            }
        }

        Ok(Runway::new(
            record.id,
            airport_code,
            record.elevation,
            record.code.trim(),
            normalize_heading(record.magnetic_heading),
            normalize_heading(record.true_heading),
            GeoPoint::new(record.latitude, record.longitude),
        ))
    }
}

/// Parse runways from any CSV reader with a header row
pub fn read_runways_csv<R: std::io::Read>(reader: R) -> Result<Vec<Runway>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut out = Vec::new();

    for (index, record) in csv_reader.deserialize::<RunwayRecord>().enumerate() {
        let lineno = index + 2;
        let record = record.with_context(|| format!("Parsing CSV line {}", lineno))?;
        let runway =
            Runway::try_from(record).with_context(|| format!("Parsing CSV line {}", lineno))?;
        out.push(runway);
    }

    Ok(out)
}

/// Read a runways CSV file and parse all rows.
/// Returns an error on the first malformed line.
pub fn read_runways_csv_file<P: AsRef<Path>>(path: P) -> Result<Vec<Runway>> {
    let f = std::fs::File::open(path.as_ref())
        .with_context(|| format!("Opening {:?}", path.as_ref()))?;
    read_runways_csv(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "id,airport_code,elevation,code,magnetic_heading,true_heading,latitude,longitude\n";

    #[test]
    fn test_csv_parsing() {
        let csv = format!("{HEADER}17,KAGC,1252,28,287.0,279.0,40.3530,-79.9210\n");

        let runways = read_runways_csv(csv.as_bytes()).expect("Failed to parse runways");

        assert_eq!(runways.len(), 1);
        let runway = &runways[0];
        assert_eq!(runway.id, 17);
        assert_eq!(runway.airport_code, "KAGC");
        assert_eq!(runway.elevation_ft, 1252.0);
        assert_eq!(runway.code, "28");
        assert_eq!(runway.magnetic_heading, 287.0);
        assert_eq!(runway.true_heading, 279.0);
        assert_eq!(runway.center, GeoPoint::new(40.3530, -79.9210));
    }

    #[test]
    fn test_runway_36_heading_is_stored_as_zero() {
        let csv = format!("{HEADER}18,KTST,1000,36,360,352,40.0,-80.0\n21,KTST,1000,18,180,360.0,40.0,-80.0\n");

        let runways = read_runways_csv(csv.as_bytes()).unwrap();

        assert_eq!(runways.len(), 2);
        assert_eq!(runways[0].magnetic_heading, 0.0);
        assert_eq!(runways[0].true_heading, 352.0);
        assert_eq!(runways[1].true_heading, 0.0);
    }

    #[test]
    fn test_heading_out_of_range_is_rejected() {
        for bad in ["361.5", "-10", "NaN", "inf"] {
            let csv = format!("{HEADER}18,KAGC,1252,36,{bad},352.0,40.35,-79.92\n");

            let err = read_runways_csv(csv.as_bytes()).unwrap_err();
            assert!(format!("{err:#}").contains("outside [0, 360]"), "{bad}");
        }
    }

    #[test]
    fn test_malformed_number_reports_line() {
        let csv = format!("{HEADER}19,KAGC,1252,10,107.0,99.0,40.35,-79.92\n20,KAGC,abc,28,287,279,40.35,-79.92\n");

        let err = read_runways_csv(csv.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("line 3"));
    }
}
