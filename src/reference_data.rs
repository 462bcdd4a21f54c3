//! Airports, their runways and the spatial index over them
//!
//! Built once before any flight is analyzed and shared read-only by every
//! worker afterwards.

use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::airports::{Airport, read_airports_csv_file};
use crate::quad_tree::QuadTree;
use crate::runways::{Runway, read_runways_csv_file};

/// Airport whose slot in the index was taken over by a later airport
#[derive(Debug, Clone, PartialEq)]
pub struct IndexCollision {
    pub displaced: String,
    pub kept: String,
}

#[derive(Debug, Default)]
pub struct ReferenceData {
    index: QuadTree<Airport>,
    collisions: Vec<IndexCollision>,
    skipped_runways: usize,
}

impl ReferenceData {
    /// Load both reference files and build the index
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(airports_csv: P, runways_csv: Q) -> Result<Self> {
        let airports = read_airports_csv_file(airports_csv)?;
        let runways = read_runways_csv_file(runways_csv)?;
        info!(
            "Loaded {} airports and {} runways",
            airports.len(),
            runways.len()
        );

        let (airports, skipped_runways) = attach_runways(airports, runways);
        let mut reference = Self::from_airports(airports);
        reference.skipped_runways = skipped_runways;
        Ok(reference)
    }

    /// Index airports that already carry their runways
    pub fn from_airports(airports: Vec<Airport>) -> Self {
        let mut index = QuadTree::new();
        let mut collisions = Vec::new();

        for airport in airports {
            let kept = airport.code.clone();
            if let Some(displaced) = index.insert(airport) {
                warn!(
                    "Airport {} shares a grid cell with {} and is no longer reachable",
                    displaced.code, kept
                );
                metrics::counter!("reference.quad_tree.collisions_total").increment(1);
                collisions.push(IndexCollision {
                    displaced: displaced.code,
                    kept,
                });
            }
        }

        info!(
            "Indexed {} airports ({} displaced by grid collisions)",
            index.len(),
            collisions.len()
        );

        Self {
            index,
            collisions,
            skipped_runways: 0,
        }
    }

    /// Airport in the same grid cell as the position, if any
    pub fn nearest_airport(&self, lat: f64, lon: f64) -> Option<&Airport> {
        self.index.nearest(lat, lon)
    }

    pub fn airport_count(&self) -> usize {
        self.index.len()
    }

    pub fn collisions(&self) -> &[IndexCollision] {
        &self.collisions
    }

    /// Runways dropped during loading because their airport was unknown
    pub fn skipped_runways(&self) -> usize {
        self.skipped_runways
    }

    pub fn airports(&self) -> impl Iterator<Item = &Airport> {
        self.index.iter()
    }
}

/// Attach each runway to its airport in file order. Returns the airports and
/// the number of runways whose airport was not found.
pub fn attach_runways(mut airports: Vec<Airport>, runways: Vec<Runway>) -> (Vec<Airport>, usize) {
    let positions: HashMap<String, usize> = airports
        .iter()
        .enumerate()
        .map(|(i, a)| (a.code.clone(), i))
        .collect();

    let mut skipped = 0;
    for runway in runways {
        match positions.get(&runway.airport_code) {
            Some(&i) => airports[i].add_runway(runway),
            None => {
                warn!(
                    "Skipping runway {} ({}): unknown airport {}",
                    runway.id, runway.code, runway.airport_code
                );
                skipped += 1;
            }
        }
    }

    (airports, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeoPoint;
    use std::io::Write;

    fn airport(code: &str, lat: f64, lon: f64) -> Airport {
        Airport::new(code, code, "", "", GeoPoint::new(lat, lon), 1000.0)
    }

    fn runway(id: i32, airport_code: &str, code: &str) -> Runway {
        Runway::new(id, airport_code, 1000.0, code, 90.0, 90.0, GeoPoint::new(40.0, -80.0))
    }

    #[test]
    fn test_runways_attach_in_load_order() {
        let airports = vec![airport("KAAA", 40.0, -80.0), airport("KBBB", 41.0, -81.0)];
        let runways = vec![
            runway(1, "KAAA", "09"),
            runway(2, "KBBB", "18"),
            runway(3, "KAAA", "27"),
            runway(4, "KZZZ", "01"),
        ];

        let (airports, skipped) = attach_runways(airports, runways);

        assert_eq!(skipped, 1);
        let codes: Vec<_> = airports[0].runways.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["09", "27"]);
        assert_eq!(airports[1].runways.len(), 1);
    }

    #[test]
    fn test_collisions_are_reported() {
        let reference = ReferenceData::from_airports(vec![
            airport("KAAA", 40.030, -79.995),
            airport("KBBB", 40.031, -79.996),
            airport("KCCC", 41.5, -81.0),
        ]);

        assert_eq!(reference.airport_count(), 2);
        assert_eq!(
            reference.collisions(),
            &[IndexCollision {
                displaced: "KAAA".to_string(),
                kept: "KBBB".to_string(),
            }]
        );
        assert_eq!(
            reference.nearest_airport(40.03, -79.995).map(|a| a.code.as_str()),
            Some("KBBB")
        );
    }

    #[test]
    fn test_load_from_files() {
        let mut airports_csv = tempfile::NamedTempFile::new().unwrap();
        writeln!(airports_csv, "code,name,city,state,latitude,longitude,elevation").unwrap();
        writeln!(airports_csv, "KAGC,Allegheny County,West Mifflin,PA,40.3544,-79.9302,1252").unwrap();

        let mut runways_csv = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            runways_csv,
            "id,airport_code,elevation,code,magnetic_heading,true_heading,latitude,longitude"
        )
        .unwrap();
        writeln!(runways_csv, "1,KAGC,1252,10,107,99,40.355,-79.93").unwrap();
        writeln!(runways_csv, "2,XXXX,900,10,107,99,40.355,-79.93").unwrap();

        let reference = ReferenceData::load(airports_csv.path(), runways_csv.path()).unwrap();

        assert_eq!(reference.airport_count(), 1);
        assert_eq!(reference.skipped_runways(), 1);
        let kagc = reference.nearest_airport(40.3544, -79.9302).unwrap();
        assert_eq!(kagc.runways.len(), 1);
        assert_eq!(kagc.runways[0].code, "10");
    }
}
