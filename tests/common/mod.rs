//! Synthetic traffic-pattern flights around a single test airport
//!
//! The airport sits at (40.034, -80.024), 1000 ft MSL, with runway 09 whose
//! touchdown point is the airport reference point. Every position the builder
//! produces stays in the airport's grid cell.
#![allow(dead_code)]

use std::path::Path;

use fdm_analyzer::geometry::{EARTH_RADIUS_FEET, GeoPoint};
use fdm_analyzer::{Airport, ReferenceData, Runway, TelemetrySample};

pub const AIRPORT_LAT: f64 = 40.034;
pub const AIRPORT_LON: f64 = -80.024;
pub const FIELD_ELEVATION: f64 = 1000.0;

pub fn test_airport(with_runway: bool) -> Airport {
    let center = GeoPoint::new(AIRPORT_LAT, AIRPORT_LON);
    let mut airport = Airport::new("KTST", "Test Field", "Testville", "PA", center, FIELD_ELEVATION);
    if with_runway {
        airport.add_runway(Runway::new(1, "KTST", FIELD_ELEVATION, "09", 90.0, 90.0, center));
    }
    airport
}

pub fn reference(with_runway: bool) -> ReferenceData {
    ReferenceData::from_airports(vec![test_airport(with_runway)])
}

/// Builds a flight one sample at a time
#[derive(Debug, Default)]
pub struct FlightBuilder {
    samples: Vec<TelemetrySample>,
}

impl FlightBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[allow(clippy::too_many_arguments)]
    fn push(&mut self, lat: f64, lon: f64, agl: f64, ias: f64, vsi: f64, heading: f64, roll: f64, rpm: f64) {
        self.samples.push(TelemetrySample {
            time: format!("00:{:02}:{:02}", self.samples.len() / 60, self.samples.len() % 60),
            latitude: lat,
            longitude: lon,
            msl_altitude: FIELD_ELEVATION + agl,
            radio_altitude_derived: None,
            indicated_airspeed: ias,
            vertical_airspeed: vsi,
            heading,
            roll_attitude: roll,
            engine_rpm: rpm,
            groundspeed: ias,
        });
    }

    /// Ten samples climbing out from the field; the 6th is the first above 500 ft AGL
    pub fn takeoff(mut self) -> Self {
        for i in 0..10 {
            let ias = if i == 0 { 0.0 } else { 60.0 };
            self.push(AIRPORT_LAT, AIRPORT_LON + 0.001 * i as f64, 111.0 * i as f64, ias, 700.0, 90.0, 0.0, 2400.0);
        }
        self
    }

    /// Base leg, turn and final approach to runway 09: 21 samples
    ///
    /// Offsets 0..=9 fly south 1.8 mi west of the field well above 500 ft,
    /// offset 10 enters the approach gate at 450 ft, offset 11 starts the
    /// final approach segment at 150 ft and offsets 12..=20 descend from
    /// 140 to 60 ft. The turn onto final ends at offset 11, which sits
    /// `turn_offset_ft` south of the centerline. `ias` overrides the airspeed
    /// on the final approach segment per offset.
    pub fn pattern(mut self, turn_offset_ft: f64, ias: impl Fn(usize) -> f64) -> Self {
        for i in 0..10 {
            self.push(AIRPORT_LAT, -80.058, 1000.0 - 40.0 * i as f64, 70.0, -400.0, 180.0, 0.0, 1800.0);
        }
        self.push(AIRPORT_LAT, -80.041, 450.0, 65.0, -600.0, 135.0, -20.0, 1800.0);

        let on_final = GeoPoint::new(AIRPORT_LAT, -80.0385)
            .destination_point(turn_offset_ft, 180.0, EARTH_RADIUS_FEET);
        self.push(on_final.lat, on_final.lon, 150.0, ias(11), -600.0, 90.0, 0.0, 1800.0);

        for k in 0..9 {
            let offset = 12 + k;
            self.push(
                AIRPORT_LAT,
                -80.037 + 0.0013875 * k as f64,
                140.0 - 10.0 * k as f64,
                ias(offset),
                -600.0,
                90.0,
                0.0,
                1800.0,
            );
        }
        self
    }

    /// Pattern with a clean turn and 65 kt throughout the final segment
    pub fn stable_pattern(self) -> Self {
        self.pattern(0.0, |_| 65.0)
    }

    /// Touchdown and roll to a stop: 9 samples, the flight ends on the ground
    pub fn full_stop(mut self) -> Self {
        let agl = [40.0, 20.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let ias = [55.0, 45.0, 30.0, 20.0, 15.0, 10.0, 5.0, 0.0, 0.0];
        for i in 0..9 {
            self.push(AIRPORT_LAT, -80.0245 + 0.001 * i as f64, agl[i], ias[i], -200.0, 90.0, 0.0, 1200.0);
        }
        self
    }

    /// Touchdown without slowing below 35 kt and climb back to 600 ft: 12 samples
    pub fn touch_and_go(mut self) -> Self {
        let agl = [40.0, 20.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 100.0, 300.0, 600.0];
        let ias = [60.0, 58.0, 56.0, 55.0, 55.0, 56.0, 58.0, 60.0, 60.0, 62.0, 65.0, 70.0];
        for i in 0..12 {
            let rpm = if i < 7 { 1500.0 } else { 2400.0 };
            self.push(AIRPORT_LAT, -80.0245 + 0.001 * i as f64, agl[i], ias[i], 0.0, 90.0, 0.0, rpm);
        }
        self
    }

    /// Level-off and climb without touching down: 5 samples
    pub fn go_around(mut self) -> Self {
        let agl = [40.0, 45.0, 60.0, 200.0, 600.0];
        for (i, agl) in agl.into_iter().enumerate() {
            self.push(AIRPORT_LAT, -80.0245 + 0.001 * i as f64, agl, 65.0, 800.0, 90.0, 0.0, 2400.0);
        }
        self
    }

    pub fn build(self) -> Vec<TelemetrySample> {
        self.samples
    }
}

/// Write samples as a recorder CSV export
pub fn write_telemetry_csv(path: &Path, samples: &[TelemetrySample]) {
    let mut writer = csv::Writer::from_path(path).unwrap();
    for sample in samples {
        writer.serialize(sample).unwrap();
    }
    writer.flush().unwrap();
}
