//! Turn-to-final detection and grading

use anyhow::Result;
use serde::Serialize;
use std::fmt;
use tracing::debug;

use super::enrich::EnrichedSample;
use super::runway::centerline_offset_ft;
use super::scan::{last_in, scan_forward};
use crate::geometry::unsigned_heading_difference;
use crate::runways::Runway;
use crate::thresholds::Thresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RollDirection {
    Left,
    Right,
}

impl RollDirection {
    /// Sign of a cross-track offset on the side this turn heads toward
    fn sign(self) -> f64 {
        match self {
            RollDirection::Left => -1.0,
            RollDirection::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnSeverity {
    None,
    Small,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnErrorType {
    Undershoot,
    Overshoot,
}

impl fmt::Display for TurnErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnErrorType::Undershoot => write!(f, "undershoot"),
            TurnErrorType::Overshoot => write!(f, "overshoot"),
        }
    }
}

/// Turn onto the final approach course
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnToFinal {
    pub start: usize, // Last sample at least 90 degrees off the runway heading
    pub end: usize,   // First sample after `start` back within 15 degrees
    pub roll_direction: RollDirection,
    pub crosstrack_error_ft: f64, // Centerline offset at `end`
    pub severity: TurnSeverity,
    pub error_type: Option<TurnErrorType>, // Absent when severity is none
}

/// Find the turn onto `runway` that precedes `approach_end`
///
/// The lookback covers `[max(approach_end - lookback, floor), approach_end)`,
/// where `floor` is the start of the current takeoff/landing cycle. No sample
/// far enough off the runway heading means a straight-in approach.
pub(crate) fn detect_turn_to_final(
    flight: &[EnrichedSample<'_>],
    runway: &Runway,
    floor: usize,
    approach_end: usize,
    thresholds: &Thresholds,
) -> Result<Option<TurnToFinal>> {
    let window_start = approach_end
        .saturating_sub(thresholds.turn_lookback_samples)
        .max(floor);

    // Heading error for every sample the two scans can reach
    let errors = flight[window_start..]
        .iter()
        .map(|s| unsigned_heading_difference(runway.magnetic_heading, s.sample.heading))
        .collect::<Result<Vec<f64>, _>>()?;

    let Some(start) = last_in(&errors, 0..approach_end.saturating_sub(window_start), |e| {
        *e >= thresholds.turn_start_heading_error
    }) else {
        debug!("Straight-in approach to runway {}", runway.code);
        return Ok(None);
    };

    let Some(end) = scan_forward(&errors, start, |e| *e <= thresholds.turn_end_heading_error) else {
        debug!("Turn toward runway {} never settled on final", runway.code);
        return Ok(None);
    };

    let (start, end) = (window_start + start, window_start + end);
    Ok(Some(grade_turn(flight, runway, start, end, thresholds)))
}

fn grade_turn(
    flight: &[EnrichedSample<'_>],
    runway: &Runway,
    start: usize,
    end: usize,
    thresholds: &Thresholds,
) -> TurnToFinal {
    let (min_roll, max_roll) = flight[start..=end]
        .iter()
        .map(|s| s.sample.roll_attitude)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
            (lo.min(r), hi.max(r))
        });

    let roll_direction = if min_roll.abs() > max_roll.abs() {
        RollDirection::Left
    } else {
        RollDirection::Right
    };

    let crosstrack_error_ft = centerline_offset_ft(flight[end].position(), runway);
    let magnitude = crosstrack_error_ft.abs();

    let severity = if magnitude <= thresholds.turn_minor_error_ft {
        TurnSeverity::None
    } else if magnitude <= thresholds.turn_major_error_ft {
        TurnSeverity::Small
    } else {
        TurnSeverity::Large
    };

    // Carried past the centerline in the direction of the turn
    let error_type = (severity != TurnSeverity::None).then(|| {
        if crosstrack_error_ft.signum() == roll_direction.sign() {
            TurnErrorType::Overshoot
        } else {
            TurnErrorType::Undershoot
        }
    });

    debug!(
        "Turn to final {}..={}: {:?} roll, {:.1} ft off centerline ({:?})",
        start, end, roll_direction, crosstrack_error_ft, severity
    );

    TurnToFinal {
        start,
        end,
        roll_direction,
        crosstrack_error_ft,
        severity,
        error_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{EARTH_RADIUS_FEET, GeoPoint};
    use crate::telemetry::TelemetrySample;

    fn runway() -> Runway {
        Runway::new(1, "KTST", 1000.0, "09", 90.0, 90.0, GeoPoint::new(40.0, -80.0))
    }

    /// Samples west of the runway; `offsets` are feet off the centerline (+ = south/right)
    fn samples(headings: &[f64], rolls: &[f64], offsets: &[f64]) -> Vec<TelemetrySample> {
        let center = runway().center;
        headings
            .iter()
            .zip(rolls)
            .zip(offsets)
            .enumerate()
            .map(|(i, ((&heading, &roll), &offset))| {
                let along = center.destination_point(3000.0 - 100.0 * i as f64, 270.0, EARTH_RADIUS_FEET);
                let p = along.destination_point(offset.abs(), if offset >= 0.0 { 180.0 } else { 0.0 }, EARTH_RADIUS_FEET);
                TelemetrySample {
                    time: String::new(),
                    latitude: p.lat,
                    longitude: p.lon,
                    msl_altitude: 1500.0,
                    radio_altitude_derived: None,
                    indicated_airspeed: 70.0,
                    vertical_airspeed: -500.0,
                    heading,
                    roll_attitude: roll,
                    engine_rpm: 1800.0,
                    groundspeed: 70.0,
                }
            })
            .collect()
    }

    fn enriched(samples: &[TelemetrySample]) -> Vec<EnrichedSample<'_>> {
        samples
            .iter()
            .map(|sample| EnrichedSample {
                sample,
                airport: None,
                distance_ft: None,
                agl: None,
            })
            .collect()
    }

    #[test]
    fn test_straight_in_has_no_turn() {
        let data = samples(&[90.0; 6], &[0.0; 6], &[0.0; 6]);
        let flight = enriched(&data);

        let turn = detect_turn_to_final(&flight, &runway(), 0, 5, &Thresholds::default()).unwrap();
        assert!(turn.is_none());
    }

    #[test]
    fn test_right_base_to_final_overshoot() {
        // base heading north then turn right onto 090, finishing 200 ft right of centerline
        let headings = [0.0, 0.0, 30.0, 60.0, 80.0, 88.0, 90.0];
        let rolls = [0.0, 20.0, 25.0, 25.0, 15.0, 5.0, 0.0];
        let offsets = [600.0, 500.0, 400.0, 300.0, 250.0, 200.0, 200.0];
        let data = samples(&headings, &rolls, &offsets);
        let flight = enriched(&data);

        let turn = detect_turn_to_final(&flight, &runway(), 0, 6, &Thresholds::default())
            .unwrap()
            .expect("turn should be found");

        // most recent sample 90 degrees off is index 1
        assert_eq!(turn.start, 1);
        assert_eq!(turn.end, 4);
        assert_eq!(turn.roll_direction, RollDirection::Right);
        assert!((turn.crosstrack_error_ft - 250.0).abs() < 1.0);
        assert_eq!(turn.severity, TurnSeverity::Large);
        assert_eq!(turn.error_type, Some(TurnErrorType::Overshoot));
    }

    #[test]
    fn test_right_turn_short_of_centerline_is_undershoot() {
        let headings = [0.0, 45.0, 85.0, 90.0];
        let rolls = [20.0, 25.0, 10.0, 0.0];
        let offsets = [-300.0, -200.0, -60.0, -60.0];
        let data = samples(&headings, &rolls, &offsets);
        let flight = enriched(&data);

        let turn = detect_turn_to_final(&flight, &runway(), 0, 3, &Thresholds::default())
            .unwrap()
            .unwrap();

        assert_eq!((turn.start, turn.end), (0, 2));
        assert_eq!(turn.severity, TurnSeverity::Small);
        assert_eq!(turn.error_type, Some(TurnErrorType::Undershoot));
    }

    #[test]
    fn test_small_offset_has_no_error_type() {
        let headings = [180.0, 120.0, 95.0, 90.0];
        let rolls = [-20.0, -25.0, -10.0, 0.0];
        let offsets = [-100.0, -50.0, -10.0, 0.0];
        let data = samples(&headings, &rolls, &offsets);
        let flight = enriched(&data);

        let turn = detect_turn_to_final(&flight, &runway(), 0, 3, &Thresholds::default())
            .unwrap()
            .unwrap();

        assert_eq!(turn.roll_direction, RollDirection::Left);
        assert_eq!(turn.severity, TurnSeverity::None);
        assert_eq!(turn.error_type, None);
    }

    #[test]
    fn test_lookback_is_clamped_to_cycle_start() {
        let headings = [0.0, 90.0, 90.0, 90.0, 90.0];
        let data = samples(&headings, &[0.0; 5], &[0.0; 5]);
        let flight = enriched(&data);

        // the off-heading sample is before the cycle floor
        let turn = detect_turn_to_final(&flight, &runway(), 1, 4, &Thresholds::default()).unwrap();
        assert!(turn.is_none());

        let mut short = Thresholds::default();
        short.turn_lookback_samples = 2;
        let turn = detect_turn_to_final(&flight, &runway(), 0, 4, &short).unwrap();
        assert!(turn.is_none());

        let turn = detect_turn_to_final(&flight, &runway(), 0, 4, &Thresholds::default()).unwrap();
        assert_eq!(turn.map(|t| (t.start, t.end)), Some((0, 1)));
    }

    #[test]
    fn test_turn_that_never_settles_is_absent() {
        let headings = [0.0, 30.0, 50.0, 60.0];
        let data = samples(&headings, &[15.0; 4], &[0.0; 4]);
        let flight = enriched(&data);

        let turn = detect_turn_to_final(&flight, &runway(), 0, 4, &Thresholds::default()).unwrap();
        assert!(turn.is_none());
    }
}
