//! Landing classification and the hand-off to the next takeoff

use serde::Serialize;
use std::fmt;
use tracing::debug;

use super::enrich::EnrichedSample;
use super::scan::{at_least, last_in, scan_forward};
use crate::thresholds::Thresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LandingType {
    StopAndGo,
    TouchAndGo,
    GoAround,
}

impl LandingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LandingType::StopAndGo => "stop-and-go",
            LandingType::TouchAndGo => "touch-and-go",
            LandingType::GoAround => "go-around",
        }
    }
}

impl fmt::Display for LandingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LandingOutcome {
    pub landing_type: LandingType,
    pub start: usize,
    pub end: usize,
    pub end_of_data: bool,
}

impl LandingOutcome {
    /// Whether a new takeoff cycle follows this landing
    pub fn followed_by_takeoff(&self) -> bool {
        !self.end_of_data && self.landing_type != LandingType::GoAround
    }
}

/// Classify the landing that starts at `start` (the approach end)
///
/// The window runs to the first sample back above the approach altitude, or to
/// the last sample. Inside it a full stop outranks a touch-and-go, which
/// outranks a go-around. When a takeoff follows, the landing ends at the last
/// sample in the window showing takeoff power and ground roll; if there is no
/// such sample the end stays where it was.
pub(crate) fn analyze_landing(
    flight: &[EnrichedSample<'_>],
    start: usize,
    thresholds: &Thresholds,
) -> LandingOutcome {
    let climb_out = scan_forward(flight, start, |s| {
        at_least(s.agl, thresholds.approach_min_altitude_agl)
    });
    let end_of_data = climb_out.is_none();
    let end = climb_out.unwrap_or(flight.len() - 1);

    let window = &flight[start..=end];
    let landing_type = classify(window, thresholds);

    let mut outcome = LandingOutcome {
        landing_type,
        start,
        end,
        end_of_data,
    };

    if outcome.followed_by_takeoff()
        && let Some(power) = last_in(flight, start..end + 1, |s| {
            s.sample.engine_rpm > thresholds.takeoff_min_rpm
                && s.sample.groundspeed > thresholds.takeoff_min_groundspeed
                && s.sample.indicated_airspeed > 0.0
        })
    {
        outcome.end = power;
    }

    debug!(
        "Landing {}..={}: {}{}",
        outcome.start,
        outcome.end,
        outcome.landing_type,
        if end_of_data { " (end of data)" } else { "" }
    );

    outcome
}

fn classify(window: &[EnrichedSample<'_>], thresholds: &Thresholds) -> LandingType {
    let full_stop = window
        .iter()
        .any(|s| s.sample.indicated_airspeed <= thresholds.full_stop_speed_indicator);
    if full_stop {
        return LandingType::StopAndGo;
    }

    // Windows containing a sample without AGL are skipped
    let size = thresholds.agl_window_samples.max(1);
    let samples_per_window = size as f64;
    let touched_down = window
        .windows(size)
        .filter_map(|w| w.iter().map(|s| s.agl).sum::<Option<f64>>())
        .any(|sum| sum / samples_per_window < thresholds.touch_and_go_elevation_indicator);
    if touched_down {
        return LandingType::TouchAndGo;
    }

    LandingType::GoAround
}
