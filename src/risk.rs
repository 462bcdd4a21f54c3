//! Risk grading of averaged approach parameters
//!
//! Each parameter has a nominal band, an elevated band on either side of it
//! and an open-ended high band beyond those. Bands are closed, so a value on a
//! shared edge takes the higher level.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskParameter {
    IndicatedAirspeed,
    VerticalSpeed,
    Crosstrack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub enum RiskLevel {
    Nominal = 0,
    Elevated = 1,
    High = 2,
}

impl From<RiskLevel> for u8 {
    fn from(level: RiskLevel) -> u8 {
        level as u8
    }
}

#[derive(Debug, Clone, Copy)]
struct Band {
    low: f64,
    high: f64,
}

impl Band {
    const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }
}

struct Bands {
    nominal: Band,
    elevated: [Band; 2],
    high: [Band; 2],
}

impl RiskParameter {
    fn bands(self) -> Bands {
        match self {
            // Anything slow of the nominal band is already high risk
            RiskParameter::IndicatedAirspeed => Bands {
                nominal: Band::new(61.0, 66.0),
                elevated: [
                    Band::new(f64::NEG_INFINITY, 61.0),
                    Band::new(66.0, 71.0),
                ],
                high: [
                    Band::new(f64::NEG_INFINITY, 61.0),
                    Band::new(71.0, f64::INFINITY),
                ],
            },
            RiskParameter::VerticalSpeed => Bands {
                nominal: Band::new(-800.0, -500.0),
                elevated: [Band::new(-1000.0, -800.0), Band::new(-500.0, -250.0)],
                high: [
                    Band::new(f64::NEG_INFINITY, -1000.0),
                    Band::new(-250.0, f64::INFINITY),
                ],
            },
            RiskParameter::Crosstrack => Bands {
                nominal: Band::new(-40.0, 40.0),
                elevated: [Band::new(-50.0, -40.0), Band::new(40.0, 50.0)],
                high: [
                    Band::new(f64::NEG_INFINITY, -50.0),
                    Band::new(50.0, f64::INFINITY),
                ],
            },
        }
    }
}

/// Risk level of `value`, or `None` for a value no band contains (NaN)
pub fn risk_level(parameter: RiskParameter, value: f64) -> Option<RiskLevel> {
    let bands = parameter.bands();

    if bands.high.iter().any(|b| b.contains(value)) {
        Some(RiskLevel::High)
    } else if bands.elevated.iter().any(|b| b.contains(value)) {
        Some(RiskLevel::Elevated)
    } else if bands.nominal.contains(value) {
        Some(RiskLevel::Nominal)
    } else {
        None
    }
}
