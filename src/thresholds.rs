//! Exceedance thresholds used by the flight-phase engine
//!
//! Defaults are the historical constants. A TOML file can replace any subset
//! of them globally (`[defaults]`) or for one aircraft type
//! (`[aircraft.<type_id>]`); per-type tables are layered over `[defaults]`.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::debug;

use crate::geometry::MILES_TO_FEET;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    // Stable approach band
    pub approach_min_ias: f64,
    pub approach_max_ias: f64,
    pub approach_max_heading_error: f64,
    pub approach_min_vsi: f64,
    pub approach_max_crosstrack_error: f64, // Feet

    // Approach geometry
    pub approach_min_distance: f64, // Statute miles from the airport
    pub approach_min_altitude_agl: f64,
    pub approach_final_max_altitude_agl: f64,
    pub approach_final_min_altitude_agl: f64,

    // Landing classification
    pub full_stop_speed_indicator: f64,
    pub touch_and_go_elevation_indicator: f64,
    pub agl_window_samples: usize,

    pub runway_selection_indicator: f64,

    // Turn to final
    pub turn_lookback_samples: usize,
    pub turn_start_heading_error: f64,
    pub turn_end_heading_error: f64,
    pub turn_minor_error_ft: f64, // Up to this: no turn error
    pub turn_major_error_ft: f64, // Above this: large turn error

    // Takeoff power, used to find where a touch-and-go becomes a takeoff
    pub takeoff_min_rpm: f64,
    pub takeoff_min_groundspeed: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            approach_min_ias: 55.0,
            approach_max_ias: 75.0,
            approach_max_heading_error: 10.0,
            approach_min_vsi: -1000.0,
            approach_max_crosstrack_error: 50.0,
            approach_min_distance: 1.0,
            approach_min_altitude_agl: 500.0,
            approach_final_max_altitude_agl: 150.0,
            approach_final_min_altitude_agl: 50.0,
            full_stop_speed_indicator: 35.0,
            touch_and_go_elevation_indicator: 5.0,
            agl_window_samples: 5,
            runway_selection_indicator: 20.0,
            turn_lookback_samples: 180,
            turn_start_heading_error: 90.0,
            turn_end_heading_error: 15.0,
            turn_minor_error_ft: 25.0,
            turn_major_error_ft: 100.0,
            takeoff_min_rpm: 2200.0,
            takeoff_min_groundspeed: 25.0,
        }
    }
}

impl Thresholds {
    /// Approach distance gate in feet
    pub fn approach_distance_ft(&self) -> f64 {
        self.approach_min_distance * MILES_TO_FEET
    }

    /// Reject combinations that would make a phase impossible to detect
    pub fn validate(&self) -> Result<()> {
        if self.approach_min_ias > self.approach_max_ias {
            bail!(
                "approach_min_ias ({}) exceeds approach_max_ias ({})",
                self.approach_min_ias,
                self.approach_max_ias
            );
        }
        if self.approach_final_min_altitude_agl > self.approach_final_max_altitude_agl
            || self.approach_final_max_altitude_agl > self.approach_min_altitude_agl
        {
            bail!(
                "altitude gates must satisfy final_min ({}) <= final_max ({}) <= approach_min ({})",
                self.approach_final_min_altitude_agl,
                self.approach_final_max_altitude_agl,
                self.approach_min_altitude_agl
            );
        }
        if self.turn_end_heading_error > self.turn_start_heading_error {
            bail!(
                "turn_end_heading_error ({}) exceeds turn_start_heading_error ({})",
                self.turn_end_heading_error,
                self.turn_start_heading_error
            );
        }
        if self.turn_minor_error_ft > self.turn_major_error_ft {
            bail!(
                "turn_minor_error_ft ({}) exceeds turn_major_error_ft ({})",
                self.turn_minor_error_ft,
                self.turn_major_error_ft
            );
        }
        if self.agl_window_samples == 0 {
            bail!("agl_window_samples must be at least 1");
        }
        if self.approach_min_distance <= 0.0 {
            bail!("approach_min_distance must be positive");
        }
        Ok(())
    }
}

/// Raw layout of a thresholds file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ThresholdsFile {
    #[serde(default)]
    defaults: toml::Table,
    #[serde(default)]
    aircraft: BTreeMap<String, toml::Table>,
}

/// Global thresholds plus per-aircraft-type overrides
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdSet {
    defaults: Thresholds,
    per_aircraft: HashMap<i32, Thresholds>,
}

impl ThresholdSet {
    pub fn new(defaults: Thresholds) -> Self {
        Self {
            defaults,
            per_aircraft: HashMap::new(),
        }
    }

    pub fn with_aircraft(mut self, aircraft_type_id: i32, thresholds: Thresholds) -> Self {
        self.per_aircraft.insert(aircraft_type_id, thresholds);
        self
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        Self::from_toml_str(&contents).with_context(|| format!("Failed to parse {:?}", path))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: ThresholdsFile = toml::from_str(contents)?;

        let defaults: Thresholds = toml::Value::Table(file.defaults.clone())
            .try_into()
            .context("Invalid [defaults] table")?;
        defaults.validate().context("Invalid [defaults] table")?;

        let mut per_aircraft = HashMap::new();
        for (key, overrides) in file.aircraft {
            let aircraft_type_id: i32 = key
                .parse()
                .with_context(|| format!("Aircraft type id {:?} is not an integer", key))?;

            let mut merged = file.defaults.clone();
            merged.extend(overrides);
            let thresholds: Thresholds = toml::Value::Table(merged)
                .try_into()
                .with_context(|| format!("Invalid [aircraft.{}] table", key))?;
            thresholds
                .validate()
                .with_context(|| format!("Invalid [aircraft.{}] table", key))?;

            debug!("Loaded thresholds for aircraft type {}", aircraft_type_id);
            per_aircraft.insert(aircraft_type_id, thresholds);
        }

        Ok(Self {
            defaults,
            per_aircraft,
        })
    }

    /// Thresholds for one aircraft type, falling back to the defaults
    pub fn for_aircraft(&self, aircraft_type_id: i32) -> &Thresholds {
        self.per_aircraft
            .get(&aircraft_type_id)
            .unwrap_or(&self.defaults)
    }

    pub fn defaults(&self) -> &Thresholds {
        &self.defaults
    }
}
