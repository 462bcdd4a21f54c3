//! Takeoff and approach records and the builder that assembles an approach
//! stage by stage

use anyhow::{Result, anyhow};
use serde::Serialize;
use std::ops::Range;

use super::landing::{LandingOutcome, LandingType};
use super::stability::StabilityReport;
use super::turn::TurnToFinal;
use crate::runways::Runway;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TakeoffRecord {
    pub takeoff_id: usize,
    pub start: usize,
    pub end: usize, // First sample above the approach altitude
    pub airport_code: Option<String>,
}

/// One completed approach and its landing. Index ranges refer to the flight's
/// sample sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApproachRecord {
    pub approach_id: usize,
    pub airport_code: String,
    pub runway_id: Option<i32>,
    pub runway_code: Option<String>,
    pub turn_to_final: Option<TurnToFinal>,

    pub approach_start: usize,
    pub approach_end: usize,
    pub landing_start: usize,
    pub landing_end: usize,
    pub landing_type: LandingType,

    pub unstable: bool,
    pub unstable_ranges: Vec<Range<usize>>,

    // Failing values per criterion
    #[serde(rename = "F1")]
    pub f1_heading: Vec<f64>,
    #[serde(rename = "F2")]
    pub f2_crosstrack: Vec<f64>,
    #[serde(rename = "A")]
    pub a_ias: Vec<f64>,
    #[serde(rename = "S")]
    pub s_vsi: Vec<f64>,

    // All values across the final approach segment
    #[serde(rename = "HDG")]
    pub heading: Vec<f64>,
    #[serde(rename = "CTR")]
    pub crosstrack: Vec<f64>,
    #[serde(rename = "IAS")]
    pub ias: Vec<f64>,
    #[serde(rename = "VSI")]
    pub vsi: Vec<f64>,
}

/// An approach under construction
///
/// Each stage returns an updated builder; `finish` freezes it once the landing
/// is known. A builder dropped before `finish` leaves no record behind.
#[derive(Debug, Clone)]
pub(crate) struct ApproachBuilder {
    approach_id: usize,
    airport_code: String,
    approach_start: usize,
    runway: Option<(i32, String)>,
    approach_end: Option<usize>,
    turn_to_final: Option<TurnToFinal>,
    stability: Option<StabilityReport>,
}

impl ApproachBuilder {
    pub fn new(approach_id: usize, airport_code: impl Into<String>, approach_start: usize) -> Self {
        Self {
            approach_id,
            airport_code: airport_code.into(),
            approach_start,
            runway: None,
            approach_end: None,
            turn_to_final: None,
            stability: None,
        }
    }

    pub fn with_runway(self, runway: Option<&Runway>) -> Self {
        Self {
            runway: runway.map(|r| (r.id, r.code.clone())),
            ..self
        }
    }

    pub fn with_approach_end(self, approach_end: usize) -> Self {
        Self {
            approach_end: Some(approach_end),
            ..self
        }
    }

    pub fn with_turn_to_final(self, turn_to_final: Option<TurnToFinal>) -> Self {
        Self {
            turn_to_final,
            ..self
        }
    }

    pub fn with_stability(self, stability: StabilityReport) -> Self {
        Self {
            stability: Some(stability),
            ..self
        }
    }

    pub fn finish(self, landing: &LandingOutcome) -> Result<ApproachRecord> {
        let approach_end = self
            .approach_end
            .ok_or_else(|| anyhow!("Approach {} has no end index", self.approach_id))?;
        let stability = self
            .stability
            .ok_or_else(|| anyhow!("Approach {} was never evaluated for stability", self.approach_id))?;
        let (runway_id, runway_code) = self.runway.unzip();

        Ok(ApproachRecord {
            approach_id: self.approach_id,
            airport_code: self.airport_code,
            runway_id,
            runway_code,
            turn_to_final: self.turn_to_final,
            approach_start: self.approach_start,
            approach_end,
            landing_start: landing.start,
            landing_end: landing.end,
            landing_type: landing.landing_type,
            unstable: stability.unstable,
            unstable_ranges: stability.unstable_ranges,
            f1_heading: stability.f1_heading,
            f2_crosstrack: stability.f2_crosstrack,
            a_ias: stability.a_ias,
            s_vsi: stability.s_vsi,
            heading: stability.heading,
            crosstrack: stability.crosstrack,
            ias: stability.ias,
            vsi: stability.vsi,
        })
    }
}
