//! Flight-phase segmentation
//!
//! A flight is walked with a single forward cursor through repeating cycles of
//! TAKEOFF -> APPROACH ATTEMPT -> (TURN TO FINAL) -> FINAL APPROACH -> LANDING.
//! A landing either hands over to the next takeoff or ends the analysis.
//! Any boundary scan that runs out of data also ends it, and the approach in
//! progress is discarded.

mod approach;
mod enrich;
mod landing;
mod runway;
mod scan;
mod stability;
mod turn;

pub use approach::{ApproachRecord, TakeoffRecord};
pub use landing::LandingType;
pub use turn::{RollDirection, TurnErrorType, TurnSeverity, TurnToFinal};

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, info_span, trace};

use crate::reference_data::ReferenceData;
use crate::telemetry::TelemetrySample;
use crate::thresholds::{ThresholdSet, Thresholds};

use approach::ApproachBuilder;
use enrich::EnrichedSample;
use scan::{above, below, scan_forward, strictly_within, within};

/// Everything found in one flight
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlightAnalysis {
    pub flight_id: String,
    pub takeoffs: BTreeMap<usize, TakeoffRecord>,
    pub approaches: BTreeMap<usize, ApproachRecord>,
}

impl FlightAnalysis {
    pub fn unstable_approaches(&self) -> usize {
        self.approaches.values().filter(|a| a.unstable).count()
    }
}

/// Stateless analyzer over shared, read-only reference data
#[derive(Debug, Clone, Copy)]
pub struct FlightAnalyzer<'a> {
    reference: &'a ReferenceData,
    thresholds: &'a ThresholdSet,
}

impl<'a> FlightAnalyzer<'a> {
    pub fn new(reference: &'a ReferenceData, thresholds: &'a ThresholdSet) -> Self {
        Self {
            reference,
            thresholds,
        }
    }

    /// Segment one flight. `samples` must be in time order with incomplete
    /// rows already removed.
    pub fn analyze(
        &self,
        flight_id: &str,
        aircraft_type_id: i32,
        samples: &[TelemetrySample],
    ) -> Result<FlightAnalysis> {
        let span = info_span!("flight", flight_id, aircraft_type_id);
        let _guard = span.enter();
        let started = Instant::now();

        let mut context = AnalysisContext::new(self.thresholds.for_aircraft(aircraft_type_id));

        if samples.is_empty() {
            debug!("No samples to analyze");
            return Ok(context.into_analysis(flight_id));
        }

        let flight = enrich::enrich(self.reference, samples)
            .with_context(|| format!("Enriching flight {}", flight_id))?;
        context
            .run(&flight)
            .with_context(|| format!("Analyzing flight {}", flight_id))?;

        let analysis = context.into_analysis(flight_id);

        metrics::histogram!("flight_analyzer.analyze.latency_ms")
            .record(started.elapsed().as_secs_f64() * 1000.0);
        metrics::counter!("flight_analyzer.approaches_total")
            .increment(analysis.approaches.len() as u64);
        metrics::counter!("flight_analyzer.unstable_approaches_total")
            .increment(analysis.unstable_approaches() as u64);

        info!(
            "Analyzed {} samples: {} takeoffs, {} approaches ({} unstable)",
            samples.len(),
            analysis.takeoffs.len(),
            analysis.approaches.len(),
            analysis.unstable_approaches()
        );

        Ok(analysis)
    }
}

/// Per-call state; created fresh by every `analyze`
pub(crate) struct AnalysisContext<'t> {
    thresholds: &'t Thresholds,
    next_takeoff_id: usize,
    next_approach_id: usize,
    takeoffs: BTreeMap<usize, TakeoffRecord>,
    approaches: BTreeMap<usize, ApproachRecord>,
}

impl<'t> AnalysisContext<'t> {
    fn new(thresholds: &'t Thresholds) -> Self {
        Self {
            thresholds,
            next_takeoff_id: 0,
            next_approach_id: 0,
            takeoffs: BTreeMap::new(),
            approaches: BTreeMap::new(),
        }
    }

    fn into_analysis(self, flight_id: &str) -> FlightAnalysis {
        FlightAnalysis {
            flight_id: flight_id.to_string(),
            takeoffs: self.takeoffs,
            approaches: self.approaches,
        }
    }

    fn run(&mut self, flight: &[EnrichedSample<'_>]) -> Result<()> {
        let mut cursor = 0;

        while cursor < flight.len() - 1 {
            let Some(takeoff_end) = self.takeoff(flight, cursor) else {
                debug!("No takeoff after sample {}", cursor);
                break;
            };

            let Some((approach, approach_end)) = self.approach(flight, takeoff_end, cursor)? else {
                break;
            };

            let landing = landing::analyze_landing(flight, approach_end, self.thresholds);
            metrics::counter!("flight_analyzer.landings_total", "type" => landing.landing_type.as_str())
                .increment(1);

            let record = approach.finish(&landing)?;
            self.next_approach_id += 1;
            self.approaches.insert(record.approach_id, record);

            if !landing.followed_by_takeoff() {
                break;
            }
            cursor = landing.end;
        }

        Ok(())
    }

    /// Record the takeoff that starts at `start`; returns its end index
    fn takeoff(&mut self, flight: &[EnrichedSample<'_>], start: usize) -> Option<usize> {
        let end = scan_forward(flight, start, |s| {
            above(s.agl, self.thresholds.approach_min_altitude_agl)
        })?;
        trace!("Takeoff {}..={}", start, end);

        let takeoff_id = self.next_takeoff_id;
        self.next_takeoff_id += 1;
        self.takeoffs.insert(
            takeoff_id,
            TakeoffRecord {
                takeoff_id,
                start,
                end,
                airport_code: flight[start].airport.map(|a| a.code.clone()),
            },
        );

        Some(end)
    }

    /// Follow one approach from the end of the takeoff through stability
    /// evaluation. Returns the builder and the approach end, or `None` when
    /// the data runs out first.
    fn approach(
        &self,
        flight: &[EnrichedSample<'_>],
        takeoff_end: usize,
        cycle_start: usize,
    ) -> Result<Option<(ApproachBuilder, usize)>> {
        let t = self.thresholds;
        let distance_ft = t.approach_distance_ft();

        let Some(attempt) = scan_forward(flight, takeoff_end, |s| {
            below(s.distance_ft, distance_ft) && below(s.agl, t.approach_min_altitude_agl)
        }) else {
            debug!("No approach after sample {}", takeoff_end);
            return Ok(None);
        };

        // The attempt sample is within the distance gate, so it has an airport
        let Some(airport) = flight[attempt].airport else {
            return Ok(None);
        };
        debug!(
            "Approaching {} ({}, {}) at sample {}",
            airport.code, airport.city, airport.state, attempt
        );

        let Some(approach_start) = scan_forward(flight, attempt, |s| {
            !strictly_within(s.agl, t.approach_final_max_altitude_agl, t.approach_min_altitude_agl)
        }) else {
            return Ok(None);
        };

        let start = &flight[approach_start];
        let runway = runway::select_runway(
            airport,
            start.position(),
            start.sample.heading,
            t.runway_selection_indicator,
        )
        .with_context(|| format!("Selecting runway at sample {}", approach_start))?;

        let Some(approach_end) = scan_forward(flight, approach_start, |s| {
            !(below(s.distance_ft, distance_ft)
                && within(
                    s.agl,
                    t.approach_final_min_altitude_agl,
                    t.approach_final_max_altitude_agl,
                ))
        }) else {
            return Ok(None);
        };
        debug!("Final approach {}..{}", approach_start, approach_end);

        let turn_to_final = match runway {
            Some(runway) => {
                turn::detect_turn_to_final(flight, runway, cycle_start, approach_end, t)
                    .with_context(|| format!("Turn to final before sample {}", approach_end))?
            }
            None => None,
        };

        let stability =
            stability::evaluate_stability(flight, approach_start..approach_end, runway, t)
                .with_context(|| format!("Stability of approach {}..{}", approach_start, approach_end))?;

        let builder = ApproachBuilder::new(self.next_approach_id, airport.code.clone(), approach_start)
            .with_runway(runway)
            .with_approach_end(approach_end)
            .with_turn_to_final(turn_to_final)
            .with_stability(stability);
        Ok(Some((builder, approach_end)))
    }
}
