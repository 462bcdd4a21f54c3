//! Stable-approach criteria over the final approach segment
//!
//! F1 heading alignment, F2 centerline deviation, A indicated airspeed band and
//! S sink rate. F1 and F2 need a runway; without one they pass for every
//! sample and their value sequences stay empty.

use anyhow::Result;
use std::ops::Range;
use tracing::trace;

use super::enrich::EnrichedSample;
use super::runway::centerline_offset_ft;
use super::scan::contiguous_ranges;
use crate::geometry::signed_heading_difference;
use crate::runways::Runway;
use crate::thresholds::Thresholds;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct StabilityReport {
    pub unstable: bool,

    // Values of the samples that failed each criterion
    pub f1_heading: Vec<f64>,
    pub f2_crosstrack: Vec<f64>,
    pub a_ias: Vec<f64>,
    pub s_vsi: Vec<f64>,

    // Every sample's value, pass or fail
    pub heading: Vec<f64>,
    pub crosstrack: Vec<f64>,
    pub ias: Vec<f64>,
    pub vsi: Vec<f64>,

    /// Flight indices where at least one criterion failed, as half-open ranges
    pub unstable_ranges: Vec<Range<usize>>,
}

/// Evaluate the half-open segment `[segment.start, segment.end)`
pub(crate) fn evaluate_stability(
    flight: &[EnrichedSample<'_>],
    segment: Range<usize>,
    runway: Option<&Runway>,
    thresholds: &Thresholds,
) -> Result<StabilityReport> {
    let mut report = StabilityReport::default();
    let mut failed_indices = Vec::new();

    for (i, point) in flight[segment.clone()].iter().enumerate() {
        let index = segment.start + i;
        let sample = point.sample;

        let (f1, f2) = match runway {
            Some(runway) => {
                let heading_error = signed_heading_difference(runway.magnetic_heading, sample.heading)?;
                let offset = centerline_offset_ft(point.position(), runway);
                report.heading.push(heading_error);
                report.crosstrack.push(offset);

                let f1 = heading_error.abs() <= thresholds.approach_max_heading_error;
                let f2 = offset.abs() <= thresholds.approach_max_crosstrack_error;
                if !f1 {
                    report.f1_heading.push(heading_error);
                }
                if !f2 {
                    report.f2_crosstrack.push(offset);
                }
                (f1, f2)
            }
            None => (true, true),
        };

        let ias = sample.indicated_airspeed;
        let vsi = sample.vertical_airspeed;
        report.ias.push(ias);
        report.vsi.push(vsi);

        let a = thresholds.approach_min_ias <= ias && ias <= thresholds.approach_max_ias;
        let s = vsi >= thresholds.approach_min_vsi;
        if !a {
            report.a_ias.push(ias);
        }
        if !s {
            report.s_vsi.push(vsi);
        }

        if !(f1 && f2 && a && s) {
            trace!(
                "sample {} unstable: heading={} centerline={} ias={} vsi={}",
                index, f1, f2, a, s
            );
            failed_indices.push(index);
        }
    }

    report.unstable = !failed_indices.is_empty();
    report.unstable_ranges = contiguous_ranges(failed_indices);
    Ok(report)
}
