use anyhow::{Context, Result};
use tracing::trace;

use crate::airports::Airport;
use crate::geometry::{GeoPoint, MILES_TO_FEET, vincenty_distance};
use crate::reference_data::ReferenceData;
use crate::telemetry::TelemetrySample;

/// A telemetry sample with the values derived from reference data
#[derive(Debug, Clone)]
pub(crate) struct EnrichedSample<'a> {
    pub sample: &'a TelemetrySample,
    pub airport: Option<&'a Airport>,
    pub distance_ft: Option<f64>, // Vincenty distance to `airport`
    pub agl: Option<f64>,
}

impl EnrichedSample<'_> {
    pub fn position(&self) -> GeoPoint {
        self.sample.position()
    }
}

/// Attach nearest airport, distance and AGL to every sample
///
/// AGL is the recorder's radio altitude when present, otherwise MSL altitude
/// minus the elevation of the airport found for that sample.
pub(crate) fn enrich<'a>(
    reference: &'a ReferenceData,
    samples: &'a [TelemetrySample],
) -> Result<Vec<EnrichedSample<'a>>> {
    samples
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            let position = sample.position();
            let airport = reference.nearest_airport(position.lat, position.lon);

            let distance_ft = airport
                .map(|a| vincenty_distance(&position, &a.center))
                .transpose()
                .with_context(|| format!("Distance to nearest airport at sample {}", i))?
                .map(|miles| miles * MILES_TO_FEET);

            let agl = sample
                .radio_altitude_derived
                .or_else(|| airport.map(|a| sample.msl_altitude - a.elevation_ft));

            trace!(
                "sample {}: airport={:?} distance_ft={:?} agl={:?}",
                i,
                airport.map(|a| a.code.as_str()),
                distance_ft,
                agl
            );

            Ok(EnrichedSample {
                sample,
                airport,
                distance_ft,
                agl,
            })
        })
        .collect()
}
