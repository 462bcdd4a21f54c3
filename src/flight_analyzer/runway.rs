use anyhow::Result;
use tracing::debug;

use crate::airports::Airport;
use crate::geometry::{EARTH_RADIUS_FEET, GeoPoint, unsigned_heading_difference};
use crate::runways::Runway;

/// Pick the runway the aircraft is lined up with
///
/// Candidates are runways whose magnetic heading is within
/// `max_heading_difference` of the aircraft heading. The one whose center is
/// closest by plain |dlat| + |dlon| wins; on a tie the first loaded runway is kept.
pub(crate) fn select_runway<'a>(
    airport: &'a Airport,
    position: GeoPoint,
    heading: f64,
    max_heading_difference: f64,
) -> Result<Option<&'a Runway>> {
    let mut best: Option<(&Runway, f64)> = None;

    for runway in &airport.runways {
        if unsigned_heading_difference(runway.magnetic_heading, heading)? > max_heading_difference {
            continue;
        }

        let offset =
            (runway.center.lat - position.lat).abs() + (runway.center.lon - position.lon).abs();
        if best.is_none_or(|(_, closest)| offset < closest) {
            best = Some((runway, offset));
        }
    }

    match best {
        Some((runway, _)) => debug!(
            "Selected runway {} at {} for heading {:.0}",
            runway.code, airport.code, heading
        ),
        None => debug!(
            "No runway at {} within {} degrees of heading {:.0}",
            airport.code, max_heading_difference, heading
        ),
    }

    Ok(best.map(|(runway, _)| runway))
}

/// Signed distance in feet from the runway's extended centerline, positive
/// right of the landing direction
pub(crate) fn centerline_offset_ft(position: GeoPoint, runway: &Runway) -> f64 {
    position.cross_track_distance_to(&runway.center, runway.true_heading, EARTH_RADIUS_FEET)
}
