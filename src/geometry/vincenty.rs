//! Vincenty inverse formula on the WGS-84 ellipsoid
//!
//! Used where the distance itself gates a decision (within a mile of the
//! airport), so a few feet of spherical error over tens of miles matters.

use super::{GeoError, GeoPoint};

/// WGS-84 semi-major axis in statute miles
pub const MAJOR_AXIS_MILES: f64 = 3963.1906;
/// WGS-84 semi-minor axis in statute miles
pub const MINOR_AXIS_MILES: f64 = 3949.902_764_23;
pub const FLATTENING: f64 = 1.0 / 298.257_223_563;

const CONVERGENCE_TOLERANCE: f64 = 1e-12;
pub const MAX_ITERATIONS: u32 = 1000;

/// Ellipsoidal distance between two points in statute miles
///
/// Fails with [`GeoError::NoConvergence`] for nearly antipodal pairs, where the
/// iteration on λ does not settle.
pub fn vincenty_distance(from: &GeoPoint, to: &GeoPoint) -> Result<f64, GeoError> {
    let (major, minor, f) = (MAJOR_AXIS_MILES, MINOR_AXIS_MILES, FLATTENING);

    let delta_lon = (to.lon - from.lon).to_radians();

    let reduced_lat1 = ((1.0 - f) * from.lat.to_radians().tan()).atan();
    let reduced_lat2 = ((1.0 - f) * to.lat.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = reduced_lat1.sin_cos();
    let (sin_u2, cos_u2) = reduced_lat2.sin_cos();

    let mut lambda = delta_lon;

    for _ in 0..MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();

        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();

        if sin_sigma == 0.0 {
            // coincident points
            return Ok(0.0);
        }

        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);

        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;

        // zero on the equatorial line
        let cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            0.0
        };

        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));

        let previous = lambda;
        lambda = delta_lon
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

        if (lambda - previous).abs() <= CONVERGENCE_TOLERANCE {
            let u_sq = cos_sq_alpha * (major * major - minor * minor) / (minor * minor);

            let a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));

            let delta_sigma = b
                * sin_sigma
                * (cos_2sigma_m
                    + b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                            - b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma.powi(2))
                                * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));

            return Ok(minor * a * (sigma - delta_sigma));
        }
    }

    Err(GeoError::NoConvergence {
        iterations: MAX_ITERATIONS,
    })
}

/// Vincenty distance for each pair, in statute miles
///
/// The whole batch fails if any single pair fails to converge.
pub fn vincenty_distances(pairs: &[(GeoPoint, GeoPoint)]) -> Result<Vec<f64>, GeoError> {
    pairs
        .iter()
        .map(|(from, to)| vincenty_distance(from, to))
        .collect()
}
