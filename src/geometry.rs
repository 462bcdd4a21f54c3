//! Spherical-earth geodesy: n-vector points, heading arithmetic and
//! Vincenty ellipsoidal distance

pub mod heading;
pub mod point;
pub mod vector3d;
pub mod vincenty;

pub use heading::{normalize_heading, signed_heading_difference, unsigned_heading_difference};
pub use point::{GeoPoint, PathEnd};
pub use vector3d::Vector3d;
pub use vincenty::{vincenty_distance, vincenty_distances};

use thiserror::Error;

pub const MILES_TO_FEET: f64 = 5280.0;
pub const EARTH_RADIUS_MILES: f64 = 3959.0;
pub const EARTH_RADIUS_FEET: f64 = 20_900_000.0;
pub const MEAN_EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Errors raised by the geodesy functions
#[derive(Debug, Error, PartialEq)]
pub enum GeoError {
    /// A heading outside `[0, 360)` was passed to a heading-difference function
    #[error("headings must be within [0, 360): got {initial} and {final_heading}")]
    HeadingOutOfRange { initial: f64, final_heading: f64 },

    /// Vincenty's iteration did not settle, typically for nearly antipodal points
    #[error("Vincenty formula failed to converge after {iterations} iterations")]
    NoConvergence { iterations: u32 },
}
