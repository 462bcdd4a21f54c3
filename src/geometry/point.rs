//! Latitude/longitude points on a spherical earth
//!
//! Calculations go through n-vectors rather than spherical trigonometry: the
//! great circle through two points is the cross product of their n-vectors, and
//! distances fall out of the angle between vectors.

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::fmt;

use super::vector3d::Vector3d;

/// A geographic point, latitude and longitude in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Second half of a great-circle path: either an end point or an initial bearing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathEnd {
    Point(GeoPoint),
    Bearing(f64),
}

impl From<GeoPoint> for PathEnd {
    fn from(point: GeoPoint) -> Self {
        PathEnd::Point(point)
    }
}

impl From<f64> for PathEnd {
    fn from(bearing: f64) -> Self {
        PathEnd::Bearing(bearing)
    }
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// n-vector normal to the earth's surface at this point
    pub fn to_vector(&self) -> Vector3d {
        let lat = self.lat.to_radians();
        let lon = self.lon.to_radians();

        Vector3d::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
    }

    /// Normal of the great circle obtained by heading out from this point on `bearing` degrees
    pub fn great_circle(&self, bearing: f64) -> Vector3d {
        let lat = self.lat.to_radians();
        let lon = self.lon.to_radians();
        let theta = bearing.to_radians();

        Vector3d::new(
            lon.sin() * theta.cos() - lat.sin() * lon.cos() * theta.sin(),
            -lon.cos() * theta.cos() - lat.sin() * lon.sin() * theta.sin(),
            lat.cos() * theta.sin(),
        )
    }

    /// Great-circle distance to `other`, in the units of `radius`
    pub fn distance_to(&self, other: &GeoPoint, radius: f64) -> f64 {
        let delta = self.to_vector().angle_to(&other.to_vector(), None);
        delta * radius
    }

    /// Initial bearing to `other` in compass degrees, `[0, 360)`
    pub fn bearing_to(&self, other: &GeoPoint) -> f64 {
        let p1 = self.to_vector();
        let p2 = other.to_vector();

        // great circle through p1 & p2, and through p1 & the north pole
        let c1 = p1.cross(&p2);
        let c2 = p1.cross(&Vector3d::NORTH_POLE);

        let bearing = c1.angle_to(&c2, Some(&p1)).to_degrees();
        (bearing + 360.0) % 360.0
    }

    pub fn midpoint_to(&self, other: &GeoPoint) -> GeoPoint {
        (self.to_vector() + other.to_vector()).unit().to_geo_point()
    }

    /// Point reached after travelling `distance` (units of `radius`) on an initial `bearing`
    pub fn destination_point(&self, distance: f64, bearing: f64, radius: f64) -> GeoPoint {
        let delta = distance / radius;
        let c = self.great_circle(bearing);
        let p1 = self.to_vector();

        let along = p1 * delta.cos();
        let across = c.cross(&p1) * delta.sin();

        (along + across).unit().to_geo_point()
    }

    /// Signed distance from this point to the great circle through `path_start`
    ///
    /// Negative when the point is left of the path, positive when right. Units
    /// follow `radius`.
    pub fn cross_track_distance_to(
        &self,
        path_start: &GeoPoint,
        path_end: impl Into<PathEnd>,
        radius: f64,
    ) -> f64 {
        let p = self.to_vector();

        let gc = match path_end.into() {
            PathEnd::Point(end) => path_start.to_vector().cross(&end.to_vector()),
            PathEnd::Bearing(bearing) => path_start.great_circle(bearing),
        };

        // signed angle between the point and the great circle normal
        let alpha = gc.angle_to(&p, Some(&p.cross(&gc)));
        let alpha = if alpha < 0.0 {
            -FRAC_PI_2 - alpha
        } else {
            FRAC_PI_2 - alpha
        };

        alpha * radius
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
