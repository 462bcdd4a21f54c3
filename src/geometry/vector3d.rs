//! Three-dimensional vectors used as n-vectors and great-circle normals
//!
//! On a spherical earth an n-vector is the unit vector normal to the surface at
//! a point, which turns most geodesy into dot and cross products.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use super::point::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3d {
    pub const NORTH_POLE: Vector3d = Vector3d {
        x: 0.0,
        y: 0.0,
        z: 1.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, v: &Vector3d) -> f64 {
        self.x * v.x + self.y * v.y + self.z * v.z
    }

    pub fn cross(&self, v: &Vector3d) -> Vector3d {
        Vector3d {
            x: self.y * v.z - self.z * v.y,
            y: self.z * v.x - self.x * v.z,
            z: self.x * v.y - self.y * v.x,
        }
    }

    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Normalize to unit length. Zero and unit vectors are returned unchanged.
    pub fn unit(&self) -> Vector3d {
        let norm = self.length();
        if norm == 0.0 || norm == 1.0 {
            return *self;
        }
        *self * (1.0 / norm)
    }

    /// Angle in radians between this vector and `v`
    ///
    /// Without `sign` the result is unsigned in `[0, π]`. With `sign` (a vector
    /// out of the plane of `self` and `v`) the angle is positive when
    /// `self -> v` is clockwise looking along `sign`, negative otherwise.
    pub fn angle_to(&self, v: &Vector3d, sign: Option<&Vector3d>) -> f64 {
        let cross = self.cross(v);
        let mut sin_theta = cross.length();
        let cos_theta = self.dot(v);

        if let Some(reference) = sign
            && cross.dot(reference) < 0.0
        {
            sin_theta = -sin_theta;
        }

        sin_theta.atan2(cos_theta)
    }

    /// Convert an n-vector back to the latitude/longitude it points at
    pub fn to_geo_point(&self) -> GeoPoint {
        let lat = self.z.atan2((self.x * self.x + self.y * self.y).sqrt());
        let lon = self.y.atan2(self.x);
        GeoPoint::new(lat.to_degrees(), lon.to_degrees())
    }
}

impl Add for Vector3d {
    type Output = Vector3d;

    fn add(self, v: Vector3d) -> Vector3d {
        Vector3d::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }
}

impl Sub for Vector3d {
    type Output = Vector3d;

    fn sub(self, v: Vector3d) -> Vector3d {
        Vector3d::new(self.x - v.x, self.y - v.y, self.z - v.z)
    }
}

impl Mul<f64> for Vector3d {
    type Output = Vector3d;

    fn mul(self, factor: f64) -> Vector3d {
        Vector3d::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

impl Neg for Vector3d {
    type Output = Vector3d;

    fn neg(self) -> Vector3d {
        Vector3d::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Vector3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{:.6}, {:.6}, {:.6}>", self.x, self.y, self.z)
    }
}
