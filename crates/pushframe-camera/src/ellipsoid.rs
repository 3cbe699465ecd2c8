//! Triaxial reference ellipsoid geometry.

use nalgebra::{Unit, Vector3};
use serde::{Deserialize, Serialize};

/// Ellipsoid `x²/a² + y²/b² + z²/c² = 1` centred on the body origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Ellipsoid {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    pub fn sphere(r: f64) -> Self {
        Self::new(r, r, r)
    }

    #[inline]
    fn to_unit(&self, v: &Vector3<f64>) -> Vector3<f64> {
        Vector3::new(v.x / self.a, v.y / self.b, v.z / self.c)
    }

    /// First intersection of the ray `origin + t·dir`, `t ≥ 0`, with the surface.
    ///
    /// Returns `None` when the ray misses, points away, or starts inside
    /// the body.
    pub fn ray_intercept(&self, origin: &Vector3<f64>, dir: &Vector3<f64>) -> Option<Vector3<f64>> {
        let o = self.to_unit(origin);
        let d = self.to_unit(dir);

        let qa = d.dot(&d);
        let qb = 2.0 * o.dot(&d);
        let qc = o.dot(&o) - 1.0;
        if qa <= 0.0 || qc < 0.0 {
            return None;
        }

        let disc = qb * qb - 4.0 * qa * qc;
        if disc < 0.0 {
            return None;
        }
        let t = (-qb - disc.sqrt()) / (2.0 * qa);
        if t < 0.0 {
            return None;
        }
        Some(origin + dir * t)
    }

    /// Surface point in the planetocentric direction `(lon, lat)`, degrees.
    pub fn surface_point(&self, lon_deg: f64, lat_deg: f64) -> Vector3<f64> {
        let (lon, lat) = (lon_deg.to_radians(), lat_deg.to_radians());
        let u = Vector3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin());
        let s = self.to_unit(&u).norm();
        u / s
    }

    /// Outward surface normal at `point`.
    pub fn normal(&self, point: &Vector3<f64>) -> Unit<Vector3<f64>> {
        Unit::new_normalize(Vector3::new(
            point.x / (self.a * self.a),
            point.y / (self.b * self.b),
            point.z / (self.c * self.c),
        ))
    }

    /// Rectangular → `(radius, lon_deg, lat_deg)`, planetocentric.
    pub fn to_latitudinal(point: &Vector3<f64>) -> (f64, f64, f64) {
        let radius = point.norm();
        if radius == 0.0 {
            return (0.0, 0.0, 0.0);
        }
        let lon = point.y.atan2(point.x);
        let lat = (point.z / radius).clamp(-1.0, 1.0).asin();
        (radius, lon.to_degrees(), lat.to_degrees())
    }
}
