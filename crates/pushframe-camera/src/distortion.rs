//! Two-term radial distortion: `p_d = p × (1 + k1·r² + k2·r⁴)`.
//!
//! Coordinates are pixels relative to the channel principal point.

use serde::{Deserialize, Serialize};

/// Number of fixed-point passes used by [`RadialDistortion::undistort`].
///
/// The instrument calibration was derived with exactly this many passes, so
/// there is no convergence test.
pub const UNDISTORT_ITERATIONS: usize = 5;

/// Radial distortion with two coefficients.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RadialDistortion {
    pub k1: f64,
    pub k2: f64,
}

impl RadialDistortion {
    pub fn new(k1: f64, k2: f64) -> Self {
        Self { k1, k2 }
    }

    #[inline]
    fn scale(&self, x: f64, y: f64) -> f64 {
        let r2 = x * x + y * y;
        1.0 + self.k1 * r2 + self.k2 * r2 * r2
    }

    /// Forward distortion: ideal → distorted, single pass.
    #[inline]
    pub fn distort(&self, x: f64, y: f64) -> (f64, f64) {
        let s = self.scale(x, y);
        (x * s, y * s)
    }

    /// Inverse distortion: distorted → ideal.
    ///
    /// Fixed-point iteration seeded with the distorted point; always runs
    /// [`UNDISTORT_ITERATIONS`] passes.
    #[inline]
    pub fn undistort(&self, x_d: f64, y_d: f64) -> (f64, f64) {
        let (mut x, mut y) = (x_d, y_d);
        for _ in 0..UNDISTORT_ITERATIONS {
            let s = self.scale(x, y);
            x = x_d / s;
            y = y_d / s;
        }
        (x, y)
    }

    pub fn is_zero(&self) -> bool {
        self.k1 == 0.0 && self.k2 == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn junocam() -> RadialDistortion {
        RadialDistortion::new(-5.9624209455667325e-08, 2.7381910042256151e-14)
    }

    #[test]
    fn distort_undoes_undistort_across_the_sensor() {
        let d = junocam();
        // corners of the widest band relative to the principal point
        for &(x, y) in &[
            (0.0, 0.0),
            (-814.21, -158.48),
            (833.79, -158.48),
            (-814.21, 127.0 - 158.48),
            (833.79, 151.52),
            (420.0, -30.0),
            (-600.0, 290.0),
        ] {
            let (ux, uy) = d.undistort(x, y);
            let (rx, ry) = d.distort(ux, uy);
            assert!(
                (rx - x).abs() < 1e-3 && (ry - y).abs() < 1e-3,
                "round trip failed for ({x}, {y}): got ({rx}, {ry})"
            );
        }
    }

    #[test]
    fn undistort_pushes_points_outward_for_barrel_coefficients() {
        let d = junocam();
        let (ux, uy) = d.undistort(800.0, 0.0);
        assert!(ux > 800.0);
        assert_eq!(uy, 0.0);
    }

    #[test]
    fn zero_coefficients_are_identity() {
        let d = RadialDistortion::new(0.0, 0.0);
        assert!(d.is_zero());
        assert_eq!(d.undistort(100.0, -200.0), (100.0, -200.0));
        assert_eq!(d.distort(100.0, -200.0), (100.0, -200.0));
    }
}
