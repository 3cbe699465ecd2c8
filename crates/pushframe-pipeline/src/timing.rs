//! Acquisition timing.

use serde::{Deserialize, Serialize};

/// Calibrated offset added to the labelled start and stop times, seconds.
pub const START_TIME_BIAS: f64 = 0.06188;
/// Calibrated offset added to the labelled interframe delay, seconds.
pub const INTERFRAME_DELAY_BIAS: f64 = 0.001;

/// Exposure clock of one strip, ephemeris seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExposureTiming {
    pub start_et: f64,
    pub stop_et: f64,
    pub interframe_delay: f64,
}

impl ExposureTiming {
    /// Build from values taken verbatim from a label; applies the
    /// calibrated biases.
    pub fn from_label(start_et: f64, stop_et: f64, interframe_delay: f64) -> Self {
        Self {
            start_et: start_et + START_TIME_BIAS,
            stop_et: stop_et + START_TIME_BIAS,
            interframe_delay: interframe_delay + INTERFRAME_DELAY_BIAS,
        }
    }

    /// Midpoint of the acquisition window.
    #[inline]
    pub fn mid_et(&self) -> f64 {
        (self.start_et + self.stop_et) / 2.0
    }

    /// Time of exposure `index`: `mid + index · delay`.
    #[inline]
    pub fn exposure_et(&self, index: usize) -> f64 {
        self.mid_et() + index as f64 * self.interframe_delay
    }

    pub fn duration(&self) -> f64 {
        self.stop_et - self.start_et
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn biases_are_applied_once() {
        let t = ExposureTiming::from_label(100.0, 130.0, 0.37);
        assert_relative_eq!(t.start_et, 100.06188);
        assert_relative_eq!(t.stop_et, 130.06188);
        assert_relative_eq!(t.interframe_delay, 0.371);
        assert_relative_eq!(t.duration(), 30.0, epsilon = 1e-9);
    }

    #[test]
    fn exposures_step_from_the_midpoint() {
        let t = ExposureTiming {
            start_et: 10.0,
            stop_et: 20.0,
            interframe_delay: 0.5,
        };
        assert_eq!(t.mid_et(), 15.0);
        assert_eq!(t.exposure_et(0), 15.0);
        assert_eq!(t.exposure_et(4), 17.0);
    }
}
