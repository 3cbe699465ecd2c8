use crate::mosaic::MosaicPriority;
use pushframe_core::LongitudeClip;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest accepted per-framelet deadline, seconds.
const MAX_TASK_TIMEOUT_SECS: f64 = 7.0 * 86_400.0;

/// Configuration for a mosaic run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    /// Rows per framelet.
    pub band_height: usize,
    /// Exposures dropped from each end of the strip.
    pub skip_triplets: usize,
    /// Exposure whose green framelet seeds the reference map. Defaults to
    /// the middle retained exposure.
    pub reference_exposure: Option<usize>,
    /// Map projection name handed to the reprojector.
    pub projection: String,
    /// Rows trimmed from the top and bottom of every framelet.
    pub vertical_trim: usize,
    /// Worker threads; `0` uses one per CPU.
    pub num_threads: usize,
    /// Per-framelet reprojection deadline, seconds. Zero, negative and NaN
    /// values disable the deadline (it falls back to seven days).
    pub task_timeout_secs: f64,
    pub longitude_clip: LongitudeClip,
    /// Assemble the three channel mosaics concurrently.
    pub parallel_channels: bool,
    /// How overlapping framelets combine in a channel mosaic.
    pub mosaic_priority: MosaicPriority,
    /// Histogram-equalize every channel mosaic after assembly.
    pub histeq: bool,
    /// Exponent of the Lambert photometric factor.
    pub delambert_exponent: f64,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            band_height: pushframe_camera::BAND_HEIGHT,
            skip_triplets: 0,
            reference_exposure: None,
            projection: "jupiterequirectangular".to_string(),
            vertical_trim: 0,
            num_threads: 0,
            task_timeout_secs: 600.0,
            longitude_clip: LongitudeClip::Disabled,
            parallel_channels: false,
            mosaic_priority: MosaicPriority::Average,
            histeq: false,
            delambert_exponent: 0.875,
        }
    }
}

impl PipelineParams {
    pub fn task_timeout(&self) -> Duration {
        let secs = self.task_timeout_secs;
        let secs = if secs > 0.0 {
            secs.min(MAX_TASK_TIMEOUT_SECS)
        } else {
            MAX_TASK_TIMEOUT_SECS
        };
        Duration::from_secs_f64(secs)
    }

    /// Worker pool for one run.
    pub fn build_pool(&self) -> Result<ThreadPool, ThreadPoolBuildError> {
        ThreadPoolBuilder::new()
            .num_threads(self.num_threads)
            .thread_name(|i| format!("pushframe-{i}"))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_timeout(secs: f64) -> PipelineParams {
        PipelineParams {
            task_timeout_secs: secs,
            ..PipelineParams::default()
        }
    }

    #[test]
    fn timeout_is_capped_and_non_positive_disables_it() {
        let max = Duration::from_secs(7 * 86_400);
        assert_eq!(PipelineParams::default().task_timeout(), Duration::from_secs(600));
        assert_eq!(with_timeout(0.25).task_timeout(), Duration::from_millis(250));
        assert_eq!(with_timeout(1e12).task_timeout(), max);
        assert_eq!(with_timeout(f64::INFINITY).task_timeout(), max);
        for disabled in [0.0, -3.0, f64::NAN] {
            assert_eq!(with_timeout(disabled).task_timeout(), max);
        }
    }
}
