//! Lambertian fall-off correction on raw (unprojected) strips.

use crate::framelet::extract;
use crate::pipeline::PipelineError;
use crate::timing::ExposureTiming;
use pushframe_camera::{CameraModel, ChannelId, EphemerisProvider};
use pushframe_core::{Band, StripImage};
use rayon::prelude::*;
use rayon::ThreadPool;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Photometric factor for solar incidence `incidence` (radians).
#[inline]
pub fn lambert_factor(incidence: f64, exponent: f64) -> f64 {
    incidence.cos().max(0.0).powf(exponent)
}

/// Per-pixel factors and the corrected working copy.
#[derive(Clone, Debug, PartialEq)]
pub struct Delambertized {
    /// `1.0` where the pixel's ray misses the body.
    pub factors: StripImage,
    /// Source samples multiplied by their factor.
    pub corrected: StripImage,
}

/// Compute photometric factors for every pixel of `strip`.
///
/// Exposures are processed in parallel on `pool`; exposure `i` is sampled at
/// `timing.exposure_et(i)`. The source buffer is not modified.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip_all, fields(w = strip.width, h = strip.height, exponent = exponent)))]
pub fn delambertize<P: EphemerisProvider + ?Sized>(
    pool: &ThreadPool,
    strip: &StripImage,
    band_height: usize,
    timing: &ExposureTiming,
    model: &CameraModel<'_, P>,
    exponent: f64,
) -> Result<Delambertized, PipelineError> {
    let exposures = extract(&strip.view(), band_height)?.num_exposures();
    let width = strip.width;
    if width == 0 {
        return Ok(Delambertized {
            factors: strip.clone(),
            corrected: strip.clone(),
        });
    }
    let band_len = width * band_height;

    let mut factors = StripImage::filled(width, strip.height, 1.0);
    pool.install(|| {
        factors
            .data
            .par_chunks_mut(3 * band_len)
            .enumerate()
            .try_for_each(|(exposure, triplet)| {
                let et = timing.exposure_et(exposure);
                log::debug!("delambert exposure {}/{} at et={et:.3}", exposure + 1, exposures);
                for band in Band::ALL {
                    let naif_id = ChannelId::from(band).naif_id();
                    let offset = band.triplet_offset() * band_len;
                    let rows = &mut triplet[offset..offset + band_len];
                    for (y, row) in rows.chunks_exact_mut(width).enumerate() {
                        for (x, factor) in row.iter_mut().enumerate() {
                            let hit = model.intercept_for_pixel(naif_id, et, x as f64, y as f64, true)?;
                            if let Some(ill) = hit.and_then(|h| h.illumination) {
                                *factor = lambert_factor(ill.incidence, exponent) as f32;
                            }
                        }
                    }
                }
                Ok::<(), PipelineError>(())
            })
    })?;

    let corrected = StripImage {
        width,
        height: strip.height,
        data: strip
            .data
            .par_iter()
            .zip(factors.data.par_iter())
            .map(|(v, f)| v * f)
            .collect(),
    };
    Ok(Delambertized { factors, corrected })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn factor_is_cosine_power_and_clamped() {
        assert_relative_eq!(lambert_factor(0.0, 0.875), 1.0);
        assert_relative_eq!(
            lambert_factor(60f64.to_radians(), 0.875),
            0.5f64.powf(0.875),
            epsilon = 1e-12
        );
        assert_eq!(lambert_factor(100f64.to_radians(), 0.875), 0.0);
        assert_eq!(lambert_factor(std::f64::consts::PI, 2.0), 0.0);
    }
}
