//! Slicing a raw strip into framelets and exposure triplets.

use pushframe_core::{Band, ImageView};
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors raised while slicing a strip.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StripError {
    #[error("malformed strip: height {height} is not a positive multiple of 3 x {band_height}")]
    MalformedStrip { height: usize, band_height: usize },
    #[error("vertical trim of {trim} rows leaves nothing of a {band_height}-row framelet")]
    TrimTooLarge { trim: usize, band_height: usize },
}

/// Identity of one framelet: exposure index in the original strip and band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FrameletId {
    pub exposure: usize,
    pub band: Band,
}

impl FrameletId {
    pub fn new(exposure: usize, band: Band) -> Self {
        Self { exposure, band }
    }

    /// File stem for artifacts derived from this framelet, e.g.
    /// `JNCE_..._GREEN_0007`.
    pub fn file_stem(&self, prefix: &str) -> String {
        format!("{prefix}_{}_{:04}", self.band, self.exposure)
    }
}

impl fmt::Display for FrameletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.band, self.exposure)
    }
}

/// A single-band slice of a strip.
#[derive(Clone, Copy, Debug)]
pub struct Framelet<'a> {
    pub id: FrameletId,
    pub view: ImageView<'a>,
    /// Framelet row of `view` row 0. Non-zero after vertical trimming, so
    /// that camera coordinates are `(x, row + row_offset)`.
    pub row_offset: usize,
}

impl<'a> Framelet<'a> {
    #[inline]
    pub fn band(&self) -> Band {
        self.id.band
    }

    #[inline]
    pub fn exposure(&self) -> usize {
        self.id.exposure
    }

    /// Camera y coordinate of a row of this framelet's view.
    #[inline]
    pub fn camera_row(&self, row: usize) -> usize {
        row + self.row_offset
    }

    fn trimmed(&self, trim: usize) -> Result<Framelet<'a>, StripError> {
        let keep = trim
            .checked_mul(2)
            .and_then(|both| self.view.height.checked_sub(both))
            .filter(|&k| k > 0);
        let view = keep
            .and_then(|k| self.view.rows(trim, k))
            .ok_or(StripError::TrimTooLarge {
                trim,
                band_height: self.view.height,
            })?;
        Ok(Framelet {
            id: self.id,
            view,
            row_offset: self.row_offset + trim,
        })
    }
}

/// The three framelets sharing one exposure.
#[derive(Clone, Copy, Debug)]
pub struct ExposureTriplet<'a> {
    pub exposure: usize,
    pub framelets: [Framelet<'a>; 3],
}

impl<'a> ExposureTriplet<'a> {
    pub fn get(&self, band: Band) -> &Framelet<'a> {
        &self.framelets[band.triplet_offset()]
    }
}

/// Framelets of one strip, grouped by exposure.
#[derive(Clone, Debug)]
pub struct FrameletStrip<'a> {
    band_height: usize,
    triplets: Vec<ExposureTriplet<'a>>,
}

/// Slice `image` into exposure triplets of `band_height`-row framelets.
///
/// Exposure `i`, band `c` occupies rows
/// `[i·3·band_height + c·band_height, + band_height)`.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(image), fields(w = image.width, h = image.height)))]
pub fn extract<'a>(image: &ImageView<'a>, band_height: usize) -> Result<FrameletStrip<'a>, StripError> {
    let malformed = || StripError::MalformedStrip {
        height: image.height,
        band_height,
    };
    let triplet_height = band_height
        .checked_mul(3)
        .filter(|&h| h > 0)
        .ok_or_else(malformed)?;
    if image.height == 0 || image.height % triplet_height != 0 {
        return Err(malformed());
    }
    let num_exposures = image.height / triplet_height;
    let mut triplets = Vec::with_capacity(num_exposures);
    for exposure in 0..num_exposures {
        let top = exposure * triplet_height;
        let framelet = |band: Band| -> Result<Framelet<'a>, StripError> {
            let view = image
                .rows(top + band.triplet_offset() * band_height, band_height)
                .ok_or_else(malformed)?;
            Ok(Framelet {
                id: FrameletId::new(exposure, band),
                view,
                row_offset: 0,
            })
        };
        triplets.push(ExposureTriplet {
            exposure,
            framelets: [framelet(Band::Blue)?, framelet(Band::Green)?, framelet(Band::Red)?],
        });
    }
    log::debug!(
        "extracted {} exposures ({} framelets) from {}x{} strip",
        num_exposures,
        3 * num_exposures,
        image.width,
        image.height
    );
    Ok(FrameletStrip {
        band_height,
        triplets,
    })
}

impl<'a> FrameletStrip<'a> {
    pub fn band_height(&self) -> usize {
        self.band_height
    }

    pub fn num_exposures(&self) -> usize {
        self.triplets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triplets.is_empty()
    }

    pub fn triplets(&self) -> &[ExposureTriplet<'a>] {
        &self.triplets
    }

    pub fn triplet(&self, exposure: usize) -> Option<&ExposureTriplet<'a>> {
        self.triplets.iter().find(|t| t.exposure == exposure)
    }

    /// All framelets, exposure-major, bands in acquisition order.
    pub fn framelets(&self) -> impl Iterator<Item = &Framelet<'a>> + '_ {
        self.triplets.iter().flat_map(|t| t.framelets.iter())
    }

    pub fn framelet(&self, id: FrameletId) -> Option<&Framelet<'a>> {
        self.triplet(id.exposure).map(|t| t.get(id.band))
    }

    /// Drop the first and last `n` exposures. Exposure indices are kept.
    pub fn skip_triplets(mut self, n: usize) -> Self {
        if n == 0 {
            return self;
        }
        if n.saturating_mul(2) >= self.triplets.len() {
            self.triplets.clear();
        } else {
            self.triplets.truncate(self.triplets.len() - n);
            self.triplets.drain(..n);
        }
        self
    }

    /// Trim `rows` from the top and bottom of every framelet.
    pub fn trim_vertical(self, rows: usize) -> Result<Self, StripError> {
        if rows == 0 {
            return Ok(self);
        }
        let triplets = self
            .triplets
            .iter()
            .map(|t| {
                let [b, g, r] = &t.framelets;
                Ok(ExposureTriplet {
                    exposure: t.exposure,
                    framelets: [b.trimmed(rows)?, g.trimmed(rows)?, r.trimmed(rows)?],
                })
            })
            .collect::<Result<Vec<_>, StripError>>()?;
        Ok(Self {
            band_height: self.band_height,
            triplets,
        })
    }

    /// Exposure in the middle of the retained sequence: position
    /// `round(N / 2)` with halves rounded up, so 5 retained exposures pick
    /// the fourth.
    pub fn middle_exposure(&self) -> Option<usize> {
        let n = self.triplets.len();
        let middle = n.div_ceil(2).min(n.checked_sub(1)?);
        self.triplets.get(middle).map(|t| t.exposure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pushframe_core::StripImage;

    /// Strip where every sample holds its row index.
    fn row_coded_strip(width: usize, height: usize) -> StripImage {
        let data = (0..height)
            .flat_map(|y| std::iter::repeat(y as f32).take(width))
            .collect();
        StripImage::new(width, height, data).expect("strip")
    }

    #[test]
    fn slices_bands_in_acquisition_order() {
        let img = row_coded_strip(4, 3 * 8 * 5);
        let strip = extract(&img.view(), 8).expect("extract");
        assert_eq!(strip.num_exposures(), 5);
        assert_eq!(strip.framelets().count(), 15);

        let t = strip.triplet(2).expect("triplet");
        assert_eq!(t.get(Band::Blue).view.get(0, 0), Some(48.0));
        assert_eq!(t.get(Band::Green).view.get(0, 0), Some(56.0));
        assert_eq!(t.get(Band::Red).view.get(3, 7), Some(71.0));
        assert_eq!(t.get(Band::Red).id, FrameletId::new(2, Band::Red));
    }

    #[test]
    fn rejects_malformed_geometry() {
        let img = row_coded_strip(4, 100);
        assert_eq!(
            extract(&img.view(), 8).unwrap_err(),
            StripError::MalformedStrip {
                height: 100,
                band_height: 8
            }
        );
        assert!(extract(&img.view(), 0).is_err());
        let empty = StripImage::zeros(4, 0);
        assert!(extract(&empty.view(), 8).is_err());
    }

    #[test]
    fn skipping_keeps_exposure_indices() {
        let img = row_coded_strip(2, 3 * 4 * 6);
        let strip = extract(&img.view(), 4).expect("extract").skip_triplets(2);
        let kept: Vec<_> = strip.triplets().iter().map(|t| t.exposure).collect();
        assert_eq!(kept, vec![2, 3]);
        assert_eq!(strip.middle_exposure(), Some(3));

        let strip = extract(&img.view(), 4).expect("extract").skip_triplets(usize::MAX);
        assert!(strip.is_empty());

        let strip = extract(&img.view(), 4).expect("extract").skip_triplets(3);
        assert!(strip.is_empty());
        assert_eq!(strip.middle_exposure(), None);
    }

    #[test]
    fn middle_exposure_rounds_half_up() {
        let middle = |exposures: usize| {
            let img = row_coded_strip(1, 3 * exposures);
            extract(&img.view(), 1).expect("extract").middle_exposure()
        };
        assert_eq!(middle(1), Some(0));
        assert_eq!(middle(2), Some(1));
        assert_eq!(middle(3), Some(2));
        assert_eq!(middle(4), Some(2));
        assert_eq!(middle(5), Some(3));
        assert_eq!(middle(7), Some(4));
    }

    #[test]
    fn oversized_geometry_is_an_error_not_an_overflow() {
        let img = row_coded_strip(2, 3 * 4 * 2);
        assert_eq!(
            extract(&img.view(), usize::MAX).unwrap_err(),
            StripError::MalformedStrip {
                height: 24,
                band_height: usize::MAX
            }
        );
        let trimmed = extract(&img.view(), 4).expect("extract").trim_vertical(usize::MAX);
        assert!(matches!(
            trimmed,
            Err(StripError::TrimTooLarge {
                trim: usize::MAX,
                band_height: 4
            })
        ));
    }

    #[test]
    fn vertical_trim_keeps_camera_rows() {
        let img = row_coded_strip(2, 3 * 10);
        let strip = extract(&img.view(), 10)
            .expect("extract")
            .trim_vertical(2)
            .expect("trim");
        let green = strip
            .framelet(FrameletId::new(0, Band::Green))
            .expect("green");
        assert_eq!(green.view.height, 6);
        assert_eq!(green.row_offset, 2);
        assert_eq!(green.camera_row(0), 2);
        assert_eq!(green.view.get(0, 0), Some(12.0));

        let err = extract(&img.view(), 10).expect("extract").trim_vertical(5);
        assert!(matches!(err, Err(StripError::TrimTooLarge { trim: 5, .. })));
    }

    #[test]
    fn file_stems_are_unique_per_framelet() {
        let id = FrameletId::new(7, Band::Green);
        assert_eq!(id.file_stem("JNCE"), "JNCE_GREEN_0007");
        assert_eq!(id.to_string(), "GREEN#7");
    }
}
