//! Strip and framelet image files.

use crate::core::{ImageError, ImageView, StripImage};
use crate::pipeline::FrameletStrip;
use image::{DynamicImage, ImageBuffer, ImageReader, Luma};
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the raster helpers.
#[derive(thiserror::Error, Debug)]
pub enum RasterError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Buffer(#[from] ImageError),
}

/// 16-bit grayscale raster as written for framelets.
pub type Gray16Image = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Load a grayscale strip. 8- and 16-bit samples keep their native range;
/// anything else is reduced to 16-bit luma.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(path), fields(path = %path.as_ref().display())))]
pub fn load_strip(path: impl AsRef<Path>) -> Result<StripImage, RasterError> {
    let img = ImageReader::open(path.as_ref())?.with_guessed_format()?.decode()?;
    let (width, height) = (img.width() as usize, img.height() as usize);
    let data: Vec<f32> = match img {
        DynamicImage::ImageLuma8(buf) => buf.into_raw().into_iter().map(f32::from).collect(),
        DynamicImage::ImageLuma16(buf) => buf.into_raw().into_iter().map(f32::from).collect(),
        other => other.to_luma16().into_raw().into_iter().map(f32::from).collect(),
    };
    log::debug!("loaded {}x{} strip from {}", width, height, path.as_ref().display());
    Ok(StripImage::new(width, height, data)?)
}

/// Convert a view to 16-bit samples: `round(v · scale)` clamped to `u16`.
pub fn to_gray16(view: &ImageView<'_>, scale: f32) -> Gray16Image {
    let data = view
        .data
        .iter()
        .map(|&v| (v * scale).round().clamp(0.0, u16::MAX as f32) as u16)
        .collect();
    // the buffer length always matches the view
    ImageBuffer::from_raw(view.width as u32, view.height as u32, data)
        .unwrap_or_else(|| ImageBuffer::new(view.width as u32, view.height as u32))
}

/// Write `strip` as 16-bit PNG, stretched so its maximum maps to 65535.
pub fn save_normalized_png(strip: &StripImage, path: impl AsRef<Path>) -> Result<(), RasterError> {
    let scale = match strip.max_value() {
        Some(m) if m > 0.0 => u16::MAX as f32 / m,
        _ => 1.0,
    };
    to_gray16(&strip.view(), scale).save(path)?;
    Ok(())
}

/// Write every framelet as `<out_dir>/<prefix>_<BAND>_<exposure>.png`.
///
/// With `skip_existing`, files already present are left alone. Returns the
/// paths of all framelet files, written or skipped.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(framelets, out_dir), fields(exposures = framelets.num_exposures())))]
pub fn write_framelets(
    framelets: &FrameletStrip<'_>,
    prefix: &str,
    out_dir: impl AsRef<Path>,
    skip_existing: bool,
) -> Result<Vec<PathBuf>, RasterError> {
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)?;

    let mut paths = Vec::new();
    for framelet in framelets.framelets() {
        let path = out_dir.join(format!("{}.png", framelet.id.file_stem(prefix)));
        if skip_existing && path.exists() {
            log::debug!("{} exists, skipping", path.display());
        } else {
            to_gray16(&framelet.view, 1.0).save(&path)?;
        }
        paths.push(path);
    }
    log::info!("wrote {} framelets to {}", paths.len(), out_dir.display());
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extract;

    fn strip(width: usize, height: usize) -> StripImage {
        let data = (0..width * height).map(|i| (i * 10) as f32).collect();
        StripImage::new(width, height, data).expect("strip")
    }

    #[test]
    fn sixteen_bit_round_trip_keeps_native_range() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("strip.png");
        let src = strip(5, 6);
        to_gray16(&src.view(), 1.0).save(&path).expect("save");

        let loaded = load_strip(&path).expect("load");
        assert_eq!(loaded, src);
    }

    #[test]
    fn conversion_clamps_and_rounds() {
        let img = StripImage::new(4, 1, vec![-3.0, 1.4, 1.6, 1.0e6]).expect("strip");
        let g = to_gray16(&img.view(), 1.0);
        assert_eq!(g.into_raw(), vec![0, 1, 2, u16::MAX]);
    }

    #[test]
    fn framelets_are_written_once_per_band_and_exposure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = strip(3, 3 * 2 * 4);
        let framelets = extract(&src.view(), 2).expect("extract").skip_triplets(1);

        let paths = write_framelets(&framelets, "P", dir.path(), false).expect("write");
        assert_eq!(paths.len(), 6);
        assert!(paths.iter().all(|p| p.exists()));
        assert!(dir.path().join("P_GREEN_0002.png").exists());
        assert!(!dir.path().join("P_GREEN_0000.png").exists());

        let green = load_strip(dir.path().join("P_GREEN_0001.png")).expect("load");
        assert_eq!((green.width, green.height), (3, 2));
        assert_eq!(green.get(0, 0), Some((3 * 8 * 10) as f32));

        // existing files are kept untouched
        std::fs::write(&paths[0], b"placeholder").expect("overwrite");
        write_framelets(&framelets, "P", dir.path(), true).expect("write");
        assert_eq!(std::fs::read(&paths[0]).expect("read"), b"placeholder");
    }

    #[test]
    fn normalized_png_stretches_to_full_range() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("factors.png");
        let img = StripImage::new(2, 1, vec![0.25, 0.5]).expect("strip");
        save_normalized_png(&img, &path).expect("save");
        let loaded = load_strip(&path).expect("load");
        assert_eq!(loaded.data, vec![32768.0, 65535.0]);
    }
}
