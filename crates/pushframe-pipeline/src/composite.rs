//! Stacking the three channel mosaics into one color product.

use crate::mosaic::{Mosaic, MosaicError};
use pushframe_core::{Band, GlobalExtent};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// External engine that stacks channel mosaics into a color product.
pub trait Compositor: Send + Sync {
    /// Stack `red`, `green` and `blue` (already sharing one window) into a
    /// single multi-band product; returns the artifact path.
    fn composite(&self, red: &Mosaic, green: &Mosaic, blue: &Mosaic) -> Result<PathBuf, MosaicError>;
}

/// Placeholder for pipelines built without a compositor.
#[derive(Debug, Clone, Copy)]
pub enum NoCompositor {}

impl Compositor for NoCompositor {
    fn composite(&self, _: &Mosaic, _: &Mosaic, _: &Mosaic) -> Result<PathBuf, MosaicError> {
        match *self {}
    }
}

/// A color product built from the three channel mosaics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Composite {
    pub path: PathBuf,
    pub extent: GlobalExtent,
    /// Channel mosaic paths in red, green, blue order.
    pub channels: [PathBuf; 3],
}

/// Stack three channel mosaics.
///
/// The mosaics must carry the bands their position implies and share one
/// window; otherwise the compositor is not called.
pub fn compose<C: Compositor + ?Sized>(
    compositor: &C,
    red: &Mosaic,
    green: &Mosaic,
    blue: &Mosaic,
) -> Result<Composite, MosaicError> {
    for (mosaic, band) in [(red, Band::Red), (green, Band::Green), (blue, Band::Blue)] {
        if mosaic.band != band {
            return Err(MosaicError::WrongBand {
                expected: band,
                got: mosaic.band,
            });
        }
    }
    if red.extent != green.extent || red.extent != blue.extent {
        return Err(MosaicError::WindowMismatch);
    }

    log::info!("compositing RGB over {:?}", red.extent.extent());
    let path = compositor.composite(red, green, blue)?;
    Ok(Composite {
        path,
        extent: red.extent,
        channels: [red.path.clone(), green.path.clone(), blue.path.clone()],
    })
}
