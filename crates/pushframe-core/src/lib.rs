//! Core types for pushframe camera processing.
//!
//! This crate is intentionally small. It knows about strip rasters, filter
//! bands and latitude/longitude windows, and nothing about camera geometry,
//! ephemerides or external projection tools.

mod band;
mod extent;
mod image;
mod logger;

pub use band::{Band, BandParseError};
pub use extent::{aggregate, CoordinateExtent, CoverageError, GlobalExtent, LongitudeClip};
pub use image::{ImageError, ImageView, StripImage};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init, init_with_level, level_from_verbosity, LogSettings};
