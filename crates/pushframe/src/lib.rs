//! High-level facade crate for the `pushframe-*` workspace.
//!
//! This crate provides:
//! - re-exports of the underlying crates
//! - (feature-gated) raster helpers that load strips and write framelets with
//!   the `image` crate
//!
//! ## Quickstart
//!
//! ```no_run
//! use pushframe::pipeline::extract;
//! use pushframe::raster::{load_strip, write_framelets};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let strip = load_strip("JNCE_2017139_06C00109_V01-raw.png")?;
//! let framelets = extract(&strip.view(), 128)?.skip_triplets(1);
//! let written = write_framelets(&framelets, "JNCE_2017139_06C00109_V01", "work", false)?;
//! println!("wrote {} framelets", written.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `pushframe::core`: strip rasters, bands, coordinate extents, logging.
//! - `pushframe::camera`: distortion, channels, ephemeris seam, camera model.
//! - `pushframe::pipeline`: labels, framelets, reprojection, mosaics,
//!   delambertization.
//! - `pushframe::mesh`: body meshes, OBJ export, scene descriptions.
//! - `pushframe::raster` (feature `image`): strip/framelet image files.
//! - `pushframe::run_config` (feature `image`): load a configured strip, run
//!   it and write the JSON report.

pub use pushframe_camera as camera;
pub use pushframe_core as core;
pub use pushframe_mesh as mesh;
pub use pushframe_pipeline as pipeline;

pub use pushframe_camera::{CameraModel, ChannelCache, ChannelId, TargetBody};
pub use pushframe_core::{Band, CoordinateExtent, GlobalExtent, StripImage};
pub use pushframe_pipeline::{MosaicPipeline, PipelineParams};

#[cfg(feature = "image")]
pub mod raster;
#[cfg(feature = "image")]
mod run;

#[cfg(feature = "image")]
pub use run::{run_config, RunError};
