//! Framelet pipeline for pushframe strips.
//!
//! A raw strip is cut into blue/green/red framelets ([`extract`]), each
//! framelet is reprojected in parallel by an external [`Reprojector`] against
//! a shared reference map, the achieved extents are reduced into one
//! [`GlobalExtent`](pushframe_core::GlobalExtent), and every channel is
//! averaged into a [`Mosaic`] over that window by a [`Mosaicker`]. When all
//! three channels succeed a [`Compositor`] can stack them into one color
//! product. [`MosaicPipeline::run_config`] runs a [`RunConfig`] and writes its
//! [`RunReport`].
//!
//! [`delambertize`] applies the Lambertian photometric correction to raw
//! strips using a [`CameraModel`](pushframe_camera::CameraModel).

mod composite;
mod delambert;
mod framelet;
mod io;
mod metadata;
mod mosaic;
mod pipeline;
mod reproject;
mod timing;

pub use composite::{compose, Composite, Compositor, NoCompositor};
pub use delambert::{delambertize, lambert_factor, Delambertized};
pub use framelet::{extract, ExposureTriplet, Framelet, FrameletId, FrameletStrip, StripError};
pub use io::{
    product_id_from_path, ChannelReport, ConfigError, FrameletReport, RunConfig, RunReport,
};
pub use metadata::{
    AcquisitionMetadata, MetadataError, MetadataReader, Mission, MissionCapabilities, PdsLabel,
};
pub use mosaic::{assemble, Mosaic, MosaicError, MosaicPriority, Mosaicker};
pub use pipeline::{MosaicPipeline, MosaicRun, PipelineError, PipelineParams};
pub use reproject::{
    reproject_all, FrameletOutcome, ProjectedFramelet, ReprojectError, Reprojection, Reprojector,
};
pub use timing::{ExposureTiming, INTERFRAME_DELAY_BIAS, START_TIME_BIAS};
