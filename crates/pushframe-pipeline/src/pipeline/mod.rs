//! Mosaic run orchestration.
//!
//! Extraction → reference map → parallel reprojection → extent aggregation →
//! per-channel mosaic assembly.

mod error;
mod params;
mod pipeline;
mod result;

pub use error::PipelineError;
pub use params::PipelineParams;
pub use pipeline::MosaicPipeline;
pub use result::MosaicRun;
