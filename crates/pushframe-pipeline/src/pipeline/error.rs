use crate::framelet::StripError;
use crate::io::ConfigError;
use crate::metadata::{MetadataError, Mission};
use crate::mosaic::MosaicError;
use crate::reproject::ReprojectError;
use pushframe_camera::CameraError;
use pushframe_core::Band;

/// Errors returned by a mosaic run.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Strip(#[from] StripError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error("{0:?} products are not pushframe strips")]
    NotPushframe(Mission),
    #[error("reference exposure {exposure} is not part of the strip")]
    ReferenceMissing { exposure: usize },
    #[error("building the reference map failed: {0}")]
    Reference(#[source] ReprojectError),
    #[error("no framelet produced any coverage")]
    NoCoverage,
    #[error("{band} channel: {source}")]
    Channel {
        band: Band,
        #[source]
        source: MosaicError,
    },
    #[error("compositing failed: {0}")]
    Composite(#[source] MosaicError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error(transparent)]
    Camera(#[from] CameraError),
}
