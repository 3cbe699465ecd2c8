//! Running a configured product straight from its files.

use crate::pipeline::{Compositor, MosaicPipeline, MosaicRun, Mosaicker, PipelineError, Reprojector, RunConfig};
use crate::raster::{load_strip, RasterError};

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Load `config.strip_path`, run it through `pipeline` and write the run
/// report next to the outputs.
pub fn run_config<R, M, C>(pipeline: &MosaicPipeline<R, M, C>, config: &RunConfig) -> Result<MosaicRun, RunError>
where
    R: Reprojector,
    M: Mosaicker,
    C: Compositor,
{
    let strip = load_strip(&config.strip_path)?;
    Ok(pipeline.run_config(config, &strip.view())?)
}
