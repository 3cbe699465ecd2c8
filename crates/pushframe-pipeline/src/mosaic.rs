//! Per-channel mosaic assembly over the shared global window.

use crate::reproject::ProjectedFramelet;
use pushframe_core::{Band, GlobalExtent};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How overlapping inputs are combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MosaicPriority {
    #[default]
    Average,
    /// Later exposures cover earlier ones.
    OnTop,
    /// Earlier exposures cover later ones.
    Beneath,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MosaicError {
    #[error("mosaic tool failed: {0}")]
    Tool(String),
    #[error("no projected framelets for channel {0}")]
    NoInputs(Band),
    #[error("{got} mosaic given for the {expected} channel")]
    WrongBand { expected: Band, got: Band },
    #[error("channel mosaics do not share one window")]
    WindowMismatch,
    #[error("{0} is not supported by this engine")]
    Unsupported(&'static str),
}

/// External mosaicking engine.
pub trait Mosaicker: Send + Sync {
    /// Merge `inputs` of one channel into a single image constrained to
    /// `window`; returns the artifact path.
    fn mosaic(
        &self,
        band: Band,
        inputs: &[ProjectedFramelet],
        priority: MosaicPriority,
        window: &GlobalExtent,
    ) -> Result<PathBuf, MosaicError>;

    /// Histogram-equalize a finished mosaic in place of its artifact;
    /// returns the new path.
    fn equalize(&self, mosaic: &Mosaic) -> Result<PathBuf, MosaicError> {
        let _ = mosaic;
        Err(MosaicError::Unsupported("histogram equalization"))
    }
}

/// One channel's mosaic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mosaic {
    pub band: Band,
    pub path: PathBuf,
    pub extent: GlobalExtent,
    pub framelet_count: usize,
    /// Histogram equalization was applied after assembly.
    #[serde(default)]
    pub equalized: bool,
}

/// Assemble the mosaic of `band` from its projected framelets, optionally
/// histogram-equalizing the result.
///
/// `projected` may contain framelets of other bands; they are ignored. Inputs
/// reach the mosaicker in exposure order, which `OnTop` and `Beneath` rely on.
pub fn assemble<M: Mosaicker + ?Sized>(
    mosaicker: &M,
    band: Band,
    projected: &[ProjectedFramelet],
    window: &GlobalExtent,
    priority: MosaicPriority,
    equalize: bool,
) -> Result<Mosaic, MosaicError> {
    let mut inputs: Vec<ProjectedFramelet> = projected
        .iter()
        .filter(|p| p.id.band == band)
        .cloned()
        .collect();
    inputs.sort_by_key(|p| p.id.exposure);
    if inputs.is_empty() {
        return Err(MosaicError::NoInputs(band));
    }

    log::info!("assembling {band} mosaic from {} framelets", inputs.len());
    let path = mosaicker.mosaic(band, &inputs, priority, window)?;
    let mut mosaic = Mosaic {
        band,
        path,
        extent: *window,
        framelet_count: inputs.len(),
        equalized: false,
    };
    if equalize {
        log::info!("equalizing {band} mosaic");
        mosaic.path = mosaicker.equalize(&mosaic)?;
        mosaic.equalized = true;
    }
    Ok(mosaic)
}
