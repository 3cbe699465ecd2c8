use super::PipelineError;
use crate::composite::Composite;
use crate::mosaic::Mosaic;
use crate::reproject::Reprojection;
use pushframe_core::{Band, GlobalExtent};
use std::collections::BTreeMap;

/// Output of a mosaic run.
#[derive(Debug)]
pub struct MosaicRun {
    /// Exposure whose green framelet seeded the reference map.
    pub reference_exposure: usize,
    /// Window shared by every channel mosaic.
    pub global_extent: GlobalExtent,
    pub longitude_clipped: bool,
    pub reprojection: Reprojection,
    /// Per-channel outcome; one channel failing leaves the others intact.
    pub mosaics: BTreeMap<Band, Result<Mosaic, PipelineError>>,
    /// Color product; `None` without a compositor or when a channel failed.
    pub composite: Option<Result<Composite, PipelineError>>,
}

impl MosaicRun {
    pub fn mosaic(&self, band: Band) -> Option<&Mosaic> {
        self.mosaics.get(&band).and_then(|r| r.as_ref().ok())
    }

    /// `true` when every channel produced a mosaic.
    pub fn is_complete(&self) -> bool {
        Band::ALL.iter().all(|&b| self.mosaic(b).is_some())
    }

    pub fn composite(&self) -> Option<&Composite> {
        self.composite.as_ref().and_then(|r| r.as_ref().ok())
    }
}
