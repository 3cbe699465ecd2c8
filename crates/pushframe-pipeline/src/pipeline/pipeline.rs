use super::{MosaicRun, PipelineError, PipelineParams};
use crate::composite::{compose, Composite, Compositor, NoCompositor};
use crate::framelet::{extract, Framelet, FrameletId};
use crate::io::{product_id_from_path, ConfigError, RunConfig, RunReport};
use crate::metadata::AcquisitionMetadata;
use crate::mosaic::{assemble, Mosaic, Mosaicker};
use crate::reproject::{reproject_all, ProjectedFramelet, Reprojector};
use pushframe_core::{aggregate, Band, GlobalExtent, ImageView};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Strip → per-channel mosaics (→ optional RGB composite), driving external
/// reprojection, mosaicking and compositing engines.
pub struct MosaicPipeline<R, M, C = NoCompositor> {
    reprojector: Arc<R>,
    mosaicker: M,
    compositor: Option<C>,
    params: PipelineParams,
}

impl<R: Reprojector, M: Mosaicker> MosaicPipeline<R, M> {
    pub fn new(reprojector: R, mosaicker: M, params: PipelineParams) -> Self {
        Self {
            reprojector: Arc::new(reprojector),
            mosaicker,
            compositor: None,
            params,
        }
    }
}

impl<R: Reprojector, M: Mosaicker, C: Compositor> MosaicPipeline<R, M, C> {
    /// Stack the channel mosaics into a color product after every run in
    /// which all three channels succeed.
    pub fn with_compositor<K: Compositor>(self, compositor: K) -> MosaicPipeline<R, M, K> {
        MosaicPipeline {
            reprojector: self.reprojector,
            mosaicker: self.mosaicker,
            compositor: Some(compositor),
            params: self.params,
        }
    }

    #[inline]
    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    #[inline]
    pub fn reprojector(&self) -> &R {
        self.reprojector.as_ref()
    }

    #[inline]
    pub fn mosaicker(&self) -> &M {
        &self.mosaicker
    }

    #[inline]
    pub fn compositor(&self) -> Option<&C> {
        self.compositor.as_ref()
    }

    /// Run on a strip described by `meta`; rejects non-pushframe missions.
    pub fn run_acquisition(
        &self,
        meta: &AcquisitionMetadata,
        strip: &ImageView<'_>,
    ) -> Result<MosaicRun, PipelineError> {
        if !meta.mission.capabilities().pushframe {
            return Err(PipelineError::NotPushframe(meta.mission));
        }
        log::info!(
            "processing {} ({} on {})",
            meta.product_id.as_deref().unwrap_or("unnamed product"),
            meta.instrument.as_deref().unwrap_or("unknown instrument"),
            meta.target
        );
        self.run(strip)
    }

    /// Run the product described by `config` on its loaded `strip` and write
    /// the JSON report to [`RunConfig::report_path`].
    ///
    /// A configured label gates the run by mission and names the report;
    /// without one the product id comes from the strip file name. The run uses
    /// this pipeline's params (see [`RunConfig::pipeline`]).
    pub fn run_config(&self, config: &RunConfig, strip: &ImageView<'_>) -> Result<MosaicRun, PipelineError> {
        let meta = config
            .label_path
            .as_deref()
            .map(AcquisitionMetadata::load)
            .transpose()?;
        let run = match &meta {
            Some(meta) => self.run_acquisition(meta, strip)?,
            None => self.run(strip)?,
        };

        let product_id = meta
            .and_then(|m| m.product_id)
            .unwrap_or_else(|| product_id_from_path(&config.strip_path));
        let report = RunReport::from_run(&run, Some(&product_id));
        fs::create_dir_all(config.output_dir()).map_err(ConfigError::from)?;
        let path = config.report_path();
        report.write_json(&path)?;
        log::info!("wrote run report to {}", path.display());
        Ok(run)
    }

    /// Run on a raw strip.
    ///
    /// Fails before any reprojection on malformed strip geometry or a missing
    /// reference framelet, and after reprojection if no framelet produced
    /// coverage. A channel-level failure is stored in
    /// [`MosaicRun::mosaics`] and does not fail the run; it only skips the
    /// composite.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip_all, fields(w = strip.width, h = strip.height)))]
    pub fn run(&self, strip: &ImageView<'_>) -> Result<MosaicRun, PipelineError> {
        let p = &self.params;
        let framelets = extract(strip, p.band_height)?
            .skip_triplets(p.skip_triplets)
            .trim_vertical(p.vertical_trim)?;
        if framelets.is_empty() {
            log::warn!("no exposures left after skipping {} triplets", p.skip_triplets);
            return Err(PipelineError::NoCoverage);
        }

        let reference_exposure = p
            .reference_exposure
            .or_else(|| framelets.middle_exposure())
            .ok_or(PipelineError::NoCoverage)?;
        let reference_framelet = framelets
            .framelet(FrameletId::new(reference_exposure, Band::Green))
            .ok_or(PipelineError::ReferenceMissing {
                exposure: reference_exposure,
            })?;
        log::info!(
            "building {} reference map from {}",
            p.projection,
            reference_framelet.id
        );
        let reference = self
            .reprojector
            .build_reference(reference_framelet, &p.projection)
            .map(Arc::new)
            .map_err(PipelineError::Reference)?;

        let pool = p.build_pool()?;
        let all: Vec<Framelet<'_>> = framelets.framelets().copied().collect();
        let reprojection = reproject_all(&pool, &self.reprojector, &all, &reference, p.task_timeout());

        let global = aggregate(reprojection.extents()).map_err(|_| PipelineError::NoCoverage)?;
        let (global, clipped) = global.clip_longitude(p.longitude_clip);
        if clipped {
            log::info!("longitude window clipped to {:?}", global.extent());
        }

        let projected: Vec<ProjectedFramelet> = reprojection.projected().cloned().collect();
        let mosaics: BTreeMap<Band, Result<Mosaic, PipelineError>> = if p.parallel_channels {
            pool.install(|| {
                Band::ALL
                    .par_iter()
                    .map(|&band| (band, self.assemble_channel(band, &projected, &global)))
                    .collect::<Vec<_>>()
            })
            .into_iter()
            .collect()
        } else {
            Band::ALL
                .iter()
                .map(|&band| (band, self.assemble_channel(band, &projected, &global)))
                .collect()
        };

        let composite = self.composite_channels(&mosaics);

        Ok(MosaicRun {
            reference_exposure,
            global_extent: global,
            longitude_clipped: clipped,
            reprojection,
            mosaics,
            composite,
        })
    }

    fn composite_channels(
        &self,
        mosaics: &BTreeMap<Band, Result<Mosaic, PipelineError>>,
    ) -> Option<Result<Composite, PipelineError>> {
        let compositor = self.compositor.as_ref()?;
        let channel = |band: Band| mosaics.get(&band).and_then(|r| r.as_ref().ok());
        let (Some(red), Some(green), Some(blue)) = (channel(Band::Red), channel(Band::Green), channel(Band::Blue))
        else {
            log::warn!("skipping RGB composite: not every channel produced a mosaic");
            return None;
        };
        Some(compose(compositor, red, green, blue).map_err(|source| {
            log::error!("RGB composite failed: {source}");
            PipelineError::Composite(source)
        }))
    }

    fn assemble_channel(
        &self,
        band: Band,
        projected: &[ProjectedFramelet],
        global: &GlobalExtent,
    ) -> Result<Mosaic, PipelineError> {
        let p = &self.params;
        assemble(&self.mosaicker, band, projected, global, p.mosaic_priority, p.histeq).map_err(|source| {
            log::error!("{band} mosaic failed: {source}");
            PipelineError::Channel { band, source }
        })
    }
}
