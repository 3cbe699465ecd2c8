//! JSON run configuration and run reports.

use crate::composite::Composite;
use crate::framelet::FrameletId;
use crate::mosaic::{Mosaic, Mosaicker};
use crate::pipeline::{MosaicPipeline, MosaicRun, PipelineParams};
use crate::reproject::{FrameletOutcome, Reprojector};
use pushframe_core::{Band, CoordinateExtent, GlobalExtent};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn load<T: for<'de> Deserialize<'de>>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Product id derived from a strip file name: the stem without a trailing
/// `-raw`.
pub fn product_id_from_path(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().trim_end_matches("-raw").to_owned())
        .unwrap_or_else(|| "strip".to_owned())
}

fn write<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Configuration for one strip run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub strip_path: String,
    #[serde(default)]
    pub label_path: Option<String>,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub report_path: Option<String>,
    #[serde(default)]
    pub params: PipelineParams,
}

impl RunConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        load(path)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write(self, path)
    }

    /// Pipeline driving `reprojector` and `mosaicker` with this config's
    /// params.
    pub fn pipeline<R: Reprojector, M: Mosaicker>(&self, reprojector: R, mosaicker: M) -> MosaicPipeline<R, M> {
        MosaicPipeline::new(reprojector, mosaicker, self.params.clone())
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolve the report path (relative paths land in the output dir).
    pub fn report_path(&self) -> PathBuf {
        let name = self
            .report_path
            .as_deref()
            .unwrap_or("pushframe_run_report.json");
        let p = Path::new(name);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.output_dir().join(p)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameletReport {
    pub id: FrameletId,
    pub outcome: FrameletOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent: Option<CoordinateExtent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelReport {
    pub band: Band,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mosaic: Option<Mosaic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Serializable summary of a [`MosaicRun`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    #[serde(default)]
    pub product_id: Option<String>,
    pub reference_exposure: usize,
    pub global_extent: GlobalExtent,
    pub longitude_clipped: bool,
    pub framelets: Vec<FrameletReport>,
    pub channels: Vec<ChannelReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<Composite>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite_error: Option<String>,
}

impl RunReport {
    pub fn from_run(run: &MosaicRun, product_id: Option<&str>) -> Self {
        let framelets = run
            .reprojection
            .outcomes
            .iter()
            .map(|(&id, &outcome)| {
                let projected = run.reprojection.results.get(&id).and_then(Option::as_ref);
                FrameletReport {
                    id,
                    outcome,
                    path: projected.map(|p| p.path.clone()),
                    extent: projected.map(|p| p.extent),
                }
            })
            .collect();
        let channels = run
            .mosaics
            .iter()
            .map(|(&band, result)| match result {
                Ok(m) => ChannelReport {
                    band,
                    mosaic: Some(m.clone()),
                    error: None,
                },
                Err(e) => ChannelReport {
                    band,
                    mosaic: None,
                    error: Some(e.to_string()),
                },
            })
            .collect();
        Self {
            product_id: product_id.map(str::to_string),
            reference_exposure: run.reference_exposure,
            global_extent: run.global_extent,
            longitude_clipped: run.longitude_clipped,
            framelets,
            channels,
            composite: run.composite().cloned(),
            composite_error: match &run.composite {
                Some(Err(e)) => Some(e.to_string()),
                _ => None,
            },
        }
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        load(path)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write(self, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pushframe_core::LongitudeClip;

    #[test]
    fn config_fills_defaults_and_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg: RunConfig = serde_json::from_str(
            r#"{ "strip_path": "strip.png",
                 "output_dir": "out",
                 "params": { "skip_triplets": 2, "longitude_clip": "canonical" } }"#,
        )
        .expect("parse");
        assert_eq!(cfg.params.skip_triplets, 2);
        assert_eq!(cfg.params.band_height, 128);
        assert_eq!(cfg.params.longitude_clip, LongitudeClip::Canonical);
        assert_eq!(cfg.params.projection, "jupiterequirectangular");
        assert_eq!(cfg.report_path(), PathBuf::from("out/pushframe_run_report.json"));

        let path = dir.path().join("run.json");
        cfg.write_json(&path).expect("write");
        assert_eq!(RunConfig::load_json(&path).expect("load"), cfg);
    }

    #[test]
    fn product_id_drops_the_raw_suffix() {
        assert_eq!(
            product_id_from_path("data/JNCE_2017139_06C00109_V01-raw.png"),
            "JNCE_2017139_06C00109_V01"
        );
        assert_eq!(product_id_from_path("strip.png"), "strip");
    }

    #[test]
    fn missing_config_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            RunConfig::load_json(dir.path().join("absent.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
