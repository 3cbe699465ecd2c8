//! Product labels and the acquisition metadata derived from them.

use crate::timing::ExposureTiming;
use pushframe_camera::{EphemerisError, EphemerisProvider, TargetBody, UnknownTarget};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum MetadataError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("label syntax error on line {line}: {text:?}")]
    Syntax { line: usize, text: String },
    #[error("required label field {0} is missing")]
    MissingField(&'static str),
    #[error("label field {field} has invalid value {value:?}")]
    InvalidField { field: &'static str, value: String },
    #[error(transparent)]
    Target(#[from] UnknownTarget),
    #[error("spacecraft {0:?} is not supported")]
    UnsupportedMission(String),
    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),
}

/// Keyword lookup over some product label format.
///
/// Missing fields are `None`, never an error.
pub trait MetadataReader {
    fn field(&self, keyword: &str) -> Option<String>;
}

impl MetadataReader for BTreeMap<String, String> {
    fn field(&self, keyword: &str) -> Option<String> {
        self.get(keyword).cloned()
    }
}

impl MetadataReader for HashMap<String, String> {
    fn field(&self, keyword: &str) -> Option<String> {
        self.get(keyword).cloned()
    }
}

/// PDS3 attached or detached label (`KEY = VALUE` statements).
///
/// Keywords inside `OBJECT`/`GROUP` blocks are stored qualified by the block
/// names (`IMAGE.LINES`); [`MetadataReader::field`] also finds them by their
/// bare keyword when no top-level keyword matches.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PdsLabel {
    entries: Vec<(String, String)>,
}

fn strip_comment(line: &str) -> &str {
    match (line.find("/*"), line.find("*/")) {
        (Some(start), Some(end)) if end > start => {
            // only a trailing comment is expected on statement lines
            if line[end + 2..].trim().is_empty() {
                &line[..start]
            } else {
                line
            }
        }
        (Some(start), None) => &line[..start],
        _ => line,
    }
}

fn is_open(value: &str) -> bool {
    let quotes = value.matches('"').count();
    if quotes % 2 == 1 {
        return true;
    }
    let depth = value.matches(['(', '{']).count() as isize
        - value.matches([')', '}']).count() as isize;
    depth > 0
}

fn clean_value(raw: &str) -> String {
    let v = raw.trim();
    let v = v
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(v);
    v.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl PdsLabel {
    pub fn parse(text: &str) -> Result<Self, MetadataError> {
        let mut entries = Vec::new();
        let mut scope: Vec<String> = Vec::new();
        let mut pending: Option<(String, String)> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line = strip_comment(raw).trim();

            if let Some((key, mut value)) = pending.take() {
                value.push(' ');
                value.push_str(line);
                if is_open(&value) {
                    pending = Some((key, value));
                } else {
                    entries.push((key, clean_value(&value)));
                }
                continue;
            }

            if line.is_empty() {
                continue;
            }
            if line == "END" {
                break;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(MetadataError::Syntax {
                    line: idx + 1,
                    text: raw.to_string(),
                });
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "OBJECT" | "GROUP" => {
                    scope.push(clean_value(value));
                    continue;
                }
                "END_OBJECT" | "END_GROUP" => {
                    scope.pop();
                    continue;
                }
                _ => {}
            }

            let qualified = if scope.is_empty() {
                key.to_string()
            } else {
                format!("{}.{}", scope.join("."), key)
            };
            if is_open(value) {
                pending = Some((qualified, value.to_string()));
            } else {
                entries.push((qualified, clean_value(value)));
            }
        }

        if let Some((key, _)) = pending {
            return Err(MetadataError::Syntax {
                line: text.lines().count(),
                text: format!("unterminated value for {key}"),
            });
        }
        Ok(Self { entries })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, MetadataError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MetadataReader for PdsLabel {
    fn field(&self, keyword: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|(k, _)| k == keyword)
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|(k, _)| k.rsplit('.').next() == Some(keyword))
            })
            .map(|(_, v)| v.clone())
    }
}

/// What a mission's imager can do, used to dispatch processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionCapabilities {
    /// Strips are built from repeating filter framelets.
    pub pushframe: bool,
    /// Framelet height, when pushframe.
    pub band_height: Option<usize>,
}

/// Spacecraft whose products can be recognised from their labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mission {
    Juno,
    Cassini,
    Galileo,
}

impl Mission {
    pub fn capabilities(self) -> MissionCapabilities {
        match self {
            Mission::Juno => MissionCapabilities {
                pushframe: true,
                band_height: Some(pushframe_camera::BAND_HEIGHT),
            },
            Mission::Cassini | Mission::Galileo => MissionCapabilities {
                pushframe: false,
                band_height: None,
            },
        }
    }

    fn from_spacecraft_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().replace('_', " ").as_str() {
            "JUNO" => Some(Mission::Juno),
            "CASSINI ORBITER" | "CASSINI-HUYGENS" => Some(Mission::Cassini),
            "GALILEO ORBITER" => Some(Mission::Galileo),
            _ => None,
        }
    }

    /// Identify the mission from `SPACECRAFT_NAME`, falling back to
    /// `INSTRUMENT_HOST_NAME`.
    pub fn identify(reader: &(impl MetadataReader + ?Sized)) -> Result<Self, MetadataError> {
        let name = reader
            .field("SPACECRAFT_NAME")
            .or_else(|| reader.field("INSTRUMENT_HOST_NAME"))
            .ok_or(MetadataError::MissingField("SPACECRAFT_NAME"))?;
        Self::from_spacecraft_name(&name).ok_or(MetadataError::UnsupportedMission(name))
    }
}

/// Parse a numeric label value, ignoring a trailing `<unit>`.
fn parse_number(field: &'static str, value: &str) -> Result<f64, MetadataError> {
    let number = value.split('<').next().unwrap_or(value).trim();
    number.parse().map_err(|_| MetadataError::InvalidField {
        field,
        value: value.to_string(),
    })
}

/// Identity and timing of one acquisition, as read from its label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionMetadata {
    pub mission: Mission,
    pub product_id: Option<String>,
    pub target: TargetBody,
    pub instrument: Option<String>,
    /// `START_TIME`, or `IMAGE_TIME` when absent.
    pub start_time: String,
    /// `STOP_TIME`, or the start time when absent.
    pub stop_time: String,
    pub image_time: Option<String>,
    /// Labelled interframe delay, seconds, without bias.
    pub interframe_delay: f64,
    pub sub_spacecraft_longitude: Option<f64>,
}

impl AcquisitionMetadata {
    pub fn from_reader(reader: &(impl MetadataReader + ?Sized)) -> Result<Self, MetadataError> {
        let mission = Mission::identify(reader)?;
        let target = reader
            .field("TARGET_NAME")
            .ok_or(MetadataError::MissingField("TARGET_NAME"))?
            .parse::<TargetBody>()?;

        let image_time = reader.field("IMAGE_TIME");
        let start_time = reader
            .field("START_TIME")
            .or_else(|| image_time.clone())
            .ok_or(MetadataError::MissingField("START_TIME"))?;
        let stop_time = reader
            .field("STOP_TIME")
            .unwrap_or_else(|| start_time.clone());

        let delay = reader
            .field("INTERFRAME_DELAY")
            .ok_or(MetadataError::MissingField("INTERFRAME_DELAY"))?;
        let interframe_delay = parse_number("INTERFRAME_DELAY", &delay)?;

        let sub_spacecraft_longitude = reader
            .field("SUB_SPACECRAFT_LONGITUDE")
            .map(|v| parse_number("SUB_SPACECRAFT_LONGITUDE", &v))
            .transpose()?;

        Ok(Self {
            mission,
            product_id: reader.field("PRODUCT_ID").map(|p| p.replace('+', "_")),
            target,
            instrument: reader
                .field("INSTRUMENT_NAME")
                .or_else(|| reader.field("INSTRUMENT_ID")),
            start_time,
            stop_time,
            image_time,
            interframe_delay,
            sub_spacecraft_longitude,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, MetadataError> {
        Self::from_reader(&PdsLabel::load(path)?)
    }

    /// Biased exposure clock, with label times converted by `provider`.
    pub fn timing<P: EphemerisProvider + ?Sized>(&self, provider: &P) -> Result<ExposureTiming, MetadataError> {
        let start = provider.utc_to_et(&self.start_time)?;
        let stop = provider.utc_to_et(&self.stop_time)?;
        Ok(ExposureTiming::from_label(start, stop, self.interframe_delay))
    }
}
