//! Target bodies, ephemeris bodies and reference frames.

use crate::ellipsoid::Ellipsoid;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bodies that can be imaged and projected onto.
///
/// Radii are the IAU reference ellipsoids (km) from the NAIF `pck00010`
/// planetary constants kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetBody {
    Jupiter,
    Io,
    Europa,
    Ganymede,
    Callisto,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported target body: {0}")]
pub struct UnknownTarget(pub String);

impl TargetBody {
    pub const ALL: [TargetBody; 5] = [
        TargetBody::Jupiter,
        TargetBody::Io,
        TargetBody::Europa,
        TargetBody::Ganymede,
        TargetBody::Callisto,
    ];

    pub fn naif_id(self) -> i32 {
        match self {
            TargetBody::Jupiter => 599,
            TargetBody::Io => 501,
            TargetBody::Europa => 502,
            TargetBody::Ganymede => 503,
            TargetBody::Callisto => 504,
        }
    }

    pub fn from_naif_id(id: i32) -> Option<Self> {
        TargetBody::ALL.into_iter().find(|t| t.naif_id() == id)
    }

    /// Name as written in labels (`TARGET_NAME`).
    pub fn name(self) -> &'static str {
        match self {
            TargetBody::Jupiter => "JUPITER",
            TargetBody::Io => "IO",
            TargetBody::Europa => "EUROPA",
            TargetBody::Ganymede => "GANYMEDE",
            TargetBody::Callisto => "CALLISTO",
        }
    }

    /// Body-fixed frame name, e.g. `IAU_JUPITER`.
    pub fn frame_name(self) -> String {
        format!("IAU_{}", self.name())
    }

    /// Triaxial radii `(a, b, c)` in km.
    pub fn radii(self) -> [f64; 3] {
        match self {
            TargetBody::Jupiter => [71492.0, 71492.0, 66854.0],
            TargetBody::Io => [1829.4, 1819.4, 1815.7],
            TargetBody::Europa => [1562.6, 1560.3, 1559.5],
            TargetBody::Ganymede => [2631.2, 2631.2, 2631.2],
            TargetBody::Callisto => [2410.3, 2410.3, 2410.3],
        }
    }

    pub fn ellipsoid(self) -> Ellipsoid {
        let [a, b, c] = self.radii();
        Ellipsoid::new(a, b, c)
    }
}

impl fmt::Display for TargetBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TargetBody {
    type Err = UnknownTarget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_matches('"').to_ascii_uppercase();
        TargetBody::ALL
            .into_iter()
            .find(|t| t.name() == wanted)
            .ok_or_else(|| UnknownTarget(s.to_string()))
    }
}

/// Ephemeris objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Spacecraft,
    Target(TargetBody),
}

/// Reference frames understood by an ephemeris provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frame {
    J2000,
    BodyFixed(TargetBody),
    Spacecraft,
    /// Channel frame of the instrument with the given NAIF id.
    Instrument(i32),
}
