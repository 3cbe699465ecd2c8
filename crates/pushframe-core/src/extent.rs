//! Latitude/longitude windows and their reduction into one run-wide window.
//!
//! All angles are planetocentric degrees.

use serde::{Deserialize, Serialize};

/// Returned when there is nothing to aggregate.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no coverage: every framelet failed to project")]
pub struct CoverageError;

/// `(min_lat, max_lat, min_lon, max_lon)` window achieved by one projection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoordinateExtent {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl CoordinateExtent {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Smallest window containing both `self` and `other`.
    #[inline]
    pub fn union(&self, other: &CoordinateExtent) -> CoordinateExtent {
        CoordinateExtent {
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
            min_lon: self.min_lon.min(other.min_lon),
            max_lon: self.max_lon.max(other.max_lon),
        }
    }

    #[inline]
    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    #[inline]
    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }
}

/// How to treat an aggregated window spanning more than 360 degrees of
/// longitude.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LongitudeClip {
    /// Keep the window exactly as aggregated.
    #[default]
    Disabled,
    /// Clip to a single revolution. A window wider than 360 degrees whose
    /// eastern edge lies past 180 is cut back to 180; if it is still wider
    /// than 360 its western edge is moved to `max_lon - 360`.
    Canonical,
}

/// The window shared by every channel mosaic of one run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalExtent(CoordinateExtent);

impl GlobalExtent {
    #[inline]
    pub fn extent(&self) -> &CoordinateExtent {
        &self.0
    }

    /// Apply a longitude clipping policy. Returns the (possibly unchanged)
    /// window and whether anything was clipped.
    pub fn clip_longitude(self, policy: LongitudeClip) -> (GlobalExtent, bool) {
        let mut e = self.0;
        if policy == LongitudeClip::Disabled || e.lon_span() <= 360.0 {
            return (self, false);
        }
        if e.max_lon > 180.0 {
            e.max_lon = 180.0;
        }
        if e.lon_span() > 360.0 {
            e.min_lon = e.max_lon - 360.0;
        }
        (GlobalExtent(e), true)
    }
}

impl From<GlobalExtent> for CoordinateExtent {
    fn from(g: GlobalExtent) -> Self {
        g.0
    }
}

/// Reduce per-framelet extents into one global window.
///
/// Only commutative min/max operations are used, so the result does not
/// depend on the order in which extents arrive.
pub fn aggregate<'a, I>(extents: I) -> Result<GlobalExtent, CoverageError>
where
    I: IntoIterator<Item = &'a CoordinateExtent>,
{
    extents
        .into_iter()
        .fold(None, |acc: Option<CoordinateExtent>, e| {
            Some(acc.map_or(*e, |a| a.union(e)))
        })
        .map(GlobalExtent)
        .ok_or(CoverageError)
}
