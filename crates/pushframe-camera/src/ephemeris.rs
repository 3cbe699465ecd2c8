//! Ephemeris / orientation provider seam.
//!
//! Providers supply positions and frame rotations; ray intercepts and
//! illumination angles are derived from those and the target ellipsoid.
//! Light-time and aberration corrections are the provider's concern.

use crate::body::{Body, Frame, TargetBody};
use crate::ellipsoid::Ellipsoid;
use crate::time::{self, TimeParseError};
use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Errors returned by ephemeris providers.
#[derive(thiserror::Error, Debug)]
pub enum EphemerisError {
    #[error("no ephemeris data for {body:?} at et={et}")]
    NoData { body: Body, et: f64 },
    #[error("no orientation data from {from:?} to {to:?} at et={et}")]
    NoOrientation { from: Frame, to: Frame, et: f64 },
    #[error(transparent)]
    Time(#[from] TimeParseError),
}

/// A ray/ellipsoid intersection in the body-fixed frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfacePoint {
    /// Body-fixed rectangular position, km.
    pub position: Vector3<f64>,
    /// Planetocentric radius, km.
    pub radius: f64,
    /// Planetocentric longitude, degrees (-180, 180].
    pub lon_deg: f64,
    /// Planetocentric latitude, degrees.
    pub lat_deg: f64,
}

impl SurfacePoint {
    pub fn from_position(position: Vector3<f64>) -> Self {
        let (radius, lon_deg, lat_deg) = Ellipsoid::to_latitudinal(&position);
        Self {
            position,
            radius,
            lon_deg,
            lat_deg,
        }
    }
}

/// Illumination geometry at a surface point, radians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IlluminationAngles {
    pub phase: f64,
    /// Solar incidence angle.
    pub incidence: f64,
    pub emission: f64,
}

/// Time-indexed positions and frame rotations.
///
/// `et` is TDB seconds past J2000.
pub trait EphemerisProvider: Send + Sync {
    /// Position of `target` relative to `observer`, km, expressed in `frame`.
    fn position(
        &self,
        target: Body,
        observer: Body,
        et: f64,
        frame: Frame,
    ) -> Result<Vector3<f64>, EphemerisError>;

    /// Rotation taking vectors expressed in `from` into `to`.
    fn orientation(&self, from: Frame, to: Frame, et: f64) -> Result<Rotation3<f64>, EphemerisError>;

    fn utc_to_et(&self, utc: &str) -> Result<f64, EphemerisError> {
        Ok(time::utc_to_et(utc)?)
    }

    /// Cast `look` (expressed in `frame`) from `observer` onto `target`.
    ///
    /// `Ok(None)` is a geometric miss.
    fn surface_ray_intercept(
        &self,
        target: TargetBody,
        observer: Body,
        et: f64,
        frame: Frame,
        look: &Vector3<f64>,
    ) -> Result<Option<SurfacePoint>, EphemerisError> {
        let body_fixed = Frame::BodyFixed(target);
        let dir = self.orientation(frame, body_fixed, et)? * look;
        let origin = self.position(observer, Body::Target(target), et, body_fixed)?;
        Ok(target
            .ellipsoid()
            .ray_intercept(&origin, &dir)
            .map(SurfacePoint::from_position))
    }

    /// Phase, incidence and emission at a body-fixed surface point.
    fn illumination(
        &self,
        target: TargetBody,
        observer: Body,
        et: f64,
        point: &Vector3<f64>,
    ) -> Result<IlluminationAngles, EphemerisError> {
        let body_fixed = Frame::BodyFixed(target);
        let sun = self.position(Body::Sun, Body::Target(target), et, body_fixed)?;
        let obs = self.position(observer, Body::Target(target), et, body_fixed)?;
        let normal = target.ellipsoid().normal(point);

        let to_sun = sun - point;
        let to_obs = obs - point;
        Ok(IlluminationAngles {
            phase: to_sun.angle(&to_obs),
            incidence: normal.angle(&to_sun),
            emission: normal.angle(&to_obs),
        })
    }
}

impl<P: EphemerisProvider + ?Sized> EphemerisProvider for &P {
    fn position(
        &self,
        target: Body,
        observer: Body,
        et: f64,
        frame: Frame,
    ) -> Result<Vector3<f64>, EphemerisError> {
        (**self).position(target, observer, et, frame)
    }

    fn orientation(&self, from: Frame, to: Frame, et: f64) -> Result<Rotation3<f64>, EphemerisError> {
        (**self).orientation(from, to, et)
    }

    fn utc_to_et(&self, utc: &str) -> Result<f64, EphemerisError> {
        (**self).utc_to_et(utc)
    }

    fn surface_ray_intercept(
        &self,
        target: TargetBody,
        observer: Body,
        et: f64,
        frame: Frame,
        look: &Vector3<f64>,
    ) -> Result<Option<SurfacePoint>, EphemerisError> {
        (**self).surface_ray_intercept(target, observer, et, frame, look)
    }

    fn illumination(
        &self,
        target: TargetBody,
        observer: Body,
        et: f64,
        point: &Vector3<f64>,
    ) -> Result<IlluminationAngles, EphemerisError> {
        (**self).illumination(target, observer, et, point)
    }
}
