//! Camera model: channel geometry combined with an ephemeris provider.

use crate::body::{Body, Frame, TargetBody};
use crate::channel::{ChannelCache, LookVector};
use crate::ephemeris::{EphemerisProvider, IlluminationAngles, SurfacePoint};
use crate::error::CameraError;
use serde::{Deserialize, Serialize};

/// Where a pixel's ray meets the target, with optional lighting geometry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceIntercept {
    pub point: SurfacePoint,
    pub illumination: Option<IlluminationAngles>,
}

/// Pixel → ray → surface queries for one target body.
///
/// Channels are looked up in a caller-owned [`ChannelCache`], so one cache can
/// serve every worker of a run.
pub struct CameraModel<'a, P: EphemerisProvider + ?Sized> {
    provider: &'a P,
    channels: &'a ChannelCache,
    target: TargetBody,
}

impl<'a, P: EphemerisProvider + ?Sized> CameraModel<'a, P> {
    pub fn new(provider: &'a P, channels: &'a ChannelCache, target: TargetBody) -> Self {
        Self {
            provider,
            channels,
            target,
        }
    }

    pub fn target(&self) -> TargetBody {
        self.target
    }

    pub fn provider(&self) -> &'a P {
        self.provider
    }

    /// Look vector for framelet pixel `(x, y)` of the channel `naif_id`.
    pub fn pixel_to_look_vector(&self, naif_id: i32, x: f64, y: f64) -> Result<LookVector, CameraError> {
        Ok(self
            .channels
            .get_by_naif_id(naif_id)?
            .pixel_to_look_vector(x, y))
    }

    /// Body-fixed intercept of a channel-frame look vector at `et`.
    pub fn surface_intercept(
        &self,
        naif_id: i32,
        et: f64,
        look: &LookVector,
    ) -> Result<Option<SurfacePoint>, CameraError> {
        Ok(self.provider.surface_ray_intercept(
            self.target,
            Body::Spacecraft,
            et,
            Frame::Instrument(naif_id),
            look,
        )?)
    }

    pub fn illumination(&self, et: f64, point: &SurfacePoint) -> Result<IlluminationAngles, CameraError> {
        Ok(self
            .provider
            .illumination(self.target, Body::Spacecraft, et, &point.position)?)
    }

    /// Full pixel query. `Ok(None)` when the ray misses the body.
    pub fn intercept_for_pixel(
        &self,
        naif_id: i32,
        et: f64,
        x: f64,
        y: f64,
        with_illumination: bool,
    ) -> Result<Option<SurfaceIntercept>, CameraError> {
        let look = self.pixel_to_look_vector(naif_id, x, y)?;
        let Some(point) = self.surface_intercept(naif_id, et, &look)? else {
            return Ok(None);
        };
        let illumination = if with_illumination {
            Some(self.illumination(et, &point)?)
        } else {
            None
        };
        Ok(Some(SurfaceIntercept { point, illumination }))
    }
}
