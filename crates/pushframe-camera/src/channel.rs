//! Optical channels of the camera and their instrument-kernel constants.

use crate::distortion::RadialDistortion;
use crate::error::CameraError;
use nalgebra::{Rotation3, Unit, Vector3};
use pushframe_core::Band;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Unit look vector in a channel reference frame.
pub type LookVector = Unit<Vector3<f64>>;

/// Pixel pitch in millimetres.
pub const PIXEL_SIZE: f64 = 0.0074;
/// Focal length in millimetres.
pub const FOCAL_LENGTH: f64 = 10.997;
/// Width of a raw strip in pixels.
pub const STRIP_WIDTH: usize = 1648;
/// Rows per framelet in a raw strip.
pub const BAND_HEIGHT: usize = 128;
/// Rows per filter band on the physical sensor.
pub const TRUE_BAND_HEIGHT: usize = 155;

const K1: f64 = -5.9624209455667325e-08;
const K2: f64 = 2.7381910042256151e-14;
const CX: f64 = 814.21;

/// One of the five optical channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelId {
    Full,
    Blue,
    Green,
    Red,
    Methane,
}

impl ChannelId {
    pub const ALL: [ChannelId; 5] = [
        ChannelId::Full,
        ChannelId::Blue,
        ChannelId::Green,
        ChannelId::Red,
        ChannelId::Methane,
    ];

    /// NAIF instrument id (`INS-615xx`).
    pub fn naif_id(self) -> i32 {
        match self {
            ChannelId::Full => -61500,
            ChannelId::Blue => -61501,
            ChannelId::Green => -61502,
            ChannelId::Red => -61503,
            ChannelId::Methane => -61504,
        }
    }

    pub fn from_naif_id(id: i32) -> Result<Self, CameraError> {
        ChannelId::ALL
            .into_iter()
            .find(|c| c.naif_id() == id)
            .ok_or(CameraError::InvalidChannel(id))
    }

    fn index(self) -> usize {
        self as usize
    }

    fn principal_y(self) -> f64 {
        match self {
            ChannelId::Full => 78.48,
            ChannelId::Blue => 158.48,
            ChannelId::Green => 3.48,
            ChannelId::Red => -151.52,
            ChannelId::Methane => 315.48,
        }
    }

    fn sensor_top(self) -> usize {
        match self {
            ChannelId::Full => 0,
            ChannelId::Methane => 291,
            ChannelId::Blue => 456,
            ChannelId::Green => 611,
            ChannelId::Red => 766,
        }
    }
}

impl From<Band> for ChannelId {
    fn from(band: Band) -> Self {
        match band {
            Band::Blue => ChannelId::Blue,
            Band::Green => ChannelId::Green,
            Band::Red => ChannelId::Red,
        }
    }
}

/// Immutable optical description of one channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraChannel {
    pub id: ChannelId,
    pub distortion: RadialDistortion,
    /// Principal point x, pixels.
    pub cx: f64,
    /// Principal point y, pixels, in framelet row coordinates.
    pub cy: f64,
    /// Pixel pitch, mm.
    pub pixel_size: f64,
    /// Focal length, mm.
    pub focal_length: f64,
    /// First sensor row of the channel's filter band.
    pub sensor_top: usize,
}

impl CameraChannel {
    pub fn new(id: ChannelId) -> Self {
        Self {
            id,
            distortion: RadialDistortion::new(K1, K2),
            cx: CX,
            cy: id.principal_y(),
            pixel_size: PIXEL_SIZE,
            focal_length: FOCAL_LENGTH,
            sensor_top: id.sensor_top(),
        }
    }

    pub fn naif_id(&self) -> i32 {
        self.id.naif_id()
    }

    /// Undistorted offset of a framelet pixel from the principal point.
    pub fn undistorted_offset(&self, x: f64, y: f64) -> (f64, f64) {
        self.distortion.undistort(x - self.cx, y - self.cy)
    }

    /// Distorted framelet pixel for an ideal offset from the principal point.
    pub fn distorted_pixel(&self, ux: f64, uy: f64) -> (f64, f64) {
        let (dx, dy) = self.distortion.distort(ux, uy);
        (dx + self.cx, dy + self.cy)
    }

    /// Look vector of framelet pixel `(x, y)` in the channel frame.
    ///
    /// The boresight is `+Z`. The x offset tilts the ray about the frame x
    /// axis and the flipped y offset about the y axis; the first two
    /// components are then exchanged to land in the channel frame.
    pub fn pixel_to_look_vector(&self, x: f64, y: f64) -> LookVector {
        let (ux, uy) = self.undistorted_offset(x, y);
        let uy = -uy;

        let ang_x = (ux * self.pixel_size / self.focal_length).atan();
        let ang_y = (uy * self.pixel_size / self.focal_length).atan();

        // Frame rotations: rotating the frame by `a` rotates the vector by `-a`.
        let v = Rotation3::from_axis_angle(&Vector3::x_axis(), -ang_x) * Vector3::z();
        let v = Rotation3::from_axis_angle(&Vector3::y_axis(), -ang_y) * v;

        Unit::new_normalize(Vector3::new(v.y, v.x, v.z))
    }
}

/// Caller-owned, lazily filled cache of channel descriptions.
///
/// One slot per [`ChannelId`]; each slot is initialised at most once and can
/// be shared across worker threads.
#[derive(Debug, Default)]
pub struct ChannelCache {
    slots: [OnceLock<CameraChannel>; 5],
}

impl ChannelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ChannelId) -> &CameraChannel {
        self.slots[id.index()].get_or_init(|| {
            log::debug!("initialising camera channel {id:?} (naif {})", id.naif_id());
            CameraChannel::new(id)
        })
    }

    pub fn get_by_naif_id(&self, naif_id: i32) -> Result<&CameraChannel, CameraError> {
        Ok(self.get(ChannelId::from_naif_id(naif_id)?))
    }

    /// Number of channels constructed so far.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
