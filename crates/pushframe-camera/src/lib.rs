//! Camera geometry for a three-band pushframe imager.
//!
//! - [`RadialDistortion`]: two-term radial model with a fixed-iteration
//!   inverse.
//! - [`CameraChannel`] / [`ChannelCache`]: per-channel instrument constants and
//!   pixel → look-vector conversion.
//! - [`EphemerisProvider`]: the seam to position/orientation data, with
//!   [`StaticEphemeris`] as a frozen-geometry implementation.
//! - [`CameraModel`]: pixel → surface intercept → illumination queries.
//!
//! ```
//! use pushframe_camera::{ChannelCache, ChannelId};
//!
//! let cache = ChannelCache::new();
//! let green = cache.get(ChannelId::Green);
//! let v = green.pixel_to_look_vector(green.cx, green.cy);
//! assert!((v.z - 1.0).abs() < 1e-12);
//! ```

mod body;
mod channel;
mod distortion;
mod ellipsoid;
mod ephemeris;
mod error;
mod model;
mod static_ephemeris;
pub mod time;

pub use body::{Body, Frame, TargetBody, UnknownTarget};
pub use channel::{
    CameraChannel, ChannelCache, ChannelId, LookVector, BAND_HEIGHT, FOCAL_LENGTH, PIXEL_SIZE,
    STRIP_WIDTH, TRUE_BAND_HEIGHT,
};
pub use distortion::{RadialDistortion, UNDISTORT_ITERATIONS};
pub use ellipsoid::Ellipsoid;
pub use ephemeris::{EphemerisError, EphemerisProvider, IlluminationAngles, SurfacePoint};
pub use error::CameraError;
pub use model::{CameraModel, SurfaceIntercept};
pub use static_ephemeris::StaticEphemeris;
pub use time::TimeParseError;
