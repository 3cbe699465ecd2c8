use crate::ephemeris::EphemerisError;

/// Errors returned by the camera model.
#[derive(thiserror::Error, Debug)]
pub enum CameraError {
    #[error("invalid camera channel identifier: {0}")]
    InvalidChannel(i32),
    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),
}
