use pushframe_camera::EphemerisError;

/// Errors returned by mesh generation and export.
#[derive(thiserror::Error, Debug)]
pub enum MeshError {
    #[error("invalid slice counts (lat={lat}, lon={lon})")]
    InvalidSlices { lat: usize, lon: usize },
    #[error("closing the longitude seam needs at least 3 longitude slices, got {0}")]
    WrapTooNarrow(usize),
    #[error("invalid spacecraft path: {samples} samples over et [{start_et}, {stop_et}]")]
    InvalidPath { start_et: f64, stop_et: f64, samples: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),
}
