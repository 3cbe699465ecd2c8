//! Lat/lon bounded meshes on a body's reference ellipsoid.

use crate::error::MeshError;
use nalgebra::Vector3;
use pushframe_camera::TargetBody;
use pushframe_core::CoordinateExtent;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Grid resolution and seam handling for [`generate_sphere`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereParams {
    pub lat_slices: usize,
    pub lon_slices: usize,
    /// Also connect the last longitude column back to the first.
    pub wrap: bool,
}

impl Default for SphereParams {
    fn default() -> Self {
        Self {
            lat_slices: 128,
            lon_slices: 256,
            wrap: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Body-fixed position, km.
    pub position: Vector3<f64>,
    pub uv: [f64; 2],
    pub normal: Vector3<f64>,
}

/// Vertex grid and quad faces. Faces index into `vertices` counter-clockwise
/// as `(upper-left, lower-left, lower-right, upper-right)`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub faces: Vec<[usize; 4]>,
}

/// Build a `(lat_slices + 1) × lon_slices` vertex grid over `window`.
///
/// Vertex `(y, x)` sits at latitude `max_lat - y·lat_res` and longitude
/// `min_lon + x·lon_res` on the target's reference ellipsoid, with
/// `uv = (x / lon_slices, 1 - y / lat_slices)`.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(window), fields(lat = params.lat_slices, lon = params.lon_slices)))]
pub fn generate_sphere(
    window: &CoordinateExtent,
    params: &SphereParams,
    target: TargetBody,
) -> Result<Mesh, MeshError> {
    let (lat, lon) = (params.lat_slices, params.lon_slices);
    if lat == 0 || lon == 0 {
        return Err(MeshError::InvalidSlices { lat, lon });
    }
    if params.wrap && lon < 3 {
        return Err(MeshError::WrapTooNarrow(lon));
    }

    let ellipsoid = target.ellipsoid();
    let lat_res = window.lat_span() / lat as f64;
    let lon_res = window.lon_span() / lon as f64;

    let mut vertices = Vec::with_capacity((lat + 1) * lon);
    for y in 0..=lat {
        for x in 0..lon {
            let position = ellipsoid.surface_point(
                window.min_lon + lon_res * x as f64,
                window.max_lat - lat_res * y as f64,
            );
            vertices.push(Vertex {
                position,
                uv: [x as f64 / lon as f64, 1.0 - y as f64 / lat as f64],
                normal: position.normalize(),
            });
        }
    }

    let columns = if params.wrap { lon } else { lon - 1 };
    let mut faces = Vec::with_capacity(lat * columns);
    for y in 0..lat {
        for x in 0..columns {
            let ul = x + y * lon;
            let ur = (x + 1) % lon + y * lon;
            let ll = ul + lon;
            let lr = ur + lon;
            faces.push([ul, ll, lr, ur]);
        }
    }

    log::debug!(
        "{target} mesh: {} vertices, {} faces",
        vertices.len(),
        faces.len()
    );
    Ok(Mesh { vertices, faces })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params(lat: usize, lon: usize) -> SphereParams {
        SphereParams {
            lat_slices: lat,
            lon_slices: lon,
            wrap: false,
        }
    }

    #[test]
    fn counts_hold_for_any_window() {
        let windows = [
            CoordinateExtent::new(-90.0, 90.0, -180.0, 180.0),
            CoordinateExtent::new(-12.5, 40.0, 95.0, 160.0),
            CoordinateExtent::new(10.0, 10.0, 0.0, 0.0),
        ];
        for w in &windows {
            for &(lat, lon) in &[(1, 1), (1, 2), (4, 7), (16, 32)] {
                let mesh = generate_sphere(w, &params(lat, lon), TargetBody::Jupiter).expect("mesh");
                assert_eq!(mesh.vertices.len(), (lat + 1) * lon);
                assert_eq!(mesh.faces.len(), lat * (lon - 1));
                let n = mesh.vertices.len();
                assert!(mesh.faces.iter().flatten().all(|&i| i < n));
            }
        }
    }

    #[test]
    fn corners_uv_and_normals() {
        let w = CoordinateExtent::new(-30.0, 60.0, 0.0, 90.0);
        let mesh = generate_sphere(&w, &params(3, 3), TargetBody::Ganymede).expect("mesh");

        let first = &mesh.vertices[0];
        assert_eq!(first.uv, [0.0, 1.0]);
        let r = 2631.2;
        assert_relative_eq!(
            first.position,
            Vector3::new(r * 0.5, 0.0, r * 60f64.to_radians().sin()),
            epsilon = 1e-9
        );
        assert_relative_eq!(first.normal.norm(), 1.0, epsilon = 1e-12);

        let last = mesh.vertices.last().expect("vertex");
        assert_relative_eq!(last.uv[0], 2.0 / 3.0);
        assert_eq!(last.uv[1], 0.0);
        assert_relative_eq!(last.position.z, -r * 0.5, epsilon = 1e-9);

        assert_eq!(mesh.faces[0], [0, 3, 4, 1]);
    }

    #[test]
    fn wrap_closes_the_seam() {
        let w = CoordinateExtent::new(-90.0, 90.0, 0.0, 360.0);
        let p = SphereParams {
            wrap: true,
            ..params(2, 4)
        };
        let mesh = generate_sphere(&w, &p, TargetBody::Io).expect("mesh");
        assert_eq!(mesh.faces.len(), 2 * 4);
        assert_eq!(mesh.faces[3], [3, 7, 4, 0]);

        assert!(matches!(
            generate_sphere(&w, &SphereParams { wrap: true, ..params(2, 2) }, TargetBody::Io),
            Err(MeshError::WrapTooNarrow(2))
        ));
        assert!(matches!(
            generate_sphere(&w, &params(0, 4), TargetBody::Io),
            Err(MeshError::InvalidSlices { lat: 0, lon: 4 })
        ));
    }
}
