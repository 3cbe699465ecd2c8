//! Body meshes and scene descriptions for projected mosaics.
//!
//! [`generate_sphere`] builds a textured grid over a latitude/longitude
//! window of a target's reference ellipsoid; [`save_obj`] writes it as
//! Wavefront OBJ and [`SceneDescription`] records where the camera was.
//! [`spacecraft_path`] and [`camera_stops`] trace the spacecraft over a pass
//! and at each imaged product.

mod error;
mod obj;
mod scene;
mod sphere;

pub use error::MeshError;
pub use obj::{save_obj, write_obj};
pub use scene::{camera_stops, spacecraft_path, CameraStop, SceneDescription};
pub use sphere::{generate_sphere, Mesh, SphereParams, Vertex};
