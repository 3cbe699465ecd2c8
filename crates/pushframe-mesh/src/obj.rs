//! Wavefront OBJ export.

use crate::error::MeshError;
use crate::sphere::Mesh;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Write `mesh` as a single OBJ object, positions multiplied by `scalar`.
///
/// Texture and normal indices equal the vertex index.
pub fn write_obj<W: Write>(mesh: &Mesh, scalar: f64, out: &mut W) -> io::Result<()> {
    writeln!(out, "o Sphere")?;
    for v in &mesh.vertices {
        let p = v.position * scalar;
        writeln!(out, "v {:.6} {:.6} {:.6}", p.x, p.y, p.z)?;
    }
    for v in &mesh.vertices {
        writeln!(out, "vt {:.6} {:.6}", v.uv[0], v.uv[1])?;
    }
    for v in &mesh.vertices {
        writeln!(out, "vn {:.6} {:.6} {:.6}", v.normal.x, v.normal.y, v.normal.z)?;
    }
    for face in &mesh.faces {
        write!(out, "f")?;
        for &i in face {
            let i = i + 1;
            write!(out, " {i}/{i}/{i}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn save_obj(mesh: &Mesh, scalar: f64, path: impl AsRef<Path>) -> Result<(), MeshError> {
    let path = path.as_ref();
    let mut out = BufWriter::new(File::create(path)?);
    write_obj(mesh, scalar, &mut out)?;
    out.flush()?;
    log::info!(
        "wrote {} ({} vertices, {} faces)",
        path.display(),
        mesh.vertices.len(),
        mesh.faces.len()
    );
    Ok(())
}
