//! Mesh file I/O.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | UVs |
//! |--------|-----------|------|------|-----|
//! | Wavefront OBJ | `.obj` | ✓ | ✓ | `vt`, read into `map1`, active set written |
//! | STL | `.stl` | ✓ | ✗ | none |
//! | PLY | `.ply` | ✓ | ✗ | per-vertex `u`/`v` |
//!
//! Only OBJ can carry the generated lightmap UVs, so it is the only format
//! [`save`] writes.
//!
//! # Usage
//!
//! ```no_run
//! use lightmap_uv::io::{load, save};
//!
//! let mesh = load("model.stl").unwrap();
//! save(&mesh, "output.obj").unwrap();
//! ```

pub mod obj;
pub mod ply;
pub mod stl;

use std::path::Path;

use crate::error::{LightmapError, Result};
use crate::mesh::PolyMesh;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Wavefront OBJ format.
    Obj,
    /// STL (stereolithography) format.
    Stl,
    /// PLY (Stanford polygon) format.
    Ply,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "obj" => Some(Format::Obj),
            "stl" => Some(Format::Stl),
            "ply" => Some(Format::Ply),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| LightmapError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a mesh from a file with automatic format detection.
///
/// The format is determined by the file extension.
pub fn load<P: AsRef<Path>>(path: P) -> Result<PolyMesh> {
    let path = path.as_ref();
    let mesh = match detect(path)? {
        Format::Obj => obj::load(path)?,
        Format::Stl => stl::load(path)?,
        Format::Ply => ply::load(path)?,
    };
    log::info!(
        "loaded {}: {} vertices, {} faces",
        path.display(),
        mesh.num_vertices(),
        mesh.num_faces()
    );
    Ok(mesh)
}

/// Save a mesh to a file with automatic format detection.
///
/// # Errors
///
/// [`LightmapError::SaveError`] for STL and PLY, which are load-only.
pub fn save<P: AsRef<Path>>(mesh: &PolyMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Obj => obj::save(mesh, path),
        Format::Stl | Format::Ply => Err(LightmapError::SaveError {
            path: path.to_path_buf(),
            message: "only OBJ output keeps UV sets".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path("a/b/mesh.OBJ"), Some(Format::Obj));
        assert_eq!(Format::from_path("mesh.stl"), Some(Format::Stl));
        assert_eq!(Format::from_path("mesh.ply"), Some(Format::Ply));
        assert_eq!(Format::from_path("mesh.fbx"), None);
    }

    #[test]
    fn test_unsupported_paths() {
        let mesh = PolyMesh::new();
        assert!(matches!(
            load("mesh.fbx"),
            Err(LightmapError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            save(&mesh, "mesh.stl"),
            Err(LightmapError::SaveError { .. })
        ));
        assert!(matches!(
            save(&mesh, "mesh"),
            Err(LightmapError::UnsupportedFormat { .. })
        ));
    }
}
