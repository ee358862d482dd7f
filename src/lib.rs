//! # lightmap-uv
//!
//! Lightmap UV generation for polygon meshes.
//!
//! A lightmap needs its own UV layout: every face must get a unique, non
//! overlapping patch of texture space, and islands should break where the
//! surface bends so baked lighting does not smear across hard edges. This
//! crate builds that layout in four steps:
//!
//! 1. copy the active UV set into a fresh `lightmap` set and cut every edge
//! 2. weld each face to the 3D neighbors whose normals differ by less than a
//!    tolerance angle
//! 3. unfold the resulting islands
//! 4. pack them into the unit square with spacing chosen from the texture size
//!
//! The pipeline talks to its mesh through the [`host::MeshTopology`] and
//! [`host::UvEditor`] traits, so a modeling-application binding can drive it
//! directly. [`mesh::PolyMesh`] is the bundled implementation.
//!
//! ## Quick Start
//!
//! ```no_run
//! use lightmap_uv::prelude::*;
//!
//! let mut mesh = lightmap_uv::io::load("model.obj").unwrap();
//!
//! let options = LightmapOptions::default()
//!     .with_tolerance(parse_tolerance("10"))
//!     .with_texture_size(TextureSize::S512);
//! create_lightmap_uv(Some(&mut mesh), &options).unwrap();
//!
//! lightmap_uv::io::save(&mesh, "model_lightmap.obj").unwrap();
//! ```
//!
//! ## Seams From Normals
//!
//! ```
//! use lightmap_uv::prelude::*;
//! use nalgebra::Point3;
//!
//! // An open box corner: three unit quads meeting at right angles
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//!     Point3::new(1.0, 0.0, 1.0),
//!     Point3::new(0.0, 1.0, 1.0),
//! ];
//! let faces = vec![
//!     [0, 3, 2, 1], // floor
//!     [0, 1, 5, 4], // front wall
//!     [3, 0, 4, 6], // side wall
//! ];
//! let mut mesh = build_from_quads(&vertices, &faces).unwrap();
//!
//! let report = create_lightmap_uv(Some(&mut mesh), &LightmapOptions::default())
//!     .unwrap()
//!     .unwrap();
//! assert!(report.seams.welded_pairs.is_empty());
//! assert_eq!(mesh.uv_islands().unwrap().len(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod config;
pub mod error;
pub mod host;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use lightmap_uv::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::lightmap::{
        create_lightmap_uv, create_lightmap_uv_with_progress, LightmapReport, LIGHTMAP_UV_SET,
    };
    pub use crate::algo::{CancelToken, Progress};
    pub use crate::config::{parse_tolerance, LightmapOptions, TextureSize};
    pub use crate::error::{LightmapError, Result};
    pub use crate::host::{MeshTopology, UvEditor};
    pub use crate::mesh::{
        build_from_polygons, build_from_quads, build_from_triangles, EdgeId, FaceId, PolyMesh,
        UvId, UvSet, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
