//! Reference host mesh.
//!
//! [`PolyMesh`] is an in-memory polygon mesh with an undirected edge table,
//! so every edge knows all faces that use it, and a list of named UV sets.
//! It implements the [`host`](crate::host) traits, which makes the whole
//! lightmap pipeline runnable without a modeling application.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`FaceId`] - Identifies a face
//! - [`EdgeId`] - Identifies an undirected 3D edge
//! - [`UvId`] - Identifies a UV within a [`UvSet`]
//!
//! Face corners are plain `usize` positions into the mesh's corner arrays;
//! [`PolyMesh::face_corners`] gives the range for one face.
//!
//! # Construction
//!
//! ```
//! use lightmap_uv::mesh::{build_from_quads, DEFAULT_UV_SET};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh = build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap();
//! assert_eq!(mesh.num_edges(), 4);
//! assert_eq!(mesh.active_uv_set_name(), Some(DEFAULT_UV_SET));
//! ```

mod builder;
mod index;
mod polymesh;
mod uvset;

pub use builder::{
    build_from_polygons, build_from_quads, build_from_triangles, build_with_uvs, UvInput,
};
pub use index::{EdgeId, FaceId, MeshIndex, UvId, VertexId};
pub use polymesh::{Edge, HistoryEntry, PolyMesh, DEFAULT_UV_SET};
pub use uvset::UvSet;
