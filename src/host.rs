//! The geometry environment the lightmap pipeline runs against.
//!
//! The seam engine and layout driver never touch a concrete mesh type. They
//! talk to a host through two traits:
//!
//! - [`MeshTopology`]: read-only queries (counts, normals, 3D adjacency)
//! - [`UvEditor`]: UV-set management and UV mutations, including the unfold
//!   and packing solvers
//!
//! A modeling-application binding implements these over its own scene
//! representation. [`PolyMesh`] implements them for in-memory meshes.

use nalgebra::Vector3;

use crate::algo::pack::PackOptions;
use crate::algo::unfold::UnfoldOptions;
use crate::error::Result;
use crate::mesh::{FaceId, PolyMesh};

/// Read-only mesh queries.
///
/// Every answer must come from 3D topology, which stays fixed while UV
/// connectivity is being edited.
pub trait MeshTopology {
    /// Number of faces; face ids are `0..face_count()`.
    fn face_count(&self) -> usize;

    /// Number of 3D edges.
    fn edge_count(&self) -> usize;

    /// Face normal as a direction (need not be unit length). A degenerate
    /// face may report the zero vector.
    fn face_normal(&self, face: FaceId) -> Vector3<f64>;

    /// Faces sharing a 3D edge with `face`, excluding `face` itself.
    fn adjacent_faces(&self, face: FaceId) -> Vec<FaceId>;
}

/// UV mutations offered by the host.
///
/// All operations except set management act on the active UV set.
pub trait UvEditor: MeshTopology {
    /// Check whether a UV set exists.
    fn has_uv_set(&self, name: &str) -> bool;

    /// Delete a UV set.
    fn delete_uv_set(&mut self, name: &str) -> Result<()>;

    /// Copy the active UV set into a new set.
    fn duplicate_active_uv_set(&mut self, name: &str) -> Result<()>;

    /// Make a UV set active.
    fn set_active_uv_set(&mut self, name: &str) -> Result<()>;

    /// Cut every UV edge so each face is its own island.
    fn cut_all_uv_edges(&mut self) -> Result<()>;

    /// Weld the UV boundary shared by two faces.
    ///
    /// Returns whether connectivity changed. Sewing an already-sewn pair is
    /// `Ok(false)`, never an error.
    fn sew_faces(&mut self, a: FaceId, b: FaceId) -> Result<bool>;

    /// Relax every island in place; seams are hard boundaries.
    fn unfold(&mut self, options: &UnfoldOptions) -> Result<()>;

    /// Lay all islands out in the unit square without overlap.
    fn layout(&mut self, options: &PackOptions) -> Result<()>;

    /// Drop construction history. Hosts without history do nothing.
    fn delete_history(&mut self) -> Result<()> {
        Ok(())
    }
}

impl MeshTopology for PolyMesh {
    fn face_count(&self) -> usize {
        self.num_faces()
    }

    fn edge_count(&self) -> usize {
        self.num_edges()
    }

    fn face_normal(&self, face: FaceId) -> Vector3<f64> {
        PolyMesh::face_normal(self, face)
    }

    fn adjacent_faces(&self, face: FaceId) -> Vec<FaceId> {
        PolyMesh::adjacent_faces(self, face)
    }
}

impl UvEditor for PolyMesh {
    fn has_uv_set(&self, name: &str) -> bool {
        PolyMesh::has_uv_set(self, name)
    }

    fn delete_uv_set(&mut self, name: &str) -> Result<()> {
        PolyMesh::delete_uv_set(self, name)
    }

    fn duplicate_active_uv_set(&mut self, name: &str) -> Result<()> {
        PolyMesh::duplicate_active_uv_set(self, name)
    }

    fn set_active_uv_set(&mut self, name: &str) -> Result<()> {
        PolyMesh::set_active_uv_set(self, name)
    }

    fn cut_all_uv_edges(&mut self) -> Result<()> {
        PolyMesh::cut_all_uv_edges(self)
    }

    fn sew_faces(&mut self, a: FaceId, b: FaceId) -> Result<bool> {
        PolyMesh::sew_faces(self, a, b)
    }

    fn unfold(&mut self, options: &UnfoldOptions) -> Result<()> {
        let stats = self.unfold_uvs(options)?;
        log::debug!(
            "unfolded {} islands in {} iterations (max move {:.3e})",
            stats.islands,
            stats.iterations,
            stats.final_max_move
        );
        Ok(())
    }

    fn layout(&mut self, options: &PackOptions) -> Result<()> {
        let stats = self.layout_uvs(options)?;
        log::debug!(
            "packed {} islands into {} rows",
            stats.islands,
            stats.rows
        );
        Ok(())
    }

    fn delete_history(&mut self) -> Result<()> {
        PolyMesh::delete_history(self);
        Ok(())
    }
}
