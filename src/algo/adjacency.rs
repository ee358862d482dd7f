//! Topology snapshot taken before any UV mutation.
//!
//! The seam pass must see 3D adjacency, not UV adjacency, and UV connectivity
//! changes under it on every weld. [`TopologySnapshot`] queries the host once
//! for every face normal and neighbor list and serves the whole pass from
//! that copy.

use nalgebra::Vector3;
use rayon::prelude::*;

use crate::host::MeshTopology;
use crate::mesh::FaceId;

/// Per-face normals and 3D neighbors, frozen at capture time.
#[derive(Debug, Clone, Default)]
pub struct TopologySnapshot {
    normals: Vec<Vector3<f64>>,
    neighbors: Vec<Vec<FaceId>>,
    edge_count: usize,
}

impl TopologySnapshot {
    /// Query `mesh` for every face.
    ///
    /// With `parallel` set the per-face queries run on the rayon pool; they
    /// are independent, so the result is identical either way. Neighbor lists
    /// are normalized: ascending, deduplicated, without the face itself or
    /// out-of-range ids.
    pub fn capture<M>(mesh: &M, parallel: bool) -> Self
    where
        M: MeshTopology + Sync + ?Sized,
    {
        let face_count = mesh.face_count();
        let query = |i: usize| {
            let face = FaceId::new(i);
            let normal = mesh.face_normal(face);
            let neighbors = normalize_neighbors(face, mesh.adjacent_faces(face), face_count);
            (normal, neighbors)
        };

        let per_face: Vec<(Vector3<f64>, Vec<FaceId>)> = if parallel {
            (0..face_count).into_par_iter().map(query).collect()
        } else {
            (0..face_count).map(query).collect()
        };
        let (normals, neighbors) = per_face.into_iter().unzip();

        Self {
            normals,
            neighbors,
            edge_count: mesh.edge_count(),
        }
    }

    /// Number of faces captured.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.normals.len()
    }

    /// Number of 3D edges reported by the host.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Captured normal of a face.
    #[inline]
    pub fn normal(&self, face: FaceId) -> &Vector3<f64> {
        &self.normals[face.index()]
    }

    /// Captured neighbors of a face.
    #[inline]
    pub fn neighbors(&self, face: FaceId) -> &[FaceId] {
        &self.neighbors[face.index()]
    }

    /// Number of ordered (face, neighbor) pairs the seam pass will evaluate.
    pub fn num_directed_pairs(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum()
    }
}

fn normalize_neighbors(face: FaceId, mut neighbors: Vec<FaceId>, face_count: usize) -> Vec<FaceId> {
    neighbors.retain(|&g| g != face && g.is_valid() && g.index() < face_count);
    neighbors.sort_unstable();
    neighbors.dedup();
    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Host that reports neighbors messily: duplicates, self, out of range.
    struct Messy;

    impl MeshTopology for Messy {
        fn face_count(&self) -> usize {
            3
        }
        fn edge_count(&self) -> usize {
            4
        }
        fn face_normal(&self, face: FaceId) -> Vector3<f64> {
            Vector3::new(face.index() as f64, 0.0, 1.0)
        }
        fn adjacent_faces(&self, face: FaceId) -> Vec<FaceId> {
            match face.index() {
                0 => vec![FaceId::new(2), FaceId::new(1), FaceId::new(2), FaceId::new(0)],
                1 => vec![FaceId::new(0), FaceId::new(17)],
                _ => vec![FaceId::new(0)],
            }
        }
    }

    #[test]
    fn test_neighbors_are_normalized() {
        let snapshot = TopologySnapshot::capture(&Messy, false);
        assert_eq!(snapshot.face_count(), 3);
        assert_eq!(snapshot.edge_count(), 4);
        assert_eq!(snapshot.neighbors(FaceId::new(0)), &[FaceId::new(1), FaceId::new(2)]);
        assert_eq!(snapshot.neighbors(FaceId::new(1)), &[FaceId::new(0)]);
        assert_eq!(snapshot.num_directed_pairs(), 4);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let a = TopologySnapshot::capture(&Messy, true);
        let b = TopologySnapshot::capture(&Messy, false);
        for i in 0..3 {
            let f = FaceId::new(i);
            assert_eq!(a.normal(f), b.normal(f));
            assert_eq!(a.neighbors(f), b.neighbors(f));
        }
    }
}
