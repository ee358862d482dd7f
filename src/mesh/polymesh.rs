//! Polygon mesh with named UV sets.
//!
//! [`PolyMesh`] is the in-memory host mesh that the lightmap pipeline runs
//! against when no modeling application is attached. It stores:
//!
//! - vertex positions
//! - polygon faces as runs of corners (`face_offsets` delimits each face)
//! - an undirected edge table where each edge lists every incident face,
//!   so non-manifold edges are representable
//! - an ordered list of [`UvSet`]s, one of which is active
//! - a history of UV operations
//!
//! 3D topology is fixed at build time. UV operations only rewrite UV sets.

use std::ops::Range;

use nalgebra::{Point3, Vector3};

use super::index::{EdgeId, FaceId, VertexId};
use super::uvset::UvSet;
use crate::algo::pack::{self, PackOptions, PackStats};
use crate::algo::unfold::{self, UnfoldOptions, UnfoldStats};
use crate::error::{LightmapError, Result};

/// Name of the UV set every freshly built mesh starts with.
pub const DEFAULT_UV_SET: &str = "map1";

/// An undirected 3D edge.
#[derive(Debug, Clone)]
pub struct Edge {
    /// Endpoints, lower vertex index first.
    pub vertices: [VertexId; 2],
    /// Every face using this edge, in face order.
    pub faces: Vec<FaceId>,
}

impl Edge {
    /// An edge with a single incident face.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.faces.len() < 2
    }

    /// An edge shared by more than two faces.
    #[inline]
    pub fn is_non_manifold(&self) -> bool {
        self.faces.len() > 2
    }
}

/// One recorded UV mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    /// A UV set was created by copying another.
    CreateUvSet {
        /// New set name.
        name: String,
        /// Set it was copied from.
        source: String,
    },
    /// A UV set was deleted.
    DeleteUvSet {
        /// Deleted set name.
        name: String,
    },
    /// The active UV set changed.
    SetActiveUvSet {
        /// Newly active set.
        name: String,
    },
    /// Every UV edge of a set was cut.
    CutUvEdges {
        /// Set that was cut.
        uv_set: String,
        /// Number of 3D edges involved.
        edges: usize,
    },
    /// Two faces were sewn together in UV space.
    SewFaces {
        /// First face.
        a: FaceId,
        /// Second face.
        b: FaceId,
    },
    /// The active set was unfolded.
    Unfold {
        /// Relaxation iterations run.
        iterations: usize,
    },
    /// The active set was packed into the unit square.
    Layout {
        /// Number of islands placed.
        islands: usize,
        /// Gap between islands, in percent of UV space.
        spacing_percent: f64,
    },
}

/// A polygon mesh with an edge-face incidence table and named UV sets.
#[derive(Debug, Clone)]
pub struct PolyMesh {
    pub(crate) positions: Vec<Point3<f64>>,
    /// Corner range of face `f` is `face_offsets[f]..face_offsets[f + 1]`.
    pub(crate) face_offsets: Vec<usize>,
    pub(crate) corner_vertices: Vec<VertexId>,
    /// Edge from corner `k` to the next corner of the same face.
    pub(crate) corner_edges: Vec<EdgeId>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) uv_sets: Vec<UvSet>,
    pub(crate) active_uv_set: Option<usize>,
    pub(crate) history: Vec<HistoryEntry>,
}

impl Default for PolyMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl PolyMesh {
    /// Create a new empty mesh with an empty default UV set.
    pub fn new() -> Self {
        Self::with_capacity(0, 0).with_default_uv_set()
    }

    pub(crate) fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        let mut face_offsets = Vec::with_capacity(num_faces + 1);
        face_offsets.push(0);
        Self {
            positions: Vec::with_capacity(num_vertices),
            face_offsets,
            corner_vertices: Vec::with_capacity(num_faces * 4),
            corner_edges: Vec::with_capacity(num_faces * 4),
            edges: Vec::with_capacity(num_faces * 2),
            uv_sets: Vec::new(),
            active_uv_set: None,
            history: Vec::new(),
        }
    }

    fn with_default_uv_set(mut self) -> Self {
        self.uv_sets.push(UvSet::per_vertex(DEFAULT_UV_SET, &[], 0));
        self.active_uv_set = Some(0);
        self
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.face_offsets.len() - 1
    }

    /// Get the number of undirected edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Get the number of face corners.
    #[inline]
    pub fn num_corners(&self) -> usize {
        self.corner_vertices.len()
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.positions[v.index()]
    }

    /// Get an edge by ID.
    #[inline]
    pub fn edge(&self, e: EdgeId) -> &Edge {
        &self.edges[e.index()]
    }

    /// Corner index range of a face.
    #[inline]
    pub fn face_corners(&self, f: FaceId) -> Range<usize> {
        self.face_offsets[f.index()]..self.face_offsets[f.index() + 1]
    }

    /// Vertices of a face, in winding order.
    #[inline]
    pub fn face_vertices(&self, f: FaceId) -> &[VertexId] {
        &self.corner_vertices[self.face_corners(f)]
    }

    /// Edges of a face; entry `k` joins corner `k` and corner `k + 1`.
    #[inline]
    pub fn face_edges(&self, f: FaceId) -> &[EdgeId] {
        &self.corner_edges[self.face_corners(f)]
    }

    /// Vertex of a corner.
    #[inline]
    pub fn corner_vertex(&self, corner: usize) -> VertexId {
        self.corner_vertices[corner]
    }

    /// Raw face offsets (one per face plus the end offset).
    #[inline]
    pub fn face_offsets(&self) -> &[usize] {
        &self.face_offsets
    }

    /// Return an error unless `f` names a face of this mesh.
    pub fn check_face(&self, f: FaceId) -> Result<()> {
        if f.is_valid() && f.index() < self.num_faces() {
            Ok(())
        } else {
            Err(LightmapError::InvalidFace {
                face: f.index(),
                count: self.num_faces(),
            })
        }
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.positions.len()).map(VertexId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        (0..self.num_faces()).map(FaceId::new)
    }

    /// Iterate over all edges with their IDs.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .map(|(i, e)| (EdgeId::new(i), e))
    }

    // ==================== Topology Queries ====================

    /// Faces sharing at least one 3D edge with `f`.
    ///
    /// The result excludes `f`, is sorted ascending and lists each neighbor
    /// once even when several edges are shared. Only 3D connectivity is
    /// consulted; UV seams have no influence.
    pub fn adjacent_faces(&self, f: FaceId) -> Vec<FaceId> {
        let mut neighbors: Vec<FaceId> = self
            .face_edges(f)
            .iter()
            .flat_map(|&e| self.edge(e).faces.iter().copied())
            .filter(|&g| g != f)
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    /// Edges shared by faces `a` and `b`.
    pub fn shared_edges(&self, a: FaceId, b: FaceId) -> Vec<EdgeId> {
        let mut shared: Vec<EdgeId> = self
            .face_edges(a)
            .iter()
            .copied()
            .filter(|&e| self.edge(e).faces.contains(&b))
            .collect();
        shared.dedup();
        shared
    }

    /// The corner of face `f` sitting on vertex `v`.
    pub fn corner_of(&self, f: FaceId, v: VertexId) -> Option<usize> {
        self.face_corners(f).find(|&c| self.corner_vertices[c] == v)
    }

    // ==================== Geometry ====================

    /// Unnormalized face normal (Newell's method); its length is twice the
    /// face area for planar polygons.
    pub fn face_area_vector(&self, f: FaceId) -> Vector3<f64> {
        let verts = self.face_vertices(f);
        let mut n = Vector3::zeros();
        for (k, &v) in verts.iter().enumerate() {
            let p = self.position(v);
            let q = self.position(verts[(k + 1) % verts.len()]);
            n.x += (p.y - q.y) * (p.z + q.z);
            n.y += (p.z - q.z) * (p.x + q.x);
            n.z += (p.x - q.x) * (p.y + q.y);
        }
        n
    }

    /// Unit face normal, or the zero vector for a face with no area.
    pub fn face_normal(&self, f: FaceId) -> Vector3<f64> {
        let n = self.face_area_vector(f);
        let len = n.norm();
        if len > f64::MIN_POSITIVE && len.is_finite() {
            n / len
        } else {
            Vector3::zeros()
        }
    }

    /// Area of a (planar) face.
    pub fn face_area(&self, f: FaceId) -> f64 {
        0.5 * self.face_area_vector(f).norm()
    }

    /// Average of the corner positions of a face.
    pub fn face_centroid(&self, f: FaceId) -> Point3<f64> {
        let verts = self.face_vertices(f);
        let sum = verts
            .iter()
            .fold(Vector3::zeros(), |acc, &v| acc + self.position(v).coords);
        Point3::from(sum / verts.len() as f64)
    }

    /// Compute the length of an edge.
    pub fn edge_length(&self, e: EdgeId) -> f64 {
        let [a, b] = self.edge(e).vertices;
        (self.position(b) - self.position(a)).norm()
    }

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = *self.positions.first()?;
        let (mut min, mut max) = (first, first);
        for p in &self.positions {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        Some((min, max))
    }

    /// Compute the total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        self.face_ids().map(|f| self.face_area(f)).sum()
    }

    // ==================== UV Sets ====================

    /// Names of all UV sets in creation order.
    pub fn uv_set_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.uv_sets.iter().map(|s| s.name())
    }

    /// Check whether a UV set exists.
    pub fn has_uv_set(&self, name: &str) -> bool {
        self.uv_set_position(name).is_some()
    }

    /// Look up a UV set by name.
    pub fn uv_set(&self, name: &str) -> Option<&UvSet> {
        self.uv_set_position(name).map(|i| &self.uv_sets[i])
    }

    /// The active UV set.
    pub fn active_uv_set(&self) -> Result<&UvSet> {
        self.active_uv_set
            .map(|i| &self.uv_sets[i])
            .ok_or(LightmapError::NoActiveUvSet)
    }

    /// The active UV set, mutably.
    pub fn active_uv_set_mut(&mut self) -> Result<&mut UvSet> {
        match self.active_uv_set {
            Some(i) => Ok(&mut self.uv_sets[i]),
            None => Err(LightmapError::NoActiveUvSet),
        }
    }

    /// Name of the active UV set, if any.
    pub fn active_uv_set_name(&self) -> Option<&str> {
        self.active_uv_set.map(|i| self.uv_sets[i].name())
    }

    fn uv_set_position(&self, name: &str) -> Option<usize> {
        self.uv_sets.iter().position(|s| s.name() == name)
    }

    /// Delete a UV set.
    ///
    /// Deleting the active set activates the first remaining set, if any.
    pub fn delete_uv_set(&mut self, name: &str) -> Result<()> {
        let index = self
            .uv_set_position(name)
            .ok_or_else(|| LightmapError::uv_set_not_found(name))?;
        self.uv_sets.remove(index);

        self.active_uv_set = match self.active_uv_set {
            Some(a) if a == index => (!self.uv_sets.is_empty()).then_some(0),
            Some(a) if a > index => Some(a - 1),
            other => other,
        };

        log::debug!("deleted UV set '{}'", name);
        self.history.push(HistoryEntry::DeleteUvSet {
            name: name.to_string(),
        });
        Ok(())
    }

    /// Copy the active UV set into a new set called `name`.
    ///
    /// The active set does not change.
    pub fn duplicate_active_uv_set(&mut self, name: &str) -> Result<()> {
        if self.has_uv_set(name) {
            return Err(LightmapError::UvSetExists {
                name: name.to_string(),
            });
        }
        let source = self.active_uv_set()?;
        let copy = source.duplicate(name);
        let source_name = source.name().to_string();
        self.uv_sets.push(copy);

        self.history.push(HistoryEntry::CreateUvSet {
            name: name.to_string(),
            source: source_name,
        });
        Ok(())
    }

    /// Make a UV set the active one.
    pub fn set_active_uv_set(&mut self, name: &str) -> Result<()> {
        let index = self
            .uv_set_position(name)
            .ok_or_else(|| LightmapError::uv_set_not_found(name))?;
        self.active_uv_set = Some(index);
        self.history.push(HistoryEntry::SetActiveUvSet {
            name: name.to_string(),
        });
        Ok(())
    }

    /// Cut every UV edge of the active set: each face becomes its own island.
    pub fn cut_all_uv_edges(&mut self) -> Result<()> {
        let edges = self.num_edges();
        let set = self.active_uv_set_mut()?;
        set.cut_all();
        let uv_set = set.name().to_string();
        self.history.push(HistoryEntry::CutUvEdges { uv_set, edges });
        Ok(())
    }

    /// Sew the UV boundary between two faces in the active set.
    ///
    /// Every 3D edge the faces share is welded: the UVs of both endpoints are
    /// merged across the two faces. Returns whether UV connectivity changed;
    /// sewing faces that share no edge, or are already sewn, is a no-op.
    pub fn sew_faces(&mut self, a: FaceId, b: FaceId) -> Result<bool> {
        self.check_face(a)?;
        self.check_face(b)?;
        if a == b {
            return Ok(false);
        }

        let mut merges = Vec::new();
        for e in self.shared_edges(a, b) {
            for v in self.edge(e).vertices {
                if let (Some(ca), Some(cb)) = (self.corner_of(a, v), self.corner_of(b, v)) {
                    merges.push((ca, cb));
                }
            }
        }

        let set = self.active_uv_set_mut()?;
        let mut changed = false;
        for (ca, cb) in merges {
            let (ua, ub) = (set.corner_uv(ca), set.corner_uv(cb));
            changed |= set.merge(ua, ub);
        }

        if changed {
            self.history.push(HistoryEntry::SewFaces { a, b });
        }
        Ok(changed)
    }

    /// UV islands of the active set.
    pub fn uv_islands(&self) -> Result<Vec<Vec<FaceId>>> {
        Ok(self.active_uv_set()?.islands(&self.face_offsets))
    }

    /// Unfold the active set with the reference relaxation solver.
    pub fn unfold_uvs(&mut self, options: &UnfoldOptions) -> Result<UnfoldStats> {
        self.active_uv_set_mut()?.compact();
        let (coords, stats) = unfold::unfold(self, self.active_uv_set()?, options)?;
        self.active_uv_set_mut()?.set_coords(coords);
        self.history.push(HistoryEntry::Unfold {
            iterations: stats.iterations,
        });
        Ok(stats)
    }

    /// Pack the islands of the active set into the unit square.
    pub fn layout_uvs(&mut self, options: &PackOptions) -> Result<PackStats> {
        self.active_uv_set_mut()?.compact();
        let (coords, stats) = pack::pack(self, self.active_uv_set()?, options)?;
        self.active_uv_set_mut()?.set_coords(coords);
        self.history.push(HistoryEntry::Layout {
            islands: stats.islands,
            spacing_percent: options.spacing_percent,
        });
        Ok(stats)
    }

    // ==================== History ====================

    /// UV operations recorded since the last history deletion.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Forget recorded operations.
    pub fn delete_history(&mut self) {
        self.history.clear();
    }
}
