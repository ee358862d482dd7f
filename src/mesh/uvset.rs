//! Named UV sets.
//!
//! A [`UvSet`] stores one 2D parameterization of a mesh. Every face corner
//! points at a UV id; two corners are UV-connected when they resolve to the
//! same id. Sewing merges ids with a union-find forest, cutting hands every
//! corner its own id. Faces that reach each other through shared UV ids form
//! one UV island.

use nalgebra::Point2;

use super::index::{FaceId, UvId};

/// One named UV parameterization of a mesh.
#[derive(Debug, Clone)]
pub struct UvSet {
    name: String,
    /// Coordinates indexed by UV id. Only root ids carry meaningful values.
    coords: Vec<Point2<f64>>,
    /// UV id of every face corner, in mesh corner order.
    corner_uvs: Vec<UvId>,
    /// Union-find parent links; a root points at itself.
    parent: Vec<UvId>,
}

impl UvSet {
    /// Create a UV set from explicit coordinates and per-corner UV ids.
    pub fn new(name: impl Into<String>, coords: Vec<Point2<f64>>, corner_uvs: Vec<UvId>) -> Self {
        let parent = (0..coords.len()).map(UvId::new).collect();
        Self {
            name: name.into(),
            coords,
            corner_uvs,
            parent,
        }
    }

    /// Create a set where every vertex owns exactly one UV at the origin.
    ///
    /// `corner_vertices` holds the vertex index of each face corner. The result
    /// is fully connected: no seams anywhere.
    pub fn per_vertex(name: impl Into<String>, corner_vertices: &[usize], num_vertices: usize) -> Self {
        let corner_uvs = corner_vertices.iter().map(|&v| UvId::new(v)).collect();
        Self::new(name, vec![Point2::origin(); num_vertices], corner_uvs)
    }

    /// The name of this set.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Copy this set under a new name.
    pub fn duplicate(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Number of allocated UV ids (including merged, non-root ids).
    #[inline]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Check if the set has no UVs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Number of face corners covered by this set.
    #[inline]
    pub fn num_corners(&self) -> usize {
        self.corner_uvs.len()
    }

    /// Resolve a UV id to the root it has been merged into.
    pub fn find(&self, uv: UvId) -> UvId {
        let mut current = uv;
        loop {
            let up = self.parent[current.index()];
            if up == current {
                return current;
            }
            current = up;
        }
    }

    /// The resolved UV id used by a face corner.
    #[inline]
    pub fn corner_uv(&self, corner: usize) -> UvId {
        self.find(self.corner_uvs[corner])
    }

    /// The coordinate of a UV id (after resolving merges).
    #[inline]
    pub fn uv(&self, uv: UvId) -> Point2<f64> {
        self.coords[self.find(uv).index()]
    }

    /// The coordinate used by a face corner.
    #[inline]
    pub fn corner_coord(&self, corner: usize) -> Point2<f64> {
        self.coords[self.corner_uv(corner).index()]
    }

    /// Set the coordinate of a UV id (and of everything merged with it).
    pub fn set_uv(&mut self, uv: UvId, coord: Point2<f64>) {
        let root = self.find(uv);
        self.coords[root.index()] = coord;
    }

    /// Replace all coordinates at once.
    ///
    /// Used after a solver has computed a full layout over a compacted set.
    pub(crate) fn set_coords(&mut self, coords: Vec<Point2<f64>>) {
        debug_assert_eq!(coords.len(), self.coords.len());
        self.coords = coords;
    }

    /// Merge two UV ids. Returns `false` if they were already connected.
    ///
    /// The lower root index survives, so the outcome does not depend on the
    /// argument order. The surviving coordinate is kept.
    pub fn merge(&mut self, a: UvId, b: UvId) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        let (keep, drop) = if ra < rb { (ra, rb) } else { (rb, ra) };
        self.parent[drop.index()] = keep;
        true
    }

    /// Give every face corner its own UV id, keeping current coordinates.
    ///
    /// After this every face is a separate island.
    pub fn cut_all(&mut self) {
        let coords: Vec<Point2<f64>> = (0..self.corner_uvs.len())
            .map(|c| self.corner_coord(c))
            .collect();
        self.corner_uvs = (0..coords.len()).map(UvId::new).collect();
        self.parent = (0..coords.len()).map(UvId::new).collect();
        self.coords = coords;
    }

    /// Drop merged ids and renumber roots densely in first-use order.
    ///
    /// Connectivity and coordinates are unchanged. Afterwards every id in
    /// `0..len()` is a root used by at least one corner.
    pub fn compact(&mut self) {
        let mut remap: Vec<Option<UvId>> = vec![None; self.coords.len()];
        let mut coords = Vec::new();
        let mut corner_uvs = Vec::with_capacity(self.corner_uvs.len());

        for c in 0..self.corner_uvs.len() {
            let root = self.corner_uv(c);
            let id = match remap[root.index()] {
                Some(id) => id,
                None => {
                    let id = UvId::new(coords.len());
                    coords.push(self.coords[root.index()]);
                    remap[root.index()] = Some(id);
                    id
                }
            };
            corner_uvs.push(id);
        }

        self.parent = (0..coords.len()).map(UvId::new).collect();
        self.coords = coords;
        self.corner_uvs = corner_uvs;
    }

    /// Check whether no merged (non-root) ids remain.
    pub fn is_compact(&self) -> bool {
        self.parent.iter().enumerate().all(|(i, p)| p.index() == i)
            && self.corner_uvs.iter().all(|uv| uv.index() < self.coords.len())
    }

    /// Group faces into UV islands.
    ///
    /// `face_offsets` holds the first corner of every face plus a trailing
    /// end offset. Islands are sorted by their smallest face, and the faces
    /// inside each island are ascending.
    pub fn islands(&self, face_offsets: &[usize]) -> Vec<Vec<FaceId>> {
        let num_faces = face_offsets.len().saturating_sub(1);
        let mut face_parent: Vec<usize> = (0..num_faces).collect();
        let mut owner: Vec<Option<usize>> = vec![None; self.coords.len()];

        fn root(parent: &mut [usize], mut i: usize) -> usize {
            while parent[i] != i {
                parent[i] = parent[parent[i]];
                i = parent[i];
            }
            i
        }

        for f in 0..num_faces {
            for c in face_offsets[f]..face_offsets[f + 1] {
                let uv = self.corner_uv(c).index();
                match owner[uv] {
                    None => owner[uv] = Some(f),
                    Some(other) => {
                        let ra = root(&mut face_parent, f);
                        let rb = root(&mut face_parent, other);
                        if ra != rb {
                            face_parent[ra.max(rb)] = ra.min(rb);
                        }
                    }
                }
            }
        }

        let mut slot: Vec<Option<usize>> = vec![None; num_faces];
        let mut islands: Vec<Vec<FaceId>> = Vec::new();
        for f in 0..num_faces {
            let r = root(&mut face_parent, f);
            let index = *slot[r].get_or_insert_with(|| {
                islands.push(Vec::new());
                islands.len() - 1
            });
            islands[index].push(FaceId::new(f));
        }
        islands
    }

    /// Compute the bounding box of all UVs referenced by corners.
    ///
    /// Returns `None` if no corner references a UV.
    pub fn bounding_box(&self) -> Option<(Point2<f64>, Point2<f64>)> {
        let mut corners = (0..self.corner_uvs.len()).map(|c| self.corner_coord(c));
        let first = corners.next()?;
        let (mut min, mut max) = (first, first);
        for uv in corners {
            min.x = min.x.min(uv.x);
            min.y = min.y.min(uv.y);
            max.x = max.x.max(uv.x);
            max.y = max.y.max(uv.y);
        }
        Some((min, max))
    }
}
