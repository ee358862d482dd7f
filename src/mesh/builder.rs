//! Mesh construction utilities.
//!
//! This module provides functions for building [`PolyMesh`] values from
//! face-vertex lists as commonly found in mesh file formats. The builder
//! derives the undirected edge table once; every later topology query reads
//! from it.

use std::collections::HashMap;

use nalgebra::{Point2, Point3};

use super::index::{EdgeId, FaceId, UvId, VertexId};
use super::polymesh::{Edge, PolyMesh, DEFAULT_UV_SET};
use super::uvset::UvSet;
use crate::error::{LightmapError, Result};

/// Texture coordinates read alongside a mesh.
///
/// `face_uvs` must mirror the face list: one UV index per face corner.
#[derive(Debug, Clone, Default)]
pub struct UvInput {
    /// UV coordinates.
    pub coords: Vec<Point2<f64>>,
    /// Per-face lists of indices into `coords`.
    pub face_uvs: Vec<Vec<usize>>,
}

/// Build a polygon mesh from vertices and faces of any size.
///
/// Every face needs at least three distinct vertices. An empty face list
/// produces an empty mesh. The mesh gets a default, fully connected UV set
/// named `map1`.
///
/// # Example
/// ```
/// use lightmap_uv::mesh::build_from_polygons;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(2.0, 0.5, 0.0),
/// ];
/// let faces = vec![vec![0, 1, 2, 3], vec![1, 4, 2]];
///
/// let mesh = build_from_polygons(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_faces(), 2);
/// assert_eq!(mesh.num_edges(), 6);
/// ```
pub fn build_from_polygons(vertices: &[Point3<f64>], faces: &[Vec<usize>]) -> Result<PolyMesh> {
    build_with_uvs(vertices, faces, None)
}

/// Build a mesh from triangles.
pub fn build_from_triangles(vertices: &[Point3<f64>], faces: &[[usize; 3]]) -> Result<PolyMesh> {
    let faces: Vec<Vec<usize>> = faces.iter().map(|f| f.to_vec()).collect();
    build_with_uvs(vertices, &faces, None)
}

/// Build a mesh from quads (counter-clockwise corners).
pub fn build_from_quads(vertices: &[Point3<f64>], faces: &[[usize; 4]]) -> Result<PolyMesh> {
    let faces: Vec<Vec<usize>> = faces.iter().map(|f| f.to_vec()).collect();
    build_with_uvs(vertices, &faces, None)
}

/// Build a mesh with an optional set of texture coordinates.
///
/// When `uvs` is given, it becomes the default `map1` set; otherwise `map1`
/// has one UV per vertex.
pub fn build_with_uvs(
    vertices: &[Point3<f64>],
    faces: &[Vec<usize>],
    uvs: Option<&UvInput>,
) -> Result<PolyMesh> {
    // Validate vertex indices and corner counts
    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= vertices.len() {
                return Err(LightmapError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }
        if face.len() < 3 || has_repeated_vertex(face) {
            return Err(LightmapError::DegenerateFace { face: fi });
        }
    }

    let mut mesh = PolyMesh::with_capacity(vertices.len(), faces.len());
    mesh.positions.extend_from_slice(vertices);

    // Undirected edge (low, high) -> edge id
    let mut edge_map: HashMap<(usize, usize), EdgeId> = HashMap::new();

    for (fi, face) in faces.iter().enumerate() {
        let face_id = FaceId::new(fi);
        let n = face.len();
        for k in 0..n {
            let a = face[k];
            let b = face[(k + 1) % n];
            let key = (a.min(b), a.max(b));

            let edge_id = *edge_map.entry(key).or_insert_with(|| {
                mesh.edges.push(Edge {
                    vertices: [VertexId::new(key.0), VertexId::new(key.1)],
                    faces: Vec::with_capacity(2),
                });
                EdgeId::new(mesh.edges.len() - 1)
            });

            let incident = &mut mesh.edges[edge_id.index()].faces;
            if !incident.contains(&face_id) {
                incident.push(face_id);
            }

            mesh.corner_vertices.push(VertexId::new(a));
            mesh.corner_edges.push(edge_id);
        }
        mesh.face_offsets.push(mesh.corner_vertices.len());
    }

    let default_set = match uvs {
        Some(input) => uv_set_from_input(input, faces)?,
        None => {
            let corners: Vec<usize> = mesh.corner_vertices.iter().map(|v| v.index()).collect();
            UvSet::per_vertex(DEFAULT_UV_SET, &corners, vertices.len())
        }
    };
    mesh.uv_sets.push(default_set);
    mesh.active_uv_set = Some(0);

    Ok(mesh)
}

fn has_repeated_vertex(face: &[usize]) -> bool {
    face.iter()
        .enumerate()
        .any(|(i, v)| face[i + 1..].contains(v))
}

fn uv_set_from_input(input: &UvInput, faces: &[Vec<usize>]) -> Result<UvSet> {
    if input.face_uvs.len() != faces.len() {
        return Err(LightmapError::invalid_param(
            "face_uvs",
            input.face_uvs.len(),
            "must have one entry per face",
        ));
    }

    let mut corner_uvs = Vec::new();
    for (fi, (face, face_uv)) in faces.iter().zip(&input.face_uvs).enumerate() {
        if face.len() != face_uv.len() {
            return Err(LightmapError::invalid_param(
                "face_uvs",
                fi,
                "UV corner count differs from vertex corner count",
            ));
        }
        for &uv in face_uv {
            if uv >= input.coords.len() {
                return Err(LightmapError::invalid_param(
                    "face_uvs",
                    uv,
                    "UV index out of range",
                ));
            }
            corner_uvs.push(UvId::new(uv));
        }
    }

    Ok(UvSet::new(DEFAULT_UV_SET, input.coords.clone(), corner_uvs))
}
