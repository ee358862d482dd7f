//! Reference unfold solver.
//!
//! Each UV island is first projected onto the plane of its area-weighted
//! normal, then relaxed: every UV edge acts as a spring whose rest length is
//! the matching 3D edge length. Iteration stops once the largest UV move in a
//! sweep falls below the stop threshold (relative to the mean 3D edge
//! length) or the iteration cap is hit.
//!
//! Islands share no UV ids, so seams are hard boundaries by construction.

use std::collections::HashSet;

use nalgebra::{Point2, Point3, Vector2, Vector3};

use crate::error::{LightmapError, Result};
use crate::mesh::{PolyMesh, UvSet};

/// Options for the unfold solver.
#[derive(Debug, Clone)]
pub struct UnfoldOptions {
    /// Maximum number of relaxation sweeps.
    pub max_iterations: usize,

    /// Stop once no UV moves further than this fraction of the mean edge
    /// length in one sweep.
    pub stop_threshold: f64,

    /// Fraction of the averaged spring correction applied per sweep (0, 1].
    pub step: f64,
}

impl Default for UnfoldOptions {
    fn default() -> Self {
        Self {
            max_iterations: 5000,
            stop_threshold: 0.001,
            step: 0.5,
        }
    }
}

impl UnfoldOptions {
    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the stop threshold.
    pub fn with_stop_threshold(mut self, stop_threshold: f64) -> Self {
        self.stop_threshold = stop_threshold;
        self
    }

    /// Set the relaxation step, clamped to (0, 1].
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step.clamp(f64::EPSILON, 1.0);
        self
    }
}

/// Statistics from one unfold run.
#[derive(Debug, Clone, Default)]
pub struct UnfoldStats {
    /// Islands processed.
    pub islands: usize,
    /// Relaxation sweeps run.
    pub iterations: usize,
    /// Largest UV move in the last sweep, relative to the mean edge length.
    pub final_max_move: f64,
}

/// A UV edge spring.
struct Spring {
    a: usize,
    b: usize,
    rest: f64,
}

/// Unfold a compacted UV set of `mesh`.
///
/// Returns new coordinates indexed by UV id, leaving `uv_set` untouched.
///
/// # Errors
///
/// [`LightmapError::UnfoldFailed`] if the relaxation produces non-finite
/// coordinates.
pub fn unfold(mesh: &PolyMesh, uv_set: &UvSet, options: &UnfoldOptions) -> Result<(Vec<Point2<f64>>, UnfoldStats)> {
    debug_assert!(uv_set.is_compact());

    let num_uvs = uv_set.len();
    let islands = uv_set.islands(mesh.face_offsets());
    let mut coords = vec![Point2::origin(); num_uvs];

    // 3D position behind every UV
    let mut uv_position: Vec<Point3<f64>> = vec![Point3::origin(); num_uvs];
    for c in 0..mesh.num_corners() {
        uv_position[uv_set.corner_uv(c).index()] = *mesh.position(mesh.corner_vertex(c));
    }

    // Initial layout: planar projection per island
    let mut island_of_uv = vec![usize::MAX; num_uvs];
    for (k, faces) in islands.iter().enumerate() {
        let mut area_normal = Vector3::zeros();
        let mut weighted_center = Vector3::zeros();
        let mut total_area = 0.0;
        for &f in faces {
            let n = mesh.face_area_vector(f);
            let area = 0.5 * n.norm();
            area_normal += n;
            weighted_center += mesh.face_centroid(f).coords * area;
            total_area += area;
        }

        let normal = if area_normal.norm() > 1e-12 {
            area_normal.normalize()
        } else {
            Vector3::z()
        };
        let center = if total_area > 1e-12 {
            weighted_center / total_area
        } else {
            mesh.face_centroid(faces[0]).coords
        };

        let up = if normal.y.abs() < 0.99 { Vector3::y() } else { Vector3::x() };
        let u_axis = normal.cross(&up).normalize();
        let v_axis = normal.cross(&u_axis).normalize();

        for &f in faces {
            for c in mesh.face_corners(f) {
                let uv = uv_set.corner_uv(c).index();
                if island_of_uv[uv] == k {
                    continue;
                }
                island_of_uv[uv] = k;
                let p = uv_position[uv].coords - center;
                coords[uv] = Point2::new(p.dot(&u_axis), p.dot(&v_axis));
            }
        }
    }

    // Springs along every UV edge, once per UV pair
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    let mut springs = Vec::new();
    for f in mesh.face_ids() {
        let corners = mesh.face_corners(f);
        let n = corners.len();
        for k in 0..n {
            let ca = corners.start + k;
            let cb = corners.start + (k + 1) % n;
            let (a, b) = (uv_set.corner_uv(ca).index(), uv_set.corner_uv(cb).index());
            if a == b || !seen.insert((a.min(b), a.max(b))) {
                continue;
            }
            let rest = (uv_position[b] - uv_position[a]).norm();
            springs.push(Spring { a, b, rest });
        }
    }

    let mut stats = UnfoldStats {
        islands: islands.len(),
        ..UnfoldStats::default()
    };
    if springs.is_empty() {
        return Ok((coords, stats));
    }

    let mean_rest = springs.iter().map(|s| s.rest).sum::<f64>() / springs.len() as f64;
    let scale = if mean_rest > 1e-12 { mean_rest } else { 1.0 };

    let mut correction = vec![Vector2::zeros(); num_uvs];
    let mut count = vec![0usize; num_uvs];
    for iteration in 0..options.max_iterations {
        correction.iter_mut().for_each(|c| *c = Vector2::zeros());
        count.iter_mut().for_each(|c| *c = 0);

        for s in &springs {
            let d = coords[s.b] - coords[s.a];
            let len = d.norm();
            if len < 1e-12 {
                continue;
            }
            let delta = d * (0.5 * (len - s.rest) / len);
            correction[s.a] += delta;
            correction[s.b] -= delta;
            count[s.a] += 1;
            count[s.b] += 1;
        }

        let mut max_move: f64 = 0.0;
        for uv in 0..num_uvs {
            if count[uv] == 0 {
                continue;
            }
            let step = correction[uv] * (options.step / count[uv] as f64);
            coords[uv] += step;
            max_move = max_move.max(step.norm());
        }

        stats.iterations = iteration + 1;
        stats.final_max_move = max_move / scale;
        if stats.final_max_move < options.stop_threshold {
            break;
        }
    }

    if let Some(uv) = coords.iter().position(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(LightmapError::UnfoldFailed {
            island: island_of_uv[uv],
            reason: "relaxation diverged".to_string(),
        });
    }

    Ok((coords, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_polygons, build_from_triangles, FaceId};

    fn uv_edge_length(mesh: &PolyMesh, c0: usize, c1: usize) -> f64 {
        let set = mesh.active_uv_set().unwrap();
        (set.corner_coord(c1) - set.corner_coord(c0)).norm()
    }

    #[test]
    fn test_flat_island_keeps_shape() {
        // A 2 x 1 rectangle in the z = 3 plane, as two triangles.
        let vertices = vec![
            Point3::new(0.0, 0.0, 3.0),
            Point3::new(2.0, 0.0, 3.0),
            Point3::new(2.0, 1.0, 3.0),
            Point3::new(0.0, 1.0, 3.0),
        ];
        let mut mesh = build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap();
        let stats = mesh.unfold_uvs(&UnfoldOptions::default()).unwrap();

        assert_eq!(stats.islands, 1);
        assert!(stats.iterations <= 2);
        assert!((uv_edge_length(&mesh, 0, 1) - 2.0).abs() < 1e-9);
        assert!((uv_edge_length(&mesh, 1, 2) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_folded_island_is_flattened() {
        // Two unit squares at a right angle, still UV-connected: the
        // projection squashes one, relaxation restores its edge lengths.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
        ];
        let faces = vec![vec![0, 1, 2, 3], vec![1, 4, 5, 2]];
        let mut mesh = build_from_polygons(&vertices, &faces).unwrap();
        let options = UnfoldOptions::default().with_stop_threshold(1e-6);
        mesh.unfold_uvs(&options).unwrap();

        for c in mesh.face_corners(FaceId::new(1)) {
            let next = if c + 1 == 8 { 4 } else { c + 1 };
            assert!((uv_edge_length(&mesh, c, next) - 1.0).abs() < 0.05);
        }
    }

    #[test]
    fn test_seams_are_respected() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mut mesh = build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap();
        mesh.cut_all_uv_edges().unwrap();
        let stats = mesh.unfold_uvs(&UnfoldOptions::default()).unwrap();

        assert_eq!(stats.islands, 2);
        let set = mesh.active_uv_set().unwrap();
        assert_eq!(set.len(), 6);
        assert_ne!(set.corner_uv(0), set.corner_uv(3));
    }

    #[test]
    fn test_empty_mesh() {
        let mut mesh = PolyMesh::new();
        let stats = mesh.unfold_uvs(&UnfoldOptions::default()).unwrap();
        assert_eq!(stats.islands, 0);
        assert_eq!(stats.iterations, 0);
    }
}
