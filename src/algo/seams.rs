//! Seam decision engine.
//!
//! Starting from a fully cut UV set (every face its own island), the engine
//! visits faces in ascending order and welds each face to every 3D neighbor
//! whose normal lies strictly within the angular tolerance. Everything else
//! stays a seam.
//!
//! The work is split in two:
//!
//! - [`plan_seams`] is pure: it reads a [`TopologySnapshot`] and produces a
//!   [`SeamPlan`] of per-pair decisions. It can run in parallel and be tested
//!   against synthetic topology.
//! - [`apply_seam_plan`] walks the plan in face order, issues the welds to a
//!   [`UvEditor`], polls for cancellation between faces and reports progress.
//!
//! [`build_lightmap_seams`] does both against a live host.
//!
//! # Example
//!
//! ```
//! use lightmap_uv::prelude::*;
//! use lightmap_uv::algo::seams::{build_lightmap_seams, SeamOptions};
//! use nalgebra::Point3;
//!
//! // A flat quad split into two triangles
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mut mesh = build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap();
//! mesh.cut_all_uv_edges().unwrap();
//!
//! let report = build_lightmap_seams(&mut mesh, &SeamOptions::default()).unwrap();
//! assert_eq!(report.welded_pairs.len(), 2); // (0, 1) and (1, 0)
//! assert_eq!(mesh.uv_islands().unwrap().len(), 1);
//! ```

use std::collections::BTreeSet;

use rayon::prelude::*;

use super::adjacency::TopologySnapshot;
use super::progress::Progress;
use super::vecmath::{angle_between, within_tolerance};
use crate::config::{sanitize_tolerance, DEFAULT_TOLERANCE_DEGREES};
use crate::host::UvEditor;
use crate::mesh::FaceId;
use crate::error::Result;

/// Options for the seam pass.
#[derive(Debug, Clone)]
pub struct SeamOptions {
    /// Largest normal angle (exclusive), in degrees, that still gets welded.
    pub tolerance_degrees: f64,

    /// Whether to capture topology and plan decisions on the rayon pool.
    pub parallel: bool,
}

impl Default for SeamOptions {
    fn default() -> Self {
        Self {
            tolerance_degrees: DEFAULT_TOLERANCE_DEGREES,
            parallel: true,
        }
    }
}

impl SeamOptions {
    /// Set the weld tolerance in degrees.
    ///
    /// Negative or non-finite values fall back to the default.
    pub fn with_tolerance(mut self, tolerance_degrees: f64) -> Self {
        self.tolerance_degrees = sanitize_tolerance(tolerance_degrees);
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Outcome for one (face, neighbor) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PairOutcome {
    /// Normals are within tolerance; weld the shared UV boundary.
    Weld {
        /// Angle between the normals, in degrees.
        angle: f64,
    },
    /// Normals differ by the tolerance or more; keep the seam.
    Seam {
        /// Angle between the normals, in degrees.
        angle: f64,
    },
    /// One of the normals has zero length; keep the seam.
    Degenerate,
}

impl PairOutcome {
    /// Whether this outcome welds.
    #[inline]
    pub fn is_weld(&self) -> bool {
        matches!(self, PairOutcome::Weld { .. })
    }
}

/// Decision for one face against one neighbor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairDecision {
    /// The neighbor face.
    pub neighbor: FaceId,
    /// What to do with the shared boundary.
    pub outcome: PairOutcome,
}

/// All decisions made from one face's point of view.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceDecision {
    /// The face being visited.
    pub face: FaceId,
    /// One entry per neighbor, ascending by neighbor id.
    pub pairs: Vec<PairDecision>,
}

/// Decide every neighbor of one face.
pub fn decide_face(snapshot: &TopologySnapshot, face: FaceId, tolerance_degrees: f64) -> FaceDecision {
    let normal = snapshot.normal(face);
    let pairs = snapshot
        .neighbors(face)
        .iter()
        .map(|&neighbor| {
            let outcome = match angle_between(normal, snapshot.normal(neighbor)) {
                Ok(angle) if within_tolerance(angle, tolerance_degrees) => PairOutcome::Weld { angle },
                Ok(angle) => PairOutcome::Seam { angle },
                Err(_) => PairOutcome::Degenerate,
            };
            PairDecision { neighbor, outcome }
        })
        .collect();
    FaceDecision { face, pairs }
}

/// Weld/seam decisions for every face, in ascending face order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeamPlan {
    /// One entry per face.
    pub faces: Vec<FaceDecision>,
}

impl SeamPlan {
    /// Unordered welded pairs, each as `(low, high)`.
    pub fn welded_pairs(&self) -> BTreeSet<(FaceId, FaceId)> {
        self.faces
            .iter()
            .flat_map(|d| {
                d.pairs
                    .iter()
                    .filter(|p| p.outcome.is_weld())
                    .map(move |p| ordered_pair(d.face, p.neighbor))
            })
            .collect()
    }
}

/// Compute the decisions for every face of a snapshot.
///
/// Pure: the snapshot is not modified and no host is touched. The result
/// does not depend on `parallel`.
pub fn plan_seams(snapshot: &TopologySnapshot, tolerance_degrees: f64, parallel: bool) -> SeamPlan {
    let decide = |i: usize| decide_face(snapshot, FaceId::new(i), tolerance_degrees);
    let faces = if parallel {
        (0..snapshot.face_count()).into_par_iter().map(decide).collect()
    } else {
        (0..snapshot.face_count()).map(decide).collect()
    };
    SeamPlan { faces }
}

/// What a seam pass did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeamReport {
    /// Faces in the mesh.
    pub total_faces: usize,
    /// Faces fully visited before the pass ended.
    pub faces_processed: usize,
    /// (face, neighbor) pairs evaluated.
    pub pairs_evaluated: usize,
    /// Every weld issued, in evaluation order, as `(face, neighbor)`.
    pub welded_pairs: Vec<(FaceId, FaceId)>,
    /// Welds that actually changed UV connectivity.
    pub sews_applied: usize,
    /// Pairs left as seams because a normal had zero length.
    pub degenerate_pairs: usize,
    /// Whether the pass stopped early on request.
    pub cancelled: bool,
}

impl SeamReport {
    /// Unordered welded pairs, each as `(low, high)`.
    pub fn welded_pair_set(&self) -> BTreeSet<(FaceId, FaceId)> {
        self.welded_pairs
            .iter()
            .map(|&(a, b)| ordered_pair(a, b))
            .collect()
    }
}

/// Issue the welds of a plan to a host, face by face.
///
/// Cancellation is checked before each face; on cancellation the welds
/// already issued stay in place and the report has `cancelled` set. Progress
/// is reported after each face as `(faces done, total faces)`.
///
/// # Errors
///
/// Errors from [`UvEditor::sew_faces`] abort the pass; earlier welds persist.
pub fn apply_seam_plan<M>(mesh: &mut M, plan: &SeamPlan, progress: &Progress) -> Result<SeamReport>
where
    M: UvEditor + ?Sized,
{
    let total = plan.faces.len();
    let mut report = SeamReport {
        total_faces: total,
        ..SeamReport::default()
    };

    for (i, decision) in plan.faces.iter().enumerate() {
        if progress.is_cancelled() {
            log::info!("seam pass cancelled after {} of {} faces", i, total);
            report.cancelled = true;
            break;
        }

        for pair in &decision.pairs {
            report.pairs_evaluated += 1;
            match pair.outcome {
                PairOutcome::Weld { .. } => {
                    if mesh.sew_faces(decision.face, pair.neighbor)? {
                        report.sews_applied += 1;
                    }
                    report.welded_pairs.push((decision.face, pair.neighbor));
                }
                PairOutcome::Seam { .. } => {}
                PairOutcome::Degenerate => {
                    log::warn!(
                        "zero-length normal between faces {} and {}; leaving seam",
                        decision.face,
                        pair.neighbor
                    );
                    report.degenerate_pairs += 1;
                }
            }
        }

        report.faces_processed = i + 1;
        progress.report(i + 1, total, "Sewing faces");
    }

    Ok(report)
}

/// Run the seam pass against a host whose active UV set is fully cut.
pub fn build_lightmap_seams<M>(mesh: &mut M, options: &SeamOptions) -> Result<SeamReport>
where
    M: UvEditor + Sync + ?Sized,
{
    build_lightmap_seams_with_progress(mesh, options, &Progress::none())
}

/// Run the seam pass with progress reporting and cancellation.
pub fn build_lightmap_seams_with_progress<M>(
    mesh: &mut M,
    options: &SeamOptions,
    progress: &Progress,
) -> Result<SeamReport>
where
    M: UvEditor + Sync + ?Sized,
{
    let tolerance_degrees = sanitize_tolerance(options.tolerance_degrees);
    let snapshot = TopologySnapshot::capture(&*mesh, options.parallel);
    log::debug!(
        "seam pass over {} faces, {} edges, {} neighbor pairs (tolerance {}°)",
        snapshot.face_count(),
        snapshot.edge_count(),
        snapshot.num_directed_pairs(),
        tolerance_degrees
    );

    let plan = plan_seams(&snapshot, tolerance_degrees, options.parallel);
    let report = apply_seam_plan(mesh, &plan, progress)?;

    log::info!(
        "seam pass: {} faces, {} welds ({} changed UVs), {} degenerate pairs",
        report.faces_processed,
        report.welded_pairs.len(),
        report.sews_applied,
        report.degenerate_pairs
    );
    Ok(report)
}

#[inline]
fn ordered_pair(a: FaceId, b: FaceId) -> (FaceId, FaceId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::pack::PackOptions;
    use crate::algo::progress::CancelToken;
    use crate::algo::unfold::UnfoldOptions;
    use crate::host::MeshTopology;
    use crate::mesh::{build_from_triangles, PolyMesh};
    use nalgebra::{Point3, Vector3};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Synthetic host: explicit normals and adjacency, welds recorded as
    /// islands through a tiny union-find.
    #[derive(Clone)]
    struct Synthetic {
        normals: Vec<Vector3<f64>>,
        adjacency: Vec<Vec<usize>>,
        island: Vec<usize>,
        sew_calls: Vec<(usize, usize)>,
    }

    impl Synthetic {
        fn new(normals: Vec<Vector3<f64>>, adjacency: Vec<Vec<usize>>) -> Self {
            let n = normals.len();
            Self {
                normals,
                adjacency,
                island: (0..n).collect(),
                sew_calls: Vec::new(),
            }
        }

        fn root(&self, mut i: usize) -> usize {
            while self.island[i] != i {
                i = self.island[i];
            }
            i
        }

        fn island_count(&self) -> usize {
            (0..self.normals.len()).filter(|&i| self.root(i) == i).count()
        }
    }

    impl MeshTopology for Synthetic {
        fn face_count(&self) -> usize {
            self.normals.len()
        }
        fn edge_count(&self) -> usize {
            self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
        }
        fn face_normal(&self, face: FaceId) -> Vector3<f64> {
            self.normals[face.index()]
        }
        fn adjacent_faces(&self, face: FaceId) -> Vec<FaceId> {
            self.adjacency[face.index()].iter().map(|&j| FaceId::new(j)).collect()
        }
    }

    impl UvEditor for Synthetic {
        fn has_uv_set(&self, _name: &str) -> bool {
            true
        }
        fn delete_uv_set(&mut self, _name: &str) -> Result<()> {
            Ok(())
        }
        fn duplicate_active_uv_set(&mut self, _name: &str) -> Result<()> {
            Ok(())
        }
        fn set_active_uv_set(&mut self, _name: &str) -> Result<()> {
            Ok(())
        }
        fn cut_all_uv_edges(&mut self) -> Result<()> {
            self.island = (0..self.normals.len()).collect();
            Ok(())
        }
        fn sew_faces(&mut self, a: FaceId, b: FaceId) -> Result<bool> {
            self.sew_calls.push((a.index(), b.index()));
            let (ra, rb) = (self.root(a.index()), self.root(b.index()));
            if ra == rb {
                return Ok(false);
            }
            self.island[ra.max(rb)] = ra.min(rb);
            Ok(true)
        }
        fn unfold(&mut self, _options: &UnfoldOptions) -> Result<()> {
            Ok(())
        }
        fn layout(&mut self, _options: &PackOptions) -> Result<()> {
            Ok(())
        }
    }

    fn up() -> Vector3<f64> {
        Vector3::new(0.0, 0.0, 1.0)
    }

    /// Unit vector `degrees` away from +Z, tilted toward +X.
    fn tilted(degrees: f64) -> Vector3<f64> {
        let r = degrees.to_radians();
        Vector3::new(r.sin(), 0.0, r.cos())
    }

    /// A strip of faces, each adjacent to the next.
    fn strip(normals: Vec<Vector3<f64>>) -> Synthetic {
        let n = normals.len();
        let adjacency = (0..n)
            .map(|i| {
                let mut adj = Vec::new();
                if i > 0 {
                    adj.push(i - 1);
                }
                if i + 1 < n {
                    adj.push(i + 1);
                }
                adj
            })
            .collect();
        Synthetic::new(normals, adjacency)
    }

    #[test]
    fn test_identical_normals_weld() {
        let mut host = strip(vec![up(), up()]);
        let report = build_lightmap_seams(&mut host, &SeamOptions::default()).unwrap();
        assert_eq!(host.island_count(), 1);
        assert_eq!(report.sews_applied, 1);
        assert_eq!(report.welded_pair_set().len(), 1);
    }

    #[test]
    fn test_perpendicular_normals_keep_seam() {
        let mut host = strip(vec![up(), Vector3::new(1.0, 0.0, 0.0)]);
        let report = build_lightmap_seams(&mut host, &SeamOptions::default()).unwrap();
        assert_eq!(host.island_count(), 2);
        assert!(report.welded_pairs.is_empty());
        assert!(host.sew_calls.is_empty());
    }

    #[test]
    fn test_angle_at_tolerance_is_not_welded() {
        // Exactly 90 degrees apart: representable without rounding error.
        let snapshot =
            TopologySnapshot::capture(&strip(vec![up(), Vector3::new(1.0, 0.0, 0.0)]), false);
        let plan = plan_seams(&snapshot, 90.0, false);
        assert!(plan.welded_pairs().is_empty());
        assert_eq!(plan.faces[0].pairs[0].outcome, PairOutcome::Seam { angle: 90.0 });

        // Anything above the angle welds
        let plan = plan_seams(&snapshot, 90.000001, false);
        assert_eq!(plan.welded_pairs().len(), 1);
    }

    #[test]
    fn test_tolerance_threshold() {
        let host = strip(vec![up(), tilted(3.0), tilted(9.0)]);
        let snapshot = TopologySnapshot::capture(&host, false);

        let pairs = plan_seams(&snapshot, 5.0, false).welded_pairs();
        assert_eq!(pairs.len(), 1);
        assert!(pairs.contains(&(FaceId::new(0), FaceId::new(1))));

        // 3 -> 9 degrees is 6 apart: welded only once tolerance exceeds 6
        assert_eq!(plan_seams(&snapshot, 7.0, false).welded_pairs().len(), 2);
        assert!(plan_seams(&snapshot, 0.0, false).welded_pairs().is_empty());
    }

    #[test]
    fn test_zero_normal_is_skipped() {
        let mut host = strip(vec![up(), Vector3::zeros(), up()]);
        let report = build_lightmap_seams(&mut host, &SeamOptions::default()).unwrap();
        assert_eq!(report.degenerate_pairs, 4);
        assert_eq!(report.faces_processed, 3);
        assert_eq!(host.island_count(), 3);
    }

    #[test]
    fn test_invalid_tolerance_falls_back_to_default() {
        assert_eq!(
            SeamOptions::default().with_tolerance(f64::NAN).tolerance_degrees,
            DEFAULT_TOLERANCE_DEGREES
        );

        // Fields set directly are checked at the start of the pass
        let options = SeamOptions {
            tolerance_degrees: -1.0,
            parallel: false,
        };
        let mut host = strip(vec![up(), tilted(3.0)]);
        let report = build_lightmap_seams(&mut host, &options).unwrap();
        assert_eq!(report.sews_applied, 1);
        assert_eq!(host.island_count(), 1);
    }

    #[test]
    fn test_tiny_identical_normals_weld() {
        let tiny = up() * 1e-13;
        let mut host = strip(vec![tiny, tiny, tiny]);
        let report = build_lightmap_seams(&mut host, &SeamOptions::default()).unwrap();
        assert_eq!(report.degenerate_pairs, 0);
        assert_eq!(host.island_count(), 1);
    }

    #[test]
    fn test_seam_pass_is_deterministic() {
        let normals: Vec<Vector3<f64>> = (0..40).map(|i| tilted((i % 7) as f64 * 2.0)).collect();
        let host = strip(normals);

        let mut first = host.clone();
        let mut second = host.clone();
        let a = build_lightmap_seams(&mut first, &SeamOptions::default()).unwrap();
        let b = build_lightmap_seams(&mut second, &SeamOptions::default().sequential()).unwrap();
        assert_eq!(a.welded_pair_set(), b.welded_pair_set());
        assert_eq!(a, b);
        assert_eq!(first.sew_calls, second.sew_calls);
        assert_eq!(first.island_count(), second.island_count());
    }

    #[test]
    fn test_pair_visited_from_both_sides() {
        let mut host = strip(vec![up(), up()]);
        let report = build_lightmap_seams(&mut host, &SeamOptions::default()).unwrap();
        assert_eq!(
            report.welded_pairs,
            vec![(FaceId::new(0), FaceId::new(1)), (FaceId::new(1), FaceId::new(0))]
        );
        assert_eq!(host.sew_calls, vec![(0, 1), (1, 0)]);
        assert_eq!(report.sews_applied, 1);
    }

    #[test]
    fn test_plan_is_deterministic() {
        let normals: Vec<Vector3<f64>> = (0..40).map(|i| tilted((i % 7) as f64 * 2.0)).collect();
        let host = strip(normals);
        let snapshot = TopologySnapshot::capture(&host, true);

        let a = plan_seams(&snapshot, 5.0, true);
        let b = plan_seams(&snapshot, 5.0, false);
        let c = plan_seams(&TopologySnapshot::capture(&host, false), 5.0, true);
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_cancellation_yields_prefix_of_full_run() {
        let normals: Vec<Vector3<f64>> = (0..12).map(|i| tilted((i % 3) as f64)).collect();

        let mut full_host = strip(normals.clone());
        let full = build_lightmap_seams(&mut full_host, &SeamOptions::default()).unwrap();
        assert!(!full.cancelled);

        let token = CancelToken::new();
        let trip = token.clone();
        let progress = Progress::new(move |current, _, _| {
            if current == 5 {
                trip.cancel();
            }
        })
        .with_cancel(token);

        let mut partial_host = strip(normals);
        let partial =
            build_lightmap_seams_with_progress(&mut partial_host, &SeamOptions::default(), &progress)
                .unwrap();

        assert!(partial.cancelled);
        assert_eq!(partial.faces_processed, 5);
        let prefix: Vec<(FaceId, FaceId)> = full
            .welded_pairs
            .iter()
            .copied()
            .filter(|(f, _)| f.index() < 5)
            .collect();
        assert_eq!(partial.welded_pairs, prefix);
    }

    #[test]
    fn test_cancelled_before_start_does_nothing() {
        let token = CancelToken::new();
        token.cancel();
        let progress = Progress::none().with_cancel(token);

        let mut host = strip(vec![up(), up(), up()]);
        let report =
            build_lightmap_seams_with_progress(&mut host, &SeamOptions::default(), &progress).unwrap();
        assert!(report.cancelled);
        assert_eq!(report.faces_processed, 0);
        assert_eq!(host.island_count(), 3);
    }

    #[test]
    fn test_progress_counts_every_face() {
        let reports = Arc::new(AtomicUsize::new(0));
        let seen = reports.clone();
        let progress = Progress::new(move |current, total, _| {
            assert_eq!(total, 4);
            assert!(current >= 1 && current <= total);
            seen.fetch_add(1, Ordering::Relaxed);
        });

        let mut host = strip(vec![up(); 4]);
        build_lightmap_seams_with_progress(&mut host, &SeamOptions::default().sequential(), &progress)
            .unwrap();
        assert_eq!(reports.load(Ordering::Relaxed), 4);
    }

    #[test]
    fn test_empty_mesh_is_noop() {
        let mut host = strip(Vec::new());
        let report = build_lightmap_seams(&mut host, &SeamOptions::default()).unwrap();
        assert_eq!(report, SeamReport::default());
    }

    #[test]
    fn test_polymesh_hinge() {
        // Two faces sharing edge (0, 1); face 1 can be flat or folded to +X.
        let flat = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(-1.0, 0.5, 0.0),
        ];
        let mut folded = flat.clone();
        folded[3] = Point3::new(0.0, 0.5, 1.0);
        let faces = [[0, 2, 1], [0, 1, 3]];

        let mut mesh: PolyMesh = build_from_triangles(&flat, &faces).unwrap();
        mesh.cut_all_uv_edges().unwrap();
        build_lightmap_seams(&mut mesh, &SeamOptions::default()).unwrap();
        assert_eq!(mesh.uv_islands().unwrap().len(), 1);

        let mut mesh: PolyMesh = build_from_triangles(&folded, &faces).unwrap();
        mesh.cut_all_uv_edges().unwrap();
        build_lightmap_seams(&mut mesh, &SeamOptions::default()).unwrap();
        assert_eq!(mesh.uv_islands().unwrap().len(), 2);
    }
}
