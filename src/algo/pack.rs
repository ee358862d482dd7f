//! Reference UV island packer.
//!
//! Shelf packing: islands keep their relative size, are sorted tallest
//! first and placed left to right on rows inside a square whose side comes
//! from the total island area. A gap of `spacing_percent` percent of that
//! side separates islands from each other and from the border. The finished
//! layout is scaled uniformly into the unit square.

use nalgebra::{Point2, Vector2};

use crate::error::{LightmapError, Result};
use crate::mesh::{PolyMesh, UvId, UvSet};

/// Options for the packer.
#[derive(Debug, Clone)]
pub struct PackOptions {
    /// Gap around each island, in percent of the layout side.
    pub spacing_percent: f64,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            spacing_percent: 0.4,
        }
    }
}

impl PackOptions {
    /// Options with the given spacing.
    pub fn with_spacing_percent(spacing_percent: f64) -> Self {
        Self { spacing_percent }
    }
}

/// Statistics from one packing run.
#[derive(Debug, Clone, Default)]
pub struct PackStats {
    /// Islands placed.
    pub islands: usize,
    /// Shelf rows used.
    pub rows: usize,
    /// Scale applied from island units to UV space.
    pub scale: f64,
}

/// Axis-aligned extent of one island in its current UV coordinates.
struct IslandBounds {
    uvs: Vec<usize>,
    min: Point2<f64>,
    max: Point2<f64>,
}

impl IslandBounds {
    fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// Pack the islands of a compacted UV set of `mesh` into `[0, 1]²`.
///
/// Returns new coordinates indexed by UV id.
///
/// # Errors
///
/// - [`LightmapError::InvalidParameter`] if the spacing is negative, not
///   finite, or leaves no room (50% or more).
/// - [`LightmapError::PackFailed`] if the islands have no extent at all.
pub fn pack(mesh: &PolyMesh, uv_set: &UvSet, options: &PackOptions) -> Result<(Vec<Point2<f64>>, PackStats)> {
    debug_assert!(uv_set.is_compact());

    let spacing = options.spacing_percent;
    if !spacing.is_finite() || !(0.0..50.0).contains(&spacing) {
        return Err(LightmapError::invalid_param(
            "spacing_percent",
            spacing,
            "must be in [0, 50)",
        ));
    }

    let num_uvs = uv_set.len();
    let mut coords: Vec<Point2<f64>> = (0..num_uvs)
        .map(|i| uv_set.uv(UvId::new(i)))
        .collect();

    let mut bounds: Vec<IslandBounds> = Vec::new();
    let mut claimed = vec![false; num_uvs];
    for faces in uv_set.islands(mesh.face_offsets()) {
        let mut uvs = Vec::new();
        for f in faces {
            for c in mesh.face_corners(f) {
                let uv = uv_set.corner_uv(c).index();
                if !claimed[uv] {
                    claimed[uv] = true;
                    uvs.push(uv);
                }
            }
        }
        let mut min = coords[uvs[0]];
        let mut max = min;
        for &uv in &uvs {
            min = min.inf(&coords[uv]);
            max = max.sup(&coords[uv]);
        }
        bounds.push(IslandBounds { uvs, min, max });
    }

    if bounds.is_empty() {
        return Ok((coords, PackStats::default()));
    }

    let total_area: f64 = bounds.iter().map(|b| b.width() * b.height()).sum();
    let widest = bounds.iter().map(IslandBounds::width).fold(0.0, f64::max);
    let base = total_area.sqrt().max(widest);
    let gap = base * spacing / 100.0;
    let side = base.max(widest + 2.0 * gap);

    // Tallest first; ties keep island order
    let mut order: Vec<usize> = (0..bounds.len()).collect();
    order.sort_by(|&a, &b| {
        bounds[b]
            .height()
            .partial_cmp(&bounds[a].height())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut offsets = vec![Vector2::zeros(); bounds.len()];
    let mut cursor = Vector2::new(gap, gap);
    let mut row_height: f64 = 0.0;
    let mut used_width: f64 = 0.0;
    let mut rows = 1;

    for &i in &order {
        let island = &bounds[i];
        if cursor.x + island.width() + gap > side && cursor.x > gap {
            cursor.y += row_height + gap;
            cursor.x = gap;
            row_height = 0.0;
            rows += 1;
        }
        offsets[i] = cursor - island.min.coords;
        cursor.x += island.width() + gap;
        used_width = used_width.max(cursor.x);
        row_height = row_height.max(island.height());
    }
    let used_height = cursor.y + row_height + gap;

    let extent = used_width.max(used_height);
    if !(extent > 1e-12) || !extent.is_finite() {
        return Err(LightmapError::PackFailed {
            reason: "islands have no extent".to_string(),
        });
    }
    let scale = 1.0 / extent;

    for (island, offset) in bounds.iter().zip(&offsets) {
        for &uv in &island.uvs {
            coords[uv] = Point2::from((coords[uv].coords + offset) * scale);
        }
    }

    Ok((
        coords,
        PackStats {
            islands: bounds.len(),
            rows,
            scale,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::unfold::UnfoldOptions;
    use crate::mesh::build_from_quads;
    use nalgebra::Point3;

    /// Unit cube with every UV edge cut and each face unfolded.
    fn cut_cube() -> PolyMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let faces = [
            [0, 3, 2, 1],
            [4, 5, 6, 7],
            [0, 1, 5, 4],
            [1, 2, 6, 5],
            [2, 3, 7, 6],
            [3, 0, 4, 7],
        ];
        let mut mesh = build_from_quads(&vertices, &faces).unwrap();
        mesh.cut_all_uv_edges().unwrap();
        mesh.unfold_uvs(&UnfoldOptions::default()).unwrap();
        mesh
    }

    fn island_boxes(mesh: &PolyMesh) -> Vec<(Point2<f64>, Point2<f64>)> {
        let set = mesh.active_uv_set().unwrap();
        mesh.uv_islands()
            .unwrap()
            .iter()
            .map(|faces| {
                let mut min = Point2::new(f64::MAX, f64::MAX);
                let mut max = Point2::new(f64::MIN, f64::MIN);
                for &f in faces {
                    for c in mesh.face_corners(f) {
                        let p = set.corner_coord(c);
                        min = min.inf(&p);
                        max = max.sup(&p);
                    }
                }
                (min, max)
            })
            .collect()
    }

    #[test]
    fn test_islands_fit_unit_square_without_overlap() {
        let mut mesh = cut_cube();
        let stats = mesh.layout_uvs(&PackOptions::with_spacing_percent(3.2)).unwrap();
        assert_eq!(stats.islands, 6);

        let boxes = island_boxes(&mesh);
        for (min, max) in &boxes {
            assert!(min.x >= -1e-12 && min.y >= -1e-12);
            assert!(max.x <= 1.0 + 1e-12 && max.y <= 1.0 + 1e-12);
        }
        for i in 0..boxes.len() {
            for j in i + 1..boxes.len() {
                let (a, b) = (&boxes[i], &boxes[j]);
                let overlap = a.0.x < b.1.x && b.0.x < a.1.x && a.0.y < b.1.y && b.0.y < a.1.y;
                assert!(!overlap, "islands {} and {} overlap", i, j);
            }
        }
    }

    #[test]
    fn test_islands_keep_relative_size() {
        let mut mesh = cut_cube();
        mesh.layout_uvs(&PackOptions::with_spacing_percent(0.4)).unwrap();
        let boxes = island_boxes(&mesh);
        let w0 = boxes[0].1.x - boxes[0].0.x;
        for (min, max) in &boxes {
            assert!(((max.x - min.x) - w0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_wider_spacing_shrinks_islands() {
        let mut tight = cut_cube();
        let tight_stats = tight.layout_uvs(&PackOptions::with_spacing_percent(0.05)).unwrap();
        let mut loose = cut_cube();
        let loose_stats = loose.layout_uvs(&PackOptions::with_spacing_percent(3.2)).unwrap();
        assert!(loose_stats.scale < tight_stats.scale);
    }

    #[test]
    fn test_invalid_spacing() {
        let mut mesh = cut_cube();
        assert!(mesh.layout_uvs(&PackOptions::with_spacing_percent(-1.0)).is_err());
        assert!(mesh.layout_uvs(&PackOptions::with_spacing_percent(f64::NAN)).is_err());
        assert!(mesh.layout_uvs(&PackOptions::with_spacing_percent(50.0)).is_err());
    }

    #[test]
    fn test_empty_mesh() {
        let mut mesh = PolyMesh::new();
        let stats = mesh.layout_uvs(&PackOptions::default()).unwrap();
        assert_eq!(stats.islands, 0);
    }
}
