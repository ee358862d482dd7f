//! STL (stereolithography) format support.
//!
//! Loading only, binary or ASCII. STL repeats every corner position per
//! triangle; identical positions are welded back into shared vertices so the
//! mesh has 3D adjacency. STL carries no texture coordinates, so `map1` gets
//! one UV per vertex.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use nalgebra::Point3;

use crate::error::{LightmapError, Result};
use crate::mesh::{build_from_triangles, PolyMesh};

/// Load a mesh from an STL file.
///
/// Triangles that collapse after welding are dropped.
///
/// # Example
///
/// ```no_run
/// use lightmap_uv::io::stl;
///
/// let mesh = stl::load("model.stl").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<PolyMesh> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let stl = stl_io::read_stl(&mut file).map_err(|e| LightmapError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let positions: Vec<[f32; 3]> = stl
        .vertices
        .iter()
        .map(|v| [v[0], v[1], v[2]])
        .collect();
    let (vertices, faces) = weld_triangles(&positions, stl.faces.iter().map(|f| f.vertices));

    if faces.is_empty() {
        return Err(LightmapError::LoadError {
            path: path.to_path_buf(),
            message: "STL file contains no valid triangles".to_string(),
        });
    }

    log::debug!(
        "parsed STL: {} triangles, {} welded vertices",
        faces.len(),
        vertices.len()
    );
    build_from_triangles(&vertices, &faces)
}

/// Merge bit-identical positions and drop triangles that lose a corner.
fn weld_triangles<T>(positions: &[[f32; 3]], triangles: T) -> (Vec<Point3<f64>>, Vec<[usize; 3]>)
where
    T: Iterator<Item = [usize; 3]>,
{
    let mut vertices: Vec<Point3<f64>> = Vec::new();
    let mut lookup: HashMap<[u32; 3], usize> = HashMap::new();
    let mut faces = Vec::new();

    let mut weld = |p: [f32; 3]| {
        // -0.0 and 0.0 are the same point
        let key = p.map(|c| if c == 0.0 { 0 } else { c.to_bits() });
        *lookup.entry(key).or_insert_with(|| {
            vertices.push(Point3::new(p[0] as f64, p[1] as f64, p[2] as f64));
            vertices.len() - 1
        })
    };

    for tri in triangles {
        let [a, b, c] = tri.map(|i| weld(positions[i]));
        if a != b && b != c && a != c {
            faces.push([a, b, c]);
        }
    }
    (vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weld_shares_vertices() {
        // Two triangles of a quad, each with its own copy of the diagonal
        let positions = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [-0.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        let (vertices, faces) = weld_triangles(&positions, [[0, 1, 2], [3, 4, 5]].into_iter());
        assert_eq!(vertices.len(), 4);
        assert_eq!(faces, vec![[0, 1, 2], [0, 2, 3]]);

        let mesh = build_from_triangles(&vertices, &faces).unwrap();
        assert_eq!(mesh.num_edges(), 5);
    }

    #[test]
    fn test_weld_drops_collapsed_triangles() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let (_, faces) = weld_triangles(&positions, [[0, 1, 2]].into_iter());
        assert!(faces.is_empty());
    }
}
