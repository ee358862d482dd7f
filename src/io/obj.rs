//! Wavefront OBJ format support.
//!
//! Reads `v`, `vt` and `f` records; faces keep their polygon size. Face
//! corners may be written as `v`, `v/vt`, `v//vn` or `v/vt/vn`, with 1-based
//! or negative (relative) indices. Texture coordinates become the `map1` UV
//! set when every face carries them. Normals, groups and materials are
//! skipped.
//!
//! Saving writes positions, the active UV set and faces as `v/vt`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::{Point2, Point3};

use crate::error::{LightmapError, Result};
use crate::mesh::{build_with_uvs, PolyMesh, UvId, UvInput};

/// Load a mesh from an OBJ file.
///
/// # Example
///
/// ```no_run
/// use lightmap_uv::io::obj;
///
/// let mesh = obj::load("model.obj").unwrap();
/// println!("{} faces", mesh.num_faces());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<PolyMesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    read(BufReader::new(file)).map_err(|e| match e {
        LightmapError::LoadError { message, .. } => LightmapError::LoadError {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })
}

/// Parse OBJ data from a reader.
pub fn read<R: BufRead>(reader: R) -> Result<PolyMesh> {
    let mut positions: Vec<Point3<f64>> = Vec::new();
    let mut tex_coords: Vec<Point2<f64>> = Vec::new();
    let mut normal_count = 0usize;
    let mut faces: Vec<Vec<usize>> = Vec::new();
    let mut face_uvs: Vec<Option<Vec<usize>>> = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = line_no + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };
        let args: Vec<&str> = parts.collect();

        match keyword {
            "v" => {
                let [x, y, z] = parse_reals::<3>(&args, line_no)?;
                positions.push(Point3::new(x, y, z));
            }
            "vt" => {
                let [u, v] = parse_reals::<2>(&args, line_no)?;
                tex_coords.push(Point2::new(u, v));
            }
            "vn" => normal_count += 1,
            "f" => {
                if args.len() < 3 {
                    return Err(parse_error(line_no, "face needs at least 3 corners"));
                }
                let mut face = Vec::with_capacity(args.len());
                let mut uvs = Vec::with_capacity(args.len());
                for corner in &args {
                    let mut fields = corner.split('/');
                    let v = fields.next().unwrap_or("");
                    let vt = fields.next().filter(|s| !s.is_empty());
                    let vn = fields.next().filter(|s| !s.is_empty());

                    face.push(resolve_index(v, positions.len(), line_no)?);
                    if let Some(vt) = vt {
                        uvs.push(resolve_index(vt, tex_coords.len(), line_no)?);
                    }
                    if let Some(vn) = vn {
                        resolve_index(vn, normal_count, line_no)?;
                    }
                }
                faces.push(face);
                face_uvs.push((uvs.len() == args.len()).then_some(uvs));
            }
            _ => {}
        }
    }

    let with_uvs = face_uvs.iter().filter(|uvs| uvs.is_some()).count();
    let uv_input = if with_uvs > 0 && with_uvs == faces.len() {
        Some(UvInput {
            coords: tex_coords,
            face_uvs: face_uvs.into_iter().flatten().collect(),
        })
    } else {
        if with_uvs > 0 {
            log::warn!(
                "only {} of {} faces have texture coordinates; ignoring them",
                with_uvs,
                faces.len()
            );
        }
        None
    };

    log::debug!(
        "parsed OBJ: {} vertices, {} faces{}",
        positions.len(),
        faces.len(),
        if uv_input.is_some() { ", with UVs" } else { "" }
    );
    build_with_uvs(&positions, &faces, uv_input.as_ref())
}

/// Save a mesh to an OBJ file, with the active UV set as `vt`.
///
/// # Example
///
/// ```no_run
/// use lightmap_uv::io::obj;
/// use lightmap_uv::mesh::PolyMesh;
///
/// let mesh = PolyMesh::new();
/// obj::save(&mesh, "output.obj").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(mesh: &PolyMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a mesh as OBJ text.
pub fn write<W: Write>(mesh: &PolyMesh, writer: &mut W) -> Result<()> {
    writeln!(writer, "# written by lightmap-uv")?;

    for v in mesh.vertex_ids() {
        let p = mesh.position(v);
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
    }

    // Renumber resolved UV ids in order of first use
    let uv_set = mesh.active_uv_set().ok();
    let mut corner_vt = vec![0usize; mesh.num_corners()];
    if let Some(set) = uv_set {
        writeln!(writer, "# uv set: {}", set.name())?;
        let mut numbering: HashMap<UvId, usize> = HashMap::new();
        let mut order: Vec<UvId> = Vec::new();
        for (c, vt) in corner_vt.iter_mut().enumerate() {
            let uv = set.corner_uv(c);
            let next = numbering.len() + 1;
            *vt = *numbering.entry(uv).or_insert_with(|| {
                order.push(uv);
                next
            });
        }
        for uv in order {
            let p = set.uv(uv);
            writeln!(writer, "vt {} {}", p.x, p.y)?;
        }
    }

    for f in mesh.face_ids() {
        write!(writer, "f")?;
        for c in mesh.face_corners(f) {
            let v = mesh.corner_vertex(c).index() + 1;
            if uv_set.is_some() {
                write!(writer, " {}/{}", v, corner_vt[c])?;
            } else {
                write!(writer, " {}", v)?;
            }
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn parse_reals<const N: usize>(args: &[&str], line_no: usize) -> Result<[f64; N]> {
    if args.len() < N {
        return Err(parse_error(line_no, "too few components"));
    }
    let mut out = [0.0; N];
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = arg
            .parse()
            .map_err(|_| parse_error(line_no, &format!("invalid number '{}'", arg)))?;
    }
    Ok(out)
}

/// Turn a 1-based or negative OBJ index into a 0-based one.
fn resolve_index(token: &str, count: usize, line_no: usize) -> Result<usize> {
    let raw: i64 = token
        .parse()
        .map_err(|_| parse_error(line_no, &format!("invalid index '{}'", token)))?;
    let index = match raw {
        0 => None,
        r if r > 0 => Some(r as usize - 1),
        r => count.checked_sub(r.unsigned_abs() as usize),
    };
    index
        .filter(|&i| i < count)
        .ok_or_else(|| parse_error(line_no, &format!("index {} out of range", raw)))
}

fn parse_error(line_no: usize, message: &str) -> LightmapError {
    LightmapError::LoadError {
        path: Default::default(),
        message: format!("line {}: {}", line_no, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::lightmap::create_lightmap_uv;
    use crate::config::LightmapOptions;
    use crate::mesh::FaceId;

    #[test]
    fn test_read_polygons() {
        let data = "
            # square and triangle
            v 0 0 0
            v 1 0 0
            v 1 1 0
            v 0 1 0
            v 2 0.5 0
            f 1 2 3 4
            f 2 5 3
        ";
        let mesh = read(data.as_bytes()).unwrap();
        assert_eq!(mesh.num_vertices(), 5);
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_edges(), 6);
    }

    #[test]
    fn test_read_texture_coordinates() {
        let data = "
            v 0 0 0
            v 1 0 0
            v 1 1 0
            v 0 1 0
            vt 0 0
            vt 1 0
            vt 1 1
            vt 0 1
            vt 0.5 0.5
            vn 0 0 1
            f 1/1/1 2/2/1 3/3/1
            f 1/5/1 3/3/1 4/4/1
        ";
        let mesh = read(data.as_bytes()).unwrap();
        let set = mesh.active_uv_set().unwrap();
        assert_eq!(set.corner_coord(1), Point2::new(1.0, 0.0));
        // Vertex 0 has different vt in the two faces, so the faces share
        // only the UV at vertex 2 and still form one island.
        assert_ne!(set.corner_uv(0), set.corner_uv(3));
        assert_eq!(mesh.uv_islands().unwrap().len(), 1);
    }

    #[test]
    fn test_read_negative_and_normal_only_indices() {
        let data = "
            v 0 0 0
            v 1 0 0
            v 0 1 0
            vn 0 0 1
            f -3//1 -2//1 -1//1
        ";
        let mesh = read(data.as_bytes()).unwrap();
        assert_eq!(mesh.num_faces(), 1);
        let vertices: Vec<usize> = mesh
            .face_vertices(FaceId::new(0))
            .iter()
            .map(|v| v.index())
            .collect();
        assert_eq!(vertices, vec![0, 1, 2]);
    }

    #[test]
    fn test_partial_uvs_are_ignored() {
        let data = "
            v 0 0 0
            v 1 0 0
            v 1 1 0
            v 0 1 0
            vt 0 0
            vt 1 0
            vt 1 1
            f 1/1 2/2 3/3
            f 1 3 4
        ";
        let mesh = read(data.as_bytes()).unwrap();
        // Falls back to one UV per vertex
        assert_eq!(mesh.active_uv_set().unwrap().len(), 4);
    }

    #[test]
    fn test_read_errors() {
        assert!(read("v 0 0 0\nf 1 2 3\n".as_bytes()).is_err());
        assert!(read("v 0 0\n".as_bytes()).is_err());
        assert!(read("v 0 0 0\nv 1 0 0\nf 1 2\n".as_bytes()).is_err());
        assert!(read("v a b c\n".as_bytes()).is_err());
        assert!(read("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n".as_bytes()).is_err());
    }

    #[test]
    fn test_write_lightmap_set() {
        let data = "
            v 0 0 0
            v 1 0 0
            v 1 1 0
            v 0 1 0
            v 1 0 1
            v 1 1 1
            f 1 2 3 4
            f 2 5 6 3
        ";
        let mut mesh = read(data.as_bytes()).unwrap();
        create_lightmap_uv(Some(&mut mesh), &LightmapOptions::default()).unwrap();

        let mut out = Vec::new();
        write(&mesh, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("# uv set: lightmap"));
        // Folded pair: two islands of four UVs each
        assert_eq!(text.lines().filter(|l| l.starts_with("vt ")).count(), 8);
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 2);

        let reread = read(text.as_bytes()).unwrap();
        assert_eq!(reread.num_faces(), 2);
        assert_eq!(reread.uv_islands().unwrap().len(), 2);
    }
}
