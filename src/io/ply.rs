//! PLY (Stanford polygon) format support.
//!
//! Loading only: faces keep their polygon size, and per-vertex texture
//! coordinates (`u`/`v`, `s`/`t` or `texture_u`/`texture_v`) become the
//! `map1` UV set when every vertex has them.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use nalgebra::{Point2, Point3};
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{LightmapError, Result};
use crate::mesh::{build_with_uvs, PolyMesh, UvInput};

const UV_PROPERTY_NAMES: [(&str, &str); 3] = [("u", "v"), ("s", "t"), ("texture_u", "texture_v")];

/// Load a mesh from a PLY file (ASCII or binary).
///
/// # Example
///
/// ```no_run
/// use lightmap_uv::io::ply;
///
/// let mesh = ply::load("model.ply").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<PolyMesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let load_error = |message: &str| LightmapError::LoadError {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| load_error(&e.to_string()))?;

    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| load_error("PLY file has no vertex element"))?;

    let mut vertices: Vec<Point3<f64>> = Vec::with_capacity(vertex_element.len());
    let mut tex_coords: Vec<Point2<f64>> = Vec::new();
    for vertex in vertex_element {
        let coord = |name: &str| get_float_property(vertex, name);
        match (coord("x"), coord("y"), coord("z")) {
            (Some(x), Some(y), Some(z)) => vertices.push(Point3::new(x, y, z)),
            _ => return Err(load_error("vertex missing a coordinate")),
        }
        if let Some(uv) = UV_PROPERTY_NAMES
            .iter()
            .find_map(|&(u, v)| Some(Point2::new(coord(u)?, coord(v)?)))
        {
            tex_coords.push(uv);
        }
    }

    let face_element = ply
        .payload
        .get("face")
        .ok_or_else(|| load_error("PLY file has no face element"))?;

    let mut faces: Vec<Vec<usize>> = Vec::with_capacity(face_element.len());
    for face in face_element {
        let indices = get_list_property(face, "vertex_indices")
            .or_else(|| get_list_property(face, "vertex_index"))
            .ok_or_else(|| load_error("face missing vertex_indices property"))?;
        faces.push(indices);
    }

    let uv_input = (!tex_coords.is_empty() && tex_coords.len() == vertices.len()).then(|| UvInput {
        coords: tex_coords,
        face_uvs: faces.clone(),
    });

    log::debug!(
        "parsed PLY: {} vertices, {} faces{}",
        vertices.len(),
        faces.len(),
        if uv_input.is_some() { ", with UVs" } else { "" }
    );
    build_with_uvs(&vertices, &faces, uv_input.as_ref())
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

fn get_list_property(element: &DefaultElement, name: &str) -> Option<Vec<usize>> {
    match element.get(name)? {
        Property::ListInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        _ => None,
    }
}
