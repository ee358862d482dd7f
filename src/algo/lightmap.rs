//! Lightmap UV driver.
//!
//! Sequences the host operations that turn a mesh's active UV set into a
//! lightmap layout:
//!
//! 1. optionally drop construction history
//! 2. delete any previous `lightmap` UV set
//! 3. copy the active set into a fresh `lightmap` set and activate it
//! 4. cut every UV edge
//! 5. weld neighbors with similar normals ([`seams`](super::seams))
//! 6. unfold
//! 7. pack, with spacing taken from the texture size
//!
//! The order matters: the seam pass assumes a fully cut baseline, and unfold
//! and pack must see its seams. A failing step aborts the run; whatever was
//! applied before stays in place.
//!
//! # Example
//!
//! ```
//! use lightmap_uv::prelude::*;
//! use lightmap_uv::algo::lightmap::{create_lightmap_uv, LIGHTMAP_UV_SET};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mut mesh = build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap();
//!
//! let options = LightmapOptions::default().with_texture_size(TextureSize::S1024);
//! let report = create_lightmap_uv(Some(&mut mesh), &options).unwrap().unwrap();
//!
//! assert_eq!(report.texel_density, 0.1);
//! assert_eq!(mesh.active_uv_set_name(), Some(LIGHTMAP_UV_SET));
//! assert_eq!(mesh.uv_islands().unwrap().len(), 1);
//! ```

use super::pack::PackOptions;
use super::progress::Progress;
use super::seams::{build_lightmap_seams_with_progress, SeamOptions, SeamReport};
use crate::config::{sanitize_tolerance, LightmapOptions, TextureSize};
use crate::error::Result;
use crate::host::UvEditor;

/// Name of the UV set the driver creates.
pub const LIGHTMAP_UV_SET: &str = "lightmap";

/// Summary of one lightmap run.
#[derive(Debug, Clone, PartialEq)]
pub struct LightmapReport {
    /// Outcome of the seam pass.
    pub seams: SeamReport,
    /// Tolerance the seam pass used, in degrees.
    pub tolerance_degrees: f64,
    /// Texture size the layout was made for.
    pub texture_size: TextureSize,
    /// Packing parameter handed to the host's layout.
    pub texel_density: f64,
}

/// Build a lightmap UV set on `mesh`.
///
/// `None` stands for "nothing selected" and returns `Ok(None)` without side
/// effects. A mesh without faces is also left untouched.
///
/// # Errors
///
/// Any host failure (missing active set, solver failure) is returned as is.
pub fn create_lightmap_uv<M>(mesh: Option<&mut M>, options: &LightmapOptions) -> Result<Option<LightmapReport>>
where
    M: UvEditor + Sync + ?Sized,
{
    create_lightmap_uv_with_progress(mesh, options, &Progress::none())
}

/// Build a lightmap UV set with progress reporting and cancellation.
///
/// Progress and cancellation apply to the seam pass. A cancelled pass keeps
/// the welds made so far and the run still unfolds and packs them, so the
/// mesh always ends with a valid layout.
pub fn create_lightmap_uv_with_progress<M>(
    mesh: Option<&mut M>,
    options: &LightmapOptions,
    progress: &Progress,
) -> Result<Option<LightmapReport>>
where
    M: UvEditor + Sync + ?Sized,
{
    let Some(mesh) = mesh else {
        log::info!("no mesh given; nothing to do");
        return Ok(None);
    };

    let tolerance_degrees = sanitize_tolerance(options.tolerance_degrees);
    let texture_size = options.texture_size;
    let texel_density = texture_size.texel_density();

    if mesh.face_count() == 0 {
        log::info!("mesh has no faces; nothing to do");
        return Ok(Some(LightmapReport {
            seams: SeamReport::default(),
            tolerance_degrees,
            texture_size,
            texel_density,
        }));
    }

    if options.delete_history {
        log::debug!("deleting history");
        mesh.delete_history()?;
    }

    if mesh.has_uv_set(LIGHTMAP_UV_SET) {
        log::debug!("removing previous '{}' UV set", LIGHTMAP_UV_SET);
        mesh.delete_uv_set(LIGHTMAP_UV_SET)?;
    }
    mesh.duplicate_active_uv_set(LIGHTMAP_UV_SET)?;
    mesh.set_active_uv_set(LIGHTMAP_UV_SET)?;

    log::debug!("cutting all UV edges");
    mesh.cut_all_uv_edges()?;

    let seam_options = SeamOptions::default()
        .with_tolerance(tolerance_degrees)
        .with_parallel(options.parallel);
    let seams = build_lightmap_seams_with_progress(&mut *mesh, &seam_options, progress)?;

    log::debug!(
        "unfolding (max {} iterations, stop at {})",
        options.unfold.max_iterations,
        options.unfold.stop_threshold
    );
    mesh.unfold(&options.unfold)?;

    log::debug!(
        "packing for {}px texture (spacing {}%)",
        texture_size,
        texel_density
    );
    mesh.layout(&PackOptions::with_spacing_percent(texel_density))?;

    log::info!(
        "lightmap UVs created: {} faces, {} welds{}",
        seams.total_faces,
        seams.welded_pairs.len(),
        if seams.cancelled { " (seam pass cancelled)" } else { "" }
    );

    Ok(Some(LightmapReport {
        seams,
        tolerance_degrees,
        texture_size,
        texel_density,
    }))
}
