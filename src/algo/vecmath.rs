//! Normal comparison helpers.
//!
//! Face normals coming from a host are directions, not necessarily unit
//! vectors, so every comparison divides by both lengths.

use nalgebra::Vector3;

use crate::error::{LightmapError, Result};

/// Euclidean length of a 3-component vector.
#[inline]
pub fn vector_length(v: &Vector3<f64>) -> f64 {
    (v.x * v.x + v.y * v.y + v.z * v.z).sqrt()
}

/// Angle between two directions, in degrees (`0..=180`).
///
/// The cosine is clamped to `[-1, 1]` before `acos`, so nearly parallel
/// vectors give `0` rather than `NaN`.
///
/// # Errors
///
/// [`LightmapError::ZeroLengthVector`] if either vector has zero or non-finite
/// length. Short vectors are fine: hosts may report area-weighted normals, so
/// a tiny face still has a direction.
///
/// # Example
///
/// ```
/// use lightmap_uv::algo::vecmath::angle_between;
/// use nalgebra::Vector3;
///
/// let up = Vector3::new(0.0, 0.0, 2.0);
/// let side = Vector3::new(1.0, 0.0, 0.0);
/// assert!((angle_between(&up, &side).unwrap() - 90.0).abs() < 1e-12);
/// assert!(angle_between(&up, &Vector3::zeros()).is_err());
/// ```
pub fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> Result<f64> {
    let la = vector_length(a);
    let lb = vector_length(b);
    if !(la > 0.0 && la.is_finite() && lb > 0.0 && lb.is_finite()) {
        return Err(LightmapError::ZeroLengthVector);
    }

    // Normalize before the dot product; la * lb can underflow for tiny normals.
    let cos = ((a / la).dot(&(b / lb))).clamp(-1.0, 1.0);
    Ok(cos.acos().to_degrees())
}

/// Weld predicate: strictly below the tolerance.
///
/// A pair exactly at the tolerance keeps its seam.
#[inline]
pub fn within_tolerance(angle_degrees: f64, tolerance_degrees: f64) -> bool {
    angle_degrees < tolerance_degrees
}
