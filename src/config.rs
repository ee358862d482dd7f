//! Option surface of the lightmap pipeline.
//!
//! Operator input is forgiving: a tolerance that does not parse, is negative
//! or is not finite falls back to [`DEFAULT_TOLERANCE_DEGREES`] with a
//! warning instead of failing the run.
//!
//! # Example
//!
//! ```
//! use lightmap_uv::config::{parse_tolerance, LightmapOptions, TextureSize};
//!
//! assert_eq!(parse_tolerance("abc"), 5.0);
//!
//! let options = LightmapOptions::default()
//!     .with_tolerance(parse_tolerance(" 12.5 "))
//!     .with_texture_size(TextureSize::S1024);
//! assert_eq!(options.tolerance_degrees, 12.5);
//! assert_eq!(options.texture_size.texel_density(), 0.1);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::algo::unfold::UnfoldOptions;
use crate::error::{LightmapError, Result};

/// Angle used when the operator gives no usable tolerance.
pub const DEFAULT_TOLERANCE_DEGREES: f64 = 5.0;

/// Parse an operator-supplied tolerance in degrees.
///
/// Never fails: unparsable, negative and non-finite input all yield
/// [`DEFAULT_TOLERANCE_DEGREES`].
pub fn parse_tolerance(input: &str) -> f64 {
    match input.trim().parse::<f64>() {
        Ok(value) => sanitize_tolerance(value),
        Err(_) => {
            log::warn!(
                "tolerance {:?} is not a number; using {}",
                input,
                DEFAULT_TOLERANCE_DEGREES
            );
            DEFAULT_TOLERANCE_DEGREES
        }
    }
}

/// Replace a negative or non-finite tolerance with the default.
pub fn sanitize_tolerance(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        log::warn!(
            "tolerance {} is out of range; using {}",
            value,
            DEFAULT_TOLERANCE_DEGREES
        );
        DEFAULT_TOLERANCE_DEGREES
    }
}

/// Target lightmap texture resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureSize {
    /// 32 x 32
    S32,
    /// 64 x 64
    S64,
    /// 128 x 128
    S128,
    /// 256 x 256
    #[default]
    S256,
    /// 512 x 512
    S512,
    /// 1024 x 1024
    S1024,
    /// 2048 x 2048
    S2048,
}

impl TextureSize {
    /// Every preset, smallest first.
    pub const ALL: [TextureSize; 7] = [
        TextureSize::S32,
        TextureSize::S64,
        TextureSize::S128,
        TextureSize::S256,
        TextureSize::S512,
        TextureSize::S1024,
        TextureSize::S2048,
    ];

    /// Edge length in pixels.
    pub fn pixels(self) -> u32 {
        match self {
            TextureSize::S32 => 32,
            TextureSize::S64 => 64,
            TextureSize::S128 => 128,
            TextureSize::S256 => 256,
            TextureSize::S512 => 512,
            TextureSize::S1024 => 1024,
            TextureSize::S2048 => 2048,
        }
    }

    /// Packing parameter for this resolution.
    ///
    /// Halves with every doubling of the texture, so a fixed number of
    /// texels separates neighboring islands.
    pub fn texel_density(self) -> f64 {
        match self {
            TextureSize::S32 => 3.2,
            TextureSize::S64 => 1.6,
            TextureSize::S128 => 0.8,
            TextureSize::S256 => 0.4,
            TextureSize::S512 => 0.2,
            TextureSize::S1024 => 0.1,
            TextureSize::S2048 => 0.05,
        }
    }
}

impl TryFrom<u32> for TextureSize {
    type Error = LightmapError;

    fn try_from(pixels: u32) -> Result<Self> {
        TextureSize::ALL
            .into_iter()
            .find(|size| size.pixels() == pixels)
            .ok_or_else(|| {
                LightmapError::invalid_param(
                    "texture_size",
                    pixels,
                    "must be one of 32, 64, 128, 256, 512, 1024, 2048",
                )
            })
    }
}

impl FromStr for TextureSize {
    type Err = LightmapError;

    fn from_str(s: &str) -> Result<Self> {
        let pixels: u32 = s.trim().parse().map_err(|_| {
            LightmapError::invalid_param("texture_size", s, "not an integer")
        })?;
        TextureSize::try_from(pixels)
    }
}

impl fmt::Display for TextureSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pixels())
    }
}

/// Options for [`create_lightmap_uv`](crate::algo::lightmap::create_lightmap_uv).
#[derive(Debug, Clone)]
pub struct LightmapOptions {
    /// Neighbors whose normals differ by strictly less than this many
    /// degrees are welded.
    pub tolerance_degrees: f64,

    /// Texture resolution; selects the packer spacing.
    pub texture_size: TextureSize,

    /// Clear host construction history before starting.
    pub delete_history: bool,

    /// Relaxation parameters handed to the host's unfold solver.
    pub unfold: UnfoldOptions,

    /// Capture normals and adjacency on the rayon pool.
    pub parallel: bool,
}

impl Default for LightmapOptions {
    fn default() -> Self {
        Self {
            tolerance_degrees: DEFAULT_TOLERANCE_DEGREES,
            texture_size: TextureSize::default(),
            delete_history: true,
            unfold: UnfoldOptions::default(),
            parallel: true,
        }
    }
}

impl LightmapOptions {
    /// Set the tolerance. Invalid values fall back to the default.
    pub fn with_tolerance(mut self, tolerance_degrees: f64) -> Self {
        self.tolerance_degrees = sanitize_tolerance(tolerance_degrees);
        self
    }

    /// Set the texture size.
    pub fn with_texture_size(mut self, texture_size: TextureSize) -> Self {
        self.texture_size = texture_size;
        self
    }

    /// Set whether history is deleted first.
    pub fn with_delete_history(mut self, delete_history: bool) -> Self {
        self.delete_history = delete_history;
        self
    }

    /// Set the unfold parameters.
    pub fn with_unfold(mut self, unfold: UnfoldOptions) -> Self {
        self.unfold = unfold;
        self
    }

    /// Set whether the topology capture runs in parallel.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tolerance() {
        assert_eq!(parse_tolerance("10"), 10.0);
        assert_eq!(parse_tolerance(" 2.5\n"), 2.5);
        assert_eq!(parse_tolerance("0"), 0.0);
        assert_eq!(parse_tolerance("abc"), DEFAULT_TOLERANCE_DEGREES);
        assert_eq!(parse_tolerance(""), DEFAULT_TOLERANCE_DEGREES);
        assert_eq!(parse_tolerance("-3"), DEFAULT_TOLERANCE_DEGREES);
        assert_eq!(parse_tolerance("NaN"), DEFAULT_TOLERANCE_DEGREES);
        assert_eq!(parse_tolerance("inf"), DEFAULT_TOLERANCE_DEGREES);
    }

    #[test]
    fn test_texel_density_table() {
        let expected = [3.2, 1.6, 0.8, 0.4, 0.2, 0.1, 0.05];
        for (size, density) in TextureSize::ALL.iter().zip(expected) {
            assert_eq!(size.texel_density(), density);
        }
        assert_eq!(TextureSize::S1024.texel_density(), 0.1);
    }

    #[test]
    fn test_texture_size_parsing() {
        assert_eq!("1024".parse::<TextureSize>().unwrap(), TextureSize::S1024);
        assert_eq!(TextureSize::try_from(32).unwrap(), TextureSize::S32);
        assert!(TextureSize::try_from(300).is_err());
        assert!("big".parse::<TextureSize>().is_err());
        assert_eq!(TextureSize::S2048.to_string(), "2048");
    }

    #[test]
    fn test_options_defaults_and_builders() {
        let options = LightmapOptions::default();
        assert_eq!(options.tolerance_degrees, 5.0);
        assert_eq!(options.texture_size, TextureSize::S256);
        assert!(options.delete_history);
        assert!(options.parallel);
        assert_eq!(options.unfold.max_iterations, 5000);

        let options = LightmapOptions::default()
            .with_tolerance(-1.0)
            .with_delete_history(false)
            .with_parallel(false);
        assert_eq!(options.tolerance_degrees, DEFAULT_TOLERANCE_DEGREES);
        assert!(!options.delete_history);
        assert!(!options.parallel);
    }
}
