//! Error types for lightmap-uv.
//!
//! This module defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`LightmapError`].
pub type Result<T> = std::result::Result<T, LightmapError>;

/// Errors that can occur while building meshes or generating lightmap UVs.
#[derive(Error, Debug)]
pub enum LightmapError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has fewer than three corners or repeats a vertex.
    #[error("face {face} is degenerate (fewer than 3 distinct vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// A face index outside `0..face_count` was passed to a mesh query.
    #[error("face index {face} out of range (mesh has {count} faces)")]
    InvalidFace {
        /// The offending face index.
        face: usize,
        /// Number of faces in the mesh.
        count: usize,
    },

    /// A direction vector had zero length, so no angle can be measured.
    #[error("cannot measure an angle against a zero-length vector")]
    ZeroLengthVector,

    /// A named UV set does not exist on the mesh.
    #[error("UV set '{name}' not found")]
    UvSetNotFound {
        /// The requested set name.
        name: String,
    },

    /// A UV set with this name already exists.
    #[error("UV set '{name}' already exists")]
    UvSetExists {
        /// The conflicting set name.
        name: String,
    },

    /// The mesh has no active UV set to operate on.
    #[error("mesh has no active UV set")]
    NoActiveUvSet,

    /// The unfold solver could not produce a layout for an island.
    #[error("unfold failed on island {island}: {reason}")]
    UnfoldFailed {
        /// Index of the island in island order.
        island: usize,
        /// Why the solver gave up.
        reason: String,
    },

    /// The packer could not lay out the islands.
    #[error("UV layout failed: {reason}")]
    PackFailed {
        /// Why the packer gave up.
        reason: String,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl LightmapError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        LightmapError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create an error for a missing UV set.
    pub fn uv_set_not_found(name: &str) -> Self {
        LightmapError::UvSetNotFound {
            name: name.to_string(),
        }
    }
}
