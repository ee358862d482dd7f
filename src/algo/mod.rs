//! Lightmap UV algorithms.
//!
//! - **Vector math**: normal angles with clamped cosine ([`vecmath`])
//! - **Topology snapshot**: normals and 3D adjacency frozen before UV edits ([`adjacency`])
//! - **Seams**: weld-or-seam decisions and their application ([`seams`])
//! - **Unfold**: reference relaxation solver ([`unfold`])
//! - **Pack**: reference shelf packer ([`pack`])
//! - **Driver**: the full lightmap pipeline ([`lightmap`])
//! - **Progress**: reporting and cooperative cancellation ([`progress`])

pub mod adjacency;
pub mod lightmap;
pub mod pack;
pub mod progress;
pub mod seams;
pub mod unfold;
pub mod vecmath;

pub use progress::{CancelToken, Progress};
