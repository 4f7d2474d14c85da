//! Interactive image-editing surface compositor core.
//!
//! Overlays a GPU-rendered, filterable image layer with a vector annotation
//! overlay, keeping both pixel-aligned under independent crop, rotation and
//! zoom transforms. The GPU filter pipeline, stroke rendering and the
//! surrounding screen chrome are external collaborators behind traits.

pub mod config;
pub mod crop;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod paint;
pub mod surface;

pub use editor::EditorSurface;
pub use error::{EditorError, EditorResult};
