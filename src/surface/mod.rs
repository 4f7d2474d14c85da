//! GPU surface lifecycle: ownership of the render context bound to a
//! platform drawable, driven by asynchronous surface-availability events.

mod backend;
mod lifecycle;

pub use backend::{BitmapCallback, FilterState, FilterValue, RenderBackend, RenderContext};
pub use lifecycle::{SurfaceLifecycle, SurfacePhase};

/// Opaque handle to the platform object a GPU context renders into. Any
/// native surface/swapchain type can stand behind this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// Surface-availability notifications delivered by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    Available {
        surface: SurfaceHandle,
        width: u32,
        height: u32,
    },
    Resized {
        width: u32,
        height: u32,
    },
    Destroyed,
}

/// A fire-and-forget frame request with two independent dirty flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRequest {
    pub pixels_dirty: bool,
    pub params_dirty: bool,
}
