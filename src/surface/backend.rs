use std::rc::Rc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use super::SurfaceHandle;

/// One named filter adjustment (exposure, contrast, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterValue {
    pub name: String,
    pub value: f32,
}

impl FilterValue {
    pub fn new(name: impl Into<String>, value: f32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Parameter bag for the external filter pipeline. This core never interprets
/// the values; it only hands them to the backend and tracks which dirty flag
/// a change maps to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub blur_radius: f32,
    pub adjustments: Vec<FilterValue>,
}

/// Asynchronous snapshot delivery; `None` when no live context exists.
pub type BitmapCallback = Box<dyn FnOnce(Option<RgbaImage>)>;

/// The live GPU rendering context owned by [`super::SurfaceLifecycle`].
///
/// Implemented by the external filter-rendering pipeline. All methods are
/// fire-and-forget from the UI thread; the implementation runs frames on its
/// own render thread and must tolerate requests arriving after `destroy`.
pub trait RenderContext {
    /// Request a frame. `pixels_dirty` re-paints the source texture,
    /// `params_dirty` re-applies the filter parameters. Back-to-back requests
    /// may coalesce into fewer frames; only the last state must render.
    fn request_render(&mut self, pixels_dirty: bool, params_dirty: bool);

    fn resize(&mut self, width: u32, height: u32);

    /// Hot-swap the source data without reallocating the context.
    fn resume_with_data(&mut self, bitmap: Rc<RgbaImage>, filters: FilterState);

    fn request_bitmap(&mut self, callback: BitmapCallback);

    fn pause(&mut self);

    fn destroy(&mut self);
}

/// Factory for render contexts, implemented by the filter pipeline.
pub trait RenderBackend {
    fn create_context(
        &mut self,
        surface: SurfaceHandle,
        bitmap: Rc<RgbaImage>,
        filters: FilterState,
        width: u32,
        height: u32,
    ) -> Box<dyn RenderContext>;
}
