//! Composition root: owns the surface lifecycle, the gesture machine and the
//! redraw scheduler, and re-applies the crop transforms on every layout pass.

mod mask;

pub use mask::mask_rectangles;

use std::cell::RefCell;
use std::rc::Rc;

use image::RgbaImage;

use crate::config::EditorConfig;
use crate::crop::{
    self, content_layer_transform, image_layer_transform, ContentTransform, LayerTransform,
    SourceRef,
};
use crate::error::{EditorError, EditorResult};
use crate::geometry::{Color, MaskRect};
use crate::paint::{
    DrawingChange, DrawingKind, GestureMachine, PaintMode, PaintState, PointerEvent,
    RedrawScheduler, RepaintTimer,
};
use crate::surface::{
    BitmapCallback, FilterState, RenderBackend, SurfaceEvent, SurfaceLifecycle, SurfacePhase,
};

/// Which collaborator the surface was initialized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InitMode {
    Filters,
    Paint,
}

/// Listener for effective drawing-state changes; receives the in-flight
/// drawing kind, or `None` when the gesture ended.
pub type DrawingListener = Box<dyn FnMut(Option<DrawingKind>)>;

/// Sink invoked whenever the annotation overlay must repaint.
pub type OverlayInvalidate = Box<dyn FnMut()>;

/// The interactive editor surface: a GPU-rendered, filterable image layer
/// stacked under a vector annotation overlay and a crop mask, kept
/// pixel-aligned under independent crop, rotation and zoom transforms.
pub struct EditorSurface {
    config: EditorConfig,
    lifecycle: SurfaceLifecycle,
    gestures: GestureMachine,
    scheduler: RedrawScheduler,
    paint_state: Option<Rc<RefCell<PaintState>>>,
    init_mode: Option<InitMode>,
    source: Option<SourceRef>,

    // Viewport geometry, recomputed each layout pass.
    measured_width: i32,
    measured_height: i32,
    normal_width: u32,
    normal_height: u32,
    cropped_width: u32,
    cropped_height: u32,
    center_x: i32,
    center_y: i32,

    image_transform: LayerTransform,
    content_transform: ContentTransform,

    visible: bool,
    drawing_listener: Option<DrawingListener>,
    overlay_invalidate: Option<OverlayInvalidate>,
}

impl EditorSurface {
    pub fn new(backend: Box<dyn RenderBackend>, timer: Box<dyn RepaintTimer>) -> Self {
        Self::with_config(EditorConfig::default(), backend, timer)
    }

    pub fn with_config(
        config: EditorConfig,
        backend: Box<dyn RenderBackend>,
        timer: Box<dyn RepaintTimer>,
    ) -> Self {
        let gestures = GestureMachine::new(config.brush_color(), config.brush_radius);
        let scheduler = RedrawScheduler::new(timer, config.redraw_delay());
        Self {
            config,
            lifecycle: SurfaceLifecycle::new(backend),
            gestures,
            scheduler,
            paint_state: None,
            init_mode: None,
            source: None,
            measured_width: 0,
            measured_height: 0,
            normal_width: 0,
            normal_height: 0,
            cropped_width: 0,
            cropped_height: 0,
            center_x: 0,
            center_y: 0,
            image_transform: LayerTransform::IDENTITY,
            content_transform: ContentTransform::IDENTITY,
            visible: false,
            drawing_listener: None,
            overlay_invalidate: None,
        }
    }

    /// Bind the surface to its source data. Exactly one of `filters` /
    /// `paint` decides the mode; supplying neither is a contract violation.
    pub fn init(
        &mut self,
        source: SourceRef,
        bitmap: Option<Rc<RgbaImage>>,
        filters: Option<FilterState>,
        paint: Option<Rc<RefCell<PaintState>>>,
    ) -> EditorResult<()> {
        let init_mode = if filters.is_some() {
            InitMode::Filters
        } else if paint.is_some() {
            InitMode::Paint
        } else {
            return Err(EditorError::MissingInitState);
        };

        if init_mode == InitMode::Filters {
            self.lifecycle.set_source(bitmap, filters);
        } else {
            self.gestures.set_enabled(true);
        }
        self.paint_state = paint;
        self.source = Some(source);
        self.init_mode = Some(init_mode);
        self.layout();
        tracing::debug!(?init_mode, "editor surface initialized");
        Ok(())
    }

    /// Re-bind to new source data without discarding the annotation or crop
    /// lifecycle. Falls back to `init` when never initialized.
    pub fn reset(
        &mut self,
        source: SourceRef,
        bitmap: Option<Rc<RgbaImage>>,
        filters: Option<FilterState>,
        paint: Option<Rc<RefCell<PaintState>>>,
    ) -> EditorResult<()> {
        if self.init_mode.is_none() {
            return self.init(source, bitmap, filters, paint);
        }
        self.source = Some(source);
        if self.init_mode == Some(InitMode::Filters) {
            match (bitmap, filters) {
                (Some(bitmap), Some(filters)) => self.lifecycle.resume_with_data(bitmap, filters),
                (bitmap, filters) => self.lifecycle.set_source(bitmap, filters),
            }
        }
        if paint.is_some() {
            self.paint_state = paint;
        }
        self.layout();
        Ok(())
    }

    /// Update source dimensions, rotation and crop; transforms recompute.
    pub fn set_sizes(&mut self, width: u32, height: u32, rotation: i32, crop: Option<crop::CropState>) {
        self.source = Some(SourceRef::new(width, height, rotation, crop));
        self.layout();
    }

    /// Crop-mask geometry: the measured pixel size of the un-cropped image
    /// and of the cropped output window.
    pub fn set_view_sizes(&mut self, width: u32, height: u32, cropped_width: u32, cropped_height: u32) {
        self.normal_width = width;
        self.normal_height = height;
        self.cropped_width = cropped_width;
        self.cropped_height = cropped_height;
        self.layout();
        self.invalidate_overlay();
    }

    /// Pixel center at which the cropped window is displayed.
    pub fn set_center(&mut self, center_x: i32, center_y: i32) {
        self.center_x = center_x;
        self.center_y = center_y;
        self.invalidate_overlay();
    }

    /// Measured size of the whole editor surface; triggers a layout pass.
    pub fn measure(&mut self, width: i32, height: i32) {
        self.measured_width = width;
        self.measured_height = height;
        self.layout();
    }

    /// Recompute both layer transforms from the current geometry. Runs on
    /// every size, crop or rotation change.
    fn layout(&mut self) {
        let Some(source) = self.source else {
            return;
        };
        let (texture_width, texture_height) = if crop::is_quarter_rotated(source.rotation) {
            (self.normal_height, self.normal_width)
        } else {
            (self.normal_width, self.normal_height)
        };
        self.image_transform = image_layer_transform(
            texture_width,
            texture_height,
            source.crop.as_ref(),
            self.cropped_width,
            self.cropped_height,
        );
        self.content_transform =
            content_layer_transform(source.width, source.height, source.crop.as_ref());
        self.gestures.set_canvas_size(texture_width, texture_height);
        self.gestures
            .set_crop_rotation(source.crop.map(|crop| crop.rotation).unwrap_or(0.0));
    }

    /// Scale/translate currently applied to the image (texture) layer.
    pub fn image_layer_transform(&self) -> LayerTransform {
        self.image_transform
    }

    /// Whole-layer 90°-step rotation of the image layer.
    pub fn image_layer_rotation(&self) -> i32 {
        self.source.map(|source| source.rotation).unwrap_or(0)
    }

    /// Rotation/scale currently applied to the annotation layer.
    pub fn content_layer_transform(&self) -> ContentTransform {
        self.content_transform
    }

    /// The opaque strips masking everything outside the crop window.
    pub fn mask_rects(&self) -> Vec<MaskRect> {
        mask_rectangles(
            self.measured_width,
            self.measured_height,
            self.cropped_width as i32,
            self.cropped_height as i32,
            self.center_x,
            self.center_y,
        )
    }

    // Surface plumbing -----------------------------------------------------

    pub fn handle_surface_event(&mut self, event: SurfaceEvent) {
        self.lifecycle.handle_event(event);
    }

    /// Deliver deferred render requests; the host calls this once per
    /// event-loop turn after surface events.
    pub fn process_deferred(&mut self) {
        self.lifecycle.drain_deferred();
    }

    pub fn surface_phase(&self) -> SurfacePhase {
        self.lifecycle.phase()
    }

    /// Forward a filter-parameter change to the renderer. `is_blur` marks
    /// the blur pass dirty in addition to the pixel content.
    pub fn request_render_by_change(&mut self, is_blur: bool) {
        self.lifecycle.request_render_by_change(is_blur);
    }

    /// Snapshot of the rendered frame; resolves to `None` immediately when
    /// no live context exists (paint-only mode or surface not yet available).
    pub fn get_bitmap_async(&mut self, callback: BitmapCallback) {
        if self.init_mode == Some(InitMode::Filters) {
            self.lifecycle.request_bitmap(callback);
        } else {
            callback(None);
        }
    }

    pub fn destroy(&mut self) {
        self.lifecycle.handle_event(SurfaceEvent::Destroyed);
    }

    pub fn pause(&mut self) {
        self.lifecycle.pause();
    }

    // Painting -------------------------------------------------------------

    pub fn set_painting_mode(&mut self, mode: PaintMode) {
        if self.gestures.mode() != mode {
            self.gestures.set_mode(mode);
            self.gestures.set_enabled(mode != PaintMode::FreeMovement);
        }
    }

    pub fn painting_mode(&self) -> PaintMode {
        self.gestures.mode()
    }

    /// Whether a drawing gesture is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.gestures.is_busy()
    }

    /// Feed one touch event through the gesture machine. Returns whether the
    /// event was consumed; unconsumed events belong to the host's pan/zoom.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> bool {
        let Some(paint_state) = self.paint_state.clone() else {
            return false;
        };
        let outcome = self.gestures.handle(&mut paint_state.borrow_mut(), event);
        self.route_changes(&outcome.changes);
        if outcome.mode_changed {
            let kind = self.gestures.effective_kind();
            if let Some(listener) = self.drawing_listener.as_mut() {
                listener(kind);
            }
        }
        outcome.consumed
    }

    pub fn cancel_drawing_by_zoom(&mut self) {
        self.gestures.cancel_drawing_by_zoom();
    }

    pub fn set_brush_parameters(&mut self, color: Color, radius: f32) {
        let Some(paint_state) = self.paint_state.clone() else {
            return;
        };
        let change = self
            .gestures
            .set_brush_parameters(&mut paint_state.borrow_mut(), color, radius);
        if let Some(change) = change {
            self.route_changes(&[change]);
        }
    }

    /// Host timer callback for the redraw scheduler.
    pub fn redraw_timer_fired(&mut self) {
        match self.overlay_invalidate.as_mut() {
            Some(sink) => self.scheduler.timer_fired(&mut **sink),
            None => self.scheduler.timer_fired(&mut || {}),
        }
    }

    fn route_changes(&mut self, changes: &[DrawingChange]) {
        for change in changes {
            match self.overlay_invalidate.as_mut() {
                Some(sink) => self.scheduler.notify(change.urgent, &mut **sink),
                None => self.scheduler.notify(change.urgent, &mut || {}),
            }
        }
    }

    fn invalidate_overlay(&mut self) {
        if let Some(sink) = self.overlay_invalidate.as_mut() {
            sink();
        }
    }

    // Listeners & visibility ----------------------------------------------

    pub fn set_drawing_listener(&mut self, listener: DrawingListener) {
        self.drawing_listener = Some(listener);
    }

    pub fn set_overlay_invalidate(&mut self, sink: OverlayInvalidate) {
        self.overlay_invalidate = Some(sink);
    }

    /// Toggle visibility of all layers together; internal state is kept.
    pub fn set_editor_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_editor_visible(&self) -> bool {
        self.visible
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use crate::crop::CropState;
    use crate::geometry::SurfacePoint;
    use crate::paint::NullTimer;
    use crate::surface::{RenderContext, SurfaceHandle};

    use super::*;

    struct NullContext;

    impl RenderContext for NullContext {
        fn request_render(&mut self, _pixels_dirty: bool, _params_dirty: bool) {}
        fn resize(&mut self, _width: u32, _height: u32) {}
        fn resume_with_data(&mut self, _bitmap: Rc<RgbaImage>, _filters: FilterState) {}
        fn request_bitmap(&mut self, callback: BitmapCallback) {
            callback(Some(RgbaImage::new(2, 2)));
        }
        fn pause(&mut self) {}
        fn destroy(&mut self) {}
    }

    struct NullBackend;

    impl RenderBackend for NullBackend {
        fn create_context(
            &mut self,
            _surface: SurfaceHandle,
            _bitmap: Rc<RgbaImage>,
            _filters: FilterState,
            _width: u32,
            _height: u32,
        ) -> Box<dyn RenderContext> {
            Box::new(NullContext)
        }
    }

    fn editor() -> EditorSurface {
        EditorSurface::new(Box::new(NullBackend), Box::new(NullTimer))
    }

    fn paint_editor() -> (EditorSurface, Rc<RefCell<PaintState>>) {
        let mut editor = editor();
        let paint = Rc::new(RefCell::new(PaintState::new()));
        editor
            .init(
                SourceRef::new(1000, 1000, 0, None),
                None,
                None,
                Some(paint.clone()),
            )
            .expect("paint init should succeed");
        editor.set_view_sizes(1000, 1000, 1000, 1000);
        editor.set_painting_mode(PaintMode::Path);
        (editor, paint)
    }

    fn down(x: f32, y: f32) -> PointerEvent {
        PointerEvent::Down {
            point: SurfacePoint::new(x, y),
            pointer_count: 1,
        }
    }

    #[test]
    fn init_without_any_state_is_a_contract_violation() {
        let mut editor = editor();
        let err = editor
            .init(SourceRef::new(100, 100, 0, None), None, None, None)
            .expect_err("init without state should fail");
        assert!(matches!(err, EditorError::MissingInitState));
    }

    #[test]
    fn paint_mode_draws_and_commits_through_the_surface() {
        let (mut editor, paint) = paint_editor();
        assert!(editor.handle_pointer_event(down(100.0, 100.0)));
        assert!(editor.is_busy());
        assert!(editor.handle_pointer_event(PointerEvent::Move {
            point: SurfacePoint::new(200.0, 200.0),
            zoom_factor: 1.0,
        }));
        assert!(editor.handle_pointer_event(PointerEvent::Up {
            point: SurfacePoint::new(300.0, 300.0),
        }));
        assert!(!editor.is_busy());
        assert_eq!(paint.borrow().len(), 1);
    }

    #[test]
    fn pointer_events_without_paint_state_fall_through() {
        let mut editor = editor();
        assert!(!editor.handle_pointer_event(down(10.0, 10.0)));
    }

    #[test]
    fn drawing_listener_fires_on_start_and_end() {
        let (mut editor, _paint) = paint_editor();
        let states: Rc<RefCell<Vec<Option<DrawingKind>>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = states.clone();
        editor.set_drawing_listener(Box::new(move |kind| sink.borrow_mut().push(kind)));
        editor.handle_pointer_event(down(100.0, 100.0));
        editor.handle_pointer_event(PointerEvent::Up {
            point: SurfacePoint::new(150.0, 150.0),
        });
        assert_eq!(
            states.borrow().as_slice(),
            [Some(DrawingKind::Path), None]
        );
    }

    #[test]
    fn urgent_changes_invalidate_the_overlay() {
        let (mut editor, _paint) = paint_editor();
        let repaints = Rc::new(Cell::new(0u32));
        let counter = repaints.clone();
        editor.set_overlay_invalidate(Box::new(move || counter.set(counter.get() + 1)));
        editor.handle_pointer_event(down(100.0, 100.0));
        editor.handle_pointer_event(PointerEvent::Up {
            point: SurfacePoint::new(150.0, 150.0),
        });
        // The up-completion is urgent and repaints synchronously.
        assert!(repaints.get() >= 1);
    }

    #[test]
    fn get_bitmap_in_paint_mode_resolves_to_none() {
        let (mut editor, _paint) = paint_editor();
        let result: Rc<RefCell<Option<Option<RgbaImage>>>> = Rc::new(RefCell::new(None));
        let sink = result.clone();
        editor.get_bitmap_async(Box::new(move |bitmap| *sink.borrow_mut() = Some(bitmap)));
        assert_eq!(*result.borrow(), Some(None));
    }

    #[test]
    fn filters_mode_snapshot_waits_for_a_live_context() {
        let mut editor = editor();
        editor
            .init(
                SourceRef::new(100, 100, 0, None),
                Some(Rc::new(RgbaImage::new(4, 4))),
                Some(FilterState::default()),
                None,
            )
            .expect("filters init should succeed");

        let result: Rc<RefCell<Option<Option<RgbaImage>>>> = Rc::new(RefCell::new(None));
        let sink = result.clone();
        editor.get_bitmap_async(Box::new(move |bitmap| *sink.borrow_mut() = Some(bitmap)));
        assert_eq!(*result.borrow(), Some(None));

        editor.handle_surface_event(SurfaceEvent::Available {
            surface: SurfaceHandle(7),
            width: 640,
            height: 480,
        });
        assert_eq!(editor.surface_phase(), SurfacePhase::Ready);

        let result: Rc<RefCell<Option<Option<RgbaImage>>>> = Rc::new(RefCell::new(None));
        let sink = result.clone();
        editor.get_bitmap_async(Box::new(move |bitmap| *sink.borrow_mut() = Some(bitmap)));
        assert!(matches!(*result.borrow(), Some(Some(_))));
    }

    #[test]
    fn destroy_is_forwarded_and_idempotent() {
        let mut editor = editor();
        editor.destroy();
        editor.destroy();
        assert_eq!(editor.surface_phase(), SurfacePhase::Destroyed);
    }

    #[test]
    fn visibility_toggle_preserves_drawings() {
        let (mut editor, paint) = paint_editor();
        editor.handle_pointer_event(down(100.0, 100.0));
        editor.handle_pointer_event(PointerEvent::Up {
            point: SurfacePoint::new(150.0, 150.0),
        });
        editor.set_editor_visible(false);
        assert!(!editor.is_editor_visible());
        assert_eq!(paint.borrow().len(), 1);
        editor.set_editor_visible(true);
        assert!(editor.is_editor_visible());
        assert_eq!(paint.borrow().len(), 1);
    }

    #[test]
    fn layout_applies_the_crop_transform_to_the_image_layer() {
        let (mut editor, _paint) = paint_editor();
        editor.set_sizes(
            1000,
            1000,
            0,
            Some(CropState::new(0.25, 0.25, 0.75, 0.75, 0.0)),
        );
        editor.set_view_sizes(1000, 1000, 300, 300);
        let transform = editor.image_layer_transform();
        assert!((transform.scale - 0.6).abs() < 1e-4);
        assert!(transform.translate_x.abs() < 1e-4);
        assert!(transform.translate_y.abs() < 1e-4);
    }

    #[test]
    fn quarter_rotated_source_swaps_the_texture_axes() {
        let (mut editor, _paint) = paint_editor();
        editor.set_sizes(
            800,
            600,
            90,
            Some(CropState::new(0.0, 0.0, 0.5, 0.5, 0.0)),
        );
        editor.set_view_sizes(800, 600, 300, 400);
        assert_eq!(editor.image_layer_rotation(), 90);
        // Texture basis is 600x800 after the swap.
        let transform = editor.image_layer_transform();
        let expected = f32::max(300.0 / (600.0 * 0.5), 400.0 / (800.0 * 0.5));
        assert!((transform.scale - expected).abs() < 1e-4);
    }

    #[test]
    fn mask_rects_follow_center_and_cropped_size() {
        let (mut editor, _paint) = paint_editor();
        editor.measure(400, 400);
        editor.set_view_sizes(400, 400, 200, 200);
        editor.set_center(200, 200);
        assert_eq!(editor.mask_rects().len(), 4);
    }
}
