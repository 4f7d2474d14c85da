use std::collections::VecDeque;
use std::rc::Rc;

use image::RgbaImage;

use super::backend::{BitmapCallback, FilterState, RenderBackend, RenderContext};
use super::{RenderRequest, SurfaceEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfacePhase {
    /// No context; waiting for the surface and/or source data.
    Absent,
    Ready,
    Paused,
    /// Terminal. Re-entering `Ready` requires a fresh `Available` event on a
    /// new lifecycle instance.
    Destroyed,
}

/// Owns at most one live render context per editor surface and mediates its
/// creation, resize, pause and destruction against surface events.
pub struct SurfaceLifecycle {
    phase: SurfacePhase,
    backend: Box<dyn RenderBackend>,
    context: Option<Box<dyn RenderContext>>,
    bitmap: Option<Rc<RgbaImage>>,
    filters: Option<FilterState>,
    deferred: VecDeque<RenderRequest>,
}

impl SurfaceLifecycle {
    pub fn new(backend: Box<dyn RenderBackend>) -> Self {
        Self {
            phase: SurfacePhase::Absent,
            backend,
            context: None,
            bitmap: None,
            filters: None,
            deferred: VecDeque::new(),
        }
    }

    pub fn phase(&self) -> SurfacePhase {
        self.phase
    }

    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    /// Supply (or clear) the context prerequisites. A surface that became
    /// available before the data loaded is a valid wait state; the context is
    /// created on the next `Available` event once everything is present.
    pub fn set_source(&mut self, bitmap: Option<Rc<RgbaImage>>, filters: Option<FilterState>) {
        self.bitmap = bitmap;
        self.filters = filters;
    }

    pub fn handle_event(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::Available {
                surface,
                width,
                height,
            } => self.on_surface_available(surface, width, height),
            SurfaceEvent::Resized { width, height } => self.on_surface_resized(width, height),
            SurfaceEvent::Destroyed => self.on_surface_destroyed(),
        }
    }

    fn on_surface_available(&mut self, surface: super::SurfaceHandle, width: u32, height: u32) {
        if self.phase != SurfacePhase::Absent || self.context.is_some() {
            tracing::debug!(phase = ?self.phase, "surface available ignored");
            return;
        }
        let (Some(bitmap), Some(filters)) = (self.bitmap.clone(), self.filters.clone()) else {
            tracing::debug!("surface available before source data; staying absent");
            return;
        };
        let mut context = self
            .backend
            .create_context(surface, bitmap, filters, width, height);
        // Initial frame paints both the pixel content and the filter pass.
        context.request_render(true, true);
        self.context = Some(context);
        self.transition(SurfacePhase::Ready);
    }

    fn on_surface_resized(&mut self, width: u32, height: u32) {
        let Some(context) = self.context.as_mut() else {
            return;
        };
        context.resize(width, height);
        context.request_render(false, true);
        // The surface can report its new size before the renderer's internal
        // buffers catch up; queue one more request for the next pump.
        self.deferred.push_back(RenderRequest {
            pixels_dirty: false,
            params_dirty: true,
        });
        tracing::debug!(width, height, "surface resized");
    }

    fn on_surface_destroyed(&mut self) {
        if self.phase == SurfacePhase::Destroyed {
            return;
        }
        if let Some(mut context) = self.context.take() {
            context.destroy();
        }
        self.deferred.clear();
        self.transition(SurfacePhase::Destroyed);
    }

    /// Deliver render requests queued for the next event-loop turn. Requests
    /// outliving the context are dropped, never an error.
    pub fn drain_deferred(&mut self) {
        while let Some(request) = self.deferred.pop_front() {
            if let Some(context) = self.context.as_mut() {
                context.request_render(request.pixels_dirty, request.params_dirty);
            }
        }
    }

    /// Hot-swap source data on a live context and re-render. No-op without a
    /// context; the data still sticks for a later `Available` event.
    pub fn resume_with_data(&mut self, bitmap: Rc<RgbaImage>, filters: FilterState) {
        self.bitmap = Some(bitmap.clone());
        self.filters = Some(filters.clone());
        if let Some(context) = self.context.as_mut() {
            context.resume_with_data(bitmap, filters);
            context.request_render(true, true);
            if self.phase == SurfacePhase::Paused {
                self.transition(SurfacePhase::Ready);
            }
        }
    }

    pub fn pause(&mut self) {
        if let Some(context) = self.context.as_mut() {
            context.pause();
            if self.phase == SurfacePhase::Ready {
                self.transition(SurfacePhase::Paused);
            }
        }
    }

    pub fn request_render_by_change(&mut self, is_blur: bool) {
        if let Some(context) = self.context.as_mut() {
            context.request_render(true, is_blur);
        }
    }

    /// Snapshot the current frame. Resolves to `None` immediately when no
    /// live context exists; that is a wait state, not an error.
    pub fn request_bitmap(&mut self, callback: BitmapCallback) {
        match self.context.as_mut() {
            Some(context) => context.request_bitmap(callback),
            None => callback(None),
        }
    }

    fn transition(&mut self, next: SurfacePhase) {
        tracing::debug!(from = ?self.phase, to = ?next, "surface phase transition");
        self.phase = next;
    }
}
