use crate::geometry::{Color, SurfacePoint};

use super::drawing::{Drawing, DrawingChange, DrawingKind};
use super::state::PaintState;
use super::PaintMode;

/// Touch events forwarded by the editor surface, one continuous sequence per
/// gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down {
        point: SurfacePoint,
        pointer_count: u32,
    },
    Move {
        point: SurfacePoint,
        /// The host's pinch-zoom factor. Intermediate path samples are only
        /// checkpointed while this is exactly 1.
        zoom_factor: f32,
    },
    Up {
        point: SurfacePoint,
    },
    Cancel {
        point: SurfacePoint,
    },
}

/// Result of feeding one pointer event through the machine.
#[derive(Debug, Default)]
pub struct GestureOutcome {
    /// Unconsumed events fall through to the host's pan/zoom handling.
    pub consumed: bool,
    pub changes: Vec<DrawingChange>,
    /// The effective drawing mode changed; the host's drawing-state listener
    /// should fire.
    pub mode_changed: bool,
}

impl GestureOutcome {
    fn unconsumed() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveGesture {
    drawing_id: u64,
    kind: DrawingKind,
}

/// Per-gesture state machine: translates one touch sequence into creation,
/// live mutation and commit/discard of exactly one [`Drawing`].
#[derive(Debug)]
pub struct GestureMachine {
    enabled: bool,
    mode: PaintMode,
    active: Option<ActiveGesture>,
    brush_color: Color,
    brush_radius: f32,
    zoom_cancel: bool,
    canvas_width: u32,
    canvas_height: u32,
    crop_rotation: f32,
}

impl GestureMachine {
    pub fn new(brush_color: Color, brush_radius: f32) -> Self {
        Self {
            enabled: false,
            mode: PaintMode::FreeMovement,
            active: None,
            brush_color,
            brush_radius,
            zoom_cancel: false,
            canvas_width: 0,
            canvas_height: 0,
            crop_rotation: 0.0,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// The configured mode applies from the next gesture-down; an in-flight
    /// gesture keeps the mode it started with.
    pub fn set_mode(&mut self, mode: PaintMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> PaintMode {
        self.mode
    }

    pub fn set_canvas_size(&mut self, width: u32, height: u32) {
        self.canvas_width = width;
        self.canvas_height = height;
    }

    /// Crop rotation baked into drawings created from now on.
    pub fn set_crop_rotation(&mut self, rotation: f32) {
        self.crop_rotation = rotation;
    }

    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    /// The mode of the in-flight gesture, if any.
    pub fn effective_kind(&self) -> Option<DrawingKind> {
        self.active.map(|active| active.kind)
    }

    /// Raised by the host when a pinch/zoom took over mid-gesture; the next
    /// cancel then uses lenient completion criteria.
    pub fn cancel_drawing_by_zoom(&mut self) {
        self.zoom_cancel = true;
    }

    /// Brush changes apply to any in-flight drawing and stick for the next.
    pub fn set_brush_parameters(
        &mut self,
        state: &mut PaintState,
        color: Color,
        radius: f32,
    ) -> Option<DrawingChange> {
        if self.brush_color == color && self.brush_radius == radius {
            return None;
        }
        self.brush_color = color;
        self.brush_radius = radius;
        let active = self.active?;
        state
            .drawing_mut(active.drawing_id)
            .and_then(|drawing| drawing.set_brush(color, radius))
    }

    pub fn handle(&mut self, state: &mut PaintState, event: PointerEvent) -> GestureOutcome {
        match event {
            PointerEvent::Down {
                point,
                pointer_count,
            } => self.on_down(state, point, pointer_count),
            PointerEvent::Move { point, zoom_factor } => {
                self.on_move(state, point, zoom_factor == 1.0)
            }
            PointerEvent::Up { point } => self.on_complete(state, point, false),
            PointerEvent::Cancel { point } => {
                let by_zoom = self.zoom_cancel;
                self.zoom_cancel = false;
                self.on_complete(state, point, by_zoom)
            }
        }
    }

    fn on_down(&mut self, state: &mut PaintState, point: SurfacePoint, pointer_count: u32) -> GestureOutcome {
        self.zoom_cancel = false;
        if self.active.is_some() {
            return GestureOutcome::unconsumed();
        }
        // Multi-touch belongs to the host's pan/zoom handler.
        if !self.enabled || pointer_count > 1 {
            return GestureOutcome::unconsumed();
        }
        let Some(kind) = self.mode.drawing_kind() else {
            return GestureOutcome::unconsumed();
        };

        let mut drawing = Drawing::new(kind, self.canvas_width, self.canvas_height, self.crop_rotation);
        let mut changes = Vec::new();
        changes.extend(drawing.start(point));
        changes.extend(drawing.set_brush(self.brush_color, self.brush_radius));
        let drawing_id = state.add(drawing);
        self.active = Some(ActiveGesture { drawing_id, kind });
        tracing::debug!(drawing_id, ?kind, "drawing gesture started");

        GestureOutcome {
            consumed: true,
            changes,
            mode_changed: true,
        }
    }

    fn on_move(&mut self, state: &mut PaintState, point: SurfacePoint, allow_history: bool) -> GestureOutcome {
        let Some(active) = self.active else {
            return GestureOutcome::unconsumed();
        };
        let changes = state
            .drawing_mut(active.drawing_id)
            .and_then(|drawing| drawing.move_to(point, allow_history))
            .into_iter()
            .collect();
        GestureOutcome {
            consumed: true,
            changes,
            mode_changed: false,
        }
    }

    fn on_complete(&mut self, state: &mut PaintState, point: SurfacePoint, by_zoom_cancel: bool) -> GestureOutcome {
        let Some(active) = self.active.take() else {
            return GestureOutcome::unconsumed();
        };
        let mut changes = Vec::new();
        let kept = match state.drawing_mut(active.drawing_id) {
            Some(drawing) => {
                let (keep, change) = drawing.complete(point, by_zoom_cancel);
                changes.extend(change);
                keep
            }
            None => false,
        };
        if kept {
            state.track_action(active.drawing_id);
        } else {
            state.remove(active.drawing_id);
            changes.push(DrawingChange::IMMEDIATE);
        }
        tracing::debug!(
            drawing_id = active.drawing_id,
            kept,
            by_zoom_cancel,
            "drawing gesture completed"
        );
        GestureOutcome {
            consumed: true,
            changes,
            mode_changed: true,
        }
    }
}
