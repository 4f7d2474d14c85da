use crate::geometry::{Color, SurfacePoint};

/// Point in canvas-relative coordinates, each axis in `[0, 1]`. Relative
/// storage keeps a drawing valid when the canvas is later re-laid-out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativePoint {
    pub x: f32,
    pub y: f32,
}

impl RelativePoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawingKind {
    Arrow,
    Rectangle,
    Path,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawingShape {
    Arrow {
        start: RelativePoint,
        end: RelativePoint,
    },
    Rectangle {
        start: RelativePoint,
        end: RelativePoint,
    },
    Path {
        points: Vec<RelativePoint>,
    },
}

/// Notification that a drawing's geometry changed. Non-urgent changes may be
/// coalesced by the redraw scheduler; urgent ones repaint immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawingChange {
    pub urgent: bool,
}

impl DrawingChange {
    pub const COALESCED: DrawingChange = DrawingChange { urgent: false };
    pub const IMMEDIATE: DrawingChange = DrawingChange { urgent: true };
}

/// One vector annotation: an arrow, a rectangle or a freehand path, with its
/// brush styling and the canvas geometry it was created against. The crop
/// rotation at creation time is baked in so a later rotation change does not
/// retroactively distort the shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    pub id: u64,
    shape: DrawingShape,
    canvas_width: u32,
    canvas_height: u32,
    canvas_rotation: f32,
    color: Color,
    radius: f32,
}

impl Drawing {
    pub fn new(kind: DrawingKind, canvas_width: u32, canvas_height: u32, canvas_rotation: f32) -> Self {
        let origin = RelativePoint::new(0.0, 0.0);
        let shape = match kind {
            DrawingKind::Arrow => DrawingShape::Arrow {
                start: origin,
                end: origin,
            },
            DrawingKind::Rectangle => DrawingShape::Rectangle {
                start: origin,
                end: origin,
            },
            DrawingKind::Path => DrawingShape::Path { points: Vec::new() },
        };
        Self {
            id: 0,
            shape,
            canvas_width,
            canvas_height,
            canvas_rotation,
            color: Color::new(255, 255, 255),
            radius: 1.0,
        }
    }

    pub fn kind(&self) -> DrawingKind {
        match self.shape {
            DrawingShape::Arrow { .. } => DrawingKind::Arrow,
            DrawingShape::Rectangle { .. } => DrawingKind::Rectangle,
            DrawingShape::Path { .. } => DrawingKind::Path,
        }
    }

    pub fn shape(&self) -> &DrawingShape {
        &self.shape
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn canvas_rotation(&self) -> f32 {
        self.canvas_rotation
    }

    fn relative(&self, point: SurfacePoint) -> RelativePoint {
        RelativePoint::new(
            point.x / self.canvas_width.max(1) as f32,
            point.y / self.canvas_height.max(1) as f32,
        )
    }

    /// Gesture-down: anchor both endpoints (or the first path sample).
    pub fn start(&mut self, point: SurfacePoint) -> Option<DrawingChange> {
        let anchor = self.relative(point);
        match &mut self.shape {
            DrawingShape::Arrow { start, end } | DrawingShape::Rectangle { start, end } => {
                *start = anchor;
                *end = anchor;
                None
            }
            DrawingShape::Path { points } => {
                points.push(anchor);
                Some(DrawingChange::COALESCED)
            }
        }
    }

    /// Gesture-move: mutate the geometry in place. `allow_history` is false
    /// while the host is pinch-zooming; intermediate path samples are then
    /// unreliable and overwrite the previous one instead of accumulating.
    pub fn move_to(&mut self, point: SurfacePoint, allow_history: bool) -> Option<DrawingChange> {
        let next = self.relative(point);
        match &mut self.shape {
            DrawingShape::Arrow { end, .. } | DrawingShape::Rectangle { end, .. } => {
                if *end != next {
                    *end = next;
                    Some(DrawingChange::COALESCED)
                } else {
                    None
                }
            }
            DrawingShape::Path { points } => {
                if allow_history || points.len() < 2 {
                    points.push(next);
                } else if let Some(last) = points.last_mut() {
                    *last = next;
                }
                Some(DrawingChange::COALESCED)
            }
        }
    }

    /// Gesture-up/cancel. Returns whether the drawing should be kept.
    ///
    /// A zoom-caused cancellation uses lenient criteria: an arrow/rectangle
    /// survives only if it never moved off its anchor (the movement belonged
    /// to the pinch), a path survives once it has accumulated more than three
    /// samples.
    pub fn complete(&mut self, point: SurfacePoint, by_zoom_cancel: bool) -> (bool, Option<DrawingChange>) {
        match &mut self.shape {
            DrawingShape::Arrow { start, end } | DrawingShape::Rectangle { start, end } => {
                let keep = !by_zoom_cancel || *start == *end;
                (keep, None)
            }
            DrawingShape::Path { points } => {
                if !by_zoom_cancel || points.len() > 3 {
                    let last = RelativePoint::new(
                        point.x / self.canvas_width.max(1) as f32,
                        point.y / self.canvas_height.max(1) as f32,
                    );
                    points.push(last);
                    points.shrink_to_fit();
                    (true, Some(DrawingChange::IMMEDIATE))
                } else {
                    (false, None)
                }
            }
        }
    }

    /// Brush changes apply immediately so the live preview recolors.
    pub fn set_brush(&mut self, color: Color, radius: f32) -> Option<DrawingChange> {
        if self.color == color && self.radius == radius {
            return None;
        }
        self.color = color;
        self.radius = radius;
        Some(DrawingChange::IMMEDIATE)
    }
}
