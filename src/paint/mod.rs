//! Vector annotations: the drawing primitive, the shared annotation list,
//! the touch gesture machine and the coalescing redraw scheduler.

mod drawing;
mod gesture;
mod redraw;
mod state;

pub use drawing::{Drawing, DrawingChange, DrawingKind, DrawingShape, RelativePoint};
pub use gesture::{GestureMachine, GestureOutcome, PointerEvent};
pub use redraw::{NullTimer, RedrawScheduler, RepaintTimer};
pub use state::PaintState;

/// The painting tool configured by the host. Passed explicitly into the
/// gesture machine, never read from shared globals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintMode {
    /// Pan/zoom the canvas; touch never creates a drawing.
    FreeMovement,
    Arrow,
    Rectangle,
    Path,
}

impl PaintMode {
    /// The drawing created for this mode; `None` for non-drawing modes, which
    /// keeps unsupported modes unrepresentable once a gesture is active.
    pub const fn drawing_kind(self) -> Option<DrawingKind> {
        match self {
            Self::FreeMovement => None,
            Self::Arrow => Some(DrawingKind::Arrow),
            Self::Rectangle => Some(DrawingKind::Rectangle),
            Self::Path => Some(DrawingKind::Path),
        }
    }
}
