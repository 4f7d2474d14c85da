use std::time::Duration;

/// One-shot timer owned by [`RedrawScheduler`]. The host arms it against its
/// own event loop and calls [`RedrawScheduler::timer_fired`] when it elapses.
pub trait RepaintTimer {
    fn arm(&mut self, delay: Duration);
    fn cancel(&mut self);
}

/// Timer for hosts that drive repaints entirely through urgent notifications
/// (tests, offline rendering). Arming it never fires.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTimer;

impl RepaintTimer for NullTimer {
    fn arm(&mut self, _delay: Duration) {}
    fn cancel(&mut self) {}
}

/// Coalesces drawing-change notifications into throttled repaints, trading
/// latency for throughput during high-frequency freehand strokes.
///
/// At most one delayed repaint is pending at a time. Coalescing never drops
/// the final state: mutation happens in place, so whatever is on screen when
/// the timer fires is the latest geometry.
pub struct RedrawScheduler {
    timer: Box<dyn RepaintTimer>,
    delay: Duration,
    pending: bool,
}

impl RedrawScheduler {
    pub fn new(timer: Box<dyn RepaintTimer>, delay: Duration) -> Self {
        Self {
            timer,
            delay,
            pending: false,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending
    }

    /// Route one change notification. Urgent changes cancel any pending timer
    /// and repaint synchronously; non-urgent ones arm the timer once and are
    /// otherwise absorbed.
    pub fn notify(&mut self, urgent: bool, repaint: &mut dyn FnMut()) {
        if urgent {
            if self.pending {
                self.timer.cancel();
                self.pending = false;
            }
            repaint();
        } else if !self.pending {
            self.pending = true;
            self.timer.arm(self.delay);
        }
    }

    /// Called by the host when the armed timer elapses.
    pub fn timer_fired(&mut self, repaint: &mut dyn FnMut()) {
        if self.pending {
            self.pending = false;
            repaint();
        }
    }
}
