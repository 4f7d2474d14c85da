use super::drawing::Drawing;

/// Ordered collection of committed and in-flight drawings. Insertion order is
/// z-order. Created by the host before editing starts and mutated only from
/// the UI thread by the gesture machine.
#[derive(Debug, Default)]
pub struct PaintState {
    drawings: Vec<Drawing>,
    next_id: u64,
    tracked_actions: Vec<u64>,
}

impl PaintState {
    pub fn new() -> Self {
        Self {
            drawings: Vec::new(),
            next_id: 1,
            tracked_actions: Vec::new(),
        }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Register a drawing, making it visible for live preview before commit.
    pub fn add(&mut self, mut drawing: Drawing) -> u64 {
        let id = self.allocate_id();
        drawing.id = id;
        self.drawings.push(drawing);
        id
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.drawings.len();
        self.drawings.retain(|drawing| drawing.id != id);
        before != self.drawings.len()
    }

    /// Record a committed drawing for the host's undo history.
    pub fn track_action(&mut self, id: u64) {
        self.tracked_actions.push(id);
    }

    /// Hand the committed ids to the host's history tracker.
    pub fn take_tracked_actions(&mut self) -> Vec<u64> {
        std::mem::take(&mut self.tracked_actions)
    }

    pub fn drawings(&self) -> &[Drawing] {
        &self.drawings
    }

    pub fn drawing_mut(&mut self, id: u64) -> Option<&mut Drawing> {
        self.drawings.iter_mut().find(|drawing| drawing.id == id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.drawings.iter().any(|drawing| drawing.id == id)
    }

    pub fn len(&self) -> usize {
        self.drawings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawings.is_empty()
    }
}
