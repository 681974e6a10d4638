use egui::{Pos2, Vec2};

/// Screen-space panning driven by incremental pointer deltas.
#[derive(Debug, Clone, Default)]
pub struct PanGesture {
    last: Option<Pos2>,
}

impl PanGesture {
    pub fn begin(&mut self, screen: Pos2) {
        self.last = Some(screen);
    }

    /// Delta since the previous position, or `None` when not panning.
    pub fn drag(&mut self, screen: Pos2) -> Option<Vec2> {
        let last = self.last?;
        self.last = Some(screen);
        Some(screen - last)
    }

    pub fn end(&mut self) {
        self.last = None;
    }

    pub fn is_active(&self) -> bool {
        self.last.is_some()
    }
}
