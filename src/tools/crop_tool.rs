use super::{Tool, ToolKind, ToolOptions};
use crate::command::Command;
use egui::{Pos2, Rect};
use serde::{Deserialize, Serialize};

/// Crop rectangle in surface space.
///
/// While dragging, `width`/`height` are signed: `(x, y)` is the anchor and
/// the sign says which side of it the cursor is on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CropRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_anchor(anchor: Pos2, current: Pos2) -> Self {
        Self::new(anchor.x, anchor.y, current.x - anchor.x, current.y - anchor.y)
    }

    /// Same area with a top-left origin and non-negative size.
    pub fn normalized(&self) -> Self {
        Self::new(
            self.x.min(self.x + self.width),
            self.y.min(self.y + self.height),
            self.width.abs(),
            self.height.abs(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    pub fn to_rect(&self) -> Rect {
        let n = self.normalized();
        Rect::from_min_size(Pos2::new(n.x, n.y), egui::vec2(n.width, n.height))
    }

    /// Whole-pixel region `(x, y, width, height)` clipped to a surface of the
    /// given size. `None` when nothing is left.
    pub fn pixel_region(&self, surface_width: u32, surface_height: u32) -> Option<(u32, u32, u32, u32)> {
        let n = self.normalized();
        let clip = |v: f32, max: u32| v.round().clamp(0.0, max as f32) as u32;
        let x0 = clip(n.x, surface_width);
        let y0 = clip(n.y, surface_height);
        let x1 = clip(n.x + n.width, surface_width);
        let y1 = clip(n.y + n.height, surface_height);
        (x1 > x0 && y1 > y0).then(|| (x0, y0, x1 - x0, y1 - y0))
    }
}

/// Rubber-band crop selection. Applying is a separate command.
#[derive(Debug, Clone, Default)]
pub struct CropTool {
    anchor: Option<Pos2>,
}

impl CropTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool for CropTool {
    fn name(&self) -> &'static str {
        "Crop"
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Crop
    }

    fn deactivate(&mut self) {
        self.anchor = None;
    }

    fn on_pointer_down(&mut self, pos: Pos2, _options: &ToolOptions) -> Option<Command> {
        self.anchor = Some(pos);
        Some(Command::SetCropRect(Some(CropRect::from_anchor(pos, pos))))
    }

    fn on_pointer_move(&mut self, pos: Pos2, _options: &ToolOptions) -> Option<Command> {
        let anchor = self.anchor?;
        Some(Command::SetCropRect(Some(CropRect::from_anchor(anchor, pos))))
    }

    fn on_pointer_up(&mut self, pos: Pos2, _options: &ToolOptions) -> Option<Command> {
        // The rectangle stays pending until the crop is applied.
        let anchor = self.anchor.take()?;
        Some(Command::SetCropRect(Some(CropRect::from_anchor(anchor, pos))))
    }

    fn on_pointer_leave(&mut self) -> Option<Command> {
        self.anchor.take().map(|_| Command::SetCropRect(None))
    }

    fn is_active(&self) -> bool {
        self.anchor.is_some()
    }

    fn current_state_name(&self) -> &'static str {
        if self.anchor.is_some() { "Dragging" } else { "Idle" }
    }
}
