use crate::command::Command;
use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};
use tiny_skia::Pixmap;

mod brush_tool;
pub use brush_tool::BrushTool;

mod crop_tool;
pub use crop_tool::{CropRect, CropTool};

mod pan;
pub use pan::PanGesture;

pub mod zoom;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushOptions {
    pub size: f32,
    pub color: Color32,
}

impl Default for BrushOptions {
    fn default() -> Self {
        Self {
            size: 10.0,
            color: Color32::WHITE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOptions {
    pub content: String,
    pub font_size: f32,
    pub color: Color32,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            content: "Hello World".to_owned(),
            font_size: 48.0,
            color: Color32::WHITE,
        }
    }
}

/// Process-wide editing defaults shared by the tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOptions {
    pub brush: BrushOptions,
    pub text: TextOptions,
}

/// Identifies a tool; this is what gets persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    #[default]
    Select,
    Crop,
    Brush,
    Text,
    AiEdit,
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        ToolKind::Select,
        ToolKind::Crop,
        ToolKind::Brush,
        ToolKind::Text,
        ToolKind::AiEdit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Crop => "Crop",
            ToolKind::Brush => "Brush",
            ToolKind::Text => "Text",
            ToolKind::AiEdit => "AI Edit",
        }
    }
}

/// Pointer-driven tool interface.
///
/// Positions are already in surface space. Handlers return the command that
/// should run as a consequence of the event, if any.
pub trait Tool {
    /// Return the name of the tool
    fn name(&self) -> &'static str;

    fn kind(&self) -> ToolKind;

    /// Called when the tool becomes active.
    fn activate(&mut self) {}

    /// Called when another tool takes over. Must drop any in-progress gesture.
    fn deactivate(&mut self);

    fn on_pointer_down(&mut self, _pos: Pos2, _options: &ToolOptions) -> Option<Command> {
        None
    }

    fn on_pointer_move(&mut self, _pos: Pos2, _options: &ToolOptions) -> Option<Command> {
        None
    }

    fn on_pointer_up(&mut self, _pos: Pos2, _options: &ToolOptions) -> Option<Command> {
        None
    }

    /// The pointer left the surface before `up`; abandon the gesture.
    fn on_pointer_leave(&mut self) -> Option<Command> {
        None
    }

    /// Paint transient feedback directly onto the live surface.
    fn update_preview(&mut self, _surface: &mut Pixmap) {}

    /// True while a down..up gesture is in progress.
    fn is_active(&self) -> bool {
        false
    }

    fn current_state_name(&self) -> &'static str {
        "Idle"
    }
}

/// Every tool, with its gesture state. Only one is active at a time.
#[derive(Debug, Clone, Default)]
pub enum ToolType {
    #[default]
    Select,
    Crop(CropTool),
    Brush(BrushTool),
    Text,
    AiEdit,
}

impl From<ToolKind> for ToolType {
    fn from(kind: ToolKind) -> Self {
        match kind {
            ToolKind::Select => ToolType::Select,
            ToolKind::Crop => ToolType::Crop(CropTool::new()),
            ToolKind::Brush => ToolType::Brush(BrushTool::new()),
            ToolKind::Text => ToolType::Text,
            ToolKind::AiEdit => ToolType::AiEdit,
        }
    }
}

impl Tool for ToolType {
    fn name(&self) -> &'static str {
        match self {
            Self::Crop(tool) => tool.name(),
            Self::Brush(tool) => tool.name(),
            other => other.kind().label(),
        }
    }

    fn kind(&self) -> ToolKind {
        match self {
            Self::Select => ToolKind::Select,
            Self::Crop(_) => ToolKind::Crop,
            Self::Brush(_) => ToolKind::Brush,
            Self::Text => ToolKind::Text,
            Self::AiEdit => ToolKind::AiEdit,
        }
    }

    fn activate(&mut self) {
        match self {
            Self::Crop(tool) => tool.activate(),
            Self::Brush(tool) => tool.activate(),
            _ => {}
        }
    }

    fn deactivate(&mut self) {
        match self {
            Self::Crop(tool) => tool.deactivate(),
            Self::Brush(tool) => tool.deactivate(),
            _ => {}
        }
    }

    fn on_pointer_down(&mut self, pos: Pos2, options: &ToolOptions) -> Option<Command> {
        match self {
            Self::Crop(tool) => tool.on_pointer_down(pos, options),
            Self::Brush(tool) => tool.on_pointer_down(pos, options),
            _ => None,
        }
    }

    fn on_pointer_move(&mut self, pos: Pos2, options: &ToolOptions) -> Option<Command> {
        match self {
            Self::Crop(tool) => tool.on_pointer_move(pos, options),
            Self::Brush(tool) => tool.on_pointer_move(pos, options),
            _ => None,
        }
    }

    fn on_pointer_up(&mut self, pos: Pos2, options: &ToolOptions) -> Option<Command> {
        match self {
            Self::Crop(tool) => tool.on_pointer_up(pos, options),
            Self::Brush(tool) => tool.on_pointer_up(pos, options),
            _ => None,
        }
    }

    fn on_pointer_leave(&mut self) -> Option<Command> {
        match self {
            Self::Crop(tool) => tool.on_pointer_leave(),
            Self::Brush(tool) => tool.on_pointer_leave(),
            _ => None,
        }
    }

    fn update_preview(&mut self, surface: &mut Pixmap) {
        if let Self::Brush(tool) = self {
            tool.update_preview(surface);
        }
    }

    fn is_active(&self) -> bool {
        match self {
            Self::Crop(tool) => tool.is_active(),
            Self::Brush(tool) => tool.is_active(),
            _ => false,
        }
    }

    fn current_state_name(&self) -> &'static str {
        match self {
            Self::Crop(tool) => tool.current_state_name(),
            Self::Brush(tool) => tool.current_state_name(),
            _ => "Idle",
        }
    }
}
