use crate::config::EditorConfig;
use crate::document::Document;
use crate::file_handler::ImageFile;
use crate::tools::{CropRect, ToolOptions, ToolType};
use crate::view::ViewTransform;
use egui::Vec2;
use tiny_skia::Pixmap;

/// Everything a command may touch, borrowed from the editor for the
/// duration of one execution.
pub struct CommandContext<'a> {
    /// The layer stack being edited
    pub document: &'a mut Document,
    pub view: &'a mut ViewTransform,
    /// Size of the embedding viewport in screen pixels
    pub viewport: Vec2,
    pub tool: &'a mut ToolType,
    pub options: &'a ToolOptions,
    pub crop_rect: &'a mut Option<CropRect>,
    pub image_file: &'a mut Option<ImageFile>,
    /// The current composited surface, if any
    pub surface: Option<&'a Pixmap>,
    pub ui_visible: &'a mut bool,
    pub config: &'a EditorConfig,
}
