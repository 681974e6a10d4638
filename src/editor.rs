use crate::ai::{self, AiEditResult, AiEditService, AiPanelState, ServiceError};
use crate::command::{Command, CommandContext, Effects};
use crate::config::EditorConfig;
use crate::document::Document;
use crate::error::{EditorError, EditorResult};
use crate::file_handler::{self, ImageFile};
use crate::input::{InputEvent, shortcuts};
use crate::layer::{Layer, LayerId};
use crate::renderer::{Compositor, RedrawOutcome, raster};
use crate::state::{PersistenceError, ProjectSnapshot, ProjectStorage};
use crate::tools::{
    BrushOptions, CropRect, PanGesture, TextOptions, Tool, ToolKind, ToolOptions, ToolType, zoom,
};
use crate::view::ViewTransform;
use egui::{Key, PointerButton, Vec2};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tiny_skia::Pixmap;

const MISSING_INPUT: &str = "Please upload an image and enter a prompt.";

/// A PNG ready to be handed to the user.
#[derive(Clone, PartialEq)]
pub struct ExportedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ExportedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportedImage")
            .field("file_name", &self.file_name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

struct PendingAiEdit {
    prompt: String,
    future: BoxFuture<'static, Result<AiEditResult, ServiceError>>,
}

/// The headless editor: owns the layer stack, the surface, the active tool
/// and everything that gets persisted. The egui shell only feeds it input
/// and reads back what to draw.
pub struct Editor {
    config: EditorConfig,
    document: Document,
    compositor: Compositor,
    view: ViewTransform,
    viewport: Vec2,
    tool: ToolType,
    options: ToolOptions,
    crop_rect: Option<CropRect>,
    image_file: Option<ImageFile>,
    prompt: String,
    ai_panel: AiPanelState,
    ai_service: Option<Arc<dyn AiEditService>>,
    pending_ai: Option<PendingAiEdit>,
    storage: Box<dyn ProjectStorage>,
    pan: PanGesture,
    space_held: bool,
    ui_visible: bool,
    confirm_new_project: bool,
    /// Prompt or option edits not yet written to storage
    unsaved: bool,
    last_error: Option<String>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("document", &self.document)
            .field("compositor", &self.compositor)
            .field("view", &self.view)
            .field("tool", &self.tool.kind())
            .field("crop_rect", &self.crop_rect)
            .field("ai_pending", &self.pending_ai.is_some())
            .finish_non_exhaustive()
    }
}

impl Editor {
    pub fn new(config: EditorConfig, storage: Box<dyn ProjectStorage>) -> Self {
        let options = ToolOptions {
            brush: config.brush.clone(),
            text: config.text.clone(),
        };
        Self {
            view: ViewTransform::new(config.min_zoom, config.max_zoom),
            config,
            document: Document::new(),
            compositor: Compositor::new(),
            viewport: Vec2::ZERO,
            tool: ToolType::default(),
            options,
            crop_rect: None,
            image_file: None,
            prompt: String::new(),
            ai_panel: AiPanelState::default(),
            ai_service: None,
            pending_ai: None,
            storage,
            pan: PanGesture::default(),
            space_held: false,
            ui_visible: true,
            confirm_new_project: false,
            unsaved: false,
            last_error: None,
        }
    }

    pub fn with_ai_service(mut self, service: Arc<dyn AiEditService>) -> Self {
        self.ai_service = Some(service);
        self
    }

    pub fn set_ai_service(&mut self, service: Arc<dyn AiEditService>) {
        self.ai_service = Some(service);
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn layers(&self) -> &[Layer] {
        self.document.layers()
    }

    pub fn surface(&self) -> Option<&Pixmap> {
        self.compositor.surface()
    }

    /// Changes whenever the surface pixels change.
    pub fn surface_revision(&self) -> u64 {
        self.compositor.revision()
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn tool(&self) -> &ToolType {
        &self.tool
    }

    pub fn tool_kind(&self) -> ToolKind {
        self.tool.kind()
    }

    pub fn options(&self) -> &ToolOptions {
        &self.options
    }

    pub fn crop_rect(&self) -> Option<CropRect> {
        self.crop_rect
    }

    pub fn image_file(&self) -> Option<&ImageFile> {
        self.image_file.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.document.background().is_some()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn ai_panel(&self) -> &AiPanelState {
        &self.ai_panel
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_active() || self.space_held
    }

    pub fn ui_visible(&self) -> bool {
        self.ui_visible
    }

    pub fn new_project_pending(&self) -> bool {
        self.confirm_new_project
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Records the viewport size. The first non-empty size fits the image.
    pub fn set_viewport_size(&mut self, size: Vec2) {
        let first = self.viewport.x <= 0.0 || self.viewport.y <= 0.0;
        self.viewport = size;
        if first && size.x > 0.0 && size.y > 0.0 {
            self.fit_view();
        }
    }

    fn fit_view(&mut self) {
        if let Some(background) = self.document.background() {
            let size = Vec2::new(background.width as f32, background.height as f32);
            self.view.fit(size, self.viewport, self.config.fit_padding);
        }
    }

    fn fail<T>(&mut self, err: impl Into<EditorError>) -> EditorResult<T> {
        let err = err.into();
        log::warn!("{}", err);
        self.last_error = Some(err.to_string());
        Err(err)
    }

    /// Runs a command and applies its effects.
    pub fn execute(&mut self, command: Command) -> EditorResult<()> {
        log::trace!("Executing {:?}", command);
        let mut ctx = CommandContext {
            document: &mut self.document,
            view: &mut self.view,
            viewport: self.viewport,
            tool: &mut self.tool,
            options: &self.options,
            crop_rect: &mut self.crop_rect,
            image_file: &mut self.image_file,
            surface: self.compositor.surface(),
            ui_visible: &mut self.ui_visible,
            config: &self.config,
        };
        match command.execute(&mut ctx) {
            Ok(effects) => {
                self.apply(effects);
                Ok(())
            }
            Err(err) => self.fail(err),
        }
    }

    fn apply(&mut self, effects: Effects) {
        if effects.redraw {
            self.redraw();
        }
        if effects.persist {
            self.persist();
        }
    }

    /// Recomposites the surface from the layer stack.
    pub fn redraw(&mut self) -> RedrawOutcome {
        self.compositor.redraw_blocking(self.document.layers())
    }

    fn run_tool_command(&mut self, command: Option<Command>) {
        if let Some(command) = command {
            // failures are already recorded in last_error
            let _ = self.execute(command);
        }
    }

    /// Routes one viewport input event.
    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown { pos, button, .. } => {
                if button == PointerButton::Middle || self.space_held {
                    self.pan.begin(pos);
                    return;
                }
                if button != PointerButton::Primary || !self.has_image() {
                    return;
                }
                let surface_pos = self.view.to_surface(pos);
                let command = self.tool.on_pointer_down(surface_pos, &self.options);
                self.run_tool_command(command);
            }

            InputEvent::PointerMove { pos } => {
                if let Some(delta) = self.pan.drag(pos) {
                    self.view.pan_by(delta);
                    return;
                }
                if !self.tool.is_active() {
                    return;
                }
                let surface_pos = self.view.to_surface(pos);
                let command = self.tool.on_pointer_move(surface_pos, &self.options);
                if let Some(surface) = self.compositor.surface_mut() {
                    self.tool.update_preview(surface);
                    self.compositor.mark_dirty();
                }
                self.run_tool_command(command);
            }

            InputEvent::PointerUp { pos, button } => {
                if self.pan.is_active() {
                    if button == PointerButton::Middle || button == PointerButton::Primary {
                        self.pan.end();
                    }
                    return;
                }
                if button != PointerButton::Primary {
                    return;
                }
                let surface_pos = self.view.to_surface(pos);
                let command = self.tool.on_pointer_up(surface_pos, &self.options);
                self.run_tool_command(command);
            }

            InputEvent::PointerLeave => {
                self.pan.end();
                let command = self.tool.on_pointer_leave();
                self.run_tool_command(command);
            }

            InputEvent::Wheel {
                pos,
                delta,
                modifiers,
            } => {
                if zoom::is_zoom_gesture(modifiers) {
                    let factor = zoom::wheel_factor(delta.y, self.config.zoom_step);
                    self.view.zoom_by(pos, factor);
                } else {
                    self.view.pan_by(delta);
                }
            }

            InputEvent::KeyDown {
                key,
                modifiers,
                repeat,
            } => {
                if key == Key::Space {
                    self.space_held = true;
                    return;
                }
                if repeat {
                    return;
                }
                let command = shortcuts::command_for_key(key, modifiers, self.tool.kind());
                self.run_tool_command(command);
            }

            InputEvent::KeyUp { key } => {
                if key == Key::Space {
                    self.space_held = false;
                    self.pan.end();
                }
            }
        }
    }

    pub fn set_tool(&mut self, kind: ToolKind) {
        self.run_tool_command(Some(Command::SetTool(kind)));
    }

    /// Prompt and option setters only mark the project as changed. They are
    /// called on every keystroke and slider frame; the shell writes the
    /// result with [`Editor::persist_if_dirty`] once input settles.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        let prompt = prompt.into();
        if self.prompt != prompt {
            self.prompt = prompt;
            self.unsaved = true;
        }
    }

    pub fn set_brush_options(&mut self, brush: BrushOptions) {
        if self.options.brush != brush {
            self.options.brush = brush;
            self.unsaved = true;
        }
    }

    pub fn set_text_options(&mut self, text: TextOptions) {
        if self.options.text != text {
            self.options.text = text;
            self.unsaved = true;
        }
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn persist_if_dirty(&mut self) {
        if self.unsaved {
            self.persist();
        }
    }

    /// Starts a new project from an uploaded file, replacing everything.
    pub fn load_image(&mut self, mut file: ImageFile) -> EditorResult<()> {
        let mime = match file_handler::resolve_mime_type(&file.mime_type, &file.name, &file.bytes) {
            Ok(mime) => mime,
            Err(err) => return self.fail(err),
        };
        let size = match file_handler::image_dimensions(&file.bytes) {
            Ok(size) => size,
            Err(err) => return self.fail(err),
        };
        log::info!("Loaded {} ({}, {}x{})", file.name, mime, size[0], size[1]);

        file.mime_type = mime.to_owned();
        let background = Layer::new_image("Background", file.bytes.clone(), mime, size);
        self.document.replace_with(background);
        self.image_file = Some(file);
        self.crop_rect = None;
        self.prompt.clear();
        self.ai_panel.reset();
        self.last_error = None;

        self.redraw();
        self.fit_view();
        self.persist();
        Ok(())
    }

    /// Encodes the composited surface as PNG.
    pub fn export_png(&mut self) -> EditorResult<ExportedImage> {
        if !self.has_image() {
            return self.fail(EditorError::EmptySurface);
        }
        self.redraw();
        let Some(surface) = self.compositor.surface() else {
            return self.fail(EditorError::EmptySurface);
        };
        match raster::encode_png(surface) {
            Ok(bytes) => Ok(ExportedImage {
                file_name: file_handler::export_file_name(self.image_file.as_ref()),
                bytes,
            }),
            Err(err) => self.fail(err),
        }
    }

    pub fn is_ai_loading(&self) -> bool {
        self.pending_ai.is_some()
    }

    /// Sends the uploaded image and the prompt to the AI service.
    pub fn request_ai_edit(&mut self) -> EditorResult<()> {
        if self.pending_ai.is_some() {
            return Err(EditorError::AiBusy);
        }
        let file = match &self.image_file {
            Some(file) if !self.prompt.trim().is_empty() => file,
            _ => {
                self.ai_panel.error = Some(MISSING_INPUT.to_owned());
                return Err(EditorError::InputValidation(MISSING_INPUT));
            }
        };
        let Some(service) = self.ai_service.clone() else {
            let err = ServiceError::new("No AI edit service is configured.");
            self.ai_panel.error = Some(err.to_string());
            return Err(err.into());
        };

        log::info!("Requesting AI edit: {:?}", self.prompt);
        let future = service.edit_image(file.bytes.clone(), file.mime_type.clone(), self.prompt.clone());
        self.ai_panel.start();
        self.pending_ai = Some(PendingAiEdit {
            prompt: self.prompt.clone(),
            future,
        });
        Ok(())
    }

    /// Polls the in-flight AI edit. `Ready(None)` when nothing is pending.
    pub fn poll_ai_edit(&mut self, cx: &mut Context<'_>) -> Poll<Option<EditorResult<LayerId>>> {
        let Some(pending) = self.pending_ai.as_mut() else {
            return Poll::Ready(None);
        };
        let result = match pending.future.poll_unpin(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(result) => result,
        };
        let prompt = match self.pending_ai.take() {
            Some(pending) => pending.prompt,
            None => String::new(),
        };
        Poll::Ready(Some(self.finish_ai_edit(&prompt, result)))
    }

    /// Requests an edit and blocks until it completes.
    pub fn run_ai_edit(&mut self) -> EditorResult<LayerId> {
        self.request_ai_edit()?;
        futures::executor::block_on(futures::future::poll_fn(|cx| self.poll_ai_edit(cx)))
            .unwrap_or(Err(EditorError::InputValidation("No AI edit in progress")))
    }

    fn finish_ai_edit(
        &mut self,
        prompt: &str,
        result: Result<AiEditResult, ServiceError>,
    ) -> EditorResult<LayerId> {
        self.ai_panel.is_loading = false;
        let outcome = result.and_then(|result| {
            let image = result.edited_image.ok_or_else(ServiceError::missing_image)?;
            Ok((image, result.text_response))
        });
        let (image, text_response) = match outcome {
            Ok(parts) => parts,
            Err(err) => {
                log::warn!("AI edit failed: {}", err);
                self.ai_panel.error = Some(err.to_string());
                return Err(err.into());
            }
        };

        let size = match file_handler::image_dimensions(&image.bytes) {
            Ok(size) => size,
            Err(err) => {
                self.ai_panel.error = Some(err.to_string());
                return Err(err);
            }
        };
        let name = ai::layer_name_for_prompt(prompt, self.config.ai_layer_name_chars);
        let layer = Layer::new_image(name, image.bytes, image.mime_type, size);
        let id = layer.id;
        log::info!("AI edit finished, adding layer '{}'", layer.name);

        self.ai_panel.text_response = text_response;
        self.document.add_layer(layer);
        self.document.set_active(Some(id));
        self.redraw();
        self.persist();
        Ok(id)
    }

    pub fn request_new_project(&mut self) {
        self.confirm_new_project = true;
    }

    pub fn cancel_new_project(&mut self) {
        self.confirm_new_project = false;
    }

    /// Drops everything and clears the persisted slot.
    pub fn confirm_new_project(&mut self) {
        if !self.confirm_new_project {
            return;
        }
        log::info!("Starting a new project");
        self.confirm_new_project = false;
        self.document.clear();
        self.compositor.clear();
        self.view.reset();
        self.tool = ToolType::default();
        self.options = ToolOptions {
            brush: self.config.brush.clone(),
            text: self.config.text.clone(),
        };
        self.crop_rect = None;
        self.image_file = None;
        self.prompt.clear();
        self.ai_panel.reset();
        self.pending_ai = None;
        self.pan.end();
        self.unsaved = false;
        self.last_error = None;
        if let Err(err) = self.storage.clear() {
            log::error!("Failed to clear saved project: {}", err);
        }
    }

    pub fn snapshot(&self) -> ProjectSnapshot {
        ProjectSnapshot {
            image_file: self.image_file.clone(),
            layers: self.document.layers().to_vec(),
            active_layer_id: self.document.active_layer_id(),
            active_tool: self.tool.kind(),
            prompt: self.prompt.clone(),
            brush_options: self.options.brush.clone(),
            text_options: self.options.text.clone(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }

    /// Writes the current project to storage. Failures are logged only.
    pub fn persist(&mut self) {
        self.unsaved = false;
        if let Err(err) = self.storage.save(&self.snapshot()) {
            log::error!("Failed to save project: {}", err);
        }
    }

    /// Loads the stored project, if any. A corrupt slot is discarded and the
    /// editor starts empty. Returns whether a project was restored.
    pub fn restore(&mut self) -> bool {
        let snapshot = match self.storage.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return false,
            Err(PersistenceError::Corrupt(reason)) => {
                log::warn!("Discarding corrupt saved project: {}", reason);
                if let Err(err) = self.storage.clear() {
                    log::error!("Failed to clear saved project: {}", err);
                }
                return false;
            }
            Err(err) => {
                log::error!("Failed to load saved project: {}", err);
                return false;
            }
        };

        log::info!("Restoring project with {} layers", snapshot.layers.len());
        self.document = Document::from_parts(snapshot.layers, snapshot.active_layer_id);
        self.image_file = snapshot.image_file;
        self.prompt = snapshot.prompt;
        self.options = ToolOptions {
            brush: snapshot.brush_options,
            text: snapshot.text_options,
        };
        let mut tool = ToolType::from(snapshot.active_tool);
        tool.activate();
        self.tool = tool;
        self.crop_rect = None;
        self.unsaved = false;

        self.redraw();
        self.fit_view();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryStorage;
    use egui::{Modifiers, Pos2};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut out = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    fn editor_with_image() -> Editor {
        let mut editor = Editor::new(EditorConfig::default(), Box::new(MemoryStorage::new()));
        editor.set_viewport_size(Vec2::new(400.0, 400.0));
        editor
            .load_image(ImageFile::new("cat.png", "image/png", png(200, 200)))
            .unwrap();
        editor
    }

    fn key(editor: &mut Editor, key: Key) {
        editor.handle_input(InputEvent::KeyDown {
            key,
            modifiers: Modifiers::NONE,
            repeat: false,
        });
    }

    #[test]
    fn upload_replaces_stack_with_background() {
        let mut editor = editor_with_image();
        editor.set_prompt("stale");
        editor
            .load_image(ImageFile::new("dog.png", "", png(50, 40)))
            .unwrap();

        let layers = editor.layers();
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].name, "Background");
        assert_eq!(editor.document().active_layer_id(), Some(layers[0].id));
        assert_eq!(editor.prompt(), "");
        assert_eq!(editor.surface().map(|s| (s.width(), s.height())), Some((50, 40)));
        assert_eq!(editor.image_file().map(|f| f.mime_type.as_str()), Some("image/png"));
    }

    #[test]
    fn unreadable_upload_is_reported() {
        let mut editor = Editor::new(EditorConfig::default(), Box::new(MemoryStorage::new()));
        let result = editor.load_image(ImageFile::new("notes.txt", "text/plain", b"hi".to_vec()));
        assert!(matches!(result, Err(EditorError::UnsupportedImage(_))));
        assert!(editor.last_error().is_some());
        assert!(editor.layers().is_empty());
    }

    #[test]
    fn space_drag_pans_instead_of_drawing() {
        let mut editor = editor_with_image();
        editor.set_tool(ToolKind::Brush);
        let before = editor.view().offset;

        key(&mut editor, Key::Space);
        editor.handle_input(InputEvent::PointerDown {
            pos: Pos2::new(10.0, 10.0),
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        });
        editor.handle_input(InputEvent::PointerMove {
            pos: Pos2::new(30.0, 15.0),
        });
        editor.handle_input(InputEvent::PointerUp {
            pos: Pos2::new(30.0, 15.0),
            button: PointerButton::Primary,
        });

        assert_eq!(editor.view().offset, before + Vec2::new(20.0, 5.0));
        assert_eq!(editor.layers().len(), 1);
    }

    #[test]
    fn switching_away_from_crop_clears_rect() {
        let mut editor = editor_with_image();
        key(&mut editor, Key::C);
        editor.execute(Command::SetCropRect(Some(CropRect::new(1.0, 1.0, 5.0, 5.0))))
            .unwrap();
        key(&mut editor, Key::B);
        assert_eq!(editor.tool_kind(), ToolKind::Brush);
        assert_eq!(editor.crop_rect(), None);
    }

    #[test]
    fn new_project_needs_confirmation() {
        let mut editor = editor_with_image();
        editor.confirm_new_project();
        assert_eq!(editor.layers().len(), 1);

        editor.request_new_project();
        editor.cancel_new_project();
        editor.confirm_new_project();
        assert_eq!(editor.layers().len(), 1);

        editor.request_new_project();
        editor.confirm_new_project();
        assert!(editor.layers().is_empty());
        assert!(editor.surface().is_none());
        assert!(editor.image_file().is_none());
    }

    #[test]
    fn export_uses_upload_name() {
        let mut editor = editor_with_image();
        let exported = editor.export_png().unwrap();
        assert_eq!(exported.file_name, "cat-edited.png");
        assert_eq!(file_handler::image_dimensions(&exported.bytes).unwrap(), [200, 200]);

        let mut empty = Editor::new(EditorConfig::default(), Box::new(MemoryStorage::new()));
        assert!(matches!(empty.export_png(), Err(EditorError::EmptySurface)));
    }
}
