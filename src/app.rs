use crate::config::EditorConfig;
use crate::editor::{Editor, ExportedImage};
use crate::file_handler::{FileHandler, ImageFile};
use crate::input::InputHandler;
use crate::panels;
use crate::state::MemoryStorage;
use crate::texture_manager::TextureManager;
use std::sync::Arc;
use std::task::{Poll, Wake, Waker};

/// Wakes the UI when the in-flight AI edit makes progress.
struct RepaintWaker(egui::Context);

impl Wake for RepaintWaker {
    fn wake(self: Arc<Self>) {
        self.0.request_repaint();
    }
}

pub struct PhotoApp {
    editor: Editor,
    /// Live copy of the persisted slot, flushed into eframe storage on save
    slot: MemoryStorage,
    storage_key: String,
    input: InputHandler,
    file_handler: FileHandler,
    textures: TextureManager,
    status: Option<String>,
}

impl PhotoApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, config: EditorConfig) -> Self {
        let storage_key = config.storage_key.clone();
        let slot = match cc.storage.and_then(|storage| storage.get_string(&storage_key)) {
            Some(contents) => MemoryStorage::with_contents(contents),
            None => MemoryStorage::new(),
        };
        let mut editor = Editor::new(config, Box::new(slot.clone()));
        if editor.restore() {
            log::info!("Restored previous project");
        }

        Self {
            editor,
            slot,
            storage_key,
            input: InputHandler::new(),
            file_handler: FileHandler::new(),
            textures: TextureManager::new(),
            status: None,
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn input_mut(&mut self) -> &mut InputHandler {
        &mut self.input
    }

    pub fn textures_mut(&mut self) -> &mut TextureManager {
        &mut self.textures
    }

    /// Split borrow used by the viewport, which draws the texture while
    /// reading editor state.
    pub fn viewport_parts(&mut self) -> (&mut Editor, &mut InputHandler, &mut TextureManager) {
        (&mut self.editor, &mut self.input, &mut self.textures)
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn load_image(&mut self, file: ImageFile) {
        if self.editor.load_image(file).is_ok() {
            self.textures.invalidate();
            self.status = None;
        }
    }

    /// Asks for an image with the native file dialog and loads it.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open_image_dialog(&mut self) {
        let Some(path) = crate::file_handler::pick_image_path() else {
            return;
        };
        match ImageFile::from_path(&path) {
            Ok(file) => self.load_image(file),
            Err(err) => {
                log::error!("Failed to open {}: {}", path.display(), err);
                self.status = Some(err.to_string());
            }
        }
    }

    pub fn export(&mut self) {
        match self.editor.export_png() {
            Ok(exported) => self.status = save_export(exported),
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    pub fn generate_ai_edit(&mut self) {
        if let Err(err) = self.editor.request_ai_edit() {
            log::debug!("AI edit not started: {}", err);
        }
    }

    fn poll_ai_edit(&mut self, ctx: &egui::Context) {
        if !self.editor.is_ai_loading() {
            return;
        }
        let waker = Waker::from(Arc::new(RepaintWaker(ctx.clone())));
        let mut cx = std::task::Context::from_waker(&waker);
        if let Poll::Ready(Some(Err(err))) = self.editor.poll_ai_edit(&mut cx) {
            log::warn!("AI edit failed: {}", err);
        }
    }
}

/// Offers the PNG through a save dialog. `None` status when cancelled.
#[cfg(not(target_arch = "wasm32"))]
fn save_export(exported: ExportedImage) -> Option<String> {
    let path = crate::file_handler::pick_export_path(&exported.file_name)?;
    Some(match std::fs::write(&path, &exported.bytes) {
        Ok(()) => {
            log::info!("Exported {}", path.display());
            format!("Saved {}", path.display())
        }
        Err(err) => {
            log::error!("Failed to write {}: {}", path.display(), err);
            format!("Export failed: {err}")
        }
    })
}

#[cfg(target_arch = "wasm32")]
fn save_export(exported: ExportedImage) -> Option<String> {
    Some(match crate::web::download(&exported.file_name, &exported.bytes) {
        Ok(()) => format!("Downloaded {}", exported.file_name),
        Err(err) => {
            log::error!("Download failed: {:?}", err);
            "Export failed".to_owned()
        }
    })
}

impl eframe::App for PhotoApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.editor.persist_if_dirty();
        storage.set_string(&self.storage_key, self.slot.contents().unwrap_or_default());
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_ai_edit(ctx);

        if self.file_handler.check_for_dropped_files(ctx) {
            if let Some(file) = self.file_handler.take_image_files().into_iter().next() {
                self.load_image(file);
            }
        }

        if self.editor.ui_visible() {
            panels::top_bar(self, ctx);
            panels::tools_panel(self, ctx);
            panels::options_panel(self, ctx);
        }
        panels::central_panel(self, ctx);
        panels::new_project_dialog(self, ctx);

        // Slider drags and typing only mark the project dirty; write it once
        // the pointer is released and no text field has focus.
        let settled = !ctx.input(|i| i.pointer.any_down()) && !ctx.wants_keyboard_input();
        if settled {
            self.editor.persist_if_dirty();
        }

        self.file_handler.preview_files_being_dropped(ctx);
    }
}
