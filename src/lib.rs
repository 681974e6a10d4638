#![warn(clippy::all, rust_2018_idioms)]

pub mod ai;
pub mod app;
pub mod command;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod file_handler;
pub mod input;
pub mod layer;
pub mod panels;
pub mod renderer;
pub mod state;
pub mod texture_manager;
pub mod tools;
pub mod view;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use ai::{AiEditResult, AiEditService, AiPanelState, EditedImage, ServiceError};
pub use app::PhotoApp;
pub use command::{Command, Effects};
pub use config::{ConfigError, EditorConfig};
pub use document::{Direction, Document};
pub use editor::{Editor, ExportedImage};
pub use error::{EditorError, EditorResult};
pub use file_handler::ImageFile;
pub use input::{InputEvent, InputHandler};
pub use layer::{Layer, LayerId, LayerKind};
pub use renderer::{Compositor, RedrawOutcome};
pub use state::{FileStorage, MemoryStorage, PersistenceError, ProjectSnapshot, ProjectStorage};
pub use tools::{Tool, ToolKind, ToolOptions, ToolType};
pub use view::ViewTransform;
