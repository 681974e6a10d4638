use crate::file_handler::ImageFile;
use crate::layer::{Layer, LayerId};
use crate::tools::{BrushOptions, TextOptions, ToolKind};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during state persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize project: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to access project storage: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored project is unreadable: {0}")]
    Corrupt(String),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Everything that survives a restart.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSnapshot {
    pub image_file: Option<ImageFile>,
    pub layers: Vec<Layer>,
    pub active_layer_id: Option<LayerId>,
    pub active_tool: ToolKind,
    pub prompt: String,
    pub brush_options: BrushOptions,
    pub text_options: TextOptions,
    /// Version of the application that wrote the snapshot
    pub version: String,
}

/// The upload as written to the slot. When an image layer carries the same
/// bytes (always true right after upload or crop) only its id is stored.
#[derive(Serialize)]
struct StoredUploadRef<'a> {
    name: &'a str,
    mime_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    layer: Option<LayerId>,
    #[serde(skip_serializing_if = "bytes_empty", with = "super::encoding")]
    bytes: &'a [u8],
}

fn bytes_empty(bytes: &&[u8]) -> bool {
    bytes.is_empty()
}

#[derive(Serialize)]
struct StoredProjectRef<'a> {
    image_file: Option<StoredUploadRef<'a>>,
    layers: &'a [Layer],
    active_layer_id: Option<LayerId>,
    active_tool: ToolKind,
    prompt: &'a str,
    brush_options: &'a BrushOptions,
    text_options: &'a TextOptions,
    version: &'a str,
}

#[derive(Deserialize)]
struct StoredUpload {
    name: String,
    mime_type: String,
    #[serde(default)]
    layer: Option<LayerId>,
    #[serde(default, with = "super::encoding")]
    bytes: Vec<u8>,
}

#[derive(Deserialize)]
struct StoredProject {
    image_file: Option<StoredUpload>,
    layers: Vec<Layer>,
    active_layer_id: Option<LayerId>,
    active_tool: ToolKind,
    prompt: String,
    brush_options: BrushOptions,
    text_options: TextOptions,
    #[serde(default)]
    version: String,
}

impl ProjectSnapshot {
    pub fn to_json(&self) -> PersistenceResult<String> {
        let image_file = self.image_file.as_ref().map(|file| {
            let shared = self.layers.iter().find(|layer| {
                layer
                    .kind
                    .as_image()
                    .is_some_and(|image| image.data == file.bytes)
            });
            let bytes: &[u8] = if shared.is_some() { &[] } else { &file.bytes };
            StoredUploadRef {
                name: &file.name,
                mime_type: &file.mime_type,
                layer: shared.map(|layer| layer.id),
                bytes,
            }
        });
        let stored = StoredProjectRef {
            image_file,
            layers: &self.layers,
            active_layer_id: self.active_layer_id,
            active_tool: self.active_tool,
            prompt: &self.prompt,
            brush_options: &self.brush_options,
            text_options: &self.text_options,
            version: &self.version,
        };
        Ok(serde_json::to_string(&stored)?)
    }

    /// Parses a stored slot. Anything that does not deserialize is `Corrupt`.
    pub fn from_json(json: &str) -> PersistenceResult<Self> {
        let stored: StoredProject =
            serde_json::from_str(json).map_err(|e| PersistenceError::Corrupt(e.to_string()))?;
        if stored.version != env!("CARGO_PKG_VERSION") {
            log::warn!(
                "Snapshot version {:?} differs from current version {}",
                stored.version,
                env!("CARGO_PKG_VERSION")
            );
        }

        let image_file = match stored.image_file {
            None => None,
            Some(upload) => {
                let bytes = match upload.layer {
                    None => upload.bytes,
                    Some(id) => stored
                        .layers
                        .iter()
                        .find(|layer| layer.id == id)
                        .and_then(|layer| layer.kind.as_image())
                        .map(|image| image.data.clone())
                        .ok_or_else(|| {
                            PersistenceError::Corrupt(format!("upload refers to missing layer {id}"))
                        })?,
                };
                Some(ImageFile::new(upload.name, upload.mime_type, bytes))
            }
        };

        Ok(Self {
            image_file,
            layers: stored.layers,
            active_layer_id: stored.active_layer_id,
            active_tool: stored.active_tool,
            prompt: stored.prompt,
            brush_options: stored.brush_options,
            text_options: stored.text_options,
            version: stored.version,
        })
    }
}

/// A single named slot holding the serialized project.
pub trait ProjectStorage: Send {
    /// Raw slot contents, `None` when nothing was ever saved.
    fn read_slot(&self) -> PersistenceResult<Option<String>>;

    fn write_slot(&self, contents: &str) -> PersistenceResult<()>;

    fn clear(&self) -> PersistenceResult<()>;

    fn load(&self) -> PersistenceResult<Option<ProjectSnapshot>> {
        match self.read_slot()? {
            Some(json) if !json.trim().is_empty() => ProjectSnapshot::from_json(&json).map(Some),
            _ => Ok(None),
        }
    }

    fn save(&self, snapshot: &ProjectSnapshot) -> PersistenceResult<()> {
        self.write_slot(&snapshot.to_json()?)
    }
}

/// In-process slot. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.lock().clone()
    }
}

impl ProjectStorage for MemoryStorage {
    fn read_slot(&self) -> PersistenceResult<Option<String>> {
        Ok(self.slot.lock().clone())
    }

    fn write_slot(&self, contents: &str) -> PersistenceResult<()> {
        *self.slot.lock() = Some(contents.to_owned());
        Ok(())
    }

    fn clear(&self) -> PersistenceResult<()> {
        *self.slot.lock() = None;
        Ok(())
    }
}

/// Slot stored as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    state_dir: PathBuf,
    key: String,
}

impl FileStorage {
    pub fn new(state_dir: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            state_dir: state_dir.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        Path::new(&self.state_dir).join(format!("{}.json", self.key))
    }
}

impl ProjectStorage for FileStorage {
    fn read_slot(&self) -> PersistenceResult<Option<String>> {
        match fs::read_to_string(self.path()) {
            Ok(json) => Ok(Some(json)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write_slot(&self, contents: &str) -> PersistenceResult<()> {
        fs::create_dir_all(&self.state_dir)?;
        fs::write(self.path(), contents)?;
        Ok(())
    }

    fn clear(&self) -> PersistenceResult<()> {
        match fs::remove_file(self.path()) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}
