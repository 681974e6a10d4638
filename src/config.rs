use crate::tools::{BrushOptions, TextOptions};
use egui::Pos2;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid zoom range {min}..={max}")]
    ZoomRange { min: f32, max: f32 },
}

/// Editor-wide tunables. Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Zoom factor applied per wheel notch and per zoom in/out command
    pub zoom_step: f32,
    /// Screen pixels kept free around the image by zoom-to-fit
    pub fit_padding: f32,
    /// Where new text layers are anchored (baseline origin)
    pub default_text_position: Pos2,
    /// How many prompt characters name an AI-generated layer
    pub ai_layer_name_chars: usize,
    /// How many characters of its content name a text layer
    pub text_layer_name_chars: usize,
    /// Name of the persisted project slot
    pub storage_key: String,
    pub brush: BrushOptions,
    pub text: TextOptions,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_zoom: crate::view::MIN_ZOOM,
            max_zoom: crate::view::MAX_ZOOM,
            zoom_step: 1.2,
            fit_padding: 40.0,
            default_text_position: Pos2::new(50.0, 100.0),
            ai_layer_name_chars: 20,
            text_layer_name_chars: 20,
            storage_key: "photo-editor-project".to_owned(),
            brush: BrushOptions::default(),
            text: TextOptions::default(),
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom > 0.0 && self.min_zoom <= 1.0 && self.max_zoom >= 1.0) {
            return Err(ConfigError::ZoomRange {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        Ok(())
    }
}
