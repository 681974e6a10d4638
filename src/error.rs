use crate::ai::ServiceError;
use crate::state::PersistenceError;
use thiserror::Error;

/// Failures the editor reports back to the UI.
///
/// Layer-store, view and tool operations never fail; only the boundaries
/// listed here do.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The user asked for something the current state cannot provide
    #[error("{0}")]
    InputValidation(&'static str),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("An AI edit is already in progress")]
    AiBusy,

    #[error("Unsupported image type: {0}")]
    UnsupportedImage(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("There is no image on the canvas")]
    EmptySurface,

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}

pub type EditorResult<T> = Result<T, EditorError>;
