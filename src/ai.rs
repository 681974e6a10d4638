//! Port for the remote AI image-edit service and the panel state around it.

use futures::future::BoxFuture;
use thiserror::Error;

/// Canned prompts offered under the prompt box.
pub const PROMPT_SUGGESTIONS: [&str; 6] = [
    "Change the season to winter",
    "Add a dragon flying in the sky",
    "Make it a vintage polaroid photo",
    "Add dramatic, cinematic lighting",
    "Give it a cyberpunk neon glow",
    "Turn this into a watercolor painting",
];

/// Failure reported by the AI edit service, carrying a message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to edit image: {message}")]
pub struct ServiceError {
    pub message: String,
}

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The service answered but returned no picture.
    pub fn missing_image() -> Self {
        Self::new("API did not return an edited image.")
    }
}

/// An image returned by the service.
#[derive(Clone, PartialEq)]
pub struct EditedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl std::fmt::Debug for EditedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditedImage")
            .field("bytes", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AiEditResult {
    pub edited_image: Option<EditedImage>,
    pub text_response: Option<String>,
}

/// Edits an image according to a natural-language prompt.
///
/// Implementations own their transport. A result without `edited_image` is
/// treated as a failure by the editor.
pub trait AiEditService: Send + Sync {
    fn edit_image(
        &self,
        bytes: Vec<u8>,
        mime_type: String,
        prompt: String,
    ) -> BoxFuture<'static, Result<AiEditResult, ServiceError>>;
}

/// What the AI panel shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AiPanelState {
    pub is_loading: bool,
    pub error: Option<String>,
    pub text_response: Option<String>,
}

impl AiPanelState {
    pub fn start(&mut self) {
        self.is_loading = true;
        self.error = None;
        self.text_response = None;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Layer name for an edit result: the first `max_chars` characters of the
/// prompt, or "AI Edit" when that is blank.
pub fn layer_name_for_prompt(prompt: &str, max_chars: usize) -> String {
    let name: String = prompt.chars().take(max_chars).collect();
    if name.trim().is_empty() {
        "AI Edit".to_owned()
    } else {
        name
    }
}
