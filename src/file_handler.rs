use crate::error::{EditorError, EditorResult};
use eframe::egui;
use image::{ImageFormat, ImageReader};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// MIME types accepted for upload.
pub const SUPPORTED_MIME_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/webp"];

/// The uploaded source file, kept so AI edits and exports can refer back to it.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFile {
    pub name: String,
    pub mime_type: String,
    #[serde(with = "crate::state::encoding")]
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// File name without its final extension.
    pub fn base_name(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((base, _)) if !base.is_empty() => base,
            _ => &self.name,
        }
    }
}

fn mime_for_format(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

/// Picks the MIME type for an upload: the declared type when supported,
/// otherwise sniffed from the bytes, otherwise from the file extension.
pub fn resolve_mime_type(declared: &str, name: &str, bytes: &[u8]) -> EditorResult<&'static str> {
    if let Some(mime) = SUPPORTED_MIME_TYPES
        .iter()
        .find(|mime| mime.eq_ignore_ascii_case(declared.trim()))
    {
        return Ok(mime);
    }
    if let Some(mime) = image::guess_format(bytes).ok().and_then(mime_for_format) {
        return Ok(mime);
    }
    ImageFormat::from_path(name)
        .ok()
        .and_then(mime_for_format)
        .ok_or_else(|| EditorError::UnsupportedImage(name.to_owned()))
}

/// Reads width and height from the image header without a full decode.
pub fn image_dimensions(bytes: &[u8]) -> EditorResult<[u32; 2]> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?;
    let (width, height) = reader.into_dimensions()?;
    Ok([width, height])
}

#[cfg(not(target_arch = "wasm32"))]
impl ImageFile {
    /// Reads an upload from disk. The MIME type is resolved later by
    /// [`resolve_mime_type`], so it is only filled in from the extension.
    pub fn from_path(path: &std::path::Path) -> EditorResult<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_owned());
        let mime = ImageFormat::from_path(path)
            .ok()
            .and_then(mime_for_format)
            .unwrap_or_default();
        Ok(Self::new(name, mime, bytes))
    }
}

/// Native "Open image" dialog limited to the supported formats.
#[cfg(not(target_arch = "wasm32"))]
pub fn pick_image_path() -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open image")
        .add_filter("Images", &["png", "jpg", "jpeg", "webp"])
        .pick_file()
}

/// Native "Save" dialog for an export, `None` when cancelled.
#[cfg(not(target_arch = "wasm32"))]
pub fn pick_export_path(file_name: &str) -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title("Export image")
        .set_file_name(file_name)
        .add_filter("PNG", &["png"])
        .save_file()
}

/// `<base>-edited.png`, or a generic name when nothing was uploaded.
pub fn export_file_name(file: Option<&ImageFile>) -> String {
    let base = file.map(ImageFile::base_name).unwrap_or("edited-image");
    format!("{base}-edited.png")
}

/// Collects image files dropped onto the window.
#[derive(Debug, Default)]
pub struct FileHandler {
    dropped_files: Vec<egui::DroppedFile>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if new files were dropped this frame
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() {
            return false;
        }
        self.dropped_files = dropped;
        true
    }

    /// Drains the dropped files, keeping those that look like images and
    /// whose bytes are readable.
    pub fn take_image_files(&mut self) -> Vec<ImageFile> {
        std::mem::take(&mut self.dropped_files)
            .into_iter()
            .filter_map(|file| {
                let name = dropped_file_name(&file);
                if !is_image_file(&file) {
                    log::warn!("Dropped file is not a supported type: {}", name);
                    return None;
                }
                let bytes = read_dropped_bytes(&file, &name)?;
                Some(ImageFile::new(name, file.mime, bytes))
            })
            .collect()
    }

    /// Dim the window while files hover over it
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, Id, LayerId, Order, TextStyle};

        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }
        let painter =
            ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            "Drop an image to start editing",
            TextStyle::Heading.resolve(&ctx.style()),
            Color32::WHITE,
        );
    }
}

fn dropped_file_name(file: &egui::DroppedFile) -> String {
    if !file.name.is_empty() {
        return file.name.clone();
    }
    file.path
        .as_ref()
        .and_then(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_owned())
}

fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        return file.mime.starts_with("image/");
    }
    file.path
        .as_ref()
        .and_then(|path| ImageFormat::from_path(path).ok())
        .and_then(mime_for_format)
        .is_some()
}

fn read_dropped_bytes(file: &egui::DroppedFile, name: &str) -> Option<Vec<u8>> {
    if let Some(bytes) = &file.bytes {
        return Some(bytes.to_vec());
    }

    #[cfg(not(target_arch = "wasm32"))]
    if let Some(path) = &file.path {
        return match std::fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                log::error!("Failed to read image file {}: {}", path.display(), err);
                None
            }
        };
    }

    log::warn!("Dropped file has no accessible data: {}", name);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut out = Vec::new();
        RgbaImage::from_pixel(width, height, Rgba([1, 2, 3, 255]))
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn declared_mime_wins_when_supported() {
        assert_eq!(resolve_mime_type("image/webp", "a.png", &[]).unwrap(), "image/webp");
    }

    #[test]
    fn mime_falls_back_to_sniffing_then_extension() {
        let png = png_bytes(2, 2);
        assert_eq!(resolve_mime_type("", "photo", &png).unwrap(), "image/png");
        assert_eq!(resolve_mime_type("", "photo.JPG", b"no magic").unwrap(), "image/jpeg");
        assert!(matches!(
            resolve_mime_type("text/plain", "notes.txt", b"hello"),
            Err(EditorError::UnsupportedImage(_))
        ));
    }

    #[test]
    fn dimensions_come_from_header() {
        assert_eq!(image_dimensions(&png_bytes(7, 3)).unwrap(), [7, 3]);
        assert!(image_dimensions(b"garbage").is_err());
    }

    #[test]
    fn export_name_uses_base_name() {
        let file = ImageFile::new("holiday.final.jpg", "image/jpeg", Vec::new());
        assert_eq!(export_file_name(Some(&file)), "holiday.final-edited.png");
        assert_eq!(export_file_name(None), "edited-image-edited.png");

        let bare = ImageFile::new("scan", "image/png", Vec::new());
        assert_eq!(export_file_name(Some(&bare)), "scan-edited.png");
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn upload_from_disk_keeps_file_name() {
        let dir = std::env::temp_dir().join(format!("eframe-photo-open-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("holiday.PNG");
        std::fs::write(&path, png_bytes(3, 2)).unwrap();

        let file = ImageFile::from_path(&path).unwrap();
        assert_eq!(file.name, "holiday.PNG");
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(image_dimensions(&file.bytes).unwrap(), [3, 2]);

        let missing = ImageFile::from_path(&dir.join("nope.png"));
        assert!(matches!(missing, Err(EditorError::Io(_))));
        let _ = std::fs::remove_dir_all(dir);
    }
}
