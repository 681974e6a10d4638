use egui::{ColorImage, Context, TextureHandle, TextureOptions};
use tiny_skia::Pixmap;

/// Keeps the GPU copy of the surface in sync with the compositor.
///
/// The texture is re-uploaded only when the surface revision changes.
#[derive(Default)]
pub struct TextureManager {
    handle: Option<TextureHandle>,
    revision: Option<u64>,
}

impl TextureManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texture_for(
        &mut self,
        ctx: &Context,
        surface: Option<&Pixmap>,
        revision: u64,
    ) -> Option<&TextureHandle> {
        let Some(surface) = surface else {
            self.invalidate();
            return None;
        };

        if self.revision != Some(revision) || self.handle.is_none() {
            let image = color_image(surface);
            match self.handle.as_mut() {
                Some(handle) => handle.set(image, TextureOptions::LINEAR),
                None => {
                    self.handle = Some(ctx.load_texture("surface", image, TextureOptions::LINEAR))
                }
            }
            self.revision = Some(revision);
            log::trace!("Uploaded surface texture (revision {})", revision);
        }
        self.handle.as_ref()
    }

    pub fn invalidate(&mut self) {
        self.handle = None;
        self.revision = None;
    }
}

/// Both sides are premultiplied RGBA, so the bytes carry over unchanged.
pub fn color_image(surface: &Pixmap) -> ColorImage {
    ColorImage::from_rgba_premultiplied(
        [surface.width() as usize, surface.height() as usize],
        surface.data(),
    )
}
