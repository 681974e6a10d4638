mod decode_cache;
pub mod raster;

pub use decode_cache::{ContentHash, DecodeCache, DecodeError, DecodeStatus, decode_to_pixmap};

use crate::layer::{Layer, LayerKind};
use ab_glyph::FontArc;
use std::collections::HashSet;
use tiny_skia::{Color, Pixmap};

/// Result of a redraw request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawOutcome {
    /// The surface was cleared and every visible layer repainted
    Drawn,
    /// No image layer exists; the surface has zero size
    Empty,
    /// A referenced image has not been decoded yet; nothing was drawn
    PendingDecode,
}

/// Rebuilds the surface bitmap from the layer stack.
///
/// Redraws are always full-surface and all-or-nothing: if any referenced
/// image is still pending the surface is left untouched.
pub struct Compositor {
    surface: Option<Pixmap>,
    cache: DecodeCache,
    font: Option<FontArc>,
    revision: u64,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("surface", &self.surface_size())
            .field("cache", &self.cache)
            .field("revision", &self.revision)
            .finish()
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    pub fn new() -> Self {
        let font = match FontArc::try_from_slice(epaint_default_fonts::UBUNTU_LIGHT) {
            Ok(font) => Some(font),
            Err(err) => {
                log::error!("Text layers disabled, bundled font failed to load: {}", err);
                None
            }
        };
        Self {
            surface: None,
            cache: DecodeCache::new(),
            font,
            revision: 0,
        }
    }

    /// Surface dimensions for a stack: those of its first image layer.
    pub fn surface_size_for(layers: &[Layer]) -> Option<(u32, u32)> {
        layers
            .iter()
            .find_map(|layer| layer.kind.as_image())
            .map(|image| (image.width, image.height))
            .filter(|(w, h)| *w > 0 && *h > 0)
    }

    pub fn surface(&self) -> Option<&Pixmap> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut Pixmap> {
        self.surface.as_mut()
    }

    pub fn surface_size(&self) -> Option<(u32, u32)> {
        self.surface.as_ref().map(|s| (s.width(), s.height()))
    }

    /// Bumped whenever surface pixels change, so the shell knows when to
    /// re-upload its texture.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn mark_dirty(&mut self) {
        self.revision += 1;
    }

    /// Registers every image referenced by `layers` with the decode cache and
    /// evicts the ones no longer referenced.
    pub fn prepare(&mut self, layers: &[Layer]) -> Vec<ContentHash> {
        let hashes: Vec<ContentHash> = layers
            .iter()
            .filter_map(|layer| match &layer.kind {
                LayerKind::Image(image) => Some(self.cache.request(&image.data)),
                _ => None,
            })
            .collect();
        let live: HashSet<ContentHash> = hashes.iter().copied().collect();
        self.cache.retain(&live);
        hashes
    }

    /// Waits for all referenced decodes, then repaints.
    pub async fn redraw(&mut self, layers: &[Layer]) -> RedrawOutcome {
        self.prepare(layers);
        self.cache.resolve_pending().await;
        self.composite(layers)
    }

    /// Synchronous driver for [`Compositor::redraw`].
    pub fn redraw_blocking(&mut self, layers: &[Layer]) -> RedrawOutcome {
        futures::executor::block_on(self.redraw(layers))
    }

    /// Repaints from already-decoded images. Leaves the surface untouched
    /// and reports [`RedrawOutcome::PendingDecode`] if any is missing.
    pub fn composite(&mut self, layers: &[Layer]) -> RedrawOutcome {
        let Some((width, height)) = Self::surface_size_for(layers) else {
            if self.surface.take().is_some() {
                self.revision += 1;
            }
            return RedrawOutcome::Empty;
        };

        let hashes = self.prepare(layers);
        if !self.cache.all_resolved(&hashes) {
            log::debug!("Redraw deferred, {} decodes pending", self.cache.pending_count());
            return RedrawOutcome::PendingDecode;
        }

        let resized = self.surface_size() != Some((width, height));
        if resized {
            self.surface = Pixmap::new(width, height);
        }
        let Some(surface) = self.surface.as_mut() else {
            return RedrawOutcome::Empty;
        };
        surface.fill(Color::TRANSPARENT);

        for layer in layers.iter().filter(|layer| layer.visible) {
            match &layer.kind {
                LayerKind::Image(image) => {
                    let hash = ContentHash::of(&image.data);
                    match self.cache.get(hash) {
                        Some(decoded) => raster::draw_image(surface, decoded),
                        None => log::warn!("Skipping undecodable image layer '{}'", layer.name),
                    }
                }
                LayerKind::Drawing(drawing) => raster::stroke_polyline(
                    surface,
                    &drawing.points,
                    drawing.brush_color,
                    drawing.brush_size,
                ),
                LayerKind::Text(text) => {
                    if let Some(font) = &self.font {
                        raster::draw_text(
                            surface,
                            font,
                            &text.text,
                            text.position,
                            text.font_size,
                            text.color,
                        );
                    }
                }
            }
        }

        self.revision += 1;
        log::debug!("Composited {} layers onto {}x{}", layers.len(), width, height);
        RedrawOutcome::Drawn
    }

    /// Straight-alpha copy of the current surface.
    pub fn snapshot(&self) -> Option<image::RgbaImage> {
        self.surface.as_ref().map(raster::to_rgba_image)
    }

    pub fn clear(&mut self) {
        self.surface = None;
        self.cache.clear();
        self.revision += 1;
    }
}
