use egui::{Pos2, Rect, Vec2};

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 16.0;

/// Offset plus uniform scale mapping surface space onto the viewport.
///
/// `screen = surface * zoom + offset`. All screen-space positions are
/// relative to the viewport's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub offset: Vec2,
    zoom: f32,
    min_zoom: f32,
    max_zoom: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(MIN_ZOOM, MAX_ZOOM)
    }
}

impl ViewTransform {
    pub fn new(min_zoom: f32, max_zoom: f32) -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0f32.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = self.clamp_zoom(zoom);
    }

    fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    pub fn to_screen(&self, surface: Pos2) -> Pos2 {
        Pos2::new(
            surface.x * self.zoom + self.offset.x,
            surface.y * self.zoom + self.offset.y,
        )
    }

    pub fn to_surface(&self, screen: Pos2) -> Pos2 {
        Pos2::new(
            (screen.x - self.offset.x) / self.zoom,
            (screen.y - self.offset.y) / self.zoom,
        )
    }

    /// Screen rectangle covered by a surface of the given size.
    pub fn screen_rect(&self, surface_size: Vec2) -> Rect {
        Rect::from_min_size(self.to_screen(Pos2::ZERO), surface_size * self.zoom)
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Changes zoom while keeping the surface point under `anchor` fixed.
    pub fn zoom_at(&mut self, anchor: Pos2, zoom: f32) {
        let surface = self.to_surface(anchor);
        self.zoom = self.clamp_zoom(zoom);
        self.offset = anchor.to_vec2() - surface.to_vec2() * self.zoom;
    }

    pub fn zoom_by(&mut self, anchor: Pos2, factor: f32) {
        self.zoom_at(anchor, self.zoom * factor);
    }

    /// Fits `content` (surface-space) inside the viewport minus `padding` on
    /// every side, never above 100 %, and centres it.
    pub fn fit_rect(&mut self, content: Rect, viewport: Vec2, padding: f32) {
        if content.width() <= 0.0 || content.height() <= 0.0 {
            return;
        }
        let available = (viewport - Vec2::splat(padding * 2.0)).max(Vec2::splat(1.0));
        let scale = (available.x / content.width())
            .min(available.y / content.height())
            .min(1.0);
        self.zoom = self.clamp_zoom(scale);
        let centre = viewport / 2.0;
        self.offset = centre - content.center().to_vec2() * self.zoom;
    }

    pub fn fit(&mut self, surface_size: Vec2, viewport: Vec2, padding: f32) {
        self.fit_rect(Rect::from_min_size(Pos2::ZERO, surface_size), viewport, padding);
    }

    /// Sets zoom to exactly 1 keeping the viewport centre's surface point.
    pub fn zoom_to_actual_size(&mut self, viewport: Vec2) {
        self.zoom_at((viewport / 2.0).to_pos2(), 1.0);
    }

    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = self.clamp_zoom(1.0);
    }
}
