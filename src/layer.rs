use egui::{Color32, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A unique identifier for a layer. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(pub Uuid);

impl LayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Encoded raster content of an image layer.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageLayer {
    /// Encoded bytes (PNG, JPEG or WEBP)
    #[serde(with = "crate::state::encoding")]
    pub data: Vec<u8>,
    pub mime_type: String,
    /// Intrinsic raster width
    pub width: u32,
    /// Intrinsic raster height
    pub height: u32,
}

impl fmt::Debug for ImageLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageLayer")
            .field("data_len", &self.data.len())
            .field("mime_type", &self.mime_type)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// A freehand polyline in surface space.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrawingLayer {
    pub points: Vec<Pos2>,
    pub brush_color: Color32,
    pub brush_size: f32,
}

/// A single line of text anchored at its baseline origin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextLayer {
    pub text: String,
    pub font_size: f32,
    pub color: Color32,
    pub position: Pos2,
}

/// Kind-specific payload of a layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerKind {
    Image(ImageLayer),
    Drawing(DrawingLayer),
    Text(TextLayer),
}

impl LayerKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            LayerKind::Image(_) => "image",
            LayerKind::Drawing(_) => "drawing",
            LayerKind::Text(_) => "text",
        }
    }

    pub fn as_image(&self) -> Option<&ImageLayer> {
        match self {
            LayerKind::Image(image) => Some(image),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Layer {
    /// Unique identifier for the layer
    pub id: LayerId,
    /// Display name of the layer
    pub name: String,
    /// Whether the compositor draws this layer
    pub visible: bool,
    /// Content of the layer
    pub kind: LayerKind,
}

impl Layer {
    pub fn new(name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id: LayerId::new(),
            name: name.into(),
            visible: true,
            kind,
        }
    }

    pub fn new_image(
        name: impl Into<String>,
        data: Vec<u8>,
        mime_type: impl Into<String>,
        size: [u32; 2],
    ) -> Self {
        Self::new(
            name,
            LayerKind::Image(ImageLayer {
                data,
                mime_type: mime_type.into(),
                width: size[0],
                height: size[1],
            }),
        )
    }

    pub fn new_drawing(points: Vec<Pos2>, brush_color: Color32, brush_size: f32) -> Self {
        Self::new(
            "Drawing",
            LayerKind::Drawing(DrawingLayer {
                points,
                brush_color,
                brush_size,
            }),
        )
    }

    pub fn new_text(name: impl Into<String>, text: TextLayer) -> Self {
        Self::new(name, LayerKind::Text(text))
    }

    /// Copy of this layer under a fresh id, named "<name> Copy".
    pub fn duplicate(&self) -> Self {
        Self {
            id: LayerId::new(),
            name: format!("{} Copy", self.name),
            visible: self.visible,
            kind: self.kind.clone(),
        }
    }

    /// Approximate surface-space bounds of the layer's content.
    ///
    /// Text has no font metrics here, so its box is estimated from the font
    /// size and the character count.
    pub fn bounds(&self) -> Option<Rect> {
        match &self.kind {
            LayerKind::Image(image) => Some(Rect::from_min_size(
                Pos2::ZERO,
                Vec2::new(image.width as f32, image.height as f32),
            )),
            LayerKind::Drawing(drawing) => {
                let first = drawing.points.first()?;
                let mut rect = Rect::from_min_max(*first, *first);
                for point in &drawing.points[1..] {
                    rect.extend_with(*point);
                }
                Some(rect.expand(drawing.brush_size / 2.0))
            }
            LayerKind::Text(text) => {
                let width = text.font_size * 0.6 * text.text.chars().count() as f32;
                Some(Rect::from_min_max(
                    Pos2::new(text.position.x, text.position.y - text.font_size),
                    Pos2::new(text.position.x + width, text.position.y + text.font_size * 0.25),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_keeps_content_and_renames() {
        let layer = Layer::new_drawing(
            vec![Pos2::new(1.0, 2.0), Pos2::new(3.0, 4.0)],
            Color32::RED,
            4.0,
        );
        let copy = layer.duplicate();
        assert_ne!(copy.id, layer.id);
        assert_eq!(copy.name, "Drawing Copy");
        assert_eq!(copy.kind, layer.kind);
    }

    #[test]
    fn drawing_bounds_include_brush_radius() {
        let layer = Layer::new_drawing(
            vec![Pos2::new(10.0, 10.0), Pos2::new(20.0, 30.0)],
            Color32::WHITE,
            4.0,
        );
        let bounds = layer.bounds().unwrap();
        assert_eq!(bounds.min, Pos2::new(8.0, 8.0));
        assert_eq!(bounds.max, Pos2::new(22.0, 32.0));
    }

    #[test]
    fn kind_is_tagged_in_json() {
        let layer = Layer::new_text(
            "Hello",
            TextLayer {
                text: "Hello".to_owned(),
                font_size: 48.0,
                color: Color32::WHITE,
                position: Pos2::new(50.0, 100.0),
            },
        );
        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json["kind"]["type"], "text");
    }
}
