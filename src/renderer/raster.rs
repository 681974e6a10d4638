//! Pixel-level drawing onto the surface pixmap.

use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont, point};
use egui::{Color32, Pos2};
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform};

fn paint_for(color: Color32) -> Paint<'static> {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn brush_stroke(width: f32) -> Stroke {
    Stroke {
        width: width.max(0.1),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    }
}

/// Strokes one continuous path through `points` with round caps and joins.
pub fn stroke_polyline(surface: &mut Pixmap, points: &[Pos2], color: Color32, width: f32) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    let mut builder = PathBuilder::new();
    builder.move_to(first.x, first.y);
    for p in rest {
        builder.line_to(p.x, p.y);
    }
    // A lone move_to yields no path; there is nothing to stroke.
    let Some(path) = builder.finish() else {
        return;
    };
    surface.stroke_path(
        &path,
        &paint_for(color),
        &brush_stroke(width),
        Transform::identity(),
        None,
    );
}

/// Strokes a single segment, used for live brush feedback.
pub fn stroke_segment(surface: &mut Pixmap, from: Pos2, to: Pos2, color: Color32, width: f32) {
    stroke_polyline(surface, &[from, to], color, width);
}

/// Draws a decoded raster at the surface origin, native size.
pub fn draw_image(surface: &mut Pixmap, image: &Pixmap) {
    surface.draw_pixmap(
        0,
        0,
        image.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
}

/// Source-over blend of a straight-alpha color with `coverage` into one
/// premultiplied pixel.
fn blend_pixel(data: &mut [u8], index: usize, color: [u8; 4], coverage: f32) {
    let sa = (color[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let px = &mut data[index..index + 4];
    let inv = 1.0 - sa;
    let out_a = sa + (px[3] as f32 / 255.0) * inv;
    for c in 0..3 {
        let src = color[c] as f32 / 255.0 * sa;
        let dst = px[c] as f32 / 255.0;
        px[c] = ((src + dst * inv).min(out_a) * 255.0).round() as u8;
    }
    px[3] = (out_a * 255.0).round() as u8;
}

/// Renders one line of text with its baseline starting at `origin`.
pub fn draw_text(
    surface: &mut Pixmap,
    font: &FontArc,
    text: &str,
    origin: Pos2,
    font_size: f32,
    color: Color32,
) {
    let scale = PxScale::from(font_size.max(1.0));
    let scaled = font.as_scaled(scale);
    let rgba = color.to_srgba_unmultiplied();
    let (width, height) = (surface.width() as i32, surface.height() as i32);
    let data = surface.data_mut();

    let mut cursor_x = origin.x;
    let mut last_glyph: Option<GlyphId> = None;
    for ch in text.chars() {
        let glyph_id = font.glyph_id(ch);
        if let Some(prev) = last_glyph {
            cursor_x += scaled.kern(prev, glyph_id);
        }
        let glyph = glyph_id.with_scale_and_position(scale, point(cursor_x, origin.y));
        cursor_x += scaled.h_advance(glyph_id);
        last_glyph = Some(glyph_id);

        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let x = bounds.min.x as i32 + gx as i32;
            let y = bounds.min.y as i32 + gy as i32;
            if x < 0 || y < 0 || x >= width || y >= height {
                return;
            }
            let index = ((y * width + x) * 4) as usize;
            blend_pixel(data, index, rgba, coverage);
        });
    }
}

/// Straight-alpha RGBA copy of the surface.
pub fn to_rgba_image(surface: &Pixmap) -> image::RgbaImage {
    let mut buf = Vec::with_capacity(surface.data().len());
    for px in surface.pixels() {
        let c = px.demultiply();
        buf.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image::RgbaImage::from_raw(surface.width(), surface.height(), buf)
        .unwrap_or_else(|| image::RgbaImage::new(surface.width(), surface.height()))
}

pub fn encode_png(surface: &Pixmap) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(to_rgba_image(surface))
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    Ok(bytes)
}
