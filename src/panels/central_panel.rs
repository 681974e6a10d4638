use crate::PhotoApp;
use crate::command::Command;
use crate::tools::{CropRect, ToolKind};
use crate::view::ViewTransform;
use egui::{Align2, Color32, CursorIcon, FontId, Painter, Pos2, Rect, Sense, Stroke};

pub fn central_panel(app: &mut PhotoApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none().fill(Color32::from_gray(24)))
        .show(ctx, |ui| {
            let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
            let viewport = response.rect;
            let (editor, input, textures) = app.viewport_parts();

            input.set_viewport_rect(viewport);
            // menus and windows drawn over the canvas keep their clicks
            input.set_pointer_blocked(!(response.hovered() || response.dragged()));
            editor.set_viewport_size(viewport.size());
            for event in input.process_input(ctx) {
                editor.handle_input(event);
            }

            if !editor.has_image() {
                painter.text(
                    viewport.center(),
                    Align2::CENTER_CENTER,
                    "Drop an image here to start editing",
                    FontId::proportional(20.0),
                    Color32::GRAY,
                );
                #[cfg(not(target_arch = "wasm32"))]
                {
                    let button = Rect::from_center_size(
                        viewport.center() + egui::vec2(0.0, 40.0),
                        egui::vec2(140.0, 28.0),
                    );
                    if ui.put(button, egui::Button::new("Open image…")).clicked() {
                        app.open_image_dialog();
                    }
                }
                return;
            }

            if let Some(texture) = textures.texture_for(ctx, editor.surface(), editor.surface_revision()) {
                let screen = editor
                    .view()
                    .screen_rect(texture.size_vec2())
                    .translate(viewport.min.to_vec2());
                let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
                painter.image(texture.id(), screen, uv, Color32::WHITE);
            }

            if let Some(crop) = editor.crop_rect() {
                draw_crop_overlay(&painter, editor.view(), viewport, crop);
            }

            if response.hovered() {
                let cursor = if editor.is_panning() {
                    CursorIcon::Grab
                } else if matches!(editor.tool_kind(), ToolKind::Brush | ToolKind::Crop) {
                    CursorIcon::Crosshair
                } else {
                    CursorIcon::Default
                };
                ctx.set_cursor_icon(cursor);
            }

            let ui_visible = editor.ui_visible();
            response.context_menu(|ui| {
                let mut command = None;
                if ui.button("Zoom to Fit").clicked() {
                    command = Some(Command::ZoomToFit);
                }
                if ui.button("Zoom to 100%").clicked() {
                    command = Some(Command::ZoomToActualSize);
                }
                ui.separator();
                if ui.button(if ui_visible { "Hide UI" } else { "Show UI" }).clicked() {
                    command = Some(Command::ToggleUi);
                }
                if let Some(command) = command {
                    let _ = editor.execute(command);
                    ui.close_menu();
                }
            });
        });
}

/// Shades everything outside the pending crop and outlines it.
fn draw_crop_overlay(painter: &Painter, view: &ViewTransform, viewport: Rect, crop: CropRect) {
    let area = crop.to_rect();
    let offset = viewport.min.to_vec2();
    let selection = Rect::from_min_max(view.to_screen(area.min) + offset, view.to_screen(area.max) + offset);

    let shade = Color32::from_black_alpha(128);
    let bands = [
        Rect::from_min_max(viewport.min, Pos2::new(viewport.max.x, selection.min.y)),
        Rect::from_min_max(Pos2::new(viewport.min.x, selection.max.y), viewport.max),
        Rect::from_min_max(
            Pos2::new(viewport.min.x, selection.min.y),
            Pos2::new(selection.min.x, selection.max.y),
        ),
        Rect::from_min_max(
            Pos2::new(selection.max.x, selection.min.y),
            Pos2::new(viewport.max.x, selection.max.y),
        ),
    ];
    for band in bands {
        let band = band.intersect(viewport);
        if band.is_positive() {
            painter.rect_filled(band, 0.0, shade);
        }
    }
    painter.rect_stroke(selection, 0.0, Stroke::new(1.0, Color32::WHITE));
}
