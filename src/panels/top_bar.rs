use crate::PhotoApp;
use egui::{Align, Align2, Button, Layout};

pub fn top_bar(app: &mut PhotoApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.strong("Photo Editor");
            ui.separator();
            match app.editor().image_file() {
                Some(file) => ui.label(file.name.as_str()),
                None => ui.weak("No image"),
            };

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let has_image = app.editor().has_image();
                if ui.add_enabled(has_image, Button::new("Export")).clicked() {
                    app.export();
                }
                #[cfg(not(target_arch = "wasm32"))]
                if ui.button("Open image…").clicked() {
                    app.open_image_dialog();
                }
                if ui.button("New Project").clicked() {
                    app.editor_mut().request_new_project();
                }
                if let Some(status) = app.status() {
                    ui.weak(status);
                }
            });
        });
    });
}

/// Confirmation before throwing the project away.
pub fn new_project_dialog(app: &mut PhotoApp, ctx: &egui::Context) {
    if !app.editor().new_project_pending() {
        return;
    }
    egui::Window::new("New Project")
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label("Discard the current project and start over? This cannot be undone.");
            ui.horizontal(|ui| {
                if ui.button("Start over").clicked() {
                    app.editor_mut().confirm_new_project();
                    app.textures_mut().invalidate();
                }
                if ui.button("Cancel").clicked() {
                    app.editor_mut().cancel_new_project();
                }
            });
        });
}
