use crate::PhotoApp;
use crate::ai::PROMPT_SUGGESTIONS;
use crate::command::Command;
use crate::editor::Editor;
use crate::tools::ToolKind;
use egui::{Button, Color32, SelectableLabel, Slider, TextEdit};

use super::layers_panel;

fn shortcut_hint(kind: ToolKind) -> &'static str {
    match kind {
        ToolKind::Select => "V",
        ToolKind::Crop => "C",
        ToolKind::Brush => "B",
        ToolKind::Text => "T",
        ToolKind::AiEdit => "A",
    }
}

pub fn tools_panel(app: &mut PhotoApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(false)
        .default_width(120.0)
        .show(ctx, |ui| {
            ui.heading("Tools");

            let active = app.editor().tool_kind();
            let has_image = app.editor().has_image();
            for kind in ToolKind::ALL {
                let enabled = has_image || kind == ToolKind::Select;
                let response = ui
                    .add_enabled(enabled, SelectableLabel::new(active == kind, kind.label()))
                    .on_hover_text(format!("Shortcut: {}", shortcut_hint(kind)));
                if response.clicked() {
                    log::info!("Tool selected from UI: {}", kind.label());
                    app.editor_mut().set_tool(kind);
                }
            }
            ui.separator();

            let editor = app.editor_mut();
            ui.label(format!("Zoom {:.0}%", editor.view().zoom() * 100.0));
            ui.horizontal(|ui| {
                let mut command = None;
                if ui.button("-").on_hover_text("Zoom out").clicked() {
                    command = Some(Command::ZoomOut);
                }
                if ui.button("+").on_hover_text("Zoom in").clicked() {
                    command = Some(Command::ZoomIn);
                }
                if ui.button("Fit").clicked() {
                    command = Some(Command::ZoomToFit);
                }
                if ui.button("1:1").clicked() {
                    command = Some(Command::ZoomToActualSize);
                }
                if let Some(command) = command {
                    let _ = editor.execute(command);
                }
            });
        });
}

/// Right-hand panel: options for the active tool above the layer list.
pub fn options_panel(app: &mut PhotoApp, ctx: &egui::Context) {
    egui::SidePanel::right("options_panel")
        .resizable(true)
        .default_width(260.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                match app.editor().tool_kind() {
                    ToolKind::Select => {
                        ui.weak("Pick a tool to start editing");
                    }
                    ToolKind::Crop => crop_options(ui, app.editor_mut()),
                    ToolKind::Brush => brush_options(ui, app.editor_mut()),
                    ToolKind::Text => text_options(ui, app.editor_mut()),
                    ToolKind::AiEdit => ai_panel(ui, app),
                }
                if let Some(error) = app.editor().last_error() {
                    ui.colored_label(Color32::LIGHT_RED, error);
                }
                ui.separator();
                layers_panel(ui, app.editor_mut());
            });
        });
}

fn crop_options(ui: &mut egui::Ui, editor: &mut Editor) {
    ui.heading("Crop");
    let Some(rect) = editor.crop_rect().map(|rect| rect.normalized()) else {
        ui.weak("Drag on the image to select an area");
        return;
    };
    ui.label(format!("{:.0} x {:.0} px", rect.width, rect.height));
    ui.horizontal(|ui| {
        if ui.button("Apply").on_hover_text("Enter").clicked() {
            let _ = editor.execute(Command::ApplyCrop);
        }
        if ui.button("Cancel").on_hover_text("Esc").clicked() {
            let _ = editor.execute(Command::CancelCrop);
        }
    });
}

fn brush_options(ui: &mut egui::Ui, editor: &mut Editor) {
    ui.heading("Brush");
    let mut brush = editor.options().brush.clone();
    ui.add(Slider::new(&mut brush.size, 1.0..=100.0).text("Size"));
    ui.horizontal(|ui| {
        ui.label("Color");
        ui.color_edit_button_srgba(&mut brush.color);
    });
    editor.set_brush_options(brush);
}

fn text_options(ui: &mut egui::Ui, editor: &mut Editor) {
    ui.heading("Text");
    let mut text = editor.options().text.clone();
    ui.add(TextEdit::singleline(&mut text.content).hint_text("Text"));
    ui.add(Slider::new(&mut text.font_size, 12.0..=256.0).text("Font size"));
    ui.horizontal(|ui| {
        ui.label("Color");
        ui.color_edit_button_srgba(&mut text.color);
    });
    editor.set_text_options(text);

    if ui.button("Add Text Layer").clicked() {
        let _ = editor.execute(Command::AddTextLayer);
    }
}

fn ai_panel(ui: &mut egui::Ui, app: &mut PhotoApp) {
    ui.heading("AI Magic Edit");
    let editor = app.editor_mut();
    let has_image = editor.image_file().is_some();
    let loading = editor.is_ai_loading();

    let mut prompt = editor.prompt().to_owned();
    let hint = if has_image {
        "e.g., Add a friendly robot..."
    } else {
        "Upload an image first"
    };
    let response = ui.add_enabled(
        has_image && !loading,
        TextEdit::multiline(&mut prompt)
            .hint_text(hint)
            .desired_rows(4),
    );
    if response.changed() {
        editor.set_prompt(prompt.clone());
    }

    if has_image {
        ui.weak("Suggestions");
        ui.horizontal_wrapped(|ui| {
            for suggestion in PROMPT_SUGGESTIONS {
                if ui.add_enabled(!loading, Button::new(suggestion).small()).clicked() {
                    prompt = suggestion.to_owned();
                    editor.set_prompt(suggestion);
                }
            }
        });
    }

    let panel = editor.ai_panel().clone();
    if let Some(error) = &panel.error {
        ui.colored_label(Color32::LIGHT_RED, error.as_str());
    }
    if let Some(text) = &panel.text_response {
        ui.colored_label(Color32::LIGHT_BLUE, text.as_str());
    }

    ui.horizontal(|ui| {
        let can_generate = has_image && !prompt.trim().is_empty() && !loading;
        let label = if loading { "Generating..." } else { "Generate Edit" };
        if ui.add_enabled(can_generate, Button::new(label)).clicked() {
            app.generate_ai_edit();
        }
        if loading {
            ui.spinner();
        }
    });
}
