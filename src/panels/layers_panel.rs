use crate::command::Command;
use crate::document::Direction;
use crate::editor::Editor;
use crate::layer::LayerId;

struct LayerRow {
    id: LayerId,
    label: String,
    visible: bool,
    is_top: bool,
    is_bottom: bool,
}

/// Layer list, topmost first, with a per-layer context menu.
pub fn layers_panel(ui: &mut egui::Ui, editor: &mut Editor) {
    ui.heading("Layers");
    if editor.layers().is_empty() {
        ui.weak("No layers yet");
        return;
    }

    let active = editor.document().active_layer_id();
    let count = editor.layers().len();
    let rows: Vec<LayerRow> = editor
        .layers()
        .iter()
        .enumerate()
        .rev()
        .map(|(index, layer)| LayerRow {
            id: layer.id,
            label: format!("{} ({})", layer.name, layer.kind.kind_name()),
            visible: layer.visible,
            is_top: index + 1 == count,
            is_bottom: index == 0,
        })
        .collect();

    let mut commands = Vec::new();
    for row in rows {
        ui.horizontal(|ui| {
            let mut visible = row.visible;
            if ui
                .checkbox(&mut visible, "")
                .on_hover_text("Toggle visibility")
                .changed()
            {
                commands.push(Command::ToggleVisibility(row.id));
            }

            let response = ui.selectable_label(active == Some(row.id), row.label.as_str());
            if response.clicked() {
                commands.push(Command::SetActiveLayer(Some(row.id)));
            }
            response.context_menu(|ui| {
                if ui.button("Duplicate").clicked() {
                    commands.push(Command::DuplicateLayer(row.id));
                    ui.close_menu();
                }
                if ui.button("Zoom to Layer").clicked() {
                    commands.push(Command::ZoomToLayer(row.id));
                    ui.close_menu();
                }
                ui.separator();
                if ui.add_enabled(!row.is_top, egui::Button::new("Move Up")).clicked() {
                    commands.push(Command::MoveLayer {
                        layer_id: row.id,
                        direction: Direction::Up,
                    });
                    ui.close_menu();
                }
                if ui.add_enabled(!row.is_bottom, egui::Button::new("Move Down")).clicked() {
                    commands.push(Command::MoveLayer {
                        layer_id: row.id,
                        direction: Direction::Down,
                    });
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Delete").clicked() {
                    commands.push(Command::DeleteLayer(row.id));
                    ui.close_menu();
                }
            });
        });
    }

    for command in commands {
        // errors are surfaced through last_error
        let _ = editor.execute(command);
    }
}
