use super::{CommandContext, CommandResult, Effects};
use crate::document::Direction;
use crate::layer::{Layer, LayerId, TextLayer};
use crate::renderer::raster;
use crate::tools::{CropRect, Tool, ToolKind, ToolType};
use egui::Vec2;
use tiny_skia::IntRect;

/// Layer- and viewport-scoped commands issued by tools, menus and shortcuts.
#[derive(Debug, Clone)]
pub enum Command {
    /// Append a fully formed layer on top of the stack
    AddLayer(Layer),
    DeleteLayer(LayerId),
    DeleteActiveLayer,
    DuplicateLayer(LayerId),
    DuplicateActiveLayer,
    MoveLayer {
        layer_id: LayerId,
        direction: Direction,
    },
    ToggleVisibility(LayerId),
    SetActiveLayer(Option<LayerId>),
    RenameLayer {
        layer_id: LayerId,
        name: String,
    },

    /// Add a text layer from the current text options
    AddTextLayer,

    SetCropRect(Option<CropRect>),
    /// Replace the whole stack with the pending crop region
    ApplyCrop,
    CancelCrop,

    SetTool(ToolKind),

    ZoomIn,
    ZoomOut,
    ZoomToFit,
    ZoomToActualSize,
    ZoomToLayer(LayerId),
    ToggleUi,

    /// Recomposite without any model change (drops live brush feedback)
    RefreshSurface,
}

fn truncated(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Swaps the active tool. A gesture in progress is dropped, so the surface
/// needs a repaint if it was showing live feedback.
fn switch_tool(ctx: &mut CommandContext<'_>, kind: ToolKind) -> Effects {
    if ctx.tool.kind() == kind {
        return Effects::NONE;
    }
    log::info!("Switching tool: {} -> {}", ctx.tool.name(), kind.label());
    let interrupted = ctx.tool.is_active();
    ctx.tool.deactivate();
    if kind != ToolKind::Crop {
        *ctx.crop_rect = None;
    }
    let mut tool = ToolType::from(kind);
    tool.activate();
    *ctx.tool = tool;
    if interrupted {
        Effects::SETTINGS.merge(Effects::SURFACE)
    } else {
        Effects::SETTINGS
    }
}

fn fit_background(ctx: &mut CommandContext<'_>) {
    if let Some(background) = ctx.document.background() {
        let size = Vec2::new(background.width as f32, background.height as f32);
        ctx.view.fit(size, ctx.viewport, ctx.config.fit_padding);
    }
}

impl Command {
    /// Execute the command with the given context
    pub fn execute(self, ctx: &mut CommandContext<'_>) -> CommandResult {
        match self {
            Command::AddLayer(layer) => {
                ctx.document.add_layer(layer);
                Ok(Effects::LAYERS)
            }

            Command::DeleteLayer(layer_id) => {
                if ctx.document.get_layer(layer_id).is_none() {
                    return Ok(Effects::NONE);
                }
                ctx.document.delete_layer(layer_id);
                Ok(Effects::LAYERS)
            }

            Command::DeleteActiveLayer => match ctx.document.active_layer_id() {
                Some(id) => Command::DeleteLayer(id).execute(ctx),
                None => Ok(Effects::NONE),
            },

            Command::DuplicateLayer(layer_id) => {
                Ok(match ctx.document.duplicate_layer(layer_id) {
                    Some(_) => Effects::LAYERS,
                    None => Effects::NONE,
                })
            }

            Command::DuplicateActiveLayer => match ctx.document.active_layer_id() {
                Some(id) => Command::DuplicateLayer(id).execute(ctx),
                None => Ok(Effects::NONE),
            },

            Command::MoveLayer {
                layer_id,
                direction,
            } => {
                let before = ctx.document.index_of(layer_id);
                ctx.document.reorder(layer_id, direction);
                Ok(if ctx.document.index_of(layer_id) != before {
                    Effects::LAYERS
                } else {
                    Effects::NONE
                })
            }

            Command::ToggleVisibility(layer_id) => {
                if ctx.document.get_layer(layer_id).is_none() {
                    return Ok(Effects::NONE);
                }
                ctx.document.toggle_visibility(layer_id);
                Ok(Effects::LAYERS)
            }

            Command::SetActiveLayer(layer_id) => {
                ctx.document.set_active(layer_id);
                Ok(Effects::SETTINGS)
            }

            Command::RenameLayer { layer_id, name } => {
                Ok(if ctx.document.rename_layer(layer_id, name) {
                    Effects::SETTINGS
                } else {
                    Effects::NONE
                })
            }

            Command::AddTextLayer => {
                let text = &ctx.options.text;
                let name = match truncated(&text.content, ctx.config.text_layer_name_chars) {
                    name if name.trim().is_empty() => "Text Layer".to_owned(),
                    name => name,
                };
                let layer = Layer::new_text(
                    name,
                    TextLayer {
                        text: text.content.clone(),
                        font_size: text.font_size,
                        color: text.color,
                        position: ctx.config.default_text_position,
                    },
                );
                ctx.document.add_layer(layer);
                Ok(Effects::LAYERS)
            }

            Command::SetCropRect(rect) => {
                *ctx.crop_rect = rect;
                Ok(Effects::NONE)
            }

            Command::CancelCrop => {
                *ctx.crop_rect = None;
                Ok(Effects::NONE)
            }

            Command::ApplyCrop => {
                let region = ctx.crop_rect.take().zip(ctx.surface).and_then(|(rect, surface)| {
                    rect.pixel_region(surface.width(), surface.height())
                        .and_then(|(x, y, w, h)| IntRect::from_xywh(x as i32, y as i32, w, h))
                        .and_then(|region| surface.clone_rect(region))
                });
                let Some(cropped) = region else {
                    log::debug!("Nothing to crop");
                    return Ok(switch_tool(ctx, ToolKind::Select));
                };

                let bytes = raster::encode_png(&cropped)?;
                let size = [cropped.width(), cropped.height()];
                log::info!("Cropped canvas to {}x{}", size[0], size[1]);
                if let Some(file) = ctx.image_file.as_mut() {
                    file.bytes = bytes.clone();
                    file.mime_type = "image/png".to_owned();
                }
                ctx.document
                    .replace_with(Layer::new_image("Background", bytes, "image/png", size));
                switch_tool(ctx, ToolKind::Select);
                fit_background(ctx);
                Ok(Effects::LAYERS)
            }

            Command::SetTool(kind) => Ok(switch_tool(ctx, kind)),

            Command::ZoomIn => {
                ctx.view
                    .zoom_by((ctx.viewport / 2.0).to_pos2(), ctx.config.zoom_step);
                Ok(Effects::NONE)
            }

            Command::ZoomOut => {
                ctx.view
                    .zoom_by((ctx.viewport / 2.0).to_pos2(), 1.0 / ctx.config.zoom_step);
                Ok(Effects::NONE)
            }

            Command::ZoomToFit => {
                fit_background(ctx);
                Ok(Effects::NONE)
            }

            Command::ZoomToActualSize => {
                ctx.view.zoom_to_actual_size(ctx.viewport);
                Ok(Effects::NONE)
            }

            Command::ZoomToLayer(layer_id) => {
                if let Some(bounds) = ctx.document.get_layer(layer_id).and_then(Layer::bounds) {
                    ctx.view.fit_rect(bounds, ctx.viewport, ctx.config.fit_padding);
                }
                Ok(Effects::NONE)
            }

            Command::ToggleUi => {
                *ctx.ui_visible = !*ctx.ui_visible;
                Ok(Effects::NONE)
            }

            Command::RefreshSurface => Ok(Effects::SURFACE),
        }
    }
}
