use super::{Tool, ToolKind, ToolOptions};
use crate::command::Command;
use crate::layer::Layer;
use crate::renderer::raster;
use egui::{Color32, Pos2};
use tiny_skia::Pixmap;

#[derive(Debug, Clone, Default)]
enum BrushState {
    #[default]
    Idle,
    Stroking {
        points: Vec<Pos2>,
        color: Color32,
        size: f32,
        /// Segments not yet painted onto the live surface
        unpainted: Vec<(Pos2, Pos2)>,
        /// Whether any feedback reached the surface
        painted: bool,
    },
}

/// Freehand brush. Each stroke becomes its own drawing layer on release.
#[derive(Debug, Clone, Default)]
pub struct BrushTool {
    state: BrushState,
}

impl BrushTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[Pos2] {
        match &self.state {
            BrushState::Stroking { points, .. } => points,
            BrushState::Idle => &[],
        }
    }

    /// Ends the stroke; the preview only needs wiping if something was painted.
    fn abandon(&mut self) -> Option<Command> {
        match std::mem::take(&mut self.state) {
            BrushState::Stroking { painted: true, .. } => Some(Command::RefreshSurface),
            _ => None,
        }
    }
}

impl Tool for BrushTool {
    fn name(&self) -> &'static str {
        "Brush"
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Brush
    }

    fn activate(&mut self) {
        self.state = BrushState::Idle;
    }

    fn deactivate(&mut self) {
        self.state = BrushState::Idle;
    }

    fn on_pointer_down(&mut self, pos: Pos2, options: &ToolOptions) -> Option<Command> {
        self.state = BrushState::Stroking {
            points: vec![pos],
            color: options.brush.color,
            size: options.brush.size,
            unpainted: Vec::new(),
            painted: false,
        };
        None
    }

    fn on_pointer_move(&mut self, pos: Pos2, _options: &ToolOptions) -> Option<Command> {
        if let BrushState::Stroking {
            points, unpainted, ..
        } = &mut self.state
        {
            if let Some(last) = points.last().copied() {
                unpainted.push((last, pos));
            }
            points.push(pos);
        }
        None
    }

    fn on_pointer_up(&mut self, _pos: Pos2, _options: &ToolOptions) -> Option<Command> {
        match std::mem::take(&mut self.state) {
            BrushState::Stroking {
                points,
                color,
                size,
                ..
            } if points.len() >= 2 => {
                log::debug!("Brush stroke finished with {} points", points.len());
                Some(Command::AddLayer(Layer::new_drawing(points, color, size)))
            }
            _ => None,
        }
    }

    fn on_pointer_leave(&mut self) -> Option<Command> {
        self.abandon()
    }

    fn update_preview(&mut self, surface: &mut Pixmap) {
        if let BrushState::Stroking {
            color,
            size,
            unpainted,
            painted,
            ..
        } = &mut self.state
        {
            for (from, to) in unpainted.drain(..) {
                raster::stroke_segment(surface, from, to, *color, *size);
                *painted = true;
            }
        }
    }

    fn is_active(&self) -> bool {
        matches!(self.state, BrushState::Stroking { .. })
    }

    fn current_state_name(&self) -> &'static str {
        match self.state {
            BrushState::Idle => "Idle",
            BrushState::Stroking { .. } => "Stroking",
        }
    }
}
