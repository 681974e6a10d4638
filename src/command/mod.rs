mod commands;
mod context;

pub use commands::Command;
pub use context::CommandContext;

use crate::error::EditorError;

/// What the editor has to do after a command ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Effects {
    /// The surface must be recomposited from the layer stack
    pub redraw: bool,
    /// Persisted state changed and the snapshot must be rewritten
    pub persist: bool,
}

impl Effects {
    pub const NONE: Effects = Effects {
        redraw: false,
        persist: false,
    };
    /// Layer stack changed
    pub const LAYERS: Effects = Effects {
        redraw: true,
        persist: true,
    };
    /// Tool or option state changed
    pub const SETTINGS: Effects = Effects {
        redraw: false,
        persist: true,
    };
    /// Only the surface pixels are stale
    pub const SURFACE: Effects = Effects {
        redraw: true,
        persist: false,
    };

    pub fn merge(self, other: Effects) -> Effects {
        Effects {
            redraw: self.redraw || other.redraw,
            persist: self.persist || other.persist,
        }
    }
}

/// Result type for command execution
pub type CommandResult = Result<Effects, EditorError>;
