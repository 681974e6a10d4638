//! Keyboard shortcuts.

use crate::command::Command;
use crate::tools::ToolKind;
use egui::{Key, Modifiers};

/// Maps a key press to a command. `active_tool` gates the crop-only keys.
pub fn command_for_key(key: Key, modifiers: Modifiers, active_tool: ToolKind) -> Option<Command> {
    let primary = modifiers.command || modifiers.ctrl;

    if primary {
        return match key {
            Key::D => Some(Command::DuplicateActiveLayer),
            _ => None,
        };
    }

    let command = match key {
        Key::V => Command::SetTool(ToolKind::Select),
        Key::C => Command::SetTool(ToolKind::Crop),
        Key::B => Command::SetTool(ToolKind::Brush),
        Key::T => Command::SetTool(ToolKind::Text),
        Key::A => Command::SetTool(ToolKind::AiEdit),

        Key::Plus | Key::Equals => Command::ZoomIn,
        Key::Minus => Command::ZoomOut,
        Key::Num0 => Command::ZoomToFit,
        Key::Num1 => Command::ZoomToActualSize,

        Key::Tab => Command::ToggleUi,
        Key::Delete | Key::Backspace => Command::DeleteActiveLayer,

        Key::Enter if active_tool == ToolKind::Crop => Command::ApplyCrop,
        Key::Escape if active_tool == ToolKind::Crop => Command::CancelCrop,

        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_pick_tools() {
        assert!(matches!(
            command_for_key(Key::B, Modifiers::NONE, ToolKind::Select),
            Some(Command::SetTool(ToolKind::Brush))
        ));
        assert!(matches!(
            command_for_key(Key::A, Modifiers::NONE, ToolKind::Crop),
            Some(Command::SetTool(ToolKind::AiEdit))
        ));
    }

    #[test]
    fn ctrl_changes_meaning() {
        assert!(matches!(
            command_for_key(Key::D, Modifiers::COMMAND, ToolKind::Select),
            Some(Command::DuplicateActiveLayer)
        ));
        assert!(command_for_key(Key::D, Modifiers::NONE, ToolKind::Select).is_none());
        assert!(command_for_key(Key::C, Modifiers::CTRL, ToolKind::Select).is_none());
    }

    #[test]
    fn crop_keys_only_with_crop_tool() {
        assert!(command_for_key(Key::Enter, Modifiers::NONE, ToolKind::Select).is_none());
        assert!(matches!(
            command_for_key(Key::Enter, Modifiers::NONE, ToolKind::Crop),
            Some(Command::ApplyCrop)
        ));
        assert!(matches!(
            command_for_key(Key::Escape, Modifiers::NONE, ToolKind::Crop),
            Some(Command::CancelCrop)
        ));
    }
}
