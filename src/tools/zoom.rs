//! Wheel-to-zoom mapping.

use egui::Modifiers;

/// Whether a wheel event should zoom rather than pan.
pub fn is_zoom_gesture(modifiers: Modifiers) -> bool {
    modifiers.ctrl || modifiers.command
}

/// Zoom factor for one wheel event: scrolling up zooms in by `step`.
pub fn wheel_factor(delta_y: f32, step: f32) -> f32 {
    if delta_y > 0.0 {
        step
    } else if delta_y < 0.0 {
        1.0 / step
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_direction_sets_factor() {
        assert_eq!(wheel_factor(3.0, 1.25), 1.25);
        assert_eq!(wheel_factor(-1.0, 1.25), 0.8);
        assert_eq!(wheel_factor(0.0, 1.25), 1.0);
    }

    #[test]
    fn plain_wheel_does_not_zoom() {
        assert!(!is_zoom_gesture(Modifiers::NONE));
        assert!(is_zoom_gesture(Modifiers::CTRL));
    }
}
