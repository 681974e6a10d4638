use egui::{Context, Event, Key, Modifiers, MouseWheelUnit, PointerButton, Pos2, Rect, Vec2};

pub mod shortcuts;

/// Points per wheel "line" when the platform reports line units.
const LINE_SCROLL_POINTS: f32 = 24.0;

/// Viewport-level input, positions relative to the viewport's top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        pos: Pos2,
        button: PointerButton,
        modifiers: Modifiers,
    },
    PointerMove {
        pos: Pos2,
    },
    PointerUp {
        pos: Pos2,
        button: PointerButton,
    },
    /// Pointer left the viewport
    PointerLeave,
    Wheel {
        pos: Pos2,
        /// Scroll delta in points; positive y scrolls up
        delta: Vec2,
        modifiers: Modifiers,
    },
    KeyDown {
        key: Key,
        modifiers: Modifiers,
        repeat: bool,
    },
    KeyUp {
        key: Key,
    },
}

/// Handles converting raw egui input into our domain-specific InputEvents
#[derive(Debug, Default)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    viewport_rect: Option<Rect>,
    /// Something else (a popup, a window) is on top of the viewport
    pointer_blocked: bool,
    /// Space was pressed and its release has not been delivered yet
    space_down: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the viewport rectangle in window coordinates
    pub fn set_viewport_rect(&mut self, rect: Rect) {
        self.viewport_rect = Some(rect);
    }

    /// While blocked the pointer counts as outside the viewport.
    pub fn set_pointer_blocked(&mut self, blocked: bool) {
        self.pointer_blocked = blocked;
    }

    fn local(&self, pos: Pos2) -> Pos2 {
        match self.viewport_rect {
            Some(rect) => Pos2::ZERO + (pos - rect.min),
            None => pos,
        }
    }

    fn in_viewport(&self, pos: Pos2) -> bool {
        !self.pointer_blocked && self.viewport_rect.is_some_and(|rect| rect.contains(pos))
    }

    /// A text field taking focus swallows the Space release, so deliver
    /// it ourselves.
    fn release_held_keys(&mut self, keyboard_captured: bool, events: &mut Vec<InputEvent>) {
        if keyboard_captured && self.space_down {
            self.space_down = false;
            events.push(InputEvent::KeyUp { key: Key::Space });
        }
    }

    /// Process raw egui input and generate our InputEvents.
    ///
    /// Keyboard events are dropped while a text field has focus.
    pub fn process_input(&mut self, ctx: &Context) -> Vec<InputEvent> {
        let keyboard_captured = ctx.wants_keyboard_input();
        let mut events = Vec::new();
        self.release_held_keys(keyboard_captured, &mut events);

        ctx.input(|input| {
            let hover = input.pointer.hover_pos().filter(|pos| self.in_viewport(*pos));

            match (hover, self.last_pointer_pos) {
                (Some(pos), last) => {
                    if Some(pos) != last {
                        events.push(InputEvent::PointerMove {
                            pos: self.local(pos),
                        });
                    }
                    self.last_pointer_pos = Some(pos);
                }
                (None, Some(_)) => {
                    events.push(InputEvent::PointerLeave);
                    self.last_pointer_pos = None;
                }
                (None, None) => {}
            }

            for button in [PointerButton::Primary, PointerButton::Secondary, PointerButton::Middle] {
                if input.pointer.button_pressed(button) {
                    if let Some(pos) = hover {
                        events.push(InputEvent::PointerDown {
                            pos: self.local(pos),
                            button,
                            modifiers: input.modifiers,
                        });
                    }
                }
                if input.pointer.button_released(button) {
                    if let Some(pos) = self.last_pointer_pos {
                        events.push(InputEvent::PointerUp {
                            pos: self.local(pos),
                            button,
                        });
                    }
                }
            }

            for event in &input.events {
                match event {
                    Event::MouseWheel {
                        unit,
                        delta,
                        modifiers,
                    } => {
                        let Some(pos) = hover else { continue };
                        let delta = match unit {
                            MouseWheelUnit::Point => *delta,
                            MouseWheelUnit::Line => *delta * LINE_SCROLL_POINTS,
                            MouseWheelUnit::Page => *delta * input.screen_rect().height(),
                        };
                        events.push(InputEvent::Wheel {
                            pos: self.local(pos),
                            delta,
                            modifiers: *modifiers,
                        });
                    }
                    Event::Key {
                        key,
                        pressed,
                        repeat,
                        modifiers,
                        ..
                    } if !keyboard_captured => {
                        if *key == Key::Space {
                            self.space_down = *pressed;
                        }
                        events.push(if *pressed {
                            InputEvent::KeyDown {
                                key: *key,
                                modifiers: *modifiers,
                                repeat: *repeat,
                            }
                        } else {
                            InputEvent::KeyUp { key: *key }
                        });
                    }
                    _ => {}
                }
            }
        });

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::RawInput;

    fn key_event(key: Key, pressed: bool) -> Event {
        Event::Key {
            key,
            physical_key: None,
            pressed,
            repeat: false,
            modifiers: Modifiers::NONE,
        }
    }

    #[test]
    fn keys_become_events() {
        let ctx = Context::default();
        let mut handler = InputHandler::new();
        let mut events = Vec::new();

        let raw = RawInput {
            events: vec![key_event(Key::B, true), key_event(Key::B, false)],
            ..Default::default()
        };
        let _ = ctx.run(raw, |ctx| {
            events = handler.process_input(ctx);
        });

        assert_eq!(
            events,
            vec![
                InputEvent::KeyDown {
                    key: Key::B,
                    modifiers: Modifiers::NONE,
                    repeat: false,
                },
                InputEvent::KeyUp { key: Key::B },
            ]
        );
    }

    #[test]
    fn positions_are_viewport_relative() {
        let mut handler = InputHandler::new();
        handler.set_viewport_rect(Rect::from_min_size(Pos2::new(100.0, 50.0), Vec2::splat(200.0)));
        assert_eq!(handler.local(Pos2::new(110.0, 70.0)), Pos2::new(10.0, 20.0));
        assert!(handler.in_viewport(Pos2::new(150.0, 150.0)));
        assert!(!handler.in_viewport(Pos2::new(10.0, 10.0)));
    }

    fn press_at(pos: Pos2) -> RawInput {
        RawInput {
            events: vec![
                Event::PointerMoved(pos),
                Event::PointerButton {
                    pos,
                    button: PointerButton::Primary,
                    pressed: true,
                    modifiers: Modifiers::NONE,
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn covered_viewport_gets_no_pointer_events() {
        let ctx = Context::default();
        let mut handler = InputHandler::new();
        handler.set_viewport_rect(Rect::from_min_size(Pos2::ZERO, Vec2::splat(200.0)));
        handler.set_pointer_blocked(true);

        let mut events = Vec::new();
        let _ = ctx.run(press_at(Pos2::new(50.0, 50.0)), |ctx| {
            events = handler.process_input(ctx);
        });
        assert!(events.is_empty(), "{events:?}");

        handler.set_pointer_blocked(false);
        let _ = ctx.run(press_at(Pos2::new(60.0, 50.0)), |ctx| {
            events = handler.process_input(ctx);
        });
        assert!(events.iter().any(|event| matches!(
            event,
            InputEvent::PointerDown {
                button: PointerButton::Primary,
                ..
            }
        )));
    }

    #[test]
    fn popup_over_hovered_viewport_ends_the_hover() {
        let ctx = Context::default();
        let mut handler = InputHandler::new();
        handler.set_viewport_rect(Rect::from_min_size(Pos2::ZERO, Vec2::splat(200.0)));

        let raw = RawInput {
            events: vec![Event::PointerMoved(Pos2::new(20.0, 20.0))],
            ..Default::default()
        };
        let _ = ctx.run(raw, |ctx| {
            handler.process_input(ctx);
        });

        handler.set_pointer_blocked(true);
        let mut events = Vec::new();
        let _ = ctx.run(RawInput::default(), |ctx| {
            events = handler.process_input(ctx);
        });
        assert_eq!(events, vec![InputEvent::PointerLeave]);
    }

    #[test]
    fn space_is_released_when_a_text_field_takes_the_keyboard() {
        let ctx = Context::default();
        let mut handler = InputHandler::new();
        let raw = RawInput {
            events: vec![key_event(Key::Space, true)],
            ..Default::default()
        };
        let _ = ctx.run(raw, |ctx| {
            handler.process_input(ctx);
        });

        let mut events = Vec::new();
        handler.release_held_keys(false, &mut events);
        assert!(events.is_empty());

        handler.release_held_keys(true, &mut events);
        assert_eq!(events, vec![InputEvent::KeyUp { key: Key::Space }]);

        events.clear();
        handler.release_held_keys(true, &mut events);
        assert!(events.is_empty());
    }

}
