use std::collections::HashSet;

use crate::coords::Vec2;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState, Modifiers, MouseButton, MouseButtonState};

/// Current input state of the window.
///
/// Transitions observed while applying events are written to an [`InputFrame`].
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,
    pub focused: bool,

    /// Last known pointer position in logical pixels.
    pub pointer_pos: Option<Vec2>,

    pub keys_down: HashSet<Key>,
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::ModifiersChanged(m) => self.modifiers = *m,

            InputEvent::Focused(focused) => {
                self.focused = *focused;
                if !*focused {
                    // Releases never arrive once focus is gone.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::PointerMoved(pos) => self.pointer_pos = Some(*pos),

            InputEvent::PointerLeft => self.pointer_pos = None,

            InputEvent::Key {
                key,
                state,
                modifiers,
                ..
            } => {
                self.modifiers = *modifiers;
                match state {
                    KeyState::Pressed => {
                        if self.keys_down.insert(*key) {
                            frame.keys_pressed.insert(*key);
                        }
                    }
                    KeyState::Released => {
                        if self.keys_down.remove(key) {
                            frame.keys_released.insert(*key);
                        }
                    }
                }
            }

            InputEvent::PointerButton(button_ev) => {
                self.pointer_pos = Some(button_ev.pos);
                self.modifiers = button_ev.modifiers;
                match button_ev.state {
                    MouseButtonState::Pressed => {
                        if self.buttons_down.insert(button_ev.button) {
                            frame.buttons_pressed.insert(button_ev.button);
                        }
                    }
                    MouseButtonState::Released => {
                        if self.buttons_down.remove(&button_ev.button) {
                            frame.buttons_released.insert(button_ev.button);
                        }
                    }
                }
            }
        }

        frame.push_event(ev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerButtonEvent;

    fn button(button: MouseButton, state: MouseButtonState, x: f32, y: f32) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent {
            button,
            state,
            pos: Vec2::new(x, y),
            modifiers: Modifiers::default(),
        })
    }

    #[test]
    fn press_and_release_are_recorded_once() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, button(MouseButton::Right, MouseButtonState::Pressed, 5.0, 6.0));
        state.apply_event(&mut frame, button(MouseButton::Right, MouseButtonState::Pressed, 5.0, 6.0));
        assert!(state.buttons_down.contains(&MouseButton::Right));
        assert_eq!(frame.buttons_pressed.len(), 1);
        assert_eq!(frame.events.len(), 2);
        assert_eq!(state.pointer_pos, Some(Vec2::new(5.0, 6.0)));

        state.apply_event(&mut frame, button(MouseButton::Right, MouseButtonState::Released, 5.0, 6.0));
        assert!(!state.buttons_down.contains(&MouseButton::Right));
        assert!(frame.buttons_released.contains(&MouseButton::Right));
    }

    #[test]
    fn focus_loss_clears_held_input() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(
            &mut frame,
            InputEvent::Key {
                key: Key::Letter('a'),
                state: KeyState::Pressed,
                modifiers: Modifiers::default(),
                repeat: false,
            },
        );
        assert!(state.keys_down.contains(&Key::Letter('a')));

        state.apply_event(&mut frame, InputEvent::Focused(false));
        assert!(state.keys_down.is_empty());
    }

    #[test]
    fn pointer_left_forgets_position() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, InputEvent::PointerMoved(Vec2::new(1.0, 2.0)));
        state.apply_event(&mut frame, InputEvent::PointerLeft);
        assert_eq!(state.pointer_pos, None);

        frame.clear();
        assert!(frame.events.is_empty());
    }
}
