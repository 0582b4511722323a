use crate::coords::Vec2;

/// Keyboard key identifier.
///
/// Only the keys the application reacts to get their own variant; everything
/// else arrives as `Unknown` with the platform key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Space,
    Tab,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    /// `0`..=`9` on the main row.
    Digit(u8),
    /// Lowercase ASCII letter.
    Letter(char),

    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseButtonState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Pointer button transition at a position in logical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerButtonEvent {
    pub button: MouseButton,
    pub state: MouseButtonState,
    pub pos: Vec2,
    pub modifiers: Modifiers,
}

/// Platform-agnostic input events emitted by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    ModifiersChanged(Modifiers),

    Key {
        key: Key,
        state: KeyState,
        modifiers: Modifiers,
        repeat: bool,
    },

    /// Pointer position in logical pixels.
    PointerMoved(Vec2),
    PointerButton(PointerButtonEvent),

    /// Pointer left the window surface.
    PointerLeft,

    Focused(bool),
}

impl InputEvent {
    /// A fresh (non-repeat) press of `key`.
    pub fn is_key_press(&self, key: Key) -> bool {
        matches!(
            self,
            InputEvent::Key { key: k, state: KeyState::Pressed, repeat: false, .. } if *k == key
        )
    }

    /// Position of a press of `button`, if this is one.
    pub fn button_press(&self, button: MouseButton) -> Option<Vec2> {
        match self {
            InputEvent::PointerButton(PointerButtonEvent {
                button: b,
                state: MouseButtonState::Pressed,
                pos,
                ..
            }) if *b == button => Some(*pos),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(button: MouseButton) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent {
            button,
            state: MouseButtonState::Pressed,
            pos: Vec2::new(10.0, 20.0),
            modifiers: Modifiers::default(),
        })
    }

    #[test]
    fn button_press_matches_button() {
        assert_eq!(press(MouseButton::Right).button_press(MouseButton::Right), Some(Vec2::new(10.0, 20.0)));
        assert_eq!(press(MouseButton::Right).button_press(MouseButton::Left), None);
    }

    #[test]
    fn key_repeat_is_not_a_press() {
        let ev = InputEvent::Key {
            key: Key::Escape,
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
            repeat: true,
        };
        assert!(!ev.is_key_press(Key::Escape));
    }
}
