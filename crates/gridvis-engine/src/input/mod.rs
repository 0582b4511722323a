//! Input subsystem.
//!
//! Public types do not expose winit. The runtime translates platform events
//! through [`translate_window_event`] and feeds them to [`InputState`].

mod frame;
mod platform;
mod state;
mod types;

pub use frame::InputFrame;
pub use platform::translate_window_event;
pub use state::InputState;
pub use types::{
    InputEvent, Key, KeyState, Modifiers, MouseButton, MouseButtonState, PointerButtonEvent,
};
