//! Color types used for vertex colors and clear colors.

mod color;

pub use color::Color;
