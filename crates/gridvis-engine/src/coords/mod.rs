//! Coordinate and geometry types shared across the engine and the UI layer.
//!
//! Screen space:
//! - Logical pixels (DPI-aware)
//! - Origin top-left
//! - +X right, +Y down
//!
//! World-space vectors and matrices are `glam` types.

mod canvas;
mod rect;
mod vec2;

pub use canvas::CanvasSize;
pub use rect::Rect;
pub use vec2::Vec2;
