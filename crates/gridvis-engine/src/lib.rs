//! Grid visualizer engine crate.
//!
//! This crate owns the platform + GPU runtime pieces and the drawing core
//! (shader program, per-object geometry buffers, diagram orchestration).

pub mod device;
pub mod window;
pub mod input;
pub mod core;

pub mod logging;
pub mod coords;
pub mod paint;
pub mod render;
pub mod drawing;
