//! Grid visualizer UI layer on top of `gridvis-engine`.
//!
//! A two-level context menu model (tree, layout, hit-testing, interaction)
//! and the manager that feeds canvas input into it. Nothing here draws;
//! the application reads [`ContextMenu::layout`] and reacts to [`MenuEvent`]s.

pub mod canvas;
pub mod context_menu;
pub mod manager;
pub mod menu;

pub use canvas::CanvasConfig;
pub use context_menu::{ContextMenu, MenuEvent, MenuRow, MenuStyle};
pub use manager::UiManager;
pub use menu::{MenuError, MenuId, MenuItem, MenuNode, MenuTree};
