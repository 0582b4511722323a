use gridvis_engine::coords::{Rect, Vec2};

use crate::menu::{MenuId, MenuTree};

/// Geometric style of the menu in logical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MenuStyle {
    pub width: f32,
    pub item_height: f32,
}

impl Default for MenuStyle {
    fn default() -> Self {
        Self {
            width: 150.0,
            item_height: 32.0,
        }
    }
}

/// Interaction outcome reported to the application.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuEvent {
    Opened { at: Vec2 },
    Closed,
    /// A root with a submenu was clicked; `active` tells whether it is now open.
    Toggled { id: MenuId, active: bool },
    /// A leaf entry was clicked.
    Activated(MenuId),
}

/// One laid-out menu row.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MenuRow {
    pub id: MenuId,
    pub rect: Rect,
    /// Row belongs to the open submenu rather than the root column.
    pub in_submenu: bool,
    /// Root row whose submenu is open.
    pub active: bool,
}

/// Context menu state: visibility, anchor and the active root.
#[derive(Debug, Clone)]
pub struct ContextMenu {
    tree: MenuTree,
    style: MenuStyle,
    visible: bool,
    origin: Vec2,
    active: Option<usize>,
}

impl ContextMenu {
    pub fn new(tree: MenuTree, style: MenuStyle) -> Self {
        Self {
            tree,
            style,
            visible: false,
            origin: Vec2::zero(),
            active: None,
        }
    }

    pub fn tree(&self) -> &MenuTree {
        &self.tree
    }

    pub fn style(&self) -> MenuStyle {
        self.style
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn active_root(&self) -> Option<MenuId> {
        self.active
            .and_then(|i| self.tree.roots().get(i))
            .map(|n| n.item.id)
    }

    /// Shows the menu with its top-left corner at `pos`.
    pub fn open_at(&mut self, pos: Vec2) -> MenuEvent {
        self.visible = true;
        self.origin = pos;
        MenuEvent::Opened { at: pos }
    }

    /// Hides the menu and collapses the active submenu.
    ///
    /// Returns `None` when the menu was already hidden.
    pub fn close(&mut self) -> Option<MenuEvent> {
        let was_visible = self.visible;
        self.visible = false;
        self.active = None;
        was_visible.then_some(MenuEvent::Closed)
    }

    /// Rows of the visible menu: the root column, then the active submenu.
    ///
    /// The submenu sits right of the root column, its first row level with
    /// the active root's row.
    pub fn layout(&self) -> Vec<MenuRow> {
        if !self.visible {
            return Vec::new();
        }

        let MenuStyle { width, item_height } = self.style;
        let row = |column: f32, index: usize| {
            Rect::new(column * width, index as f32 * item_height, width, item_height)
                .translated(self.origin)
        };

        let roots = self.tree.roots();
        let mut rows: Vec<MenuRow> = roots
            .iter()
            .enumerate()
            .map(|(i, node)| MenuRow {
                id: node.item.id,
                rect: row(0.0, i),
                in_submenu: false,
                active: self.active == Some(i),
            })
            .collect();

        if let Some((index, node)) = self.active.and_then(|i| roots.get(i).map(|n| (i, n))) {
            rows.extend(node.children.iter().enumerate().map(|(j, child)| MenuRow {
                id: child.id,
                rect: row(1.0, index + j),
                in_submenu: true,
                active: false,
            }));
        }

        rows
    }

    pub fn hit_test(&self, pos: Vec2) -> Option<MenuRow> {
        self.layout().into_iter().find(|r| r.rect.contains(pos))
    }

    /// Clicks the row under `pos`, if any.
    pub fn click(&mut self, pos: Vec2) -> Option<MenuEvent> {
        let hit = self.hit_test(pos)?;

        if hit.in_submenu {
            return Some(MenuEvent::Activated(hit.id));
        }

        let index = self.tree.root_index(hit.id)?;
        if !self.tree.roots()[index].has_children() {
            return Some(MenuEvent::Activated(hit.id));
        }

        // One open submenu at a time: opening a root collapses any other.
        let active = self.active != Some(index);
        self.active = active.then_some(index);
        Some(MenuEvent::Toggled { id: hit.id, active })
    }
}
