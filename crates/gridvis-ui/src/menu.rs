use std::collections::HashSet;
use std::fmt;

/// Stable identifier of a menu entry.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MenuId(pub u32);

impl fmt::Display for MenuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Flat description of one menu entry.
///
/// Entries with no parent are root items; an entry whose parent is a root
/// item belongs to that root's submenu.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub id: MenuId,
    /// Ordering key among siblings. Ties keep insertion order.
    pub group_id: u32,
    pub title: String,
    pub description: String,
    pub parent: Option<MenuId>,
}

impl MenuItem {
    pub fn root(id: u32, group_id: u32, title: impl Into<String>) -> Self {
        Self {
            id: MenuId(id),
            group_id,
            title: title.into(),
            description: String::new(),
            parent: None,
        }
    }

    pub fn child(id: u32, group_id: u32, title: impl Into<String>, parent: u32) -> Self {
        Self {
            parent: Some(MenuId(parent)),
            ..Self::root(id, group_id, title)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Failure to assemble a [`MenuTree`] from flat items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuError {
    DuplicateId(MenuId),
    MissingParent { item: MenuId, parent: MenuId },
    /// The parent is itself a submenu item; only one submenu level exists.
    NestedSubmenu { item: MenuId, parent: MenuId },
}

impl fmt::Display for MenuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "duplicate menu id {id}"),
            Self::MissingParent { item, parent } => {
                write!(f, "menu item {item} refers to unknown parent {parent}")
            }
            Self::NestedSubmenu { item, parent } => {
                write!(f, "menu item {item} nests under submenu item {parent}")
            }
        }
    }
}

impl std::error::Error for MenuError {}

/// A root entry and its submenu, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuNode {
    pub item: MenuItem,
    pub children: Vec<MenuItem>,
}

impl MenuNode {
    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Two-level menu built from flat [`MenuItem`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuTree {
    roots: Vec<MenuNode>,
}

impl MenuTree {
    pub fn build(items: Vec<MenuItem>) -> Result<Self, MenuError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id) {
                return Err(MenuError::DuplicateId(item.id));
            }
        }

        let mut items = items;
        // Stable: equal keys keep insertion order. `None` sorts first, so roots lead.
        items.sort_by_key(|item| (item.parent, item.group_id));

        let mut roots: Vec<MenuNode> = Vec::new();
        let mut pending = Vec::new();
        for item in items {
            match item.parent {
                None => roots.push(MenuNode {
                    item,
                    children: Vec::new(),
                }),
                Some(_) => pending.push(item),
            }
        }

        for item in pending {
            let Some(parent) = item.parent else { continue };

            if let Some(node) = roots.iter_mut().find(|n| n.item.id == parent) {
                node.children.push(item);
                continue;
            }

            return Err(if seen.contains(&parent) {
                MenuError::NestedSubmenu {
                    item: item.id,
                    parent,
                }
            } else {
                MenuError::MissingParent {
                    item: item.id,
                    parent,
                }
            });
        }

        log::debug!("menu built: {} root items", roots.len());
        Ok(Self { roots })
    }

    pub fn roots(&self) -> &[MenuNode] {
        &self.roots
    }

    pub fn root_index(&self, id: MenuId) -> Option<usize> {
        self.roots.iter().position(|n| n.item.id == id)
    }

    /// Looks up any entry, root or submenu.
    pub fn find(&self, id: MenuId) -> Option<&MenuItem> {
        self.roots.iter().find_map(|n| {
            if n.item.id == id {
                Some(&n.item)
            } else {
                n.children.iter().find(|c| c.id == id)
            }
        })
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[MenuItem]) -> Vec<u32> {
        items.iter().map(|i| i.id.0).collect()
    }

    // ── build ─────────────────────────────────────────────────────────────

    #[test]
    fn roots_and_children_are_grouped() {
        let tree = MenuTree::build(vec![
            MenuItem::child(2, 0, "Lines", 1),
            MenuItem::root(0, 0, "Select"),
            MenuItem::root(1, 0, "Show"),
            MenuItem::child(3, 0, "Box", 1),
        ])
        .unwrap();

        let roots = tree.roots();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].item.title, "Select");
        assert!(!roots[0].has_children());
        assert_eq!(ids(&roots[1].children), vec![2, 3]);
    }

    #[test]
    fn group_orders_siblings_and_ties_keep_insertion_order() {
        let tree = MenuTree::build(vec![
            MenuItem::root(10, 1, "late"),
            MenuItem::root(11, 0, "first"),
            MenuItem::root(12, 0, "second"),
        ])
        .unwrap();

        let order: Vec<u32> = tree.roots().iter().map(|n| n.item.id.0).collect();
        assert_eq!(order, vec![11, 12, 10]);
    }

    #[test]
    fn find_reaches_submenu_items() {
        let tree = MenuTree::build(vec![
            MenuItem::root(1, 0, "Show"),
            MenuItem::child(2, 0, "Lines", 1).with_description("toggle lines"),
        ])
        .unwrap();
        assert_eq!(tree.find(MenuId(2)).map(|i| i.description.as_str()), Some("toggle lines"));
        assert_eq!(tree.root_index(MenuId(1)), Some(0));
        assert!(tree.find(MenuId(9)).is_none());
    }

    // ── errors ────────────────────────────────────────────────────────────

    #[test]
    fn duplicate_id_is_rejected() {
        let err = MenuTree::build(vec![MenuItem::root(1, 0, "a"), MenuItem::root(1, 0, "b")]);
        assert_eq!(err, Err(MenuError::DuplicateId(MenuId(1))));
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let err = MenuTree::build(vec![MenuItem::child(2, 0, "orphan", 7)]);
        assert_eq!(
            err,
            Err(MenuError::MissingParent {
                item: MenuId(2),
                parent: MenuId(7)
            })
        );
    }

    #[test]
    fn second_submenu_level_is_rejected() {
        let err = MenuTree::build(vec![
            MenuItem::root(1, 0, "Show"),
            MenuItem::child(2, 0, "Lines", 1),
            MenuItem::child(3, 0, "Deep", 2),
        ]);
        assert_eq!(
            err,
            Err(MenuError::NestedSubmenu {
                item: MenuId(3),
                parent: MenuId(2)
            })
        );
    }
}
