use gridvis_engine::input::{InputEvent, Key, MouseButton};

use crate::canvas::CanvasConfig;
use crate::context_menu::{ContextMenu, MenuEvent, MenuStyle};
use crate::menu::MenuTree;

/// Routes canvas input to the context menu.
///
/// - right press: open the menu at the pointer
/// - left press on a row: click it
/// - left press elsewhere: close the menu
/// - `Escape`: close the menu
#[derive(Debug, Clone)]
pub struct UiManager {
    canvas: CanvasConfig,
    menu: ContextMenu,
}

impl UiManager {
    pub fn new(canvas: CanvasConfig, tree: MenuTree, style: MenuStyle) -> Self {
        Self {
            canvas,
            menu: ContextMenu::new(tree, style),
        }
    }

    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }

    pub fn menu(&self) -> &ContextMenu {
        &self.menu
    }

    pub fn handle_input(&mut self, event: &InputEvent) -> Option<MenuEvent> {
        if let Some(pos) = event.button_press(MouseButton::Right) {
            return Some(self.menu.open_at(pos));
        }

        if let Some(pos) = event.button_press(MouseButton::Left) {
            if self.menu.hit_test(pos).is_some() {
                return self.menu.click(pos);
            }
            return self.menu.close();
        }

        if event.is_key_press(Key::Escape) {
            return self.menu.close();
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridvis_engine::coords::Vec2;
    use gridvis_engine::input::{KeyState, Modifiers, MouseButtonState, PointerButtonEvent};

    use crate::menu::{MenuId, MenuItem};

    fn manager() -> UiManager {
        let tree = MenuTree::build(vec![
            MenuItem::root(0, 0, "Select"),
            MenuItem::root(1, 0, "Show"),
            MenuItem::child(2, 0, "Lines", 1),
        ])
        .unwrap();
        UiManager::new(CanvasConfig::default(), tree, MenuStyle::default())
    }

    fn press(button: MouseButton, x: f32, y: f32) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent {
            button,
            state: MouseButtonState::Pressed,
            pos: Vec2::new(x, y),
            modifiers: Modifiers::default(),
        })
    }

    fn escape() -> InputEvent {
        InputEvent::Key {
            key: Key::Escape,
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
            repeat: false,
        }
    }

    #[test]
    fn right_press_opens_at_pointer() {
        let mut ui = manager();
        let ev = ui.handle_input(&press(MouseButton::Right, 40.0, 60.0));
        assert_eq!(ev, Some(MenuEvent::Opened { at: Vec2::new(40.0, 60.0) }));
        assert_eq!(ui.menu().origin(), Vec2::new(40.0, 60.0));
    }

    #[test]
    fn left_press_inside_clicks_and_outside_closes() {
        let mut ui = manager();
        ui.handle_input(&press(MouseButton::Right, 0.0, 0.0));

        assert_eq!(
            ui.handle_input(&press(MouseButton::Left, 10.0, 40.0)),
            Some(MenuEvent::Toggled { id: MenuId(1), active: true })
        );
        assert_eq!(
            ui.handle_input(&press(MouseButton::Left, 160.0, 40.0)),
            Some(MenuEvent::Activated(MenuId(2)))
        );
        assert_eq!(ui.handle_input(&press(MouseButton::Left, 600.0, 400.0)), Some(MenuEvent::Closed));
        assert!(!ui.menu().is_visible());
        assert_eq!(ui.menu().active_root(), None);
    }

    #[test]
    fn escape_closes_and_is_quiet_when_hidden() {
        let mut ui = manager();
        assert_eq!(ui.handle_input(&escape()), None);

        ui.handle_input(&press(MouseButton::Right, 0.0, 0.0));
        assert_eq!(ui.handle_input(&escape()), Some(MenuEvent::Closed));
    }

    #[test]
    fn pointer_motion_is_ignored() {
        let mut ui = manager();
        assert_eq!(ui.handle_input(&InputEvent::PointerMoved(Vec2::new(1.0, 1.0))), None);
        assert_eq!(ui.canvas().id, "GridVisualizer");
    }
}
