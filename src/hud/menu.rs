//! Title, death and settings menus

use crate::input::{Input, Key};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    Title,
    Death,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Start,
    OpenSettings,
    Quit,
    Retry,
    QuitToTitle,
    ToggleFps,
    ToggleRects,
    Back,
}

impl MenuKind {
    pub fn items(self) -> &'static [(&'static str, MenuAction)] {
        match self {
            MenuKind::Title => &[
                ("Start", MenuAction::Start),
                ("Settings", MenuAction::OpenSettings),
                ("Quit", MenuAction::Quit),
            ],
            MenuKind::Death => &[
                ("Retry", MenuAction::Retry),
                ("Quit to title", MenuAction::QuitToTitle),
            ],
            MenuKind::Settings => &[
                ("Show FPS", MenuAction::ToggleFps),
                ("Show rects", MenuAction::ToggleRects),
                ("Back", MenuAction::Back),
            ],
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            MenuKind::Title => "SLUGRUN",
            MenuKind::Death => "YOU DIED",
            MenuKind::Settings => "SETTINGS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub kind: MenuKind,
    pub cursor: usize,
}

impl Menu {
    pub fn new(kind: MenuKind) -> Self {
        Self { kind, cursor: 0 }
    }

    pub fn selected(&self) -> MenuAction {
        let items = self.kind.items();
        items[self.cursor.min(items.len() - 1)].1
    }

    /// Move the cursor or pick an item
    pub fn update(&mut self, input: &Input) -> Option<MenuAction> {
        let len = self.kind.items().len();
        if input.was_pressed(Key::W) {
            self.cursor = (self.cursor + len - 1) % len;
        }
        if input.was_pressed(Key::S) {
            self.cursor = (self.cursor + 1) % len;
        }
        if input.was_pressed(Key::K) || input.was_pressed(Key::J) {
            return Some(self.selected());
        }
        if self.kind == MenuKind::Settings && input.was_pressed(Key::Escape) {
            return Some(MenuAction::Back);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputEvent;

    fn tap(menu: &mut Menu, input: &mut Input, key: Key) -> Option<MenuAction> {
        input.begin_tick(&[InputEvent::KeyDown(key)]);
        let action = menu.update(input);
        input.begin_tick(&[InputEvent::KeyUp(key)]);
        action
    }

    #[test]
    fn test_cursor_wraps() {
        let mut menu = Menu::new(MenuKind::Title);
        let mut input = Input::new();
        tap(&mut menu, &mut input, Key::W);
        assert_eq!(menu.selected(), MenuAction::Quit);
        tap(&mut menu, &mut input, Key::S);
        assert_eq!(menu.selected(), MenuAction::Start);
    }

    #[test]
    fn test_select_and_escape() {
        let mut input = Input::new();
        let mut death = Menu::new(MenuKind::Death);
        tap(&mut death, &mut input, Key::S);
        assert_eq!(tap(&mut death, &mut input, Key::J), Some(MenuAction::QuitToTitle));
        assert_eq!(tap(&mut death, &mut input, Key::Escape), None);

        let mut settings = Menu::new(MenuKind::Settings);
        assert_eq!(tap(&mut settings, &mut input, Key::Escape), Some(MenuAction::Back));
    }
}
