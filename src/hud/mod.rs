//! Modal HUD stack
//!
//! Layers, highest priority first: menu, title card, puzzle modal, blocking
//! text, editor. The top active layer takes the tick's input; while any of
//! the first four is active the world is frozen.

pub mod editor;
pub mod menu;
pub mod puzzle;
pub mod text;

use crate::error::EngineError;
use crate::input::{Input, Key};
use crate::sim::world::{HudRequest, World};

pub use editor::{Editor, EditorItem};
pub use menu::{Menu, MenuAction, MenuKind};
pub use puzzle::{
    CodeLockPuzzle, OutcomeReceiver, OutcomeSender, Puzzle, PuzzleModal, PuzzleProgress,
    PuzzleStatus, outcome_channel,
};
pub use text::{TextQueue, TitleCard};

/// Something the game loop or host has to carry out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HudCommand {
    StartGame,
    RetryLevel,
    ReturnToTitle,
    Quit,
    SaveLevel,
    ReloadSheet,
    Screenshot,
    ToggleFullscreen,
    ToggleFps,
    ToggleRects,
}

#[derive(Debug)]
pub struct Hud {
    pub menu: Option<Menu>,
    /// Menu the settings screen returns to
    settings_parent: Option<MenuKind>,
    pub title_card: Option<TitleCard>,
    pub puzzle: Option<PuzzleModal>,
    pub text: TextQueue,
    pub editor: Editor,
}

impl Hud {
    pub fn new(editor_enabled: bool) -> Self {
        Self {
            menu: None,
            settings_parent: None,
            title_card: None,
            puzzle: None,
            text: TextQueue::default(),
            editor: Editor::new(editor_enabled),
        }
    }

    pub fn open_menu(&mut self, kind: MenuKind) {
        log::info!("Menu -> {:?}", kind);
        self.menu = Some(Menu::new(kind));
    }

    pub fn close_menu(&mut self) {
        self.menu = None;
        self.settings_parent = None;
    }

    /// Drop every modal layer; used when the world is rebuilt
    pub fn clear_modals(&mut self) {
        self.close_menu();
        self.title_card = None;
        self.puzzle = None;
        self.text = TextQueue::default();
    }

    pub fn is_absorbing_inputs(&self) -> bool {
        self.menu.is_some()
            || self.title_card.is_some()
            || self.puzzle.is_some()
            || self.text.is_absorbing()
    }

    /// Pull in whatever entities asked the HUD to show
    fn take_requests(&mut self, world: &mut World) {
        for request in world.hud_requests.drain(..) {
            match request {
                HudRequest::ShowText(pages) => self.text.push(pages),
                HudRequest::TitleCard(title) => self.title_card = Some(TitleCard::new(&title)),
                HudRequest::OpenPuzzle { puzzle, reply } => {
                    if self.puzzle.is_some() {
                        log::warn!("Puzzle `{}` requested while another is open", puzzle.title());
                        reply.send(PuzzleStatus::Quit);
                    } else {
                        self.puzzle = Some(PuzzleModal::new(puzzle, reply));
                    }
                }
            }
        }
    }

    fn hotkeys(&self, input: &Input, commands: &mut Vec<HudCommand>) {
        let bindings = [
            (Key::R, HudCommand::ToggleRects),
            (Key::F, HudCommand::ToggleFps),
            (Key::F1, HudCommand::ReloadSheet),
            (Key::F2, HudCommand::Screenshot),
            (Key::F4, HudCommand::ToggleFullscreen),
        ];
        for (key, command) in bindings {
            if input.was_pressed(key) {
                commands.push(command);
            }
        }
        if self.editor.enabled && input.was_pressed(Key::F5) {
            commands.push(HudCommand::SaveLevel);
        }
    }

    fn apply_menu_action(&mut self, action: MenuAction, commands: &mut Vec<HudCommand>) {
        match action {
            MenuAction::Start => {
                self.close_menu();
                commands.push(HudCommand::StartGame);
            }
            MenuAction::Retry => {
                self.close_menu();
                commands.push(HudCommand::RetryLevel);
            }
            MenuAction::QuitToTitle => {
                self.open_menu(MenuKind::Title);
                commands.push(HudCommand::ReturnToTitle);
            }
            MenuAction::Quit => commands.push(HudCommand::Quit),
            MenuAction::OpenSettings => {
                self.settings_parent = self.menu.as_ref().map(|m| m.kind);
                self.open_menu(MenuKind::Settings);
            }
            MenuAction::ToggleFps => commands.push(HudCommand::ToggleFps),
            MenuAction::ToggleRects => commands.push(HudCommand::ToggleRects),
            MenuAction::Back => match self.settings_parent.take() {
                Some(parent) => self.open_menu(parent),
                None => self.close_menu(),
            },
        }
    }

    /// Run one tick of the stack. Returns whether input was absorbed, plus
    /// commands for the game loop.
    pub fn update(
        &mut self,
        input: &Input,
        world: &mut World,
    ) -> Result<(bool, Vec<HudCommand>), EngineError> {
        let mut commands = Vec::new();
        self.hotkeys(input, &mut commands);
        self.take_requests(world);
        self.text.tick();

        if let Some(menu) = self.menu.as_mut() {
            if let Some(action) = menu.update(input) {
                world.play_sound(crate::audio::SoundEffect::MenuBlip);
                self.apply_menu_action(action, &mut commands);
            }
        } else if let Some(card) = self.title_card.as_mut() {
            if !card.tick() {
                self.title_card = None;
            }
        } else if let Some(modal) = self.puzzle.as_mut() {
            if !modal.update(input) {
                self.puzzle = None;
            }
        } else if self.text.is_absorbing() {
            self.text.advance(input);
        } else {
            self.editor.update(input, world)?;
            return Ok((false, commands));
        }
        Ok((true, commands))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputEvent;

    fn tap(hud: &mut Hud, input: &mut Input, world: &mut World, key: Key) -> (bool, Vec<HudCommand>) {
        input.begin_tick(&[InputEvent::KeyDown(key)]);
        let out = hud.update(input, world).unwrap();
        input.begin_tick(&[InputEvent::KeyUp(key)]);
        out
    }

    fn idle(hud: &mut Hud, input: &mut Input, world: &mut World) -> bool {
        input.begin_tick(&[]);
        hud.update(input, world).unwrap().0
    }

    #[test]
    fn test_empty_stack_passes_input_through() {
        let mut hud = Hud::new(false);
        let mut world = World::with_seed(3);
        let mut input = Input::new();
        assert!(!idle(&mut hud, &mut input, &mut world));
        assert!(!hud.is_absorbing_inputs());
    }

    #[test]
    fn test_title_card_absorbs_for_its_lifetime() {
        let mut hud = Hud::new(false);
        let mut world = World::with_seed(3);
        let mut input = Input::new();
        world.show_title_card("Caves");
        let mut absorbed = 0;
        while idle(&mut hud, &mut input, &mut world) {
            absorbed += 1;
        }
        assert_eq!(absorbed, crate::consts::TITLE_CARD_TICKS);
    }

    #[test]
    fn test_menu_outranks_text() {
        let mut hud = Hud::new(false);
        let mut world = World::with_seed(3);
        let mut input = Input::new();
        world.show_text(vec!["hello".to_string()]);
        hud.open_menu(MenuKind::Death);
        let (absorbed, commands) = tap(&mut hud, &mut input, &mut world, Key::K);
        assert!(absorbed);
        assert_eq!(commands, vec![HudCommand::RetryLevel]);
        assert!(hud.menu.is_none());
        // The text page is still waiting underneath
        assert_eq!(hud.text.current(), Some("hello"));
    }

    #[test]
    fn test_settings_back_returns_to_parent() {
        let mut hud = Hud::new(false);
        let mut world = World::with_seed(3);
        let mut input = Input::new();
        hud.open_menu(MenuKind::Title);
        tap(&mut hud, &mut input, &mut world, Key::S);
        tap(&mut hud, &mut input, &mut world, Key::K);
        assert_eq!(hud.menu.as_ref().map(|m| m.kind), Some(MenuKind::Settings));
        let (_, commands) = tap(&mut hud, &mut input, &mut world, Key::J);
        assert_eq!(commands, vec![HudCommand::ToggleFps]);
        tap(&mut hud, &mut input, &mut world, Key::Escape);
        assert_eq!(hud.menu.as_ref().map(|m| m.kind), Some(MenuKind::Title));
    }

    #[test]
    fn test_toggles_work_under_a_modal() {
        let mut hud = Hud::new(false);
        let mut world = World::with_seed(3);
        let mut input = Input::new();
        hud.open_menu(MenuKind::Title);
        let (_, commands) = tap(&mut hud, &mut input, &mut world, Key::R);
        assert_eq!(commands, vec![HudCommand::ToggleRects]);
        let (_, commands) = tap(&mut hud, &mut input, &mut world, Key::F5);
        assert!(commands.is_empty());
    }

    #[test]
    fn test_f5_saves_in_editor() {
        let mut hud = Hud::new(true);
        let mut world = World::with_seed(3);
        let mut input = Input::new();
        let (absorbed, commands) = tap(&mut hud, &mut input, &mut world, Key::F5);
        assert!(!absorbed);
        assert_eq!(commands, vec![HudCommand::SaveLevel]);
    }

    #[test]
    fn test_second_puzzle_is_turned_away() {
        let mut hud = Hud::new(false);
        let mut world = World::with_seed(3);
        let mut input = Input::new();
        let (tx1, rx1) = outcome_channel();
        let (tx2, rx2) = outcome_channel();
        world.open_puzzle(Box::new(CodeLockPuzzle::new("1")), tx1);
        world.open_puzzle(Box::new(CodeLockPuzzle::new("2")), tx2);
        assert!(idle(&mut hud, &mut input, &mut world));
        assert_eq!(rx1.try_take(), None);
        assert_eq!(rx2.try_take(), Some(PuzzleStatus::Quit));
    }
}
