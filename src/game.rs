//! Per-tick orchestration
//!
//! [`tick`] advances the whole game by one fixed step: input, HUD, entity
//! updates, sweep, uncollide, camera, death menu, then any queued level
//! change. The host calls it from a [`FrameClock`] driven loop and draws
//! [`Game::frame`] afterwards.

use std::path::PathBuf;

use crate::audio::{LogBackend, SoundBackend, play_effect};
use crate::consts::{MAX_SUBSTEPS, SIM_DT, WAIT_TICKS_AFTER_DEATH};
use crate::error::EngineError;
use crate::hud::{Hud, HudCommand, MenuKind};
use crate::input::{Input, InputEvent};
use crate::level::{self, LevelDef};
use crate::renderer::{Frame, Palette, Scene};
use crate::settings::Settings;
use crate::sim::entity::TickContext;
use crate::sim::world::{GameEvent, World};

/// Fixed-step accumulator plus a rolling FPS estimate
#[derive(Debug, Clone)]
pub struct FrameClock {
    accumulator: f32,
    frame_times: [f64; 60],
    frame_index: usize,
    pub fps: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            accumulator: 0.0,
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0.0,
        }
    }
}

impl FrameClock {
    /// Add `dt` seconds of wall time; returns how many ticks to run now
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.min(0.1);
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }

    /// Note a frame presented at `time` seconds
    pub fn record_frame(&mut self, time: f64) {
        self.frame_times[self.frame_index] = time;
        self.frame_index = (self.frame_index + 1) % self.frame_times.len();

        // Oldest sample is the one we overwrite next
        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 {
            let elapsed = time - oldest;
            if elapsed > 0.0 {
                self.fps = ((self.frame_times.len() - 1) as f64 / elapsed) as f32;
            }
        }
    }
}

pub struct Game {
    pub settings: Settings,
    pub world: World,
    pub hud: Hud,
    pub input: Input,
    /// Global tick counter
    pub tick_count: u64,
    pub current_level: Option<&'static LevelDef>,
    pub scene: Scene,
    pub audio: Box<dyn SoundBackend>,
    pub clock: FrameClock,
    /// Non-sound events from the last tick, for the host
    pub events: Vec<GameEvent>,
    /// Commands only the host can carry out (screenshot, fullscreen)
    pub host_requests: Vec<HudCommand>,
    pub quit_requested: bool,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("tick_count", &self.tick_count)
            .field("current_level", &self.current_level.map(|d| d.name))
            .field("entities", &self.world.entities().len())
            .field("quit_requested", &self.quit_requested)
            .finish()
    }
}

impl Game {
    /// A game sitting on the title menu with an empty world
    pub fn new(settings: Settings) -> Self {
        let palette = Palette::load_or_builtin(settings.palette_path.as_deref());
        let mut hud = Hud::new(settings.editor_enabled);
        hud.open_menu(MenuKind::Title);
        Self {
            settings,
            world: World::new(),
            hud,
            input: Input::new(),
            tick_count: 0,
            current_level: None,
            scene: Scene::new(palette),
            audio: Box::new(LogBackend::default()),
            clock: FrameClock::default(),
            events: Vec::new(),
            host_requests: Vec::new(),
            quit_requested: false,
        }
    }

    /// Tear down the world and build the named level in a fresh one
    pub fn start_level(&mut self, name: &str) -> Result<(), EngineError> {
        let def = level::level_def(name)?;
        let mut world = World::new();
        level::load(&mut world, &self.settings.levels_dir, def)?;
        world.recenter_camera();
        // Flush what the old world queued before it goes away
        self.dispatch_events();
        self.world = world;
        self.current_level = Some(def);
        self.hud.clear_modals();
        log::info!("Started level `{}`", def.name);
        Ok(())
    }

    fn apply_command(&mut self, command: HudCommand) -> Result<(), EngineError> {
        match command {
            HudCommand::StartGame => {
                let start = self.settings.start_level.clone();
                self.start_level(&start)?;
            }
            HudCommand::RetryLevel => {
                let name = self
                    .current_level
                    .map_or_else(|| self.settings.start_level.clone(), |d| d.name.to_string());
                self.start_level(&name)?;
            }
            HudCommand::ReturnToTitle => {
                self.world = World::new();
                self.current_level = None;
            }
            HudCommand::Quit => {
                log::info!("Quit requested");
                self.quit_requested = true;
            }
            HudCommand::SaveLevel => {
                let path = self.settings.level_save_path();
                if let Err(e) = level::save(&self.world, &path) {
                    log::error!("Level save failed: {}", e);
                }
            }
            HudCommand::ReloadSheet => {
                let path: Option<PathBuf> = self.settings.palette_path.clone();
                self.scene.reload(path.as_deref());
            }
            HudCommand::ToggleFps => {
                self.settings.show_fps = !self.settings.show_fps;
                log::info!("show_fps = {}", self.settings.show_fps);
            }
            HudCommand::ToggleRects => {
                self.settings.show_rects = !self.settings.show_rects;
                log::info!("show_rects = {}", self.settings.show_rects);
            }
            HudCommand::Screenshot | HudCommand::ToggleFullscreen => {
                log::debug!("Host request {:?}", command);
                self.host_requests.push(command);
            }
        }
        Ok(())
    }

    /// Route sounds to the audio backend and keep the rest for the host
    fn dispatch_events(&mut self) {
        for event in self.world.drain_events() {
            match event {
                GameEvent::Sound(effect) => {
                    play_effect(self.audio.as_mut(), effect, &self.settings)
                }
                other => self.events.push(other),
            }
        }
    }

    pub fn frame(&mut self) -> Frame {
        let fps = (self.clock.fps > 0.0).then_some(self.clock.fps);
        self.scene
            .build(&self.world, &self.hud, &self.settings, self.tick_count, fps)
    }
}

/// Advance the game by one fixed tick
pub fn tick(game: &mut Game, events: &[InputEvent]) -> Result<(), EngineError> {
    game.events.clear();
    game.input.begin_tick(events);
    game.tick_count += 1;

    let (absorbing, commands) = game.hud.update(&game.input, &mut game.world)?;
    for command in commands {
        game.apply_command(command)?;
    }

    if !absorbing {
        let ctx = TickContext {
            tick: game.tick_count,
            input: &game.input,
        };
        game.world.update_entities(&ctx)?;
        game.world.sweep()?;
        game.world.uncollide_actors();
    }

    game.world.recenter_camera();

    if let Some(t) = game.world.time_since_player_death.as_mut() {
        *t = t.saturating_add(1);
        if *t == WAIT_TICKS_AFTER_DEATH + 1 {
            game.hud.open_menu(MenuKind::Death);
        }
    }

    if let Some(name) = game.world.take_pending_level() {
        game.start_level(&name)?;
    }

    game.dispatch_events();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;
    use crate::sim::entity::DamageSource;
    use glam::Vec2;

    fn settings() -> Settings {
        Settings {
            levels_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("levels"),
            ..Settings::default()
        }
    }

    fn run(game: &mut Game, n: usize) {
        for _ in 0..n {
            tick(game, &[]).unwrap();
        }
    }

    fn start(game: &mut Game) {
        tick(game, &[InputEvent::KeyDown(Key::K)]).unwrap();
        tick(game, &[InputEvent::KeyUp(Key::K)]).unwrap();
    }

    #[test]
    fn test_clock_caps_substeps() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.advance(SIM_DT * 0.5), 0);
        assert_eq!(clock.advance(SIM_DT * 0.6), 1);
        assert_eq!(clock.advance(1.0), MAX_SUBSTEPS);
    }

    #[test]
    fn test_clock_fps_from_frame_times() {
        let mut clock = FrameClock::default();
        for i in 1..=120 {
            clock.record_frame(f64::from(i) / 60.0);
        }
        assert!((clock.fps - 60.0).abs() < 0.5);
    }

    #[test]
    fn test_title_menu_absorbs_then_starts_level() {
        let mut game = Game::new(settings());
        tick(&mut game, &[]).unwrap();
        assert_eq!(game.tick_count, 1);
        assert!(game.world.entities().is_empty());

        start(&mut game);
        assert_eq!(game.current_level.map(|d| d.name), Some("intro"));
        assert!(game.hud.menu.is_none());
        assert!(game.world.player().is_some());
    }

    #[test]
    fn test_title_card_freezes_world() {
        let mut game = Game::new(settings());
        start(&mut game);
        let before = game.world.player().unwrap().body.pos;
        // Title card is picked up on the next tick and holds the world still
        run(&mut game, 10);
        assert!(game.hud.title_card.is_some());
        assert_eq!(game.world.player().unwrap().body.pos, before);
        assert_eq!(game.tick_count, 12);
    }

    #[test]
    fn test_player_death_opens_menu_after_wait() {
        let mut game = Game::new(settings());
        start(&mut game);
        game.hud.clear_modals();
        game.world.hud_requests.clear();

        let id = game.world.player_id().unwrap();
        game.world.damage(id, 100, Vec2::ZERO, DamageSource::Script);
        tick(&mut game, &[]).unwrap();
        assert!(game.world.player().is_none());
        assert!(game.events.contains(&GameEvent::PlayerDied));

        run(&mut game, WAIT_TICKS_AFTER_DEATH as usize - 1);
        assert!(game.hud.menu.is_none());
        run(&mut game, 1);
        assert_eq!(game.hud.menu.as_ref().map(|m| m.kind), Some(MenuKind::Death));

        // Retry rebuilds the level
        start(&mut game);
        assert!(game.world.player().is_some());
        assert_eq!(game.world.time_since_player_death, None);
    }

    #[test]
    fn test_queued_level_swaps_world() {
        let mut game = Game::new(settings());
        start(&mut game);
        game.world.queue_level("caves");
        tick(&mut game, &[]).unwrap();
        assert_eq!(game.current_level.map(|d| d.name), Some("caves"));
        assert_eq!(game.world.pending_level(), None);
    }

    #[test]
    fn test_unknown_start_level_is_an_error() {
        let mut game = Game::new(Settings {
            start_level: "nowhere".to_string(),
            ..settings()
        });
        tick(&mut game, &[InputEvent::KeyDown(Key::K)]).unwrap_err();
    }

    #[test]
    fn test_sample_script_runs() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scripts/walk_and_jump.txt");
        let script = crate::input::InputScript::parse(&std::fs::read_to_string(path).unwrap());
        let mut game = Game::new(settings());
        while game.tick_count < 200 {
            let events = script.events_at(game.tick_count + 1).to_vec();
            tick(&mut game, &events).unwrap();
        }
        assert_eq!(game.current_level.map(|d| d.name), Some("intro"));
    }

    #[test]
    fn test_host_commands_pass_through() {
        let mut game = Game::new(settings());
        tick(&mut game, &[InputEvent::KeyDown(Key::F2)]).unwrap();
        assert_eq!(game.host_requests, vec![HudCommand::Screenshot]);
        tick(&mut game, &[InputEvent::KeyDown(Key::F)]).unwrap();
        assert!(game.settings.show_fps);
    }
}
