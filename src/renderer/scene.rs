//! Turns the world and HUD into a [`Frame`] the host can draw
//!
//! Entity rects are shifted by the camera offset into screen pixels. Layers
//! go back to front: ground, decorations, walls, interactables, actors,
//! overlays, then the HUD on top.

use std::path::Path;

use glam::{IVec2, Vec2};

use super::palette::Palette;
use super::shapes;
use super::vertex::{Vertex, colors};
use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH, TILE_SIZE};
use crate::geom::Rect;
use crate::hud::Hud;
use crate::hud::puzzle::{ModalPhase, PuzzleStatus};
use crate::settings::Settings;
use crate::sim::category::Category;
use crate::sim::entity::{Entity, EntityKind};
use crate::sim::world::World;

#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    /// Screen position of the text's anchor
    pub pos: IVec2,
    pub text: String,
    pub color: [f32; 4],
    /// Anchor is the text's center rather than its left edge
    pub centered: bool,
}

/// One frame's draw list
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub clear: [f32; 4],
    pub vertices: Vec<Vertex>,
    pub texts: Vec<TextItem>,
}

impl Frame {
    fn push(&mut self, vertices: Vec<Vertex>) {
        self.vertices.extend(vertices);
    }

    fn text(&mut self, x: i32, y: i32, text: impl Into<String>, color: [f32; 4], centered: bool) {
        self.texts.push(TextItem {
            pos: IVec2::new(x, y),
            text: text.into(),
            color,
            centered,
        });
    }
}

const SCREEN: Rect = Rect::new(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT);

fn layer(entity: &Entity) -> u8 {
    match &entity.kind {
        EntityKind::Decoration(_) if entity.is(Category::Ground) => 0,
        EntityKind::Decoration(_) | EntityKind::KillBlock(_) => 1,
        EntityKind::Wall(_) => 2,
        EntityKind::Door(_)
        | EntityKind::Terminal(_)
        | EntityKind::PuzzleTerminal(_)
        | EntityKind::HealthMachine(_)
        | EntityKind::LevelEndDoor(_)
        | EntityKind::Spawner(_) => 3,
        EntityKind::Enemy(_) | EntityKind::Player(_) => 4,
        EntityKind::Overlay(_) => 5,
        EntityKind::Reference | EntityKind::Reverse => 6,
    }
}

#[derive(Debug)]
pub struct Scene {
    pub palette: Palette,
}

impl Scene {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    /// F1: re-read the palette file
    pub fn reload(&mut self, path: Option<&Path>) {
        self.palette = Palette::load_or_builtin(path);
        log::info!("Reloaded palette");
    }

    pub fn build(
        &mut self,
        world: &World,
        hud: &Hud,
        settings: &Settings,
        tick: u64,
        fps: Option<f32>,
    ) -> Frame {
        let mut frame = Frame {
            clear: colors::BACKGROUND,
            ..Frame::default()
        };
        let offset = world.camera_offset();
        let to_screen = |r: Rect| r.translate(-offset.x, -offset.y);

        let mut visible: Vec<&Entity> = world
            .entities()
            .iter()
            .filter(|e| to_screen(e.rect().inflate(96, 96)).overlaps(&SCREEN))
            .collect();
        visible.sort_by_key(|e| layer(e));

        for entity in &visible {
            self.draw_entity(&mut frame, entity, to_screen(entity.rect()), offset, tick);
        }

        if settings.show_rects {
            for entity in &visible {
                frame.push(shapes::outline(to_screen(entity.rect()), 1, colors::DEBUG_RECT));
            }
        }

        self.draw_player_hud(&mut frame, world, offset);
        draw_editor(&mut frame, world, hud);
        draw_modals(&mut frame, hud);

        if settings.show_fps {
            if let Some(fps) = fps {
                frame.text(SCREEN_WIDTH - 8, 8, format!("{fps:.0} FPS"), colors::TEXT_DIM, false);
            }
        }
        frame
    }

    fn draw_entity(&mut self, frame: &mut Frame, entity: &Entity, rect: Rect, offset: IVec2, tick: u64) {
        match &entity.kind {
            EntityKind::Wall(wall) => {
                frame.push(shapes::quad(rect, self.palette.resolve(&wall.sprite, tick)));
                for strip in &wall.outline {
                    let strip = strip.translate(-offset.x, -offset.y);
                    frame.push(shapes::quad(strip, colors::WALL_OUTLINE));
                }
            }
            EntityKind::Decoration(dec) => {
                let color = self.palette.resolve(&dec.sprite, tick);
                if entity.is(Category::Track) {
                    let y = rect.center().y;
                    let (a, b) = (Vec2::new(rect.left() as f32, y), Vec2::new(rect.right() as f32, y));
                    frame.push(shapes::line(a, b, 3.0, colors::TRACK));
                } else {
                    frame.push(shapes::quad(rect, color));
                }
                if entity.is(Category::LightSource) {
                    frame.push(shapes::circle(rect.center(), 48.0, colors::LIGHT_GLOW, 24));
                }
            }
            EntityKind::KillBlock(k) => {
                frame.push(shapes::quad(rect, self.palette.resolve(&k.sprite, tick)));
            }
            EntityKind::Overlay(o) => {
                frame.push(shapes::quad(rect, self.palette.resolve(&o.sprite, tick)));
            }
            EntityKind::Door(door) => {
                let sprite = if door.locked { "door_locked" } else { "door" };
                frame.push(shapes::quad(rect, self.palette.resolve(sprite, tick)));
                // Opening doors slide up
                if door.open_cooldown != 0 {
                    let gap = rect.h * door.open_cooldown.abs() / crate::consts::DOOR_OPEN_TICKS;
                    frame.push(shapes::quad(
                        Rect::new(rect.x, rect.y, rect.w, rect.h - gap),
                        colors::BACKGROUND,
                    ));
                }
            }
            EntityKind::Terminal(_) => {
                frame.push(shapes::quad(rect, self.palette.resolve("terminal", tick)));
            }
            EntityKind::PuzzleTerminal(_) => {
                frame.push(shapes::quad(rect, self.palette.resolve("puzzle_terminal", tick)));
            }
            EntityKind::HealthMachine(_) => {
                frame.push(shapes::quad(rect, self.palette.resolve("health_machine", tick)));
            }
            EntityKind::LevelEndDoor(_) => {
                frame.push(shapes::quad(rect, self.palette.resolve("level_door", tick)));
            }
            EntityKind::Spawner(_) => {
                frame.push(shapes::outline(rect, 2, self.palette.resolve("spawner", tick)));
            }
            EntityKind::Enemy(enemy) => {
                let sprite = format!("enemy_{}", enemy.archetype.name());
                frame.push(shapes::quad(rect, self.palette.resolve(&sprite, tick)));
                let actor = &enemy.actor;
                if actor.health < actor.max_health && actor.max_health > 0 {
                    let bar = Rect::new(rect.x, rect.y - 6, rect.w, 3);
                    let filled = bar.w * actor.health / actor.max_health;
                    frame.push(shapes::quad(bar, colors::HEALTH_BAR_BACK));
                    frame.push(shapes::quad(Rect::new(bar.x, bar.y, filled, bar.h), colors::HEALTH_BAR));
                }
            }
            EntityKind::Player(player) => {
                // Blink while invulnerable
                let hidden = player.hurt_cooldown > 0 && (player.hurt_cooldown / 4) % 2 == 1;
                if !hidden {
                    frame.push(shapes::quad(rect, colors::PLAYER));
                } else {
                    frame.push(shapes::outline(rect, 1, colors::PLAYER_HURT));
                }
                if let Some(bullet) = player.active_bullet {
                    frame.push(shapes::quad(bullet.translate(-offset.x, -offset.y), colors::BULLET));
                }
            }
            EntityKind::Reference | EntityKind::Reverse => {}
        }
    }

    fn draw_player_hud(&self, frame: &mut Frame, world: &World, offset: IVec2) {
        let Some(entity) = world.player() else {
            return;
        };
        let Some(player) = entity.as_player() else {
            return;
        };
        let health = player.actor.health;
        for i in 0..player.actor.max_health / 2 {
            let heart = Rect::new(8 + i * 16, 8, 12, 12);
            frame.push(shapes::quad(heart, colors::HEART_EMPTY));
            let fill = (health - 2 * i).clamp(0, 2);
            if fill > 0 {
                let w = heart.w * fill / 2;
                frame.push(shapes::quad(Rect::new(heart.x, heart.y, w, heart.h), colors::HEART_FULL));
            }
        }
        if let Some(text) = &player.hover_overhead_text {
            let rect = entity.rect().translate(-offset.x, -offset.y);
            frame.text(rect.center().x as i32, rect.top() - 14, text.clone(), colors::TEXT, true);
        }
    }

}

fn draw_editor(frame: &mut Frame, world: &World, hud: &Hud) {
    let editor = &hud.editor;
    if !editor.enabled {
        return;
    }
    frame.push(shapes::outline(cursor_tile(world, editor.cursor), 1, colors::TEXT_DIM));
    let selected = editor
        .selected
        .map_or_else(|| "-".to_string(), |item| item.label());
    frame.text(
        8,
        SCREEN_HEIGHT - 16,
        format!("EDITOR page {} [{}]", editor.page + 1, selected),
        colors::TEXT_DIM,
        false,
    );
}

fn modal_box(frame: &mut Frame, rect: Rect) {
    frame.push(shapes::quad(rect, colors::MODAL_BACK));
    frame.push(shapes::outline(rect, 2, colors::TEXT_DIM));
}

fn draw_modals(frame: &mut Frame, hud: &Hud) {
    let cx = SCREEN_WIDTH / 2;

    if let Some(page) = hud.text.current() {
        let rect = Rect::new(32, SCREEN_HEIGHT - 96, SCREEN_WIDTH - 64, 80);
        modal_box(frame, rect);
        frame.text(rect.x + 12, rect.y + 12, page, colors::TEXT, false);
        frame.text(rect.right() - 40, rect.bottom() - 20, "[K]", colors::TEXT_DIM, false);
    }

    if let Some(modal) = &hud.puzzle {
        let rect = Rect::new(cx - 140, 60, 280, 200);
        modal_box(frame, rect);
        frame.text(cx, rect.y + 16, modal.title(), colors::TEXT, true);
        match modal.phase {
            ModalPhase::Title => {
                frame.text(cx, rect.y + 100, "[K] start   [Esc] leave", colors::TEXT_DIM, true);
            }
            ModalPhase::InProgress => {
                for (i, line) in modal.lines.iter().enumerate() {
                    frame.text(cx, rect.y + 60 + 20 * i as i32, line.clone(), colors::TEXT, true);
                }
            }
            ModalPhase::Closing { status, .. } => {
                let color = if status == PuzzleStatus::Success {
                    colors::BANNER_GOOD
                } else {
                    colors::BANNER_BAD
                };
                frame.text(cx, rect.y + 100, status.banner(), color, true);
            }
        }
    }

    if let Some(card) = &hud.title_card {
        frame.text(cx, SCREEN_HEIGHT / 3, card.text.clone(), colors::TEXT, true);
    }

    if let Some(menu) = &hud.menu {
        frame.push(shapes::quad(SCREEN, colors::MODAL_BACK));
        frame.text(cx, 80, menu.kind.heading(), colors::TEXT, true);
        for (i, (label, _)) in menu.kind.items().iter().enumerate() {
            let y = 140 + 24 * i as i32;
            let (text, color) = if i == menu.cursor {
                (format!("> {label} <"), colors::TEXT)
            } else {
                (label.to_string(), colors::TEXT_DIM)
            };
            frame.text(cx, y, text, color, true);
        }
    }
}

/// Screen rect of the editor tile under the cursor
pub fn cursor_tile(world: &World, mouse: IVec2) -> Rect {
    let p = world.to_world_pos(mouse);
    let tile = world.get_tile_at(p.x, p.y, TILE_SIZE);
    let screen = world.world_to_screen(tile);
    Rect::new(screen.x, screen.y, TILE_SIZE.0, TILE_SIZE.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hud::MenuKind;
    use crate::sim::objects::Wall;
    use crate::sim::player::Player;

    fn scene() -> Scene {
        Scene::new(Palette::builtin())
    }

    #[test]
    fn test_offscreen_entities_are_culled() {
        let mut world = World::with_seed(1);
        world
            .add_entity(Wall::new_entity("stone", Rect::new(5000, 5000, 32, 32)))
            .unwrap();
        let hud = Hud::new(false);
        let frame = scene().build(&world, &hud, &Settings::default(), 0, None);
        assert!(frame.vertices.is_empty());
    }

    #[test]
    fn test_wall_shifts_by_camera() {
        let mut world = World::with_seed(1);
        world
            .add_entity(Wall::new_entity("stone", Rect::new(100, 100, 32, 32)))
            .unwrap();
        world.camera += Vec2::new(10.0, 0.0);
        let hud = Hud::new(false);
        let frame = scene().build(&world, &hud, &Settings::default(), 0, None);
        let min_x = frame
            .vertices
            .iter()
            .map(|v| v.position[0])
            .fold(f32::MAX, f32::min);
        assert_eq!(min_x, 90.0);
    }

    #[test]
    fn test_hearts_and_menu_text() {
        let mut world = World::with_seed(1);
        world.add_entity(Player::new_entity(Vec2::new(50.0, 50.0))).unwrap();
        let mut hud = Hud::new(false);
        hud.open_menu(MenuKind::Death);
        let frame = scene().build(&world, &hud, &Settings::default(), 0, None);
        assert!(frame.texts.iter().any(|t| t.text == "YOU DIED"));
        assert!(frame.texts.iter().any(|t| t.text == "> Retry <"));
        assert!(frame.vertices.iter().any(|v| v.color == colors::HEART_FULL));
    }

    #[test]
    fn test_fps_only_when_enabled() {
        let world = World::with_seed(1);
        let hud = Hud::new(false);
        let settings = Settings {
            show_fps: true,
            ..Settings::default()
        };
        let frame = scene().build(&world, &hud, &settings, 0, Some(59.6));
        assert!(frame.texts.iter().any(|t| t.text == "60 FPS"));
        let frame = scene().build(&world, &hud, &Settings::default(), 0, Some(59.6));
        assert!(frame.texts.is_empty());
    }

    #[test]
    fn test_cursor_tile_snaps() {
        let world = World::with_seed(1);
        let tile = cursor_tile(&world, IVec2::new(40, 70));
        assert_eq!(tile.w, 32);
        assert_eq!(world.to_world_pos(tile.top_left()).x % 32, 0);
    }
}
