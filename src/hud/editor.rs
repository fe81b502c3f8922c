//! In-game level editor
//!
//! Digit keys pick a palette slot on the current page (with Shift for the alt
//! row), Tab pages through the palette. Left click places the selection on the
//! tile under the cursor; right click removes the topmost non-player entity
//! there.

use glam::{IVec2, Vec2};
use rand::Rng;

use crate::consts::TILE_SIZE;
use crate::error::EngineError;
use crate::geom::Rect;
use crate::input::{Input, Key, MouseButton};
use crate::level::catalog;
use crate::sim::category::Category;
use crate::sim::enemy::{Enemy, EnemyArchetype};
use crate::sim::entity::Entity;
use crate::sim::objects::{HealthMachine, Spawner, Wall};
use crate::sim::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorItem {
    Wall(&'static str),
    Decoration(&'static str),
    Ground(&'static str),
    Enemy(EnemyArchetype),
    Spawner(EnemyArchetype),
    HealthMachine,
}

impl EditorItem {
    pub fn label(&self) -> String {
        match self {
            EditorItem::Wall(id) => format!("wall:{id}"),
            EditorItem::Decoration(id) => format!("dec:{id}"),
            EditorItem::Ground(id) => format!("ground:{id}"),
            EditorItem::Enemy(a) => format!("enemy:{}", a.name()),
            EditorItem::Spawner(a) => format!("spawner:{}", a.name()),
            EditorItem::HealthMachine => "health".to_string(),
        }
    }

    /// Entity to drop on the tile whose top-left is `tile`
    pub fn build(&self, tile: IVec2, rng: &mut impl Rng) -> Option<Entity> {
        let (tw, th) = TILE_SIZE;
        let center = tile.as_vec2() + Vec2::new(tw as f32, th as f32) / 2.0;
        let entity = match *self {
            EditorItem::Wall(id) => Wall::new_entity(id, Rect::new(tile.x, tile.y, tw, th)),
            EditorItem::Decoration(id) => catalog::decoration(id)?.build(tile),
            EditorItem::Ground(id) => catalog::ground(id)?.build_ground(tile),
            EditorItem::Enemy(archetype) => Enemy::new_entity(archetype, center, rng),
            EditorItem::Spawner(archetype) => Spawner::new_entity(archetype, 180, 3, tile.as_vec2()),
            EditorItem::HealthMachine => HealthMachine::new_entity(3, tile.as_vec2()),
        };
        Some(entity)
    }
}

const ROW: usize = 10;

/// Each page holds a main row (slots 0-9) and an alt row (slots 10-19)
pub const PAGES: &[&[EditorItem]] = &[
    &[
        EditorItem::Wall("stone"),
        EditorItem::Wall("metal"),
        EditorItem::Wall("brick"),
        EditorItem::Ground("dirt"),
        EditorItem::Ground("grass"),
        EditorItem::Ground("rubble"),
        EditorItem::Ground("plate"),
        EditorItem::Decoration("spikes"),
        EditorItem::Decoration("acid"),
        EditorItem::Decoration("reverse"),
        EditorItem::Decoration("moss"),
        EditorItem::Decoration("crate"),
        EditorItem::Decoration("pipe"),
        EditorItem::Decoration("vines"),
        EditorItem::Decoration("sign"),
        EditorItem::Decoration("lamp"),
        EditorItem::Decoration("crystal"),
        EditorItem::Decoration("rail"),
    ],
    &[
        EditorItem::Enemy(EnemyArchetype::Dumb),
        EditorItem::Enemy(EnemyArchetype::Smart),
        EditorItem::Enemy(EnemyArchetype::Zombie),
        EditorItem::Enemy(EnemyArchetype::Flappy),
        EditorItem::Enemy(EnemyArchetype::Dodge),
        EditorItem::Enemy(EnemyArchetype::Spiky),
        EditorItem::Enemy(EnemyArchetype::Sticky),
        EditorItem::HealthMachine,
        EditorItem::Spawner(EnemyArchetype::Dumb),
        EditorItem::Spawner(EnemyArchetype::Flappy),
    ],
];

#[derive(Debug, Clone, Default)]
pub struct Editor {
    pub enabled: bool,
    pub page: usize,
    pub selected: Option<EditorItem>,
    /// Mouse position in screen pixels as of the last update
    pub cursor: IVec2,
}

impl Editor {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    pub fn update(&mut self, input: &Input, world: &mut World) -> Result<(), EngineError> {
        if !self.enabled {
            return Ok(());
        }
        self.cursor = input.mouse_pos;
        let shift = input.is_held(Key::Shift);

        if input.was_pressed(Key::Tab) {
            let n = PAGES.len();
            self.page = if shift { (self.page + n - 1) % n } else { (self.page + 1) % n };
            log::debug!("Editor page {}", self.page);
        }

        if let Some(digit) = input.digit_pressed() {
            let slot = usize::from(digit) + if shift { ROW } else { 0 };
            self.selected = PAGES[self.page].get(slot).copied();
            if let Some(item) = &self.selected {
                log::debug!("Editor selected {}", item.label());
            }
        }

        let cursor = world.to_world_pos(input.mouse_pos);
        if input.mouse_was_pressed(MouseButton::Left) {
            if let Some(item) = self.selected {
                let tile = world.get_tile_at(cursor.x, cursor.y, TILE_SIZE);
                if let Some(entity) = item.build(tile, &mut world.rng) {
                    world.add_entity(entity)?;
                }
            }
        }
        if input.mouse_was_pressed(MouseButton::Right) {
            let under = world.get_entities_at_point(cursor, &[], &[Category::Player]);
            if let Some(&top) = under.last() {
                world.remove_entity(top);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputEvent;

    fn tick(editor: &mut Editor, input: &mut Input, world: &mut World, events: &[InputEvent]) {
        input.begin_tick(events);
        editor.update(input, world).unwrap();
    }

    #[test]
    fn test_digit_selects_and_shift_picks_alt_row() {
        let mut editor = Editor::new(true);
        let mut world = World::with_seed(1);
        let mut input = Input::new();
        tick(&mut editor, &mut input, &mut world, &[InputEvent::KeyDown(Key::Digit(1))]);
        assert_eq!(editor.selected, Some(EditorItem::Wall("metal")));
        tick(
            &mut editor,
            &mut input,
            &mut world,
            &[InputEvent::KeyUp(Key::Digit(1)), InputEvent::KeyDown(Key::Shift)],
        );
        tick(&mut editor, &mut input, &mut world, &[InputEvent::KeyDown(Key::Digit(1))]);
        assert_eq!(editor.selected, Some(EditorItem::Decoration("crate")));
    }

    #[test]
    fn test_tab_pages_both_ways() {
        let mut editor = Editor::new(true);
        let mut world = World::with_seed(1);
        let mut input = Input::new();
        tick(&mut editor, &mut input, &mut world, &[InputEvent::KeyDown(Key::Tab)]);
        assert_eq!(editor.page, 1);
        tick(
            &mut editor,
            &mut input,
            &mut world,
            &[InputEvent::KeyUp(Key::Tab), InputEvent::KeyDown(Key::Shift)],
        );
        tick(&mut editor, &mut input, &mut world, &[InputEvent::KeyDown(Key::Tab)]);
        assert_eq!(editor.page, 0);
    }

    #[test]
    fn test_place_on_tile_then_remove() {
        let mut editor = Editor::new(true);
        let mut world = World::with_seed(1);
        let mut input = Input::new();
        editor.selected = Some(EditorItem::Wall("stone"));
        let offset = world.camera_offset();

        tick(
            &mut editor,
            &mut input,
            &mut world,
            &[
                InputEvent::MouseMove { x: 45, y: 70 },
                InputEvent::MouseDown(MouseButton::Left),
            ],
        );
        assert_eq!(world.entities().len(), 1);
        let wall = world.entities().iter().next().unwrap();
        let cursor = IVec2::new(45, 70) + offset;
        assert_eq!(wall.rect().top_left(), world.get_tile_at(cursor.x, cursor.y, TILE_SIZE));
        assert!(wall.is(Category::Wall));

        tick(
            &mut editor,
            &mut input,
            &mut world,
            &[
                InputEvent::MouseUp(MouseButton::Left),
                InputEvent::MouseDown(MouseButton::Right),
            ],
        );
        assert!(world.entities().is_empty());
    }

    #[test]
    fn test_disabled_editor_ignores_clicks() {
        let mut editor = Editor::new(false);
        editor.selected = Some(EditorItem::Wall("stone"));
        let mut world = World::with_seed(1);
        let mut input = Input::new();
        tick(&mut editor, &mut input, &mut world, &[InputEvent::MouseDown(MouseButton::Left)]);
        assert!(world.entities().is_empty());
    }
}
