//! Static and interactable entities: walls, decorations, overlays, doors,
//! terminals, health machines, level exits, kill blocks and spawners

use glam::Vec2;

use super::category::{Category, CategorySet};
use super::collection::EntityId;
use super::enemy::{Enemy, EnemyArchetype};
use super::entity::{Body, DamageSource, Entity, EntityKind, TickContext};
use super::world::World;
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::error::EngineError;
use crate::geom::{Direction, Rect, subtract_spans};
use crate::hud::puzzle::{CodeLockPuzzle, OutcomeReceiver, PuzzleStatus, outcome_channel};

/// Thickness of the cached wall outline strips
pub const OUTLINE_WIDTH: i32 = 2;

/// Ticks per animation cycle for sprites whose overlays live in cycles
pub fn cycle_ticks(sprite: &str) -> u32 {
    match sprite {
        "bullet_splash" => 8,
        "hurt_flash" => 6,
        "heal_sparkle" => 12,
        _ => 10,
    }
}

#[derive(Debug, Clone)]
pub struct Wall {
    pub sprite: String,
    /// Exposed edge strips, in world pixels
    pub outline: Vec<Rect>,
}

impl Wall {
    pub fn new_entity(sprite: &str, rect: Rect) -> Entity {
        let outline = Self::outline_for(rect, &[]);
        Entity::new(
            EntityKind::Wall(Wall {
                sprite: sprite.to_string(),
                outline,
            }),
            rect,
            CategorySet::of(&[Category::Wall]),
        )
    }

    /// The 2-px strips along each face of `rect` not covered by a neighbor
    pub fn outline_for(rect: Rect, neighbors: &[Rect]) -> Vec<Rect> {
        let mut strips = Vec::new();
        for dir in Direction::ALL {
            let face = rect.sliver(dir, 1);
            let touching = neighbors.iter().filter(|n| n.overlaps(&face));
            if dir.is_horizontal() {
                let cuts: Vec<(i32, i32)> = touching.map(|n| (n.top(), n.bottom())).collect();
                let x = if dir == Direction::Left {
                    rect.left()
                } else {
                    rect.right() - OUTLINE_WIDTH
                };
                for (y0, y1) in subtract_spans(rect.top(), rect.bottom(), &cuts) {
                    strips.push(Rect::new(x, y0, OUTLINE_WIDTH, y1 - y0));
                }
            } else {
                let cuts: Vec<(i32, i32)> = touching.map(|n| (n.left(), n.right())).collect();
                let y = if dir == Direction::Up {
                    rect.top()
                } else {
                    rect.bottom() - OUTLINE_WIDTH
                };
                for (x0, x1) in subtract_spans(rect.left(), rect.right(), &cuts) {
                    strips.push(Rect::new(x0, y, x1 - x0, OUTLINE_WIDTH));
                }
            }
        }
        strips
    }
}

/// Background art: plain decorations, ground tiles, lights and tracks
#[derive(Debug, Clone)]
pub struct Decoration {
    pub sprite: String,
}

impl Decoration {
    pub fn new_entity(sprite: &str, rect: Rect, categories: CategorySet) -> Entity {
        let mut categories = categories;
        categories.insert(Category::Decoration);
        Entity::new(
            EntityKind::Decoration(Decoration {
                sprite: sprite.to_string(),
            }),
            rect,
            categories,
        )
    }
}

/// How long an overlay lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifespan {
    Ticks(u32),
    /// Whole animation cycles of the overlay's sprite
    Cycles(u32),
}

impl Lifespan {
    pub fn ticks(self, sprite: &str) -> u32 {
        match self {
            Lifespan::Ticks(n) => n,
            Lifespan::Cycles(n) => n * cycle_ticks(sprite),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Overlay {
    pub sprite: String,
    pub remaining: u32,
    /// Entity this overlay stays centered on
    pub target: Option<EntityId>,
}

impl Overlay {
    pub fn new_entity(
        sprite: &str,
        lifespan: Lifespan,
        size: (i32, i32),
        target: Option<EntityId>,
    ) -> Entity {
        Entity::new(
            EntityKind::Overlay(Overlay {
                sprite: sprite.to_string(),
                remaining: lifespan.ticks(sprite),
                target,
            }),
            Rect::new(0, 0, size.0, size.1),
            CategorySet::of(&[Category::Overlay]),
        )
    }

    pub fn update(&mut self, body: &mut Body, world: &World) {
        if let Some(target) = self.target {
            match world.get(target) {
                Some(e) if e.is_alive() => body.set_center(e.center()),
                _ => {
                    body.alive = false;
                    return;
                }
            }
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            body.alive = false;
        }
    }
}

/// Paired door: opening one teleports the player to its destination
#[derive(Debug, Clone)]
pub struct Door {
    pub label: String,
    /// Label of the door this one leads to
    pub dest: Option<String>,
    pub locked: bool,
    /// 0 closed, `N..1` opening, negative while closing after an arrival
    pub open_cooldown: i32,
}

impl Door {
    pub fn new_entity(label: &str, dest: Option<&str>, locked: bool, pos: Vec2) -> Entity {
        let mut entity = Entity::new(
            EntityKind::Door(Door {
                label: label.to_string(),
                dest: dest.map(str::to_string),
                locked,
                open_cooldown: 0,
            }),
            Rect::new(0, 0, 32, 48),
            CategorySet::of(&[Category::Door, Category::Interactable]),
        );
        entity.body.set_pos(pos);
        entity
    }

    pub fn interact_message(&self) -> &str {
        if self.locked { "locked" } else { "[K] open" }
    }

    pub fn interact(&mut self, world: &mut World) {
        if self.locked {
            world.play_sound(SoundEffect::DoorLocked);
            return;
        }
        if self.open_cooldown == 0 {
            self.open_cooldown = DOOR_OPEN_TICKS;
            world.play_sound(SoundEffect::DoorOpen);
        }
    }

    pub fn update(&mut self, id: EntityId, world: &mut World) {
        match self.open_cooldown {
            0 => {}
            1 => {
                self.open_cooldown = 0;
                self.teleport(id, world);
            }
            n if n > 1 => self.open_cooldown -= 1,
            _ => self.open_cooldown += 1,
        }
    }

    /// Drop the player at the destination door, feet on its sill
    fn teleport(&self, id: EntityId, world: &mut World) {
        let Some(dest_label) = self.dest.as_deref() else {
            return;
        };
        let Some(dest) = world.get_door(dest_label).filter(|&d| d != id) else {
            log::warn!("Door `{}` leads to missing door `{}`", self.label, dest_label);
            return;
        };
        let Some(dest_rect) = world.get_mut(dest).map(|e| {
            if let Some(d) = e.as_door_mut() {
                d.open_cooldown = -DOOR_OPEN_TICKS;
            }
            e.rect()
        }) else {
            return;
        };
        if let Some(player) = world.player_mut() {
            let size = player.rect();
            player.body.set_pos(Vec2::new(
                dest_rect.center().x - size.w as f32 / 2.0,
                (dest_rect.bottom() - size.h) as f32,
            ));
            player.body.vel = Vec2::ZERO;
        }
    }
}

/// Reading terminal: shows its pages as blocking text
#[derive(Debug, Clone)]
pub struct Terminal {
    pub pages: Vec<String>,
}

impl Terminal {
    pub fn new_entity(pages: Vec<String>, pos: Vec2) -> Entity {
        let mut entity = Entity::new(
            EntityKind::Terminal(Terminal { pages }),
            Rect::new(0, 0, 32, 32),
            CategorySet::of(&[Category::Terminal, Category::Interactable]),
        );
        entity.body.set_pos(pos);
        entity
    }

    pub fn interact(&self, world: &mut World) {
        world.show_text(self.pages.clone());
    }
}

/// Terminal that opens a puzzle modal and unlocks a door once solved
#[derive(Debug)]
pub struct PuzzleTerminal {
    pub code: String,
    /// Label of the door to unlock
    pub unlocks: Option<String>,
    pub solved: bool,
    pending: Option<OutcomeReceiver>,
}

impl PuzzleTerminal {
    pub fn new_entity(code: &str, unlocks: Option<&str>, pos: Vec2) -> Entity {
        let mut entity = Entity::new(
            EntityKind::PuzzleTerminal(PuzzleTerminal {
                code: code.to_string(),
                unlocks: unlocks.map(str::to_string),
                solved: false,
                pending: None,
            }),
            Rect::new(0, 0, 32, 32),
            CategorySet::of(&[Category::PuzzleTerminal, Category::Interactable]),
        );
        entity.body.set_pos(pos);
        entity
    }

    pub fn interact_message(&self) -> &str {
        if self.solved { "unlocked" } else { "[K] hack" }
    }

    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn interact(&mut self, id: EntityId, world: &mut World) {
        if self.solved || self.pending.is_some() {
            return;
        }
        let (reply, receiver) = outcome_channel();
        world.open_puzzle(Box::new(CodeLockPuzzle::new(&self.code)), reply);
        self.pending = Some(receiver);
        log::debug!("Puzzle terminal {:?} opened its puzzle", id);
    }

    /// Pick up the puzzle's result once the HUD has written it
    pub fn update(&mut self, world: &mut World) {
        let Some(status) = self.pending.as_ref().and_then(|rx| rx.try_take()) else {
            return;
        };
        self.pending = None;
        if status != PuzzleStatus::Success {
            return;
        }
        self.solved = true;
        world.play_sound(SoundEffect::PuzzleSolved);
        if let Some(label) = self.unlocks.as_deref() {
            let door = world.get_door(label);
            match door.and_then(|d| world.get_mut(d)).and_then(|e| e.as_door_mut()) {
                Some(door) => door.locked = false,
                None => log::warn!("Puzzle terminal unlocks missing door `{}`", label),
            }
        }
    }
}

/// What using an interactable does to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractEffect {
    HealFull,
}

#[derive(Debug, Clone)]
pub struct HealthMachine {
    pub charges: u32,
}

impl HealthMachine {
    pub fn new_entity(charges: u32, pos: Vec2) -> Entity {
        let mut entity = Entity::new(
            EntityKind::HealthMachine(HealthMachine { charges }),
            Rect::new(0, 0, 32, 48),
            CategorySet::of(&[Category::HealthMachine, Category::Interactable]),
        );
        entity.body.set_pos(pos);
        entity
    }

    pub fn interact_message(&self) -> String {
        match self.charges {
            0 => "empty".to_string(),
            n => format!("[K] heal ({n} left)"),
        }
    }

    pub fn interact(&mut self, world: &mut World) -> Option<InteractEffect> {
        if self.charges == 0 {
            return None;
        }
        self.charges -= 1;
        world.play_sound(SoundEffect::Heal);
        Some(InteractEffect::HealFull)
    }
}

/// Exit to the next level
#[derive(Debug, Clone)]
pub struct LevelEndDoor {
    pub next_level: String,
}

impl LevelEndDoor {
    pub fn new_entity(next_level: &str, pos: Vec2) -> Entity {
        let mut entity = Entity::new(
            EntityKind::LevelEndDoor(LevelEndDoor {
                next_level: next_level.to_string(),
            }),
            Rect::new(0, 0, 32, 48),
            CategorySet::of(&[Category::LevelDoor, Category::Interactable]),
        );
        entity.body.set_pos(pos);
        entity
    }

    pub fn interact(&self, world: &mut World) {
        world.queue_level(&self.next_level);
    }
}

/// Hazard tile that kills any actor touching it
#[derive(Debug, Clone)]
pub struct KillBlock {
    pub sprite: String,
}

impl KillBlock {
    pub fn new_entity(sprite: &str, rect: Rect) -> Entity {
        Entity::new(
            EntityKind::KillBlock(KillBlock {
                sprite: sprite.to_string(),
            }),
            rect,
            CategorySet::of(&[Category::Decoration]),
        )
    }

    pub fn update(&self, body: &Body, world: &mut World) {
        let victims =
            world.get_entities_in_rect(body.rect, &[Category::Actor], &[], |e| e.is_alive(), None);
        for id in victims {
            world.damage(id, INSTA_KILL_DAMAGE, Vec2::ZERO, DamageSource::KillBlock);
        }
    }
}

/// Periodically spawns enemies of one archetype
#[derive(Debug, Clone)]
pub struct Spawner {
    pub archetype: EnemyArchetype,
    pub interval: u32,
    pub max_alive: usize,
    timer: u32,
    spawned: Vec<EntityId>,
}

impl Spawner {
    pub fn new_entity(archetype: EnemyArchetype, interval: u32, max_alive: usize, pos: Vec2) -> Entity {
        let mut entity = Entity::new(
            EntityKind::Spawner(Spawner {
                archetype,
                interval,
                max_alive,
                timer: 0,
                spawned: Vec::new(),
            }),
            Rect::new(0, 0, 32, 32),
            CategorySet::of(&[Category::Spawner]),
        );
        entity.body.set_pos(pos);
        entity
    }

    pub fn alive_count(&self) -> usize {
        self.spawned.len()
    }

    pub fn update(&mut self, body: &Body, world: &mut World, _ctx: &TickContext) -> Result<(), EngineError> {
        self.spawned.retain(|&id| world.contains(id));
        self.timer += 1;
        if self.timer < self.interval || self.spawned.len() >= self.max_alive {
            return Ok(());
        }
        self.timer = 0;
        let enemy = Enemy::new_entity(self.archetype, body.center(), &mut world.rng);
        let id = world.add_entity(enemy)?;
        self.spawned.push(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Input;
    use crate::sim::player::Player;
    use crate::sim::world::GameEvent;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn ctx(input: &Input) -> TickContext<'_> {
        TickContext { tick: 0, input }
    }

    #[test]
    fn test_outline_of_lone_wall_has_four_strips() {
        let strips = Wall::outline_for(Rect::new(0, 0, 32, 32), &[]);
        assert_eq!(strips.len(), 4);
        assert!(strips.contains(&Rect::new(0, 0, 32, 2)));
        assert!(strips.contains(&Rect::new(30, 0, 2, 32)));
    }

    #[test]
    fn test_outline_cut_by_partial_neighbor() {
        // Neighbor covers the lower half of the right face
        let strips = Wall::outline_for(Rect::new(0, 0, 32, 32), &[Rect::new(32, 16, 32, 32)]);
        assert!(strips.contains(&Rect::new(30, 0, 2, 16)));
        assert!(!strips.iter().any(|s| s.x == 30 && s.y >= 16));
    }

    #[test]
    fn test_overlay_cycles_convert_to_ticks() {
        let mut world = World::with_seed(3);
        let id = world
            .spawn_overlay("bullet_splash", Lifespan::Cycles(1), Vec2::ZERO, (8, 8), None)
            .unwrap();
        let input = Input::new();
        for _ in 0..7 {
            world.update_entities(&ctx(&input)).unwrap();
            world.sweep().unwrap();
            assert!(world.contains(id));
        }
        world.update_entities(&ctx(&input)).unwrap();
        world.sweep().unwrap();
        assert!(!world.contains(id));
    }

    #[test]
    fn test_overlay_dies_with_target() {
        let mut world = World::with_seed(3);
        let target = world
            .add_entity(Wall::new_entity("stone", Rect::new(0, 0, 32, 32)))
            .unwrap();
        let overlay = world
            .spawn_overlay("hurt_flash", Lifespan::Ticks(100), Vec2::ZERO, (8, 8), Some(target))
            .unwrap();
        let input = Input::new();
        world.update_entities(&ctx(&input)).unwrap();
        assert_eq!(world.get(overlay).unwrap().center(), Vec2::new(16.0, 16.0));

        world.remove_entity(target);
        world.update_entities(&ctx(&input)).unwrap();
        world.sweep().unwrap();
        assert!(!world.contains(overlay));
    }

    #[test]
    fn test_door_cycle_teleports_player() {
        let mut world = World::with_seed(3);
        let player = world
            .add_entity(Player::new_entity(Vec2::new(0.0, 0.0)))
            .unwrap();
        let a = world
            .add_entity(Door::new_entity("a", Some("b"), false, Vec2::new(0.0, 0.0)))
            .unwrap();
        let b = world
            .add_entity(Door::new_entity("b", Some("a"), false, Vec2::new(500.0, 200.0)))
            .unwrap();

        world.with_entity(a, |e, w| e.interact(w));
        assert_eq!(world.get(a).unwrap().as_door().unwrap().open_cooldown, DOOR_OPEN_TICKS);

        let door = |w: &World, id| w.get(id).unwrap().as_door().unwrap().open_cooldown;
        let input = Input::new();
        for _ in 0..DOOR_OPEN_TICKS {
            for id in [a, b] {
                world.with_entity(id, |e, w| e.update(w, &ctx(&input))).unwrap().unwrap();
            }
        }
        assert_eq!(door(&world, a), 0);
        assert!(door(&world, b) < 0);
        let p = world.get(player).unwrap().rect();
        assert_eq!(p.bottom(), world.get(b).unwrap().rect().bottom());
        assert!(world.get(b).unwrap().rect().overlaps(&p));
    }

    #[test]
    fn test_locked_door_stays_shut() {
        let mut world = World::with_seed(3);
        let a = world
            .add_entity(Door::new_entity("a", None, true, Vec2::ZERO))
            .unwrap();
        world.with_entity(a, |e, w| e.interact(w));
        assert_eq!(world.get(a).unwrap().as_door().unwrap().open_cooldown, 0);
        assert!(world.events.contains(&GameEvent::Sound(SoundEffect::DoorLocked)));
    }

    #[test]
    fn test_health_machine_runs_out() {
        let mut world = World::with_seed(3);
        let id = world
            .add_entity(HealthMachine::new_entity(1, Vec2::ZERO))
            .unwrap();
        let first = world.with_entity(id, |e, w| e.interact(w)).flatten();
        let second = world.with_entity(id, |e, w| e.interact(w)).flatten();
        assert_eq!(first, Some(InteractEffect::HealFull));
        assert_eq!(second, None);
    }

    #[test]
    fn test_kill_block_spares_slugs() {
        let mut world = World::with_seed(3);
        let mut rng = Pcg32::seed_from_u64(5);
        let spikes = world
            .add_entity(KillBlock::new_entity("spikes", Rect::new(0, 0, 64, 32)))
            .unwrap();
        let slug = world
            .add_entity(Enemy::new_entity(EnemyArchetype::Sticky, Vec2::new(16.0, 16.0), &mut rng))
            .unwrap();
        let dumb = world
            .add_entity(Enemy::new_entity(EnemyArchetype::Dumb, Vec2::new(48.0, 16.0), &mut rng))
            .unwrap();
        let input = Input::new();
        world.with_entity(spikes, |e, w| e.update(w, &ctx(&input))).unwrap().unwrap();
        assert!(world.get(slug).unwrap().is_alive());
        assert!(!world.get(dumb).unwrap().is_alive());
    }

    #[test]
    fn test_spawner_caps_alive_spawns() {
        let mut world = World::with_seed(3);
        let spawner = world
            .add_entity(Spawner::new_entity(EnemyArchetype::Spiky, 2, 2, Vec2::new(100.0, 100.0)))
            .unwrap();
        let input = Input::new();
        for _ in 0..10 {
            world.with_entity(spawner, |e, w| e.update(w, &ctx(&input))).unwrap().unwrap();
        }
        assert_eq!(world.entities().category(Category::Enemy).unwrap().len(), 2);
    }
}
