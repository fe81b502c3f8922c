//! The entity record: shared body, category tags and a per-kind payload
//!
//! Every entity carries the same [`Body`] (float position, pixel rect that
//! trails it, velocity, alive flag). Behavior is chosen by matching on
//! [`EntityKind`]; actors additionally carry an [`Actor`] block inside their
//! payload.

use glam::Vec2;

use super::category::{Category, CategorySet};
use super::collection::EntityId;
use super::enemy::Enemy;
use super::objects::{
    Decoration, Door, HealthMachine, InteractEffect, KillBlock, LevelEndDoor, Overlay,
    PuzzleTerminal, Spawner, Terminal, Wall,
};
use super::player::Player;
use super::world::World;
use crate::consts::*;
use crate::error::EngineError;
use crate::geom::Rect;
use crate::input::Input;
use crate::to_pixel;

/// Per-tick context handed to every update
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    /// Global tick counter
    pub tick: u64,
    pub input: &'a Input,
}

/// Who is dealing damage (some entities ignore some sources)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    Player,
    Enemy,
    KillBlock,
    Script,
}

/// Position, rect and velocity shared by every entity
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    /// Pixel rect; its top-left is always the rounded position
    pub rect: Rect,
    pub vel: Vec2,
    pub alive: bool,
}

impl Body {
    pub fn new(rect: Rect) -> Self {
        Self {
            pos: Vec2::new(rect.x as f32, rect.y as f32),
            rect,
            vel: Vec2::ZERO,
            alive: true,
        }
    }

    pub fn set_pos(&mut self, pos: Vec2) {
        self.pos = pos;
        self.rect.x = to_pixel(pos.x);
        self.rect.y = to_pixel(pos.y);
    }

    pub fn set_x(&mut self, x: f32) {
        self.set_pos(Vec2::new(x, self.pos.y));
    }

    pub fn set_y(&mut self, y: f32) {
        self.set_pos(Vec2::new(self.pos.x, y));
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.set_pos(self.pos + delta);
    }

    pub fn set_size(&mut self, w: i32, h: i32) {
        self.rect.w = w.max(0);
        self.rect.h = h.max(0);
    }

    /// Move so the rect's top-left sits exactly on `rect`
    pub fn snap_to(&mut self, rect: Rect) {
        self.pos = Vec2::new(rect.x as f32, rect.y as f32);
        self.rect = rect;
    }

    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }

    /// Put the rect's center on `center`
    pub fn set_center(&mut self, center: Vec2) {
        let half = Vec2::new(self.rect.w as f32, self.rect.h as f32) / 2.0;
        self.set_pos(center - half);
    }
}

/// State shared by everything that moves and takes damage
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub has_gravity: bool,
    pub is_grounded: bool,
    pub is_left_walled: bool,
    pub is_right_walled: bool,
    pub is_top_walled: bool,
    pub facing_right: bool,
    pub max_speed: Vec2,
    pub health: i32,
    pub max_health: i32,
    /// Vertical speed before this tick's gravity, for midpoint integration
    pub(crate) vy_before_gravity: Option<f32>,
}

impl Actor {
    pub fn new(max_health: i32) -> Self {
        Self {
            has_gravity: true,
            is_grounded: false,
            is_left_walled: false,
            is_right_walled: false,
            is_top_walled: false,
            facing_right: true,
            max_speed: Vec2::new(MAX_SPEED_X, MAX_SPEED_Y),
            health: max_health,
            max_health,
            vy_before_gravity: None,
        }
    }

    /// Initial vertical speed reaching `JUMP_HEIGHT` under `GRAVITY`
    pub fn jump_speed() -> f32 {
        -(2.0 * GRAVITY * JUMP_HEIGHT).sqrt()
    }

    /// Subtract health, clamped to `[0, max_health]`; true when it hit zero
    pub fn take_health(&mut self, amount: i32) -> bool {
        self.health = (self.health - amount).clamp(0, self.max_health);
        self.health == 0
    }

    pub fn heal_full(&mut self) {
        self.health = self.max_health;
    }

    pub fn is_walled(&self) -> bool {
        self.is_left_walled || self.is_right_walled
    }
}

/// Per-kind payload
#[derive(Debug)]
pub enum EntityKind {
    Player(Box<Player>),
    Enemy(Box<Enemy>),
    Wall(Wall),
    Decoration(Decoration),
    Overlay(Overlay),
    Door(Door),
    Terminal(Terminal),
    PuzzleTerminal(PuzzleTerminal),
    HealthMachine(HealthMachine),
    LevelEndDoor(LevelEndDoor),
    KillBlock(KillBlock),
    Spawner(Spawner),
    /// Placeholder left by the level loader for an unbound reference
    Reference,
    /// Invisible marker that turns patrolling enemies around
    Reverse,
}

#[derive(Debug)]
pub struct Entity {
    pub id: EntityId,
    pub body: Body,
    pub categories: CategorySet,
    /// Stable id from the level file, if this entity was bound to one
    pub ref_id: Option<String>,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(kind: EntityKind, rect: Rect, categories: CategorySet) -> Self {
        Self {
            id: EntityId(0),
            body: Body::new(rect),
            categories,
            ref_id: None,
            kind,
        }
    }

    pub fn rect(&self) -> Rect {
        self.body.rect
    }

    pub fn center(&self) -> Vec2 {
        self.body.center()
    }

    pub fn is_alive(&self) -> bool {
        self.body.alive
    }

    pub fn is(&self, category: Category) -> bool {
        self.categories.contains(category)
    }

    pub fn actor(&self) -> Option<&Actor> {
        match &self.kind {
            EntityKind::Player(p) => Some(&p.actor),
            EntityKind::Enemy(e) => Some(&e.actor),
            _ => None,
        }
    }

    pub fn actor_mut(&mut self) -> Option<&mut Actor> {
        match &mut self.kind {
            EntityKind::Player(p) => Some(&mut p.actor),
            EntityKind::Enemy(e) => Some(&mut e.actor),
            _ => None,
        }
    }

    pub fn as_player(&self) -> Option<&Player> {
        match &self.kind {
            EntityKind::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut Player> {
        match &mut self.kind {
            EntityKind::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_enemy(&self) -> Option<&Enemy> {
        match &self.kind {
            EntityKind::Enemy(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_enemy_mut(&mut self) -> Option<&mut Enemy> {
        match &mut self.kind {
            EntityKind::Enemy(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_door(&self) -> Option<&Door> {
        match &self.kind {
            EntityKind::Door(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_door_mut(&mut self) -> Option<&mut Door> {
        match &mut self.kind {
            EntityKind::Door(d) => Some(d),
            _ => None,
        }
    }

    /// Sub-rect that accepts hitscan damage
    pub fn hurtbox(&self) -> Rect {
        match &self.kind {
            EntityKind::Enemy(e) => e.hurtbox(self.body.rect),
            _ => self.body.rect,
        }
    }

    /// Advance one tick
    pub fn update(&mut self, world: &mut World, ctx: &TickContext) -> Result<(), EngineError> {
        let id = self.id;
        match &mut self.kind {
            EntityKind::Player(p) => p.update(id, &mut self.body, world, ctx),
            EntityKind::Enemy(e) => e.update(id, &mut self.body, world, ctx),
            EntityKind::Overlay(o) => {
                o.update(&mut self.body, world);
                Ok(())
            }
            EntityKind::Door(d) => {
                d.update(id, world);
                Ok(())
            }
            EntityKind::PuzzleTerminal(t) => {
                t.update(world);
                Ok(())
            }
            EntityKind::KillBlock(k) => {
                k.update(&self.body, world);
                Ok(())
            }
            EntityKind::Spawner(s) => s.update(&self.body, world, ctx),
            EntityKind::Wall(_)
            | EntityKind::Decoration(_)
            | EntityKind::Terminal(_)
            | EntityKind::HealthMachine(_)
            | EntityKind::LevelEndDoor(_)
            | EntityKind::Reference
            | EntityKind::Reverse => Ok(()),
        }
    }

    /// Apply damage; returns true if any was taken
    pub fn deal_damage(&mut self, amount: i32, direction: Vec2, source: DamageSource) -> bool {
        let took = match &mut self.kind {
            EntityKind::Player(p) => p.deal_damage(&mut self.body, amount, direction),
            EntityKind::Enemy(e) => e.deal_damage(amount, direction, source),
            _ => false,
        };
        if self.actor().is_some_and(|a| a.health == 0) {
            self.body.alive = false;
        }
        took
    }

    /// Text shown above the player's head while this is the nearest interactable
    pub fn interact_message(&self) -> Option<String> {
        match &self.kind {
            EntityKind::Door(d) => Some(d.interact_message().to_string()),
            EntityKind::Terminal(_) => Some("[K] read".to_string()),
            EntityKind::PuzzleTerminal(t) => Some(t.interact_message().to_string()),
            EntityKind::HealthMachine(h) => Some(h.interact_message()),
            EntityKind::LevelEndDoor(_) => Some("[K] leave".to_string()),
            _ => None,
        }
    }

    /// The player used this entity
    pub fn interact(&mut self, world: &mut World) -> Option<InteractEffect> {
        let id = self.id;
        match &mut self.kind {
            EntityKind::Door(d) => {
                d.interact(world);
                None
            }
            EntityKind::Terminal(t) => {
                t.interact(world);
                None
            }
            EntityKind::PuzzleTerminal(t) => {
                t.interact(id, world);
                None
            }
            EntityKind::HealthMachine(h) => h.interact(world),
            EntityKind::LevelEndDoor(d) => {
                d.interact(world);
                None
            }
            _ => None,
        }
    }

    /// Called once by the sweep that removes this entity
    pub fn on_death(&self, world: &mut World) -> Result<(), EngineError> {
        match &self.kind {
            EntityKind::Enemy(e) => e.on_death(&self.body, world),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_rect_trails_rounded_position() {
        let mut body = Body::new(Rect::new(0, 0, 10, 20));
        body.set_pos(Vec2::new(3.5, -2.4));
        assert_eq!(body.rect.top_left(), glam::IVec2::new(4, -2));
        assert_eq!((body.rect.w, body.rect.h), (10, 20));
        body.translate(Vec2::new(0.49, 0.0));
        assert_eq!(body.rect.x, 4);
    }

    #[test]
    fn test_jump_speed_matches_height() {
        let v = Actor::jump_speed();
        assert!((v * v / (2.0 * GRAVITY) - JUMP_HEIGHT).abs() < 1e-3);
        assert!(v < 0.0);
    }

    #[test]
    fn test_take_health_clamps() {
        let mut actor = Actor::new(8);
        assert!(!actor.take_health(3));
        assert_eq!(actor.health, 5);
        assert!(actor.take_health(100));
        assert_eq!(actor.health, 0);
        actor.take_health(-50);
        assert_eq!(actor.health, 8);
    }
}
