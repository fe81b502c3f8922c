//! Enemy archetypes and their AI state machines

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::category::{Category, CategorySet};
use super::collection::EntityId;
use super::collision;
use super::entity::{Actor, Body, DamageSource, Entity, EntityKind, TickContext};
use super::sticky::StickyState;
use super::world::World;
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::error::EngineError;
use crate::geom::Rect;
use crate::{approach, sign};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyArchetype {
    Dumb,
    Smart,
    Zombie,
    Flappy,
    Dodge,
    Spiky,
    Sticky,
}

impl EnemyArchetype {
    pub const ALL: [EnemyArchetype; 7] = [
        EnemyArchetype::Dumb,
        EnemyArchetype::Smart,
        EnemyArchetype::Zombie,
        EnemyArchetype::Flappy,
        EnemyArchetype::Dodge,
        EnemyArchetype::Spiky,
        EnemyArchetype::Sticky,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EnemyArchetype::Dumb => "dumb",
            EnemyArchetype::Smart => "smart",
            EnemyArchetype::Zombie => "zombie",
            EnemyArchetype::Flappy => "flappy",
            EnemyArchetype::Dodge => "dodge",
            EnemyArchetype::Spiky => "spiky",
            EnemyArchetype::Sticky => "sticky",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    pub fn size(self) -> (i32, i32) {
        match self {
            EnemyArchetype::Zombie | EnemyArchetype::Dodge => (32, 48),
            EnemyArchetype::Sticky => (STICKY_SIZE, STICKY_SIZE),
            _ => (32, 32),
        }
    }
}

/// Chase/wander memory shared by the chasing archetypes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SmartState {
    pub chasing: bool,
    /// Ticks since the player was last within chase range
    pub since_armed: u32,
}

impl SmartState {
    /// Force the chase on, as when hit
    pub fn arm(&mut self) {
        self.chasing = true;
        self.since_armed = 0;
    }

    /// Update chase state and steer `dir`. `to_player` is the vector from
    /// this enemy's center to the player's.
    pub fn think(&mut self, id: EntityId, to_player: Option<Vec2>, dir: &mut Vec2, rng: &mut impl Rng) {
        let dist = to_player.map(Vec2::length);
        match dist {
            Some(d) if d <= CHASE_RADIUS => {
                if !self.chasing {
                    log::debug!("Enemy {:?} started chasing", id);
                }
                self.arm();
            }
            _ => self.since_armed = self.since_armed.saturating_add(1),
        }
        if self.chasing
            && dist.is_none_or(|d| d > FORGET_RADIUS)
            && self.since_armed >= FORGET_DELAY
        {
            log::debug!("Enemy {:?} lost interest", id);
            self.chasing = false;
        }

        match to_player {
            Some(v) if self.chasing => *dir = v.normalize_or_zero(),
            _ => {
                if rng.random_bool(1.0 / 60.0) {
                    *dir = if rng.random_bool(0.25) {
                        Vec2::ZERO
                    } else {
                        Vec2::from_angle(rng.random::<f32>() * TAU)
                    };
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlappyState {
    /// Offset into the bobbing wave
    pub phase: f32,
    /// Ticks left in the stunned fall
    pub falling: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DodgeState {
    /// Which half of the body is vulnerable
    pub is_up: bool,
    pub since_swap: u32,
}

impl DodgeState {
    /// Per-tick chance to swap halves, ramping from 0 to 25%
    pub fn swap_chance(since_swap: u32) -> f64 {
        if since_swap < 30 {
            return 0.0;
        }
        (f64::from(since_swap - 30) / 210.0).min(1.0) * 0.25
    }
}

/// Per-archetype AI state
#[derive(Debug, Clone)]
pub enum Brain {
    Dumb { reverse_cooldown: u32 },
    Smart(SmartState),
    Zombie(SmartState),
    Flappy(FlappyState),
    Dodge(SmartState, DodgeState),
    Spiky,
    Sticky(StickyState),
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub actor: Actor,
    pub archetype: EnemyArchetype,
    pub speed: f32,
    pub current_dir: Vec2,
    pub contact_damage: i32,
    pub brain: Brain,
}

impl Enemy {
    pub fn new(archetype: EnemyArchetype, rng: &mut impl Rng) -> Self {
        let mut actor = Actor::new(ENEMY_MAX_HEALTH);
        let mut current_dir = Vec2::new(-1.0, 0.0);
        let brain = match archetype {
            EnemyArchetype::Dumb => Brain::Dumb { reverse_cooldown: 0 },
            EnemyArchetype::Smart => {
                actor.has_gravity = false;
                current_dir = Vec2::ZERO;
                Brain::Smart(SmartState::default())
            }
            EnemyArchetype::Zombie => Brain::Zombie(SmartState::default()),
            EnemyArchetype::Flappy => {
                actor.has_gravity = false;
                Brain::Flappy(FlappyState {
                    phase: rng.random::<f32>() * TAU,
                    falling: 0,
                })
            }
            EnemyArchetype::Dodge => Brain::Dodge(
                SmartState::default(),
                DodgeState {
                    is_up: rng.random_bool(0.5),
                    since_swap: 0,
                },
            ),
            EnemyArchetype::Spiky => {
                actor.has_gravity = false;
                let sx = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
                let sy = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
                current_dir = Vec2::new(sx, sy);
                Brain::Spiky
            }
            EnemyArchetype::Sticky => {
                actor.has_gravity = false;
                current_dir = Vec2::ZERO;
                Brain::Sticky(StickyState::new(rng.random_bool(0.5)))
            }
        };
        let contact_damage = match archetype {
            EnemyArchetype::Spiky => INSTA_KILL_DAMAGE,
            _ => ENEMY_CONTACT_DAMAGE,
        };
        Self {
            actor,
            archetype,
            speed: rng.random_range(ENEMY_MIN_SPEED..=ENEMY_MAX_SPEED),
            current_dir,
            contact_damage,
            brain,
        }
    }

    /// Spawn-ready entity centered on `center`
    pub fn new_entity(archetype: EnemyArchetype, center: Vec2, rng: &mut impl Rng) -> Entity {
        Self::into_entity(Self::new(archetype, rng), center)
    }

    /// A flappy heading horizontally in `dir_x`'s direction
    pub fn flappy_entity(center: Vec2, dir_x: f32, rng: &mut impl Rng) -> Entity {
        let mut enemy = Self::new(EnemyArchetype::Flappy, rng);
        enemy.current_dir = Vec2::new(dir_x, 0.0);
        Self::into_entity(enemy, center)
    }

    pub fn into_entity(self, center: Vec2) -> Entity {
        let (w, h) = self.archetype.size();
        let mut entity = Entity::new(
            EntityKind::Enemy(Box::new(self)),
            Rect::new(0, 0, w, h),
            CategorySet::of(&[Category::Enemy]),
        );
        entity.body.set_center(center);
        entity
    }

    /// Sub-rect that accepts hitscan damage
    pub fn hurtbox(&self, rect: Rect) -> Rect {
        match &self.brain {
            Brain::Dodge(_, dodge) => {
                let half = rect.h / 2;
                if dodge.is_up {
                    Rect::new(rect.x, rect.y, rect.w, half)
                } else {
                    Rect::new(rect.x, rect.y + half, rect.w, rect.h - half)
                }
            }
            _ => rect,
        }
    }

    pub fn sticky(&self) -> Option<&StickyState> {
        match &self.brain {
            Brain::Sticky(s) => Some(s),
            _ => None,
        }
    }

    pub fn update(
        &mut self,
        id: EntityId,
        body: &mut Body,
        world: &mut World,
        ctx: &TickContext,
    ) -> Result<(), EngineError> {
        collision::sample_contacts(world, &body.rect, &mut self.actor);
        let to_player = world.player().map(|p| p.center() - body.center());

        let Enemy {
            actor,
            speed,
            current_dir,
            brain,
            ..
        } = self;
        let speed = *speed;
        match brain {
            Brain::Dumb { reverse_cooldown } => {
                if *reverse_cooldown > 0 {
                    *reverse_cooldown -= 1;
                } else if blocked_x(actor, *current_dir) || touches_reverse(world, body.rect) {
                    current_dir.x = -current_dir.x;
                    *reverse_cooldown = DUMB_REVERSE_COOLDOWN;
                }
                body.vel.x = current_dir.x * speed;
            }
            Brain::Smart(smart) => {
                smart.think(id, to_player, current_dir, &mut world.rng);
                body.vel = *current_dir * speed;
            }
            Brain::Zombie(smart) => {
                smart.think(id, to_player, current_dir, &mut world.rng);
                body.vel.x = sign(current_dir.x) * speed;
            }
            Brain::Dodge(smart, dodge) => {
                smart.think(id, to_player, current_dir, &mut world.rng);
                dodge.since_swap += 1;
                if world.rng.random_bool(DodgeState::swap_chance(dodge.since_swap)) {
                    dodge.is_up = !dodge.is_up;
                    dodge.since_swap = 0;
                }
                body.vel.x = sign(current_dir.x) * speed;
            }
            Brain::Flappy(flappy) => {
                if blocked_x(actor, *current_dir) {
                    current_dir.x = -current_dir.x;
                }
                body.vel.x = current_dir.x * speed;
                if flappy.falling > 0 {
                    flappy.falling -= 1;
                    if actor.is_grounded || flappy.falling == 0 {
                        flappy.falling = 0;
                        actor.has_gravity = false;
                        body.vel.y = 0.0;
                    }
                } else {
                    let wave = (ctx.tick as f32 / 60.0 + flappy.phase).cos();
                    let target = if wave < -0.65 {
                        -1.0
                    } else if wave > 0.65 {
                        1.0
                    } else {
                        0.0
                    };
                    body.vel.y = approach(body.vel.y, target, 0.1);
                }
            }
            Brain::Spiky => {
                let reverse = touches_reverse(world, body.rect);
                if blocked_x(actor, *current_dir) || reverse {
                    current_dir.x = -current_dir.x;
                }
                let blocked_y = (current_dir.y < 0.0 && actor.is_top_walled)
                    || (current_dir.y > 0.0 && actor.is_grounded);
                if blocked_y {
                    current_dir.y = -current_dir.y;
                }
                body.vel = *current_dir * speed;
            }
            Brain::Sticky(sticky) => {
                sticky.step(actor, body, world, speed);
                *current_dir = sticky.current_dir();
            }
        }

        if current_dir.x != 0.0 {
            actor.facing_right = current_dir.x > 0.0;
        }
        collision::apply_gravity(actor, &mut body.vel);
        collision::apply_physics(actor, body);

        let contact_damage = self.contact_damage;
        let touching_player = world
            .player()
            .filter(|p| p.rect().overlaps(&body.rect))
            .map(|p| (p.center() - body.center()).normalize_or_zero());
        if let Some(direction) = touching_player {
            world.hurt_player(contact_damage, direction, DamageSource::Enemy);
        }
        Ok(())
    }

    pub fn deal_damage(&mut self, amount: i32, _direction: Vec2, source: DamageSource) -> bool {
        if amount <= 0 {
            return false;
        }
        match &mut self.brain {
            Brain::Sticky(sticky) => {
                if source == DamageSource::KillBlock {
                    return false;
                }
                if source == DamageSource::Player {
                    sticky.on_hit();
                }
            }
            Brain::Smart(smart) | Brain::Zombie(smart) | Brain::Dodge(smart, _) => smart.arm(),
            Brain::Flappy(flappy) => {
                flappy.falling = FLAPPY_FALL_TICKS;
                self.actor.has_gravity = true;
            }
            Brain::Dumb { .. } | Brain::Spiky => {}
        }
        self.actor.take_health(amount);
        true
    }

    pub fn on_death(&self, body: &Body, world: &mut World) -> Result<(), EngineError> {
        world.play_sound(SoundEffect::EnemyDeath);
        if let Brain::Zombie(_) = self.brain {
            for dir_x in [-1.0, 1.0] {
                let flappy = Self::flappy_entity(body.center(), dir_x, &mut world.rng);
                world.add_entity(flappy)?;
            }
        }
        Ok(())
    }
}

fn blocked_x(actor: &Actor, dir: Vec2) -> bool {
    (dir.x < 0.0 && actor.is_left_walled) || (dir.x > 0.0 && actor.is_right_walled)
}

fn touches_reverse(world: &World, rect: Rect) -> bool {
    !world
        .get_entities_in_rect(rect, &[Category::Reverse], &[], |_| true, Some(1))
        .is_empty()
}
