//! Player controller: run, jump, wall-slide, crouch, hitscan and interact

use glam::Vec2;

use super::category::{Category, CategorySet};
use super::collection::EntityId;
use super::collision;
use super::entity::{Actor, Body, DamageSource, Entity, EntityKind, TickContext};
use super::objects::{InteractEffect, Lifespan};
use super::world::World;
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::error::EngineError;
use crate::geom::{Direction, Rect};
use crate::input::Key;
use crate::{approach, sign};

#[derive(Debug, Clone)]
pub struct Player {
    pub actor: Actor,
    pub is_crouching: bool,
    /// Counts down from `SHOOT_COOLDOWN`; the shot lands at `SHOOT_ON_FRAME`
    pub shoot_cooldown: u32,
    /// Visible streak of the last shot
    pub active_bullet: Option<Rect>,
    pub hover_overhead_text: Option<String>,
    /// Ticks of contact-damage immunity left
    pub hurt_cooldown: u32,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            actor: Actor::new(PLAYER_MAX_HEALTH),
            is_crouching: false,
            shoot_cooldown: 0,
            active_bullet: None,
            hover_overhead_text: None,
            hurt_cooldown: 0,
        }
    }

    /// Standing player with its top-left at `pos`
    pub fn new_entity(pos: Vec2) -> Entity {
        let mut entity = Entity::new(
            EntityKind::Player(Box::new(Player::new())),
            Rect::new(0, 0, PLAYER_WIDTH, PLAYER_FULL_HEIGHT),
            CategorySet::of(&[Category::Player]),
        );
        entity.body.set_pos(pos);
        entity
    }

    pub fn update(
        &mut self,
        _id: EntityId,
        body: &mut Body,
        world: &mut World,
        ctx: &TickContext,
    ) -> Result<(), EngineError> {
        let input = ctx.input;
        collision::sample_contacts(world, &body.rect, &mut self.actor);
        self.hurt_cooldown = self.hurt_cooldown.saturating_sub(1);

        self.update_crouch(body, world, input.is_held(Key::S));
        self.update_shooting(body, world)?;

        let move_x = input.keyboard_x();
        let jump = input.was_pressed(Key::W);
        let shoot = input.was_pressed(Key::J);
        let interact = input.was_pressed(Key::K);
        let grounded = self.actor.is_grounded;

        if move_x == 0 || self.shoot_cooldown > 0 {
            let decel = if grounded { GROUND_DECEL } else { AIR_DECEL };
            body.vel.x = approach(body.vel.x, 0.0, decel);
        } else {
            let dir = move_x as f32;
            self.actor.facing_right = move_x > 0;
            if grounded && sign(body.vel.x) == -dir {
                body.vel.x = 0.0;
            } else {
                let top_speed = if self.is_crouching {
                    PLAYER_CROUCH_SPEED
                } else {
                    PLAYER_SPEED
                };
                body.vel.x = approach(body.vel.x, dir * top_speed, PLAYER_MOVE_ACCEL);
            }
        }

        let jumped = jump && self.try_jump(body);
        if jumped {
            world.play_sound(SoundEffect::Jump);
        }

        if shoot && self.actor.is_grounded && !jumped && self.shoot_cooldown == 0 {
            self.shoot_cooldown = SHOOT_COOLDOWN;
        }

        self.update_interact(body, world, interact);

        if self.actor.is_walled() && body.vel.y > PLAYER_MAX_SLIDE_SPEED {
            body.vel.y = (body.vel.y - 1.0).max(PLAYER_MAX_SLIDE_SPEED);
        }

        collision::apply_gravity(&mut self.actor, &mut body.vel);
        collision::apply_physics(&mut self.actor, body);
        Ok(())
    }

    /// Ground jump, or a wall jump kicking away from the wall
    fn try_jump(&mut self, body: &mut Body) -> bool {
        let v_j = Actor::jump_speed();
        if self.actor.is_grounded {
            body.vel.y = v_j;
        } else if self.actor.is_left_walled {
            body.vel.y = v_j;
            body.vel.x = PLAYER_SPEED;
            self.actor.facing_right = true;
        } else if self.actor.is_right_walled {
            body.vel.y = v_j;
            body.vel.x = -PLAYER_SPEED;
            self.actor.facing_right = false;
        } else {
            return false;
        }
        self.actor.is_grounded = false;
        true
    }

    /// Crouch while grounded with down held; stay down under a low ceiling
    fn update_crouch(&mut self, body: &mut Body, world: &World, down_held: bool) {
        if self.actor.is_grounded && down_held {
            self.is_crouching = true;
        } else if self.is_crouching {
            let headroom = PLAYER_FULL_HEIGHT - PLAYER_CROUCH_HEIGHT;
            if !world.is_touching_wall(&body.rect, Direction::Up, headroom) {
                self.is_crouching = false;
            }
        }

        let height = if self.is_crouching {
            PLAYER_CROUCH_HEIGHT
        } else {
            PLAYER_FULL_HEIGHT
        };
        let shift = body.rect.h - height;
        if shift != 0 {
            body.set_size(body.rect.w, height);
            body.set_y(body.pos.y + shift as f32);
        }
    }

    fn update_shooting(&mut self, body: &Body, world: &mut World) -> Result<(), EngineError> {
        if self.shoot_cooldown == 0 {
            return Ok(());
        }
        if !self.actor.is_grounded {
            self.shoot_cooldown = 0;
            self.active_bullet = None;
            return Ok(());
        }
        self.shoot_cooldown -= 1;
        if self.shoot_cooldown == SHOOT_ON_FRAME {
            self.fire(body, world)?;
        }
        if self.shoot_cooldown < SHOOT_ON_FRAME - BULLET_STREAK_TICKS {
            self.active_bullet = None;
        }
        Ok(())
    }

    /// Hitscan along the facing direction, stopping at the nearest enemy
    /// hurtbox or wall
    fn fire(&mut self, body: &Body, world: &mut World) -> Result<(), EngineError> {
        let rect = body.rect;
        let facing_right = self.actor.facing_right;
        let width = SCREEN_WIDTH / 2 + BULLET_REACH_PAST_HALF_SCREEN;
        let y = rect.bottom() - BULLET_OFFSET_Y + BULLET_CROUCH_DROP * i32::from(self.is_crouching);
        let x = if facing_right {
            rect.right()
        } else {
            rect.left() - width
        };
        let mut bullet = Rect::new(x, y, width, BULLET_HEIGHT);
        let hurt_probe = bullet.inflate(0, 4);

        let mut hits: Vec<(Rect, Option<EntityId>)> = world
            .entities()
            .get_all(&[Category::Enemy], &[], None, |e| {
                e.is_alive() && e.hurtbox().overlaps(&hurt_probe)
            })
            .into_iter()
            .filter_map(|id| world.get(id).map(|e| (e.hurtbox(), Some(id))))
            .collect();
        hits.extend(world.wall_rects_in(bullet).into_iter().map(|r| (r, None)));

        let nearest = if facing_right {
            hits.into_iter().min_by_key(|(r, _)| r.left())
        } else {
            hits.into_iter().max_by_key(|(r, _)| r.right())
        };

        if let Some((target, enemy)) = nearest {
            let impact_x = if facing_right {
                bullet.w = (target.left() - bullet.x).max(0);
                bullet.right()
            } else {
                let end = bullet.right();
                bullet.x = target.right().min(end);
                bullet.w = end - bullet.x;
                bullet.x
            };
            world.spawn_overlay(
                "bullet_splash",
                Lifespan::Cycles(1),
                Vec2::new(impact_x as f32, bullet.center().y),
                (16, 16),
                None,
            )?;
            if let Some(id) = enemy {
                let dir = Vec2::new(if facing_right { 1.0 } else { -1.0 }, 0.0);
                world.damage(id, 1, dir, DamageSource::Player);
            }
        }

        world.play_sound(SoundEffect::EnergyPulse);
        self.active_bullet = Some(bullet);
        Ok(())
    }

    fn update_interact(&mut self, body: &Body, world: &mut World, pressed: bool) {
        let probe = body.rect.inflate(2 * INTERACT_RADIUS, 0);
        let here = body.center();
        let nearest = world
            .get_entities_in_rect(probe, &[Category::Interactable], &[], |_| true, None)
            .into_iter()
            .filter_map(|id| world.get(id).map(|e| (e.center().distance_squared(here), id)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, id)| id);

        self.hover_overhead_text = nearest
            .and_then(|id| world.get(id))
            .and_then(|e| e.interact_message());

        if !pressed {
            return;
        }
        let effect = nearest
            .and_then(|id| world.with_entity(id, |e, w| e.interact(w)))
            .flatten();
        match effect {
            Some(InteractEffect::HealFull) => self.actor.heal_full(),
            None => {}
        }
    }

    /// Take damage. A half heart soaks up a whole-heart hit.
    pub fn deal_damage(&mut self, body: &mut Body, amount: i32, direction: Vec2) -> bool {
        if amount <= 0 {
            return false;
        }
        let mut amount = amount;
        if amount % 2 == 0 && self.actor.health % 2 == 1 {
            amount -= 1;
        }
        self.actor.take_health(amount);
        if direction.x.abs() > 0.25 {
            body.vel.x = KNOCKBACK_SPEED * sign(direction.x);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Input, InputEvent};
    use crate::sim::enemy::{Enemy, EnemyArchetype};
    use crate::sim::objects::{HealthMachine, Wall};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct Harness {
        world: World,
        input: Input,
        tick: u64,
        player: EntityId,
    }

    impl Harness {
        /// Player standing on a long floor whose top is at y = 200
        fn on_floor() -> Self {
            let mut world = World::with_seed(7);
            world
                .add_entity(Wall::new_entity("stone", Rect::new(0, 200, 2000, 32)))
                .unwrap();
            let player = world
                .add_entity(Player::new_entity(Vec2::new(100.0, 152.0)))
                .unwrap();
            Self {
                world,
                input: Input::new(),
                tick: 0,
                player,
            }
        }

        fn step(&mut self, events: &[InputEvent]) {
            self.input.begin_tick(events);
            let ctx = TickContext {
                tick: self.tick,
                input: &self.input,
            };
            self.world.update_entities(&ctx).unwrap();
            self.world.sweep().unwrap();
            self.world.uncollide_actors();
            self.tick += 1;
        }

        fn entity(&self) -> &Entity {
            self.world.get(self.player).unwrap()
        }

        fn player(&self) -> &Player {
            self.entity().as_player().unwrap()
        }
    }

    fn still_enemy(world: &mut World, x: i32, y: i32) -> EntityId {
        let mut enemy = Enemy::new(EnemyArchetype::Dumb, &mut Pcg32::seed_from_u64(1));
        enemy.speed = 0.0;
        enemy.actor.has_gravity = false;
        let mut entity = enemy.into_entity(Vec2::ZERO);
        entity.body.set_pos(Vec2::new(x as f32, y as f32));
        world.add_entity(entity).unwrap()
    }

    #[test]
    fn test_jump_apex_reaches_jump_height() {
        let mut h = Harness::on_floor();
        let start_y = h.entity().body.pos.y;
        h.step(&[InputEvent::KeyDown(Key::W)]);
        assert!(!h.player().actor.is_grounded);
        h.step(&[InputEvent::KeyUp(Key::W)]);

        let mut apex = start_y;
        for _ in 0..60 {
            apex = apex.min(h.entity().body.pos.y);
            h.step(&[]);
        }
        assert!(((start_y - apex) - JUMP_HEIGHT).abs() <= 1.0, "rose {}", start_y - apex);
        // Landed again
        assert_eq!(h.entity().rect().bottom(), 200);
    }

    #[test]
    fn test_grounded_jump_sets_exact_speed() {
        let mut h = Harness::on_floor();
        h.step(&[]);
        let mut player = h.player().clone();
        let mut body = h.entity().body.clone();
        assert!(player.try_jump(&mut body));
        assert_eq!(body.vel.y, -(2.0 * GRAVITY * JUMP_HEIGHT).sqrt());
    }

    #[test]
    fn test_half_heart_absorbs_full_hit() {
        let mut entity = Player::new_entity(Vec2::ZERO);
        entity.actor_mut().unwrap().health = 1;
        assert!(entity.deal_damage(2, Vec2::ZERO, DamageSource::Enemy));
        assert_eq!(entity.actor().unwrap().health, 0);
        assert!(!entity.is_alive());
    }

    #[test]
    fn test_knockback_only_for_strong_horizontal() {
        let mut entity = Player::new_entity(Vec2::ZERO);
        entity.deal_damage(1, Vec2::new(0.2, -1.0), DamageSource::Enemy);
        assert_eq!(entity.body.vel.x, 0.0);
        entity.deal_damage(1, Vec2::new(-0.9, 0.1), DamageSource::Enemy);
        assert_eq!(entity.body.vel.x, -KNOCKBACK_SPEED);
    }

    #[test]
    fn test_walljump_kicks_off_left_wall() {
        let mut world = World::with_seed(7);
        world
            .add_entity(Wall::new_entity("stone", Rect::new(0, 0, 32, 400)))
            .unwrap();
        let player = world
            .add_entity(Player::new_entity(Vec2::new(32.0, 100.0)))
            .unwrap();
        world.get_mut(player).unwrap().body.vel.y = 2.0;
        let mut h = Harness {
            world,
            input: Input::new(),
            tick: 0,
            player,
        };
        h.step(&[InputEvent::KeyDown(Key::W)]);

        let p = h.player();
        assert!(p.actor.is_left_walled);
        assert!(p.actor.facing_right);
        let vel = h.entity().body.vel;
        assert_eq!(vel.x, PLAYER_SPEED);
        // Gravity already acted once after the jump set v_j
        assert!((vel.y - (Actor::jump_speed() + GRAVITY)).abs() < 1e-5);
    }

    #[test]
    fn test_wall_slide_caps_fall() {
        let mut world = World::with_seed(7);
        world
            .add_entity(Wall::new_entity("stone", Rect::new(0, 0, 32, 400)))
            .unwrap();
        let player = world
            .add_entity(Player::new_entity(Vec2::new(32.0, 100.0)))
            .unwrap();
        world.get_mut(player).unwrap().body.vel.y = 3.0;
        let mut h = Harness {
            world,
            input: Input::new(),
            tick: 0,
            player,
        };
        for _ in 0..10 {
            h.step(&[]);
        }
        assert!(h.entity().body.vel.y <= PLAYER_MAX_SLIDE_SPEED + GRAVITY);
    }

    #[test]
    fn test_hitscan_hits_nearest_enemy() {
        let mut h = Harness::on_floor();
        let near = still_enemy(&mut h.world, 200, 130);
        let far = still_enemy(&mut h.world, 300, 130);
        let player_right = h.entity().rect().right();

        h.step(&[InputEvent::KeyDown(Key::J)]);
        assert_eq!(h.player().shoot_cooldown, SHOOT_COOLDOWN);
        for _ in 0..(SHOOT_COOLDOWN - SHOOT_ON_FRAME) {
            h.step(&[]);
        }

        let health = |id| h.world.get(id).unwrap().actor().unwrap().health;
        assert_eq!(health(near), ENEMY_MAX_HEALTH - 1);
        assert_eq!(health(far), ENEMY_MAX_HEALTH);
        let bullet = h.player().active_bullet.unwrap();
        assert_eq!(bullet.w, 200 - player_right);
        assert!(h.world.entities().category(Category::Overlay).unwrap().len() == 1);

        for _ in 0..BULLET_STREAK_TICKS + 1 {
            h.step(&[]);
        }
        assert!(h.player().active_bullet.is_none());
    }

    #[test]
    fn test_hitscan_stops_at_wall() {
        let mut h = Harness::on_floor();
        h.world
            .add_entity(Wall::new_entity("stone", Rect::new(180, 100, 32, 100)))
            .unwrap();
        let behind = still_enemy(&mut h.world, 260, 130);
        h.step(&[InputEvent::KeyDown(Key::J)]);
        for _ in 0..(SHOOT_COOLDOWN - SHOOT_ON_FRAME) {
            h.step(&[]);
        }
        let health = h.world.get(behind).unwrap().actor().unwrap().health;
        assert_eq!(health, ENEMY_MAX_HEALTH);
        assert_eq!(h.player().active_bullet.unwrap().right(), 180);
    }

    #[test]
    fn test_leaving_ground_aborts_shot() {
        let mut h = Harness::on_floor();
        h.step(&[InputEvent::KeyDown(Key::J)]);
        h.step(&[InputEvent::KeyDown(Key::W)]);
        h.step(&[]);
        assert_eq!(h.player().shoot_cooldown, 0);
    }

    #[test]
    fn test_crouch_keeps_feet_and_ceiling_holds_it() {
        let mut h = Harness::on_floor();
        h.step(&[InputEvent::KeyDown(Key::S)]);
        assert!(h.player().is_crouching);
        let rect = h.entity().rect();
        assert_eq!((rect.h, rect.bottom()), (PLAYER_CROUCH_HEIGHT, 200));

        let ceiling = h
            .world
            .add_entity(Wall::new_entity("stone", Rect::new(0, 120, 400, 48)))
            .unwrap();
        h.step(&[InputEvent::KeyUp(Key::S)]);
        assert!(h.player().is_crouching);

        h.world.remove_entity(ceiling);
        h.step(&[]);
        assert!(!h.player().is_crouching);
        assert_eq!(h.entity().rect().bottom(), 200);
    }

    #[test]
    fn test_interact_uses_nearest_machine() {
        let mut h = Harness::on_floor();
        h.world
            .add_entity(HealthMachine::new_entity(1, Vec2::new(140.0, 152.0)))
            .unwrap();
        h.world.damage(h.player, 4, Vec2::ZERO, DamageSource::Script);
        h.step(&[]);
        assert_eq!(h.player().hover_overhead_text.as_deref(), Some("[K] heal (1 left)"));

        h.step(&[InputEvent::KeyDown(Key::K)]);
        assert_eq!(h.player().actor.health, PLAYER_MAX_HEALTH);
    }

    proptest! {
        #[test]
        fn prop_health_stays_in_bounds(hits in proptest::collection::vec(-5i32..20, 1..20)) {
            let mut entity = Player::new_entity(Vec2::ZERO);
            for amount in hits {
                entity.deal_damage(amount, Vec2::ZERO, DamageSource::Enemy);
                let health = entity.actor().unwrap().health;
                prop_assert!((0..=PLAYER_MAX_HEALTH).contains(&health));
            }
        }
    }
}
