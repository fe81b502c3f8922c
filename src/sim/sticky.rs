//! Surface walker for the sticky slug
//!
//! The slug has no gravity while it clings. It travels along one axis with the
//! surface it sticks to on the perpendicular side, `dir.turned(clockwise)`.
//! Running off an outer corner snaps it around the corner; running into a wall
//! turns it up that wall. If it ever loses every surface it falls until it
//! lands and picks a new one.

use glam::Vec2;

use super::entity::{Actor, Body};
use super::world::World;
use crate::consts::STICKY_CORNER_STEP;
use crate::geom::{Direction, outside_corner_snap};

#[derive(Debug, Clone, PartialEq)]
pub struct StickyState {
    pub clockwise: bool,
    /// Travel direction; `None` while stopped or falling
    pub dir: Option<Direction>,
}

impl StickyState {
    pub fn new(clockwise: bool) -> Self {
        Self {
            clockwise,
            dir: None,
        }
    }

    /// Side the slug is stuck to
    pub fn surface(&self) -> Option<Direction> {
        self.dir.map(|d| d.turned(self.clockwise))
    }

    pub fn current_dir(&self) -> Vec2 {
        self.dir.map_or(Vec2::ZERO, Direction::to_vec2)
    }

    /// Which way the sprite's head points
    pub fn facing(&self) -> Option<Direction> {
        self.surface().map(Direction::opposite)
    }

    /// Shot by the player: reverse the winding and stop
    pub fn on_hit(&mut self) {
        self.clockwise = !self.clockwise;
        self.dir = None;
    }

    pub fn step(&mut self, actor: &mut Actor, body: &mut Body, world: &World, speed: f32) {
        let flags = (
            actor.is_top_walled,
            actor.is_grounded,
            actor.is_left_walled,
            actor.is_right_walled,
        );
        let walled = move |side: Direction| match side {
            Direction::Up => flags.0,
            Direction::Down => flags.1,
            Direction::Left => flags.2,
            Direction::Right => flags.3,
        };
        let anywhere = Direction::ALL.into_iter().any(walled);

        if !anywhere {
            if !actor.has_gravity && !self.wrap_corner(body, world, speed) {
                actor.has_gravity = true;
                self.dir = None;
            }
        } else {
            actor.has_gravity = false;
            self.dir = match self.dir {
                None => Direction::ALL
                    .into_iter()
                    .find(|&side| walled(side))
                    .map(|side| side.turned(!self.clockwise)),
                Some(mut d) => {
                    for _ in 0..4 {
                        if !walled(d) {
                            break;
                        }
                        d = d.turned(!self.clockwise);
                    }
                    Some(d)
                }
            };
        }

        if actor.has_gravity {
            body.vel.x = 0.0;
        } else {
            body.vel = self.current_dir() * speed;
        }
    }

    /// Snap around the outer corner just passed. False when no wall is near.
    fn wrap_corner(&mut self, body: &mut Body, world: &World, speed: f32) -> bool {
        let Some(travel) = self.dir else {
            return false;
        };
        let surface = travel.turned(self.clockwise);
        let pad = 2 * (speed + 4.0).ceil() as i32;
        let walls = world.wall_rects_in(body.rect.inflate(pad, pad));
        let here = body.center();

        let best = walls
            .iter()
            .map(|&wall| outside_corner_snap(body.rect, wall, travel, surface))
            .filter(|snap| walls.iter().all(|w| !w.overlaps(snap)))
            .min_by(|a, b| {
                a.center()
                    .distance_squared(here)
                    .total_cmp(&b.center().distance_squared(here))
            });
        let Some(snap) = best else {
            return false;
        };

        body.snap_to(snap);
        self.dir = Some(surface);
        body.translate(surface.to_vec2() * STICKY_CORNER_STEP);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Rect;
    use crate::input::Input;
    use crate::sim::collection::EntityId;
    use crate::sim::enemy::{Brain, Enemy, EnemyArchetype};
    use crate::sim::entity::TickContext;
    use crate::sim::objects::Wall;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::HashSet;

    const BLOCK: Rect = Rect::new(100, 100, 64, 64);

    fn world_with_slug(clockwise: bool, pos: Vec2, dir: Direction) -> (World, EntityId) {
        let mut world = World::with_seed(9);
        world.add_entity(Wall::new_entity("stone", BLOCK)).unwrap();
        let mut slug = Enemy::new(EnemyArchetype::Sticky, &mut Pcg32::seed_from_u64(1));
        slug.speed = 1.0;
        slug.brain = Brain::Sticky(StickyState {
            clockwise,
            dir: Some(dir),
        });
        let mut entity = slug.into_entity(Vec2::ZERO);
        entity.body.set_pos(pos);
        let id = world.add_entity(entity).unwrap();
        (world, id)
    }

    fn tick(world: &mut World) {
        let input = Input::new();
        let ctx = TickContext { tick: 0, input: &input };
        world.update_entities(&ctx).unwrap();
        world.sweep().unwrap();
        world.uncollide_actors();
    }

    fn dir_of(world: &World, id: EntityId) -> Option<Direction> {
        world
            .get(id)
            .and_then(|e| e.as_enemy())
            .and_then(|e| e.sticky())
            .and_then(|s| s.dir)
    }

    /// Touching a face, or passing a corner diagonally
    fn stays_on_block(rect: Rect) -> bool {
        rect.inflate(2, 2).overlaps(&BLOCK)
    }

    #[test]
    fn test_counter_clockwise_turns_down_off_floor_edge() {
        // Walking right along the top face, 2 px from the right edge
        let start = Vec2::new((BLOCK.right() - 2) as f32, (BLOCK.top() - 24) as f32);
        let (mut world, id) = world_with_slug(false, start, Direction::Right);

        let mut turned_at = None;
        for t in 0..10 {
            tick(&mut world);
            if dir_of(&world, id) == Some(Direction::Down) {
                turned_at = Some(t);
                break;
            }
        }
        assert!(turned_at.is_some());
        let rect = world.get(id).unwrap().rect();
        assert_eq!(rect.left(), BLOCK.right());
        assert!(rect.top() > BLOCK.top() && rect.top() < BLOCK.top() + 8);
        assert_eq!(world.get(id).unwrap().as_enemy().unwrap().current_dir, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_clockwise_turns_up_off_ceiling_edge() {
        // Walking right along the underside
        let start = Vec2::new((BLOCK.right() - 2) as f32, BLOCK.bottom() as f32);
        let (mut world, id) = world_with_slug(true, start, Direction::Right);
        for _ in 0..10 {
            tick(&mut world);
            if dir_of(&world, id) == Some(Direction::Up) {
                break;
            }
        }
        assert_eq!(dir_of(&world, id), Some(Direction::Up));
        assert_eq!(world.get(id).unwrap().as_enemy().unwrap().current_dir, Vec2::new(0.0, -1.0));
        assert_eq!(world.get(id).unwrap().rect().left(), BLOCK.right());
    }

    #[test]
    fn test_loops_the_perimeter_forever() {
        let start = Vec2::new(120.0, (BLOCK.top() - 24) as f32);
        let (mut world, id) = world_with_slug(false, start, Direction::Right);
        let mut seen = HashSet::new();
        for _ in 0..2000 {
            tick(&mut world);
            let rect = world.get(id).unwrap().rect();
            assert!(stays_on_block(rect), "slug left the block at {rect:?}");
            assert!(!rect.overlaps(&BLOCK));
            seen.insert(dir_of(&world, id).unwrap());
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_climbs_wall_ahead() {
        let mut world = World::with_seed(9);
        world
            .add_entity(Wall::new_entity("stone", Rect::new(0, 200, 400, 32)))
            .unwrap();
        world
            .add_entity(Wall::new_entity("stone", Rect::new(200, 100, 32, 100)))
            .unwrap();
        let mut slug = Enemy::new(EnemyArchetype::Sticky, &mut Pcg32::seed_from_u64(1));
        slug.speed = 1.0;
        slug.brain = Brain::Sticky(StickyState {
            clockwise: false,
            dir: Some(Direction::Right),
        });
        let mut entity = slug.into_entity(Vec2::ZERO);
        entity.body.set_pos(Vec2::new(170.0, 176.0));
        let id = world.add_entity(entity).unwrap();
        for _ in 0..20 {
            tick(&mut world);
        }
        assert_eq!(dir_of(&world, id), Some(Direction::Up));
        assert_eq!(world.get(id).unwrap().rect().right(), 200);
    }

    #[test]
    fn test_hit_reverses_winding_and_stops() {
        let mut state = StickyState {
            clockwise: false,
            dir: Some(Direction::Right),
        };
        state.on_hit();
        assert!(state.clockwise);
        assert_eq!(state.current_dir(), Vec2::ZERO);
    }

    #[test]
    fn test_falls_without_surfaces_then_reacquires() {
        let mut world = World::with_seed(9);
        world
            .add_entity(Wall::new_entity("stone", Rect::new(0, 200, 400, 32)))
            .unwrap();
        let slug = Enemy::new(EnemyArchetype::Sticky, &mut Pcg32::seed_from_u64(1));
        let id = world.add_entity(slug.into_entity(Vec2::new(100.0, 100.0))).unwrap();
        tick(&mut world);
        assert!(world.get(id).unwrap().actor().unwrap().has_gravity);
        for _ in 0..60 {
            tick(&mut world);
        }
        let e = world.get(id).unwrap();
        assert!(!e.actor().unwrap().has_gravity);
        assert!(matches!(dir_of(&world, id), Some(Direction::Left | Direction::Right)));
        assert_eq!(e.rect().bottom(), 200);
    }
}
