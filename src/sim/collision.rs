//! Collision detection and response against static walls
//!
//! Actors never sweep; they move, then get pushed back out one axis at a time.

use glam::Vec2;

use super::entity::{Actor, Body};
use super::world::World;
use crate::consts::{GRAVITY, UNCOLLIDE_SLACK};
use crate::geom::{Direction, Rect};

/// Refresh the four wall-contact flags for an actor at `rect`
pub fn sample_contacts(world: &World, rect: &Rect, actor: &mut Actor) {
    actor.is_grounded = world.is_touching_wall(rect, Direction::Down, 1);
    actor.is_top_walled = world.is_touching_wall(rect, Direction::Up, 1);
    actor.is_left_walled = world.is_touching_wall(rect, Direction::Left, 1);
    actor.is_right_walled = world.is_touching_wall(rect, Direction::Right, 1);
}

/// Accelerate downward unless grounded; landing kills downward speed
pub fn apply_gravity(actor: &mut Actor, vel: &mut Vec2) {
    actor.vy_before_gravity = Some(vel.y);
    if !actor.has_gravity {
        return;
    }
    if actor.is_grounded {
        if vel.y > 0.0 {
            vel.y = 0.0;
        }
        return;
    }
    vel.y = (vel.y + GRAVITY).min(actor.max_speed.y);
}

/// Move by the current velocity.
///
/// The vertical step uses the mean of the speed before and after this tick's
/// gravity so a jump peaks at the height it was computed for.
pub fn apply_physics(actor: &mut Actor, body: &mut Body) {
    let dy = match actor.vy_before_gravity.take() {
        Some(before) => (before + body.vel.y) / 2.0,
        None => body.vel.y,
    };
    body.translate(Vec2::new(body.vel.x, dy));
}

/// Push `body` out of every wall it overlaps, x first, then y.
///
/// Each pass tests a rect shrunk by `UNCOLLIDE_SLACK` per side on the other
/// axis, so grazing a corner or sinking a few pixels into a floor never
/// triggers a push along the wrong axis. Small actors shrink less so the
/// probe never vanishes.
pub fn uncollide(body: &mut Body, walls: &[Rect]) {
    let slack = |size: i32| UNCOLLIDE_SLACK.min((size - 1) / 2).max(0);

    for wall in walls {
        let probe = body.rect.inflate(0, -2 * slack(body.rect.h));
        if !probe.overlaps(wall) {
            continue;
        }
        let left_shift = (wall.x - body.rect.w) as f32;
        let right_shift = (wall.x + wall.w) as f32;
        let x = body.pos.x;
        let target = if (left_shift - x).abs() <= (right_shift - x).abs() {
            left_shift
        } else {
            right_shift
        };
        body.set_x(target);
    }

    for wall in walls {
        let probe = body.rect.inflate(-2 * slack(body.rect.w), 0);
        if !probe.overlaps(wall) {
            continue;
        }
        let top_shift = (wall.y - body.rect.h) as f32;
        let bottom_shift = (wall.y + wall.h) as f32;
        let y = body.pos.y;
        let target = if (top_shift - y).abs() <= (bottom_shift - y).abs() {
            top_shift
        } else {
            bottom_shift
        };
        body.set_y(target);
    }
}

/// Deepest overlap of `rect` into any wall along either axis
pub fn max_penetration(rect: &Rect, walls: &[Rect]) -> i32 {
    walls
        .iter()
        .filter_map(|w| rect.intersection(w))
        .map(|overlap| overlap.w.min(overlap.h))
        .max()
        .unwrap_or(0)
}
