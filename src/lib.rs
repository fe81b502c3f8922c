//! Slugrun - a 2D side-scrolling action-platformer engine
//!
//! Core modules:
//! - `sim`: Fixed-tick world simulation (entities, collision, AI, player)
//! - `hud`: Modal stack (menus, title cards, text pages, puzzles, editor)
//! - `level`: Level text format, loader/saver and per-level binders
//! - `renderer`: Draw-list construction for the host renderer
//! - `game`: The per-tick orchestration tying the above together

pub mod audio;
pub mod error;
pub mod game;
pub mod geom;
pub mod hud;
pub mod input;
pub mod level;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::EngineError;
pub use game::{Game, tick};
pub use settings::Settings;

/// Engine tuning constants
pub mod consts {
    /// Simulation ticks per second
    pub const TICK_RATE: u32 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / TICK_RATE as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Logical screen size in pixels
    pub const SCREEN_WIDTH: i32 = 640;
    pub const SCREEN_HEIGHT: i32 = 360;

    /// Default tile size for grid snapping
    pub const TILE_SIZE: (i32, i32) = (32, 32);

    /// Gravity (px/tick²)
    pub const GRAVITY: f32 = 0.65;
    /// Terminal velocities for actors
    pub const MAX_SPEED_X: f32 = 5.0;
    pub const MAX_SPEED_Y: f32 = 10.0;
    /// Grounded jump height in pixels
    pub const JUMP_HEIGHT: f32 = 96.0;

    /// Four hearts, two points each
    pub const PLAYER_MAX_HEALTH: i32 = 8;
    pub const PLAYER_WIDTH: i32 = 24;
    pub const PLAYER_FULL_HEIGHT: i32 = 48;
    pub const PLAYER_CROUCH_HEIGHT: i32 = 32;
    pub const PLAYER_SPEED: f32 = 3.0;
    pub const PLAYER_CROUCH_SPEED: f32 = 1.25;
    pub const PLAYER_MAX_SLIDE_SPEED: f32 = 0.75;
    pub const PLAYER_MOVE_ACCEL: f32 = 0.5;
    pub const GROUND_DECEL: f32 = 1.0;
    pub const AIR_DECEL: f32 = 0.125;
    pub const KNOCKBACK_SPEED: f32 = 3.0;
    /// Ticks of contact-damage immunity after being hurt
    pub const PLAYER_HURT_COOLDOWN: u32 = 60;

    /// Hitscan weapon timing
    pub const SHOOT_COOLDOWN: u32 = 30;
    pub const SHOOT_ON_FRAME: u32 = 20;
    pub const BULLET_STREAK_TICKS: u32 = 4;
    pub const BULLET_HEIGHT: i32 = 4;
    pub const BULLET_OFFSET_Y: i32 = 52;
    pub const BULLET_CROUCH_DROP: i32 = 30;
    pub const BULLET_REACH_PAST_HALF_SCREEN: i32 = 64;

    pub const INTERACT_RADIUS: i32 = 32;

    /// Ticks after the player dies before the death menu opens
    pub const WAIT_TICKS_AFTER_DEATH: u32 = 60;

    /// Axis slack used by uncollide
    pub const UNCOLLIDE_SLACK: i32 = 10;

    /// Enemy defaults
    pub const ENEMY_MIN_SPEED: f32 = 0.75;
    pub const ENEMY_MAX_SPEED: f32 = 1.25;
    pub const ENEMY_MAX_HEALTH: i32 = 3;
    pub const ENEMY_CONTACT_DAMAGE: i32 = 2;
    pub const INSTA_KILL_DAMAGE: i32 = 10;
    pub const DUMB_REVERSE_COOLDOWN: u32 = 20;
    pub const CHASE_RADIUS: f32 = 140.0;
    pub const FORGET_RADIUS: f32 = 300.0;
    pub const FORGET_DELAY: u32 = 240;
    pub const FLAPPY_FALL_TICKS: u32 = 45;
    pub const STICKY_SIZE: i32 = 24;
    /// Distance a slug advances onto a new face after a corner snap
    pub const STICKY_CORNER_STEP: f32 = 4.0;

    /// Door open animation length
    pub const DOOR_OPEN_TICKS: i32 = 20;

    /// HUD timings
    pub const TITLE_CARD_TICKS: u32 = 50;
    pub const TEXT_ADVANCE_DELAY: u32 = 15;
    pub const TEXT_ADVANCE_GRACE: u32 = 2;
    pub const PUZZLE_CLOSE_DELAY: u32 = 30;
}

/// Move `value` toward `target` by at most `step`
#[inline]
pub fn approach(value: f32, target: f32, step: f32) -> f32 {
    if value < target {
        (value + step).min(target)
    } else {
        (value - step).max(target)
    }
}

/// Sign as -1, 0 or 1 (zero stays zero, unlike `f32::signum`)
#[inline]
pub fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Round to the nearest pixel the way entity rects trail positions
#[inline]
pub fn to_pixel(value: f32) -> i32 {
    (value + 0.5).floor() as i32
}
