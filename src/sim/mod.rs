//! Fixed-tick world simulation
//!
//! All gameplay logic lives here:
//! - Entities are plain records in an id-keyed arena, updated in insertion order
//! - Cross-entity effects go through `World` queries and `EntityId` handles
//! - No rendering or platform dependencies

pub mod category;
pub mod collection;
pub mod collision;
pub mod enemy;
pub mod entity;
pub mod objects;
pub mod player;
pub mod sticky;
pub mod world;

pub use category::{Category, CategorySet};
pub use collection::{EntityCollection, EntityId};
pub use enemy::{Brain, Enemy, EnemyArchetype};
pub use entity::{Actor, Body, DamageSource, Entity, EntityKind, TickContext};
pub use objects::{
    Decoration, Door, HealthMachine, InteractEffect, KillBlock, LevelEndDoor, Lifespan, Overlay,
    PuzzleTerminal, Spawner, Terminal, Wall,
};
pub use player::Player;
pub use sticky::StickyState;
pub use world::{GameEvent, HudRequest, World};
