//! Level loading, binding and saving
//!
//! Loading runs in two passes. The file pass turns every record into an
//! entity, with each REFERENCES line becoming a placeholder that holds its
//! `ref_id`. The bind pass is plain code per level: it builds the scripted
//! entities (player, doors, enemies, terminals) and drops each one onto its
//! reference with [`RefTable::fetch`]. Whatever is not fetched stays a
//! placeholder, and is saved back unchanged.

pub mod catalog;
pub mod format;

use std::collections::BTreeMap;
use std::path::Path;

use glam::{IVec2, Vec2};

use crate::error::EngineError;
use crate::geom::Rect;
use crate::sim::category::CategorySet;
use crate::sim::collection::EntityId;
use crate::sim::enemy::{Enemy, EnemyArchetype};
use crate::sim::entity::{Entity, EntityKind};
use crate::sim::objects::{
    Door, HealthMachine, LevelEndDoor, PuzzleTerminal, Spawner, Terminal, Wall,
};
use crate::sim::player::Player;
use crate::sim::world::World;
use format::{LevelFile, Record};

/// Code pass that binds a level's references
pub type Binder = fn(&mut World, &mut RefTable, &LevelDef) -> Result<(), EngineError>;

#[derive(Debug, Clone, Copy)]
pub struct LevelDef {
    pub name: &'static str,
    /// File under the levels directory
    pub file: &'static str,
    pub title: &'static str,
    pub next: Option<&'static str>,
    pub bind: Binder,
}

pub const LIBRARY: &[LevelDef] = &[
    LevelDef {
        name: "intro",
        file: "intro.txt",
        title: "Sector 1: Intake",
        next: Some("caves"),
        bind: bind_intro,
    },
    LevelDef {
        name: "caves",
        file: "caves.txt",
        title: "Sector 2: The Caves",
        next: Some("intro"),
        bind: bind_caves,
    },
];

pub fn level_def(name: &str) -> Result<&'static LevelDef, EngineError> {
    LIBRARY
        .iter()
        .find(|def| def.name == name)
        .ok_or_else(|| EngineError::UnknownLevel(name.to_string()))
}

/// Unbound reference placeholders by `ref_id`
#[derive(Debug, Default)]
pub struct RefTable {
    refs: BTreeMap<String, EntityId>,
}

impl RefTable {
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn contains(&self, ref_id: &str) -> bool {
        self.refs.contains_key(ref_id)
    }

    /// Replace the placeholder for `ref_id` with `entity`: the entity takes
    /// the placeholder's position and id, and the reference is used up.
    pub fn fetch(
        &mut self,
        world: &mut World,
        ref_id: &str,
        mut entity: Entity,
    ) -> Result<EntityId, EngineError> {
        let placeholder = self
            .refs
            .remove(ref_id)
            .and_then(|id| world.remove_entity(id))
            .ok_or_else(|| EngineError::UnknownReferenceId(ref_id.to_string()))?;
        entity.body.set_pos(placeholder.body.pos);
        entity.ref_id = Some(ref_id.to_string());
        world.add_entity(entity)
    }
}

fn reference_entity(ref_id: &str, pos: IVec2) -> Entity {
    let mut entity = Entity::new(
        EntityKind::Reference,
        Rect::new(pos.x, pos.y, 16, 16),
        CategorySet::new(),
    );
    entity.ref_id = Some(ref_id.to_string());
    entity
}

/// File pass: add every record to the world
pub fn populate(world: &mut World, level: &LevelFile) -> Result<RefTable, EngineError> {
    let mut table = RefTable::default();
    for record in &level.records {
        match record {
            Record::Reference { ref_id, pos } => {
                let id = world.add_entity(reference_entity(ref_id, *pos))?;
                if let Some(old) = table.refs.insert(ref_id.clone(), id) {
                    log::warn!("Duplicate reference `{}`, keeping the last one", ref_id);
                    world.remove_entity(old);
                }
            }
            Record::Decoration { id, pos } => {
                if let Some(spec) = catalog::decoration(id) {
                    world.add_entity(spec.build(*pos))?;
                }
            }
            Record::Ground { id, pos } => {
                if let Some(spec) = catalog::ground(id) {
                    world.add_entity(spec.build_ground(*pos))?;
                }
            }
            Record::Wall { anim, rect } => {
                world.add_entity(Wall::new_entity(anim, *rect))?;
            }
        }
    }
    Ok(table)
}

/// Load a library level into `world` from `levels_dir`
pub fn load(world: &mut World, levels_dir: &Path, def: &LevelDef) -> Result<(), EngineError> {
    let path = levels_dir.join(def.file);
    let text = std::fs::read_to_string(&path).map_err(|e| EngineError::io(&path, e))?;
    let level = LevelFile::parse(&text, &path.display().to_string());
    let mut refs = populate(world, &level)?;
    (def.bind)(world, &mut refs, def)?;
    if !refs.is_empty() {
        log::debug!("{} references left unbound in `{}`", refs.len(), def.name);
    }
    log::info!(
        "Loaded level `{}` ({} entities)",
        def.name,
        world.entities().len()
    );
    world.show_title_card(def.title);
    Ok(())
}

/// Records for everything a level file keeps; actors and overlays are dropped
pub fn snapshot(world: &World) -> LevelFile {
    let mut records = Vec::new();
    for entity in world.entities().iter() {
        let pos = entity.rect().top_left();
        if let Some(ref_id) = &entity.ref_id {
            records.push(Record::Reference {
                ref_id: ref_id.clone(),
                pos,
            });
        } else if let EntityKind::Wall(wall) = &entity.kind {
            records.push(Record::Wall {
                anim: wall.sprite.clone(),
                rect: entity.rect(),
            });
        } else if let Some(id) = catalog::ground_id(entity) {
            records.push(Record::Ground {
                id: id.to_string(),
                pos,
            });
        } else if let Some(id) = catalog::decoration_id(entity) {
            records.push(Record::Decoration {
                id: id.to_string(),
                pos,
            });
        }
    }
    LevelFile { records }
}

pub fn save(world: &World, path: &Path) -> Result<(), EngineError> {
    let text = snapshot(world).to_text();
    std::fs::write(path, text).map_err(|e| EngineError::io(path, e))?;
    log::info!("Saved level to {}", path.display());
    Ok(())
}

// === Binders ===

/// Put the door to `def.next` on the `exit` reference; a level with no
/// successor keeps the placeholder
fn bind_exit(world: &mut World, refs: &mut RefTable, def: &LevelDef) -> Result<(), EngineError> {
    match def.next {
        Some(next) => {
            refs.fetch(world, "exit", LevelEndDoor::new_entity(next, Vec2::ZERO))?;
        }
        None => log::debug!("`{}` is the last level, exit left unbound", def.name),
    }
    Ok(())
}

fn bind_intro(world: &mut World, refs: &mut RefTable, def: &LevelDef) -> Result<(), EngineError> {
    refs.fetch(world, "player_start", Player::new_entity(Vec2::ZERO))?;
    refs.fetch(
        world,
        "door_a",
        Door::new_entity("door_a", Some("door_b"), false, Vec2::ZERO),
    )?;
    refs.fetch(
        world,
        "door_b",
        Door::new_entity("door_b", Some("door_a"), false, Vec2::ZERO),
    )?;
    refs.fetch(
        world,
        "terminal",
        Terminal::new_entity(
            vec![
                "INTAKE LOG: the slugs got out of the tanks again.".to_string(),
                "A/D to move, W to jump, S to crouch.".to_string(),
                "J fires the pulse gun. K uses things.".to_string(),
            ],
            Vec2::ZERO,
        ),
    )?;
    for ref_id in ["dumb_1", "dumb_2"] {
        let enemy = Enemy::new_entity(EnemyArchetype::Dumb, Vec2::ZERO, &mut world.rng);
        refs.fetch(world, ref_id, enemy)?;
    }
    let flappy = Enemy::new_entity(EnemyArchetype::Flappy, Vec2::ZERO, &mut world.rng);
    refs.fetch(world, "flappy_1", flappy)?;
    bind_exit(world, refs, def)
}

fn bind_caves(world: &mut World, refs: &mut RefTable, def: &LevelDef) -> Result<(), EngineError> {
    refs.fetch(world, "player_start", Player::new_entity(Vec2::ZERO))?;
    refs.fetch(world, "health", HealthMachine::new_entity(2, Vec2::ZERO))?;
    refs.fetch(
        world,
        "puzzle",
        PuzzleTerminal::new_entity("4096", Some("vault_door"), Vec2::ZERO),
    )?;
    refs.fetch(
        world,
        "vault_door",
        Door::new_entity("vault_door", Some("vault_exit"), true, Vec2::ZERO),
    )?;
    refs.fetch(
        world,
        "vault_exit",
        Door::new_entity("vault_exit", Some("vault_door"), false, Vec2::ZERO),
    )?;
    for (ref_id, archetype) in [
        ("slug_1", EnemyArchetype::Sticky),
        ("slug_2", EnemyArchetype::Sticky),
        ("zombie_1", EnemyArchetype::Zombie),
        ("smart_1", EnemyArchetype::Smart),
        ("dodge_1", EnemyArchetype::Dodge),
        ("spiky_1", EnemyArchetype::Spiky),
    ] {
        let enemy = Enemy::new_entity(archetype, Vec2::ZERO, &mut world.rng);
        refs.fetch(world, ref_id, enemy)?;
    }
    refs.fetch(
        world,
        "spawner_1",
        Spawner::new_entity(EnemyArchetype::Flappy, 240, 2, Vec2::ZERO),
    )?;
    bind_exit(world, refs, def)
}
