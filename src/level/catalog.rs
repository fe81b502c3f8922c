//! Known decoration and ground ids
//!
//! Level files only carry an id and a position for decorations, so the size
//! and the entity each id turns into come from here. An id missing from the
//! table makes its level line invalid.

use glam::IVec2;

use crate::geom::Rect;
use crate::sim::category::{Category, CategorySet};
use crate::sim::entity::{Entity, EntityKind};
use crate::sim::objects::{Decoration, KillBlock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorationRole {
    Plain,
    Light,
    Track,
    /// Kills actors on contact
    Hazard,
    /// Turns patrolling enemies around; never drawn
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecorationSpec {
    pub id: &'static str,
    pub size: (i32, i32),
    pub role: DecorationRole,
}

const fn spec(id: &'static str, w: i32, h: i32, role: DecorationRole) -> DecorationSpec {
    DecorationSpec {
        id,
        size: (w, h),
        role,
    }
}

pub const DECORATIONS: &[DecorationSpec] = &[
    spec("moss", 32, 32, DecorationRole::Plain),
    spec("crate", 32, 32, DecorationRole::Plain),
    spec("pipe", 32, 32, DecorationRole::Plain),
    spec("vines", 32, 64, DecorationRole::Plain),
    spec("sign", 32, 32, DecorationRole::Plain),
    spec("lamp", 16, 32, DecorationRole::Light),
    spec("crystal", 16, 16, DecorationRole::Light),
    spec("rail", 32, 8, DecorationRole::Track),
    spec("spikes", 32, 16, DecorationRole::Hazard),
    spec("acid", 32, 32, DecorationRole::Hazard),
    spec("reverse", 32, 32, DecorationRole::Reverse),
];

pub const GROUND: &[DecorationSpec] = &[
    spec("dirt", 32, 32, DecorationRole::Plain),
    spec("grass", 32, 32, DecorationRole::Plain),
    spec("rubble", 32, 32, DecorationRole::Plain),
    spec("plate", 32, 32, DecorationRole::Plain),
];

pub fn decoration(id: &str) -> Option<&'static DecorationSpec> {
    DECORATIONS.iter().find(|s| s.id == id)
}

pub fn ground(id: &str) -> Option<&'static DecorationSpec> {
    GROUND.iter().find(|s| s.id == id)
}

impl DecorationSpec {
    fn rect_at(&self, pos: IVec2) -> Rect {
        Rect::new(pos.x, pos.y, self.size.0, self.size.1)
    }

    /// Entity for a DECORATIONS record
    pub fn build(&self, pos: IVec2) -> Entity {
        let rect = self.rect_at(pos);
        match self.role {
            DecorationRole::Plain => Decoration::new_entity(self.id, rect, CategorySet::new()),
            DecorationRole::Light => {
                Decoration::new_entity(self.id, rect, CategorySet::of(&[Category::LightSource]))
            }
            DecorationRole::Track => {
                Decoration::new_entity(self.id, rect, CategorySet::of(&[Category::Track]))
            }
            DecorationRole::Hazard => KillBlock::new_entity(self.id, rect),
            DecorationRole::Reverse => Entity::new(
                EntityKind::Reverse,
                rect,
                CategorySet::of(&[Category::Reverse]),
            ),
        }
    }

    /// Entity for a GROUND record
    pub fn build_ground(&self, pos: IVec2) -> Entity {
        Decoration::new_entity(
            self.id,
            self.rect_at(pos),
            CategorySet::of(&[Category::Ground]),
        )
    }
}

/// The DECORATIONS id an entity saves under, if it is one
pub fn decoration_id(entity: &Entity) -> Option<&str> {
    if entity.is(Category::Ground) {
        return None;
    }
    match &entity.kind {
        EntityKind::Decoration(d) => Some(d.sprite.as_str()),
        EntityKind::KillBlock(k) => Some(k.sprite.as_str()),
        EntityKind::Reverse => Some("reverse"),
        _ => None,
    }
}

/// The GROUND id an entity saves under, if it is one
pub fn ground_id(entity: &Entity) -> Option<&str> {
    match &entity.kind {
        EntityKind::Decoration(d) if entity.is(Category::Ground) => Some(d.sprite.as_str()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<&str> = DECORATIONS.iter().chain(GROUND).map(|s| s.id).collect();
        ids.sort_unstable();
        let before = ids.len();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[test]
    fn test_roles_pick_categories() {
        let lamp = decoration("lamp").unwrap().build(IVec2::new(4, 8));
        assert!(lamp.is(Category::Decoration) && lamp.is(Category::LightSource));
        assert_eq!(lamp.rect(), Rect::new(4, 8, 16, 32));

        let spikes = decoration("spikes").unwrap().build(IVec2::ZERO);
        assert!(matches!(spikes.kind, EntityKind::KillBlock(_)));
        assert_eq!(decoration_id(&spikes), Some("spikes"));

        let dirt = ground("dirt").unwrap().build_ground(IVec2::ZERO);
        assert!(dirt.is(Category::Ground) && dirt.is(Category::Decoration));
        assert!(!dirt.is(Category::Wall));
        assert_eq!(decoration_id(&dirt), None);
        assert_eq!(ground_id(&dirt), Some("dirt"));
    }

    #[test]
    fn test_unknown_id() {
        assert!(decoration("dragon").is_none());
        assert!(ground("moss").is_none());
    }
}
