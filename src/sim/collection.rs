//! Entity storage with category-indexed lookup
//!
//! Ids are handed out monotonically and never reused, so iterating the
//! `BTreeMap` by id is iterating in insertion order. An entity can be
//! checked out while it updates; the index keeps its id and lookups just
//! skip it until it is checked back in.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::category::Category;
use super::entity::Entity;
use crate::geom::Rect;

/// Stable handle to an entity in a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

#[derive(Debug, Default)]
pub struct EntityCollection {
    entities: BTreeMap<EntityId, Entity>,
    categories: HashMap<Category, BTreeSet<EntityId>>,
    custom: HashMap<String, BTreeSet<EntityId>>,
    /// Ids currently lent out for an update
    checked_out: HashSet<EntityId>,
    warned_custom: HashSet<String>,
    next_id: u32,
}

impl EntityCollection {
    pub fn new() -> Self {
        let mut collection = Self {
            next_id: 1,
            ..Self::default()
        };
        for c in Category::VOLATILE {
            collection.categories.insert(c, BTreeSet::new());
        }
        collection
    }

    /// Store an entity, assigning and returning its id
    pub fn insert(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        entity.id = id;

        for c in entity.categories.iter() {
            self.categories.entry(c).or_default().insert(id);
        }
        for name in entity.categories.custom() {
            if self.warned_custom.insert(name.clone()) {
                log::warn!("Unknown category tag `{}` (accepted)", name);
            }
            self.custom.entry(name.clone()).or_default().insert(id);
        }
        self.entities.insert(id, entity);
        id
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;
        self.unindex(id, &entity);
        Some(entity)
    }

    fn unindex(&mut self, id: EntityId, entity: &Entity) {
        for c in entity.categories.iter() {
            if let Some(set) = self.categories.get_mut(&c) {
                set.remove(&id);
                if set.is_empty() && !c.is_volatile() {
                    self.categories.remove(&c);
                }
            }
        }
        for name in entity.categories.custom() {
            if let Some(set) = self.custom.get_mut(name) {
                set.remove(&id);
                if set.is_empty() {
                    self.custom.remove(name);
                }
            }
        }
    }

    /// Lend an entity out for its update; it stays indexed
    pub fn check_out(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;
        self.checked_out.insert(id);
        Some(entity)
    }

    /// Return a checked-out entity to its slot
    pub fn check_in(&mut self, entity: Entity) {
        if self.checked_out.remove(&entity.id) {
            self.entities.insert(entity.id, entity);
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id) || self.checked_out.contains(&id)
    }

    /// Ids in insertion order
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len() + self.checked_out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index entry for a category, `None` once a non-volatile set was pruned
    pub fn category(&self, category: Category) -> Option<&BTreeSet<EntityId>> {
        self.categories.get(&category)
    }

    pub fn custom_category(&self, name: &str) -> Option<&BTreeSet<EntityId>> {
        self.custom.get(name)
    }

    /// Entities of one category, in insertion order
    pub fn with_category(&self, category: Category) -> impl Iterator<Item = &Entity> {
        self.categories
            .get(&category)
            .into_iter()
            .flat_map(|set| set.iter())
            .filter_map(|id| self.entities.get(id))
    }

    /// Entities with at least one of `categories` (all when empty), none of
    /// `not_categories`, overlapping `rect` when given, and passing `pred`.
    pub fn get_all(
        &self,
        categories: &[Category],
        not_categories: &[Category],
        rect: Option<Rect>,
        pred: impl Fn(&Entity) -> bool,
    ) -> Vec<EntityId> {
        let candidates: BTreeSet<EntityId> = if categories.is_empty() {
            self.entities.keys().copied().collect()
        } else {
            categories
                .iter()
                .filter_map(|c| self.categories.get(c))
                .flat_map(|set| set.iter().copied())
                .collect()
        };

        candidates
            .into_iter()
            .filter_map(|id| self.entities.get(&id))
            .filter(|e| !e.categories.contains_any(not_categories))
            .filter(|e| rect.is_none_or(|r| e.rect().overlaps(&r)))
            .filter(|e| pred(e))
            .map(|e| e.id)
            .collect()
    }

    /// Check the index against the stored entities' own tags
    pub fn is_index_consistent(&self) -> bool {
        for c in Category::ALL {
            let tagged: BTreeSet<EntityId> = self
                .entities
                .values()
                .filter(|e| e.categories.contains(c))
                .map(|e| e.id)
                .collect();
            let indexed: BTreeSet<EntityId> = self
                .categories
                .get(&c)
                .map(|set| {
                    set.iter()
                        .copied()
                        .filter(|id| !self.checked_out.contains(id))
                        .collect()
                })
                .unwrap_or_default();
            if tagged != indexed {
                return false;
            }
            if c.is_volatile() && !self.categories.contains_key(&c) {
                return false;
            }
            if !c.is_volatile() && indexed.is_empty() && self.categories.contains_key(&c) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::category::CategorySet;
    use crate::sim::entity::EntityKind;
    use proptest::prelude::*;

    fn tagged(categories: &[Category], x: i32) -> Entity {
        Entity::new(
            EntityKind::Reverse,
            Rect::new(x, 0, 10, 10),
            CategorySet::of(categories),
        )
    }

    #[test]
    fn test_insert_indexes_implied_categories() {
        let mut c = EntityCollection::new();
        let id = c.insert(tagged(&[Category::Player], 0));
        assert!(c.category(Category::Actor).unwrap().contains(&id));
        assert!(c.category(Category::Player).unwrap().contains(&id));
    }

    #[test]
    fn test_volatile_sets_survive_empty_others_pruned() {
        let mut c = EntityCollection::new();
        let enemy = c.insert(tagged(&[Category::Enemy], 0));
        let wall = c.insert(tagged(&[Category::Wall], 20));
        c.remove(enemy);
        c.remove(wall);
        assert!(c.category(Category::Enemy).unwrap().is_empty());
        assert!(c.category(Category::Wall).is_none());
        assert!(c.is_index_consistent());
    }

    #[test]
    fn test_get_all_filters() {
        let mut c = EntityCollection::new();
        let a = c.insert(tagged(&[Category::Wall], 0));
        let b = c.insert(tagged(&[Category::Enemy], 100));
        let d = c.insert(tagged(&[Category::Decoration, Category::LightSource], 5));

        assert_eq!(c.get_all(&[], &[], None, |_| true), vec![a, b, d]);
        assert_eq!(
            c.get_all(&[Category::Wall, Category::Decoration], &[], None, |_| true),
            vec![a, d]
        );
        assert_eq!(
            c.get_all(&[], &[Category::LightSource], Some(Rect::new(0, 0, 20, 20)), |_| true),
            vec![a]
        );
        assert_eq!(c.get_all(&[], &[], None, |e| e.rect().x > 50), vec![b]);
    }

    #[test]
    fn test_checked_out_entity_is_skipped_but_indexed() {
        let mut c = EntityCollection::new();
        let id = c.insert(tagged(&[Category::Enemy], 0));
        let e = c.check_out(id).unwrap();
        assert!(c.get(id).is_none());
        assert!(c.get_all(&[Category::Enemy], &[], None, |_| true).is_empty());
        assert!(c.contains(id));
        c.check_in(e);
        assert!(c.get(id).is_some());
    }

    #[test]
    fn test_custom_tags_are_indexed() {
        let mut c = EntityCollection::new();
        let mut set = CategorySet::new();
        set.insert_name("sparkly");
        let id = c.insert(Entity::new(EntityKind::Reverse, Rect::new(0, 0, 1, 1), set));
        assert!(c.custom_category("sparkly").unwrap().contains(&id));
        c.remove(id);
        assert!(c.custom_category("sparkly").is_none());
    }

    proptest! {
        #[test]
        fn prop_index_consistent_under_churn(ops in proptest::collection::vec((0usize..17, 0usize..17, any::<bool>()), 1..60)) {
            let mut c = EntityCollection::new();
            let mut live: Vec<EntityId> = Vec::new();
            for (i, (a, b, add)) in ops.into_iter().enumerate() {
                if add || live.is_empty() {
                    let cats = [Category::ALL[a], Category::ALL[b]];
                    live.push(c.insert(tagged(&cats, i as i32)));
                } else {
                    let id = live.remove(a % live.len());
                    prop_assert!(c.remove(id).is_some());
                }
                prop_assert!(c.is_index_consistent());
            }
        }
    }
}
