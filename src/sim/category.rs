//! Category tags used for indexed entity lookup
//!
//! The closed set is a bitmask; anything else is carried as a custom string.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Ground,
    Wall,
    Actor,
    Player,
    Enemy,
    Decoration,
    Overlay,
    Interactable,
    LightSource,
    Door,
    Terminal,
    PuzzleTerminal,
    HealthMachine,
    LevelDoor,
    Reverse,
    Track,
    Spawner,
}

impl Category {
    pub const ALL: [Category; 17] = [
        Category::Ground,
        Category::Wall,
        Category::Actor,
        Category::Player,
        Category::Enemy,
        Category::Decoration,
        Category::Overlay,
        Category::Interactable,
        Category::LightSource,
        Category::Door,
        Category::Terminal,
        Category::PuzzleTerminal,
        Category::HealthMachine,
        Category::LevelDoor,
        Category::Reverse,
        Category::Track,
        Category::Spawner,
    ];

    /// Categories whose index entry is kept even while empty
    pub const VOLATILE: [Category; 4] = [
        Category::Actor,
        Category::Enemy,
        Category::Player,
        Category::Overlay,
    ];

    pub fn is_volatile(self) -> bool {
        Self::VOLATILE.contains(&self)
    }

    const fn bit(self) -> u32 {
        1 << self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Ground => "ground",
            Category::Wall => "wall",
            Category::Actor => "actor",
            Category::Player => "player",
            Category::Enemy => "enemy",
            Category::Decoration => "decoration",
            Category::Overlay => "overlay",
            Category::Interactable => "interactable",
            Category::LightSource => "light_source",
            Category::Door => "door",
            Category::Terminal => "terminal",
            Category::PuzzleTerminal => "puzzle_terminal",
            Category::HealthMachine => "health_machine",
            Category::LevelDoor => "level_door",
            Category::Reverse => "reverse",
            Category::Track => "track",
            Category::Spawner => "spawner",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An entity's tags: known categories as bits plus any custom names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySet {
    bits: u32,
    custom: Vec<String>,
}

impl CategorySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(categories: &[Category]) -> Self {
        let mut set = Self::new();
        for &c in categories {
            set.insert(c);
        }
        set
    }

    /// Add a category along with the ones it implies.
    ///
    /// `player` and `enemy` imply `actor`, `ground` implies `decoration`.
    /// `wall` and `ground` exclude each other; the later insert wins.
    pub fn insert(&mut self, category: Category) {
        self.bits |= category.bit();
        match category {
            Category::Player | Category::Enemy => self.bits |= Category::Actor.bit(),
            Category::Ground => {
                self.bits |= Category::Decoration.bit();
                self.bits &= !Category::Wall.bit();
            }
            Category::Wall => self.bits &= !Category::Ground.bit(),
            _ => {}
        }
    }

    pub fn remove(&mut self, category: Category) {
        self.bits &= !category.bit();
    }

    /// Add a tag by name, keeping unknown names as custom tags
    pub fn insert_name(&mut self, name: &str) {
        match Category::from_name(name) {
            Some(c) => self.insert(c),
            None => {
                if !self.custom.iter().any(|n| n == name) {
                    self.custom.push(name.to_string());
                }
            }
        }
    }

    pub fn contains(&self, category: Category) -> bool {
        self.bits & category.bit() != 0
    }

    pub fn contains_any(&self, categories: &[Category]) -> bool {
        categories.iter().any(|&c| self.contains(c))
    }

    pub fn has_custom(&self, name: &str) -> bool {
        self.custom.iter().any(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL.into_iter().filter(|&c| self.contains(c))
    }

    pub fn custom(&self) -> &[String] {
        &self.custom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implications() {
        let set = CategorySet::of(&[Category::Player]);
        assert!(set.contains(Category::Actor));
        let set = CategorySet::of(&[Category::Ground]);
        assert!(set.contains(Category::Decoration));
    }

    #[test]
    fn test_wall_and_ground_are_disjoint() {
        let mut set = CategorySet::of(&[Category::Wall]);
        set.insert(Category::Ground);
        assert!(!set.contains(Category::Wall));
        set.insert(Category::Wall);
        assert!(!set.contains(Category::Ground));
    }

    #[test]
    fn test_names_round_trip() {
        for c in Category::ALL {
            assert_eq!(Category::from_name(c.name()), Some(c));
        }
        let mut set = CategorySet::new();
        set.insert_name("glowing");
        set.insert_name("glowing");
        set.insert_name("door");
        assert_eq!(set.custom().to_vec(), vec!["glowing".to_string()]);
        assert!(set.contains(Category::Door));
    }
}
