//! Sprite id to color table
//!
//! Stands in for the sprite sheet: each sprite id maps to a flat RGBA color.
//! Ids with no entry draw as a cycling rainbow, and are warned about once.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::shapes::rainbow;
use crate::error::EngineError;

#[derive(Debug, Clone, Default)]
pub struct Palette {
    colors: HashMap<String, [f32; 4]>,
    warned: HashSet<String>,
}

const BUILTIN: &[(&str, [f32; 4])] = &[
    ("stone", [0.35, 0.33, 0.4, 1.0]),
    ("metal", [0.45, 0.5, 0.55, 1.0]),
    ("brick", [0.55, 0.3, 0.25, 1.0]),
    ("dirt", [0.3, 0.22, 0.15, 1.0]),
    ("grass", [0.2, 0.4, 0.18, 1.0]),
    ("rubble", [0.28, 0.26, 0.24, 1.0]),
    ("plate", [0.32, 0.34, 0.38, 1.0]),
    ("moss", [0.25, 0.5, 0.25, 1.0]),
    ("crate", [0.6, 0.45, 0.25, 1.0]),
    ("pipe", [0.4, 0.42, 0.35, 1.0]),
    ("vines", [0.2, 0.55, 0.2, 1.0]),
    ("sign", [0.7, 0.65, 0.4, 1.0]),
    ("lamp", [1.0, 0.9, 0.55, 1.0]),
    ("crystal", [0.55, 0.85, 1.0, 1.0]),
    ("rail", [0.45, 0.45, 0.5, 1.0]),
    ("spikes", [0.8, 0.8, 0.85, 1.0]),
    ("acid", [0.5, 0.95, 0.2, 1.0]),
    ("door", [0.5, 0.35, 0.2, 1.0]),
    ("door_locked", [0.6, 0.15, 0.15, 1.0]),
    ("terminal", [0.2, 0.6, 0.7, 1.0]),
    ("puzzle_terminal", [0.7, 0.4, 0.9, 1.0]),
    ("health_machine", [0.9, 0.3, 0.4, 1.0]),
    ("level_door", [0.95, 0.8, 0.2, 1.0]),
    ("spawner", [0.3, 0.3, 0.3, 0.6]),
    ("enemy_dumb", [0.75, 0.45, 0.2, 1.0]),
    ("enemy_smart", [0.8, 0.2, 0.6, 1.0]),
    ("enemy_zombie", [0.45, 0.6, 0.35, 1.0]),
    ("enemy_flappy", [0.9, 0.75, 0.3, 1.0]),
    ("enemy_dodge", [0.35, 0.55, 0.9, 1.0]),
    ("enemy_spiky", [0.95, 0.95, 0.95, 1.0]),
    ("enemy_sticky", [0.85, 0.85, 0.3, 1.0]),
    ("bullet_splash", [0.7, 0.95, 1.0, 0.9]),
    ("hurt_flash", [1.0, 0.3, 0.3, 0.7]),
    ("heal_sparkle", [0.5, 1.0, 0.6, 0.8]),
];

impl Palette {
    pub fn builtin() -> Self {
        let colors = BUILTIN
            .iter()
            .map(|(id, color)| (id.to_string(), *color))
            .collect();
        Self {
            colors,
            warned: HashSet::new(),
        }
    }

    /// Built-in colors overridden by a JSON map of id to `[r, g, b, a]`
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let json = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => EngineError::AssetMissing {
                path: path.display().to_string(),
            },
            _ => EngineError::io(path, e),
        })?;
        let overrides: HashMap<String, [f32; 4]> = serde_json::from_str(&json)?;
        let mut palette = Self::builtin();
        log::info!("Loaded {} palette entries from {}", overrides.len(), path.display());
        palette.colors.extend(overrides);
        Ok(palette)
    }

    /// `load`, falling back to the built-in table on any error
    pub fn load_or_builtin(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::builtin();
        };
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Palette unavailable ({}), using built-in colors", e);
            Self::builtin()
        })
    }

    pub fn get(&self, id: &str) -> Option<[f32; 4]> {
        self.colors.get(id).copied()
    }

    /// Color for `id`, or the rainbow placeholder
    pub fn resolve(&mut self, id: &str, tick: u64) -> [f32; 4] {
        if let Some(color) = self.get(id) {
            return color;
        }
        if self.warned.insert(id.to_string()) {
            let err = EngineError::AssetMissing {
                path: format!("sprite `{id}`"),
            };
            log::warn!("{}", err);
        }
        let phase = id.bytes().map(u32::from).sum();
        rainbow(tick, phase)
    }

    pub fn warned_count(&self) -> usize {
        self.warned.len()
    }
}
