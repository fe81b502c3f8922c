//! Game settings and preferences
//!
//! Persisted as JSON next to the executable (or wherever `--settings` points).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,
    /// Outline every entity rect (debug)
    pub show_rects: bool,

    // === Debug ===
    /// Enable the level editor hotkeys
    pub editor_enabled: bool,
    /// F5 writes the current world to `<level_save_dest>.txt`
    pub level_save_dest: String,

    // === Levels ===
    /// Directory holding level files
    pub levels_dir: PathBuf,
    /// Level started from the title menu
    pub start_level: String,

    // === Assets ===
    /// Optional sprite palette (JSON map of sprite id to RGBA)
    pub palette_path: Option<PathBuf>,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_fps: false,
            show_rects: false,

            editor_enabled: false,
            level_save_dest: "saved_level".to_string(),

            levels_dir: PathBuf::from("levels"),
            start_level: "intro".to_string(),

            palette_path: None,

            master_volume: 0.8,
            sfx_volume: 1.0,
        }
    }
}

impl Settings {
    /// Load settings from disk, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let settings = serde_json::from_str(&json)?;
                log::info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(EngineError::io(path, e)),
        }
    }

    /// Save settings to disk
    pub fn save(&self, path: &Path) -> Result<(), EngineError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| EngineError::io(path, e))?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Destination file for F5 level saves
    pub fn level_save_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.txt", self.level_save_dest))
    }
}
