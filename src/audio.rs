//! Sound effect cues
//!
//! The simulation only names the sound it wants; a [`SoundBackend`] owned by
//! the host actually plays it. The default backend just logs.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Hitscan discharge
    EnergyPulse,
    /// Player jumped
    Jump,
    /// Player took damage
    PlayerHurt,
    /// An enemy took damage
    EnemyHurt,
    /// An enemy died
    EnemyDeath,
    /// Door started opening
    DoorOpen,
    /// Interacted with a locked door
    DoorLocked,
    /// Health machine used
    Heal,
    /// Puzzle solved
    PuzzleSolved,
    /// Menu cursor moved / selected
    MenuBlip,
}

impl SoundEffect {
    /// Relative loudness before the settings volumes are applied
    pub fn base_volume(&self) -> f32 {
        match self {
            SoundEffect::EnergyPulse => 0.6,
            SoundEffect::MenuBlip => 0.4,
            SoundEffect::EnemyDeath | SoundEffect::PlayerHurt => 0.9,
            _ => 0.7,
        }
    }
}

/// Something that can play sound effects
pub trait SoundBackend {
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Backend used when no audio device is wired up: logs at debug level
#[derive(Debug, Default)]
pub struct LogBackend {
    pub played: u64,
}

impl SoundBackend for LogBackend {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        self.played += 1;
        log::debug!("sound {:?} at volume {:.2}", effect, volume);
    }
}

/// Play an effect scaled by the user's volume settings (muted at zero)
pub fn play_effect(backend: &mut dyn SoundBackend, effect: SoundEffect, settings: &Settings) {
    let volume = effect.base_volume() * settings.master_volume * settings.sfx_volume;
    if volume > 0.0 {
        backend.play(effect, volume.clamp(0.0, 1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_muted_settings_skip_backend() {
        let mut backend = LogBackend::default();
        let mut settings = Settings::default();
        play_effect(&mut backend, SoundEffect::Jump, &settings);
        assert_eq!(backend.played, 1);

        settings.master_volume = 0.0;
        play_effect(&mut backend, SoundEffect::Jump, &settings);
        assert_eq!(backend.played, 1);
    }
}
