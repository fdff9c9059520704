//! Game settings and preferences
//!
//! Persisted separately from the score history.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::platform::Storage;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Skip the title color rotation
    pub reduced_motion: bool,

    // === Timing ===
    /// Inactivity before the session times out
    pub inactivity_timeout_ms: u32,
    /// Pause between a cleared round and the next
    pub round_delay_ms: u32,
    /// Gap between pattern flashes
    pub flash_interval_ms: u32,
    pub countdown_period_ms: u32,
    /// First countdown number
    pub countdown_from: u32,
    pub title_cycle_ms: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            reduced_motion: false,

            inactivity_timeout_ms: INACTIVITY_TIMEOUT_MS,
            round_delay_ms: ROUND_DELAY_MS,
            flash_interval_ms: FLASH_INTERVAL_MS,
            countdown_period_ms: COUNTDOWN_PERIOD_MS,
            countdown_from: COUNTDOWN_FROM,
            title_cycle_ms: TITLE_CYCLE_MS,
        }
    }
}

impl Settings {
    /// Effective sound volume (0 when muted)
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume.clamp(0.0, 1.0) * self.sfx_volume.clamp(0.0, 1.0)
        }
    }

    /// Title rotation enabled (respects reduced_motion)
    pub fn effective_title_cycle(&self) -> bool {
        !self.reduced_motion && self.title_cycle_ms > 0
    }

    /// Load settings from storage, falling back to defaults
    pub fn load(storage: &impl Storage) -> Self {
        if let Some(json) = storage.get_item(SETTINGS_STORAGE_KEY) {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from storage");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to storage
    pub fn save(&self, storage: &mut impl Storage) {
        match serde_json::to_string(self) {
            Ok(json) => match storage.set_item(SETTINGS_STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Settings not saved: {}", e),
            },
            Err(e) => log::warn!("Failed to serialize settings: {}", e),
        }
    }
}
