//! Simon Says - A memory sequence game
//!
//! Core modules:
//! - `sim`: Sequence engine (pattern, input verification, game phases)
//! - `history`: Persisted score history with filtering
//! - `session`: Game session driving the engine from input and timer events
//! - `platform`: Renderer/audio/storage/scheduler capabilities and their hosts
//! - `settings`: Persisted preferences and timings

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod error;
pub mod history;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::{HistoryError, StorageError};
pub use history::{EntryId, HistoryEntry, HistoryStore};
pub use session::{GameSession, SaveOutcome};
pub use settings::Settings;
pub use sim::{ButtonColor, GamePhase, GameState};

/// Game configuration constants
pub mod consts {
    /// LocalStorage key for the score history
    pub const HISTORY_STORAGE_KEY: &str = "gameHistory";
    /// Copy of a history blob that failed to parse
    pub const HISTORY_BACKUP_STORAGE_KEY: &str = "gameHistoryBackup";
    /// LocalStorage key for settings
    pub const SETTINGS_STORAGE_KEY: &str = "simonSettings";

    /// Player inactivity before the session times out (3 minutes)
    pub const INACTIVITY_TIMEOUT_MS: u32 = 180_000;
    /// Pause between a cleared round and the next presentation
    pub const ROUND_DELAY_MS: u32 = 1000;
    /// Gap between flashes while presenting the pattern
    pub const FLASH_INTERVAL_MS: u32 = 600;
    /// Countdown tick period
    pub const COUNTDOWN_PERIOD_MS: u32 = 1000;
    /// First number shown by the countdown
    pub const COUNTDOWN_FROM: u32 = 3;
    /// Title accent color rotation period
    pub const TITLE_CYCLE_MS: u32 = 1000;
}
