//! Platform abstraction layer
//!
//! Capabilities the game session is driven through:
//! - `Renderer`: screens, title, button flashes
//! - `AudioPlayer`: button tones and the wrong-answer buzz
//! - `Storage`: key-value persistence (LocalStorage on web)
//! - `Scheduler`: one-shot and repeating timers
//!
//! Hosts: `web` (wasm32 browser), `headless` + `manual` (native, tests).

pub mod headless;
pub mod manual;
pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use headless::{LogAudio, LogRenderer};
pub use manual::ManualScheduler;
pub use memory::MemoryStorage;

use crate::error::StorageError;
use crate::sim::ButtonColor;

/// Screens and popups the session shows and hides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Start,
    Game,
    GameOver,
    History,
    SessionTimeout,
    Help,
    DeleteConfirm,
    EditInitials,
}

/// Popups opened from the page that a session reset closes
pub const PAGE_POPUPS: [Screen; 3] = [Screen::Help, Screen::DeleteConfirm, Screen::EditInitials];

impl Screen {
    /// DOM element id of the screen
    pub fn element_id(&self) -> &'static str {
        match self {
            Screen::Start => "start-screen",
            Screen::Game => "game-screen",
            Screen::GameOver => "game-over-screen",
            Screen::History => "history-popup",
            Screen::SessionTimeout => "session-timeout-popup",
            Screen::Help => "help-popup",
            Screen::DeleteConfirm => "delete-popup",
            Screen::EditInitials => "edit-popup",
        }
    }
}

/// Sounds the session can request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    /// Tone of a button
    Tone(ButtonColor),
    /// Wrong answer
    Wrong,
}

/// Timer purposes; at most one of each is pending at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Countdown interval tick
    CountdownTick,
    /// Flash the next step of the pattern
    PresentStep,
    /// Delay after a cleared round
    NextRound,
    /// Player inactivity expiry
    Inactivity,
    /// Title accent color rotation
    TitleCycle,
}

/// Handle returned by the scheduler, used to cancel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u32);

/// Presentation layer
pub trait Renderer {
    /// Light up a button while presenting the pattern
    fn flash(&mut self, color: ButtonColor);
    /// Pressed-state animation for a player click
    fn press(&mut self, color: ButtonColor);
    fn show_screen(&mut self, screen: Screen);
    fn hide_screen(&mut self, screen: Screen);
    /// Level title ("Level 3", "Get Ready...", countdown digits)
    fn set_title(&mut self, text: &str);
    fn show_final_score(&mut self, score: u32);
    /// Accent color of the screen titles
    fn set_title_accent(&mut self, color: ButtonColor);
}

/// Sound output
pub trait AudioPlayer {
    fn play(&mut self, sound: Sound);
}

/// Durable key-value storage
pub trait Storage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Timer service; firings are delivered to `GameSession::on_timer`
pub trait Scheduler {
    /// Fire `kind` once after `delay_ms`
    fn after(&mut self, delay_ms: u32, kind: TimerKind) -> TimerHandle;
    /// Fire `kind` every `period_ms` until cancelled
    fn every(&mut self, period_ms: u32, kind: TimerKind) -> TimerHandle;
    fn cancel(&mut self, handle: TimerHandle);
}

/// Locale-formatted (date, time) strings for a history entry
#[cfg(target_arch = "wasm32")]
pub fn local_timestamp() -> (String, String) {
    let now = js_sys::Date::new_0();
    let options = wasm_bindgen::JsValue::UNDEFINED;
    (
        String::from(now.to_locale_date_string("default", &options)),
        String::from(now.to_locale_time_string("default")),
    )
}

#[cfg(not(target_arch = "wasm32"))]
pub fn local_timestamp() -> (String, String) {
    ("N/A".to_string(), "N/A".to_string())
}
