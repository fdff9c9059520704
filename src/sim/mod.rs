//! Sequence engine
//!
//! All game rules live here. This module must stay pure:
//! - Seeded RNG only
//! - No timers, rendering, audio or storage

pub mod color;
pub mod round;
pub mod state;

pub use color::ButtonColor;
pub use round::{
    CountdownStep, SubmitOutcome, advance_sequence, countdown_tick, present_step, return_to_idle,
    start_game, submit_input,
};
pub use state::{GamePhase, GameState};
