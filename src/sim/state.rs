//! Game state and core sequence types
//!
//! Everything a running game needs lives here; the session owns exactly one.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::color::ButtonColor;

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Start screen, or after a session timeout
    Idle,
    /// "Get Ready..." countdown, `remaining` numbers left to show before play
    Countdown { remaining: u32 },
    /// Replaying the pattern, `next_step` is the next index to flash
    Presenting { next_step: usize },
    /// Waiting for the player's clicks
    AwaitingInput,
    /// Round fully matched, next round pending
    RoundCleared,
    /// Wrong click ended the run
    GameOver,
}

impl GamePhase {
    /// Whether a run is in progress (countdown through round delay)
    pub fn is_active(&self) -> bool {
        !matches!(self, GamePhase::Idle | GamePhase::GameOver)
    }
}

/// Complete game state for one session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the pattern RNG was created from
    pub seed: u64,
    /// Number of sequence steps presented so far
    pub level: u32,
    /// Number of fully matched rounds
    pub score: u32,
    /// Cumulative pattern the player must reproduce
    pub pattern: Vec<ButtonColor>,
    /// The player's attempt at the current round
    pub user_input: Vec<ButtonColor>,
    pub phase: GamePhase,
    rng: Pcg32,
}

impl GameState {
    /// Create an idle game with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            level: 0,
            score: 0,
            pattern: Vec::new(),
            user_input: Vec::new(),
            phase: GamePhase::Idle,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Draw the next pattern color
    pub(crate) fn draw_color(&mut self) -> ButtonColor {
        ButtonColor::random(&mut self.rng)
    }

    /// Drop the pattern and the player's attempt
    pub(crate) fn clear_sequences(&mut self) {
        self.pattern.clear();
        self.user_input.clear();
    }
}
