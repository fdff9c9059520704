//! Round rules
//!
//! Pure transitions on `GameState`. No timers, rendering or audio: callers
//! act on the returned outcomes.

use super::color::ButtonColor;
use super::state::{GamePhase, GameState};

/// Result of one countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// Display this number
    Show(u32),
    /// Countdown finished, present the first round
    Begin,
    /// Not counting down
    Ignored,
}

/// Result of a player click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Click arrived outside `AwaitingInput`
    Ignored,
    /// Matches so far, more clicks expected
    Correct,
    /// Whole pattern matched, score incremented
    RoundComplete,
    /// Mismatch, run over
    Wrong,
}

/// Reset level, score and sequences and begin the countdown
pub fn start_game(state: &mut GameState, countdown_from: u32) {
    state.level = 0;
    state.score = 0;
    state.clear_sequences();
    state.phase = GamePhase::Countdown {
        remaining: countdown_from,
    };
}

/// Advance the countdown by one tick
///
/// Counting down from 3 shows 3, 2, 1 and the fourth tick begins round 1.
pub fn countdown_tick(state: &mut GameState) -> CountdownStep {
    match state.phase {
        GamePhase::Countdown { remaining: 0 } => CountdownStep::Begin,
        GamePhase::Countdown { remaining } => {
            state.phase = GamePhase::Countdown {
                remaining: remaining - 1,
            };
            CountdownStep::Show(remaining)
        }
        _ => CountdownStep::Ignored,
    }
}

/// Start the next round: one more level, one more random color
///
/// The round presents the whole cumulative pattern, so the phase restarts
/// at step 0. Returns the newly appended color.
pub fn advance_sequence(state: &mut GameState) -> ButtonColor {
    state.user_input.clear();
    state.level += 1;
    let color = state.draw_color();
    state.pattern.push(color);
    state.phase = GamePhase::Presenting { next_step: 0 };
    color
}

/// Emit the next color to flash while presenting
///
/// After the last step the phase moves to `AwaitingInput`.
pub fn present_step(state: &mut GameState) -> Option<ButtonColor> {
    let GamePhase::Presenting { next_step } = state.phase else {
        return None;
    };
    let color = *state.pattern.get(next_step)?;
    let next_step = next_step + 1;
    state.phase = if next_step >= state.pattern.len() {
        GamePhase::AwaitingInput
    } else {
        GamePhase::Presenting { next_step }
    };
    Some(color)
}

/// Record a click and check it against the pattern
pub fn submit_input(state: &mut GameState, color: ButtonColor) -> SubmitOutcome {
    if state.phase != GamePhase::AwaitingInput || state.user_input.len() >= state.pattern.len() {
        return SubmitOutcome::Ignored;
    }

    let position = state.user_input.len();
    state.user_input.push(color);

    if state.pattern[position] != color {
        state.clear_sequences();
        state.phase = GamePhase::GameOver;
        return SubmitOutcome::Wrong;
    }

    if state.user_input.len() == state.pattern.len() {
        state.score += 1;
        state.phase = GamePhase::RoundCleared;
        SubmitOutcome::RoundComplete
    } else {
        SubmitOutcome::Correct
    }
}

/// Discard the current run and go back to the start screen
pub fn return_to_idle(state: &mut GameState) {
    state.clear_sequences();
    state.phase = GamePhase::Idle;
}

#[cfg(test)]
mod tests {
    use super::*;
    use ButtonColor::*;
    use proptest::prelude::*;

    /// Put the state mid-round with a known pattern
    fn awaiting(pattern: &[ButtonColor]) -> GameState {
        let mut state = GameState::new(1);
        state.pattern = pattern.to_vec();
        state.level = pattern.len() as u32;
        state.phase = GamePhase::AwaitingInput;
        state
    }

    #[test]
    fn test_start_game_resets() {
        let mut state = awaiting(&[Red, Blue]);
        state.score = 1;
        state.user_input.push(Red);

        start_game(&mut state, 3);

        assert_eq!(state.level, 0);
        assert_eq!(state.score, 0);
        assert!(state.pattern.is_empty());
        assert!(state.user_input.is_empty());
        assert_eq!(state.phase, GamePhase::Countdown { remaining: 3 });
    }

    #[test]
    fn test_countdown_begins_on_fourth_tick() {
        let mut state = GameState::new(1);
        start_game(&mut state, 3);

        let steps: Vec<_> = (0..4).map(|_| countdown_tick(&mut state)).collect();
        assert_eq!(
            steps,
            vec![
                CountdownStep::Show(3),
                CountdownStep::Show(2),
                CountdownStep::Show(1),
                CountdownStep::Begin,
            ]
        );
    }

    #[test]
    fn test_countdown_from_zero_begins_immediately() {
        let mut state = GameState::new(1);
        start_game(&mut state, 0);
        assert_eq!(countdown_tick(&mut state), CountdownStep::Begin);
    }

    #[test]
    fn test_countdown_ignored_when_idle() {
        let mut state = GameState::new(1);
        assert_eq!(countdown_tick(&mut state), CountdownStep::Ignored);
    }

    #[test]
    fn test_advance_presents_whole_pattern() {
        let mut state = GameState::new(42);
        start_game(&mut state, 0);
        advance_sequence(&mut state);
        assert_eq!(present_step(&mut state), Some(state.pattern[0]));
        assert_eq!(state.phase, GamePhase::AwaitingInput);

        let pattern = state.pattern.clone();
        for color in &pattern {
            submit_input(&mut state, *color);
        }
        advance_sequence(&mut state);

        let mut shown = Vec::new();
        while let Some(color) = present_step(&mut state) {
            shown.push(color);
        }
        assert_eq!(shown, state.pattern);
        assert_eq!(shown.len(), 2);
        assert_eq!(state.phase, GamePhase::AwaitingInput);
    }

    #[test]
    fn test_matching_round_scores_once() {
        let mut state = awaiting(&[Red, Blue]);
        assert_eq!(submit_input(&mut state, Red), SubmitOutcome::Correct);
        assert_eq!(state.score, 0);
        assert_eq!(submit_input(&mut state, Blue), SubmitOutcome::RoundComplete);
        assert_eq!(state.score, 1);
        assert_eq!(state.phase, GamePhase::RoundCleared);
    }

    #[test]
    fn test_mismatch_ends_game_and_clears() {
        let mut state = awaiting(&[Red, Blue]);
        submit_input(&mut state, Red);
        assert_eq!(submit_input(&mut state, Green), SubmitOutcome::Wrong);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.pattern.is_empty());
        assert!(state.user_input.is_empty());
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_first_click_mismatch_is_immediate() {
        let mut state = awaiting(&[Red, Blue, Green]);
        assert_eq!(submit_input(&mut state, Yellow), SubmitOutcome::Wrong);
    }

    #[test]
    fn test_clicks_outside_input_phase_ignored() {
        let mut state = awaiting(&[Red]);
        state.phase = GamePhase::Presenting { next_step: 0 };
        assert_eq!(submit_input(&mut state, Red), SubmitOutcome::Ignored);
        assert!(state.user_input.is_empty());

        state.phase = GamePhase::RoundCleared;
        assert_eq!(submit_input(&mut state, Red), SubmitOutcome::Ignored);
    }

    #[test]
    fn test_return_to_idle_discards_run() {
        let mut state = awaiting(&[Red, Blue]);
        submit_input(&mut state, Red);
        return_to_idle(&mut state);
        assert_eq!(state.phase, GamePhase::Idle);
        assert!(state.pattern.is_empty());
        assert!(state.user_input.is_empty());
    }

    #[test]
    fn test_same_seed_same_pattern() {
        let mut a = GameState::new(99999);
        let mut b = GameState::new(99999);
        for _ in 0..10 {
            assert_eq!(advance_sequence(&mut a), advance_sequence(&mut b));
        }
    }

    proptest! {
        #[test]
        fn prop_pattern_is_prefix_stable(seed in any::<u64>(), rounds in 1usize..40) {
            let mut state = GameState::new(seed);
            start_game(&mut state, 0);
            let mut previous: Vec<ButtonColor> = Vec::new();
            for n in 1..=rounds {
                advance_sequence(&mut state);
                prop_assert_eq!(state.pattern.len(), n);
                prop_assert_eq!(&state.pattern[..n - 1], &previous[..]);
                previous = state.pattern.clone();
            }
        }

        #[test]
        fn prop_score_never_exceeds_level(
            seed in any::<u64>(),
            clicks in proptest::collection::vec(0usize..4, 0..60),
        ) {
            let mut state = GameState::new(seed);
            start_game(&mut state, 0);
            advance_sequence(&mut state);
            while present_step(&mut state).is_some() {}

            for pick in clicks {
                match submit_input(&mut state, ButtonColor::ALL[pick]) {
                    SubmitOutcome::RoundComplete => {
                        advance_sequence(&mut state);
                        while present_step(&mut state).is_some() {}
                    }
                    SubmitOutcome::Wrong => {
                        start_game(&mut state, 0);
                        advance_sequence(&mut state);
                        while present_step(&mut state).is_some() {}
                    }
                    _ => {}
                }
                prop_assert!(state.score <= state.level);
                prop_assert!(state.user_input.len() <= state.pattern.len());
            }
        }
    }
}
