//! Game session
//!
//! Owns one `GameState`, the score history and the injected collaborators.
//! Hosts feed it input events and timer firings; it applies the round rules
//! and tells the renderer, audio and scheduler what to do.

use std::collections::HashMap;

use crate::error::HistoryError;
use crate::history::{EntryId, HistoryEntry, HistoryStore, normalize_initials};
use crate::platform::{
    self, AudioPlayer, ManualScheduler, PAGE_POPUPS, Renderer, Scheduler, Screen, Sound, Storage,
    TimerHandle, TimerKind,
};
use crate::settings::Settings;
use crate::sim::{ButtonColor, CountdownStep, GamePhase, GameState, SubmitOutcome, round};

/// Timers that belong to a run and die with it
const GAME_TIMERS: [TimerKind; 3] = [
    TimerKind::CountdownTick,
    TimerKind::PresentStep,
    TimerKind::NextRound,
];

/// Result of a save request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(EntryId),
    /// This run's score was already saved
    AlreadySaved,
    /// No finished run to save
    NoFinishedGame,
}

/// One player's game session
pub struct GameSession<R, A, T, S>
where
    R: Renderer,
    A: AudioPlayer,
    T: Scheduler,
    S: Storage,
{
    state: GameState,
    history: HistoryStore<S>,
    settings: Settings,
    renderer: R,
    audio: A,
    scheduler: T,
    /// Pending timer per kind
    timers: HashMap<TimerKind, TimerHandle>,
    /// One save per finished run
    score_saved: bool,
    title_accent: ButtonColor,
}

impl<R, A, T, S> GameSession<R, A, T, S>
where
    R: Renderer,
    A: AudioPlayer,
    T: Scheduler,
    S: Storage,
{
    pub fn new(
        seed: u64,
        settings: Settings,
        history: HistoryStore<S>,
        renderer: R,
        audio: A,
        scheduler: T,
    ) -> Self {
        Self {
            state: GameState::new(seed),
            history,
            settings,
            renderer,
            audio,
            scheduler,
            timers: HashMap::new(),
            score_saved: false,
            title_accent: ButtonColor::Red,
        }
    }

    /// Show the start screen and arm the idle timers
    pub fn boot(&mut self) {
        log::info!(
            "Session ready (seed {}, {} saved games)",
            self.state.seed,
            self.history.len()
        );
        self.renderer.show_screen(Screen::Start);
        self.renderer.set_title_accent(self.title_accent);
        if self.settings.effective_title_cycle() {
            self.arm_interval(TimerKind::TitleCycle, self.settings.title_cycle_ms);
        }
        self.user_activity();
    }

    // === Input events ===

    /// Start (or restart after game over) a run
    pub fn start(&mut self) {
        if self.state.phase.is_active() {
            log::debug!("Start ignored, run in progress ({:?})", self.state.phase);
            return;
        }

        self.user_activity();
        self.renderer.hide_screen(Screen::Start);
        self.renderer.hide_screen(Screen::GameOver);
        self.renderer.hide_screen(Screen::History);
        self.renderer.hide_screen(Screen::SessionTimeout);
        self.renderer.show_screen(Screen::Game);

        self.score_saved = false;
        round::start_game(&mut self.state, self.settings.countdown_from);
        self.renderer.set_title("Get Ready...");
        self.arm_interval(TimerKind::CountdownTick, self.settings.countdown_period_ms);
        log::info!("Countdown started");
    }

    /// A game button was clicked
    pub fn color_clicked(&mut self, color: ButtonColor) -> SubmitOutcome {
        self.user_activity();

        let outcome = round::submit_input(&mut self.state, color);
        if outcome == SubmitOutcome::Ignored {
            log::debug!("Click on {} ignored in {:?}", color, self.state.phase);
            return outcome;
        }

        self.audio.play(Sound::Tone(color));
        self.renderer.press(color);

        match outcome {
            SubmitOutcome::RoundComplete => {
                log::info!("Round {} cleared, score {}", self.state.level, self.state.score);
                self.arm(TimerKind::NextRound, self.settings.round_delay_ms);
            }
            SubmitOutcome::Wrong => {
                self.audio.play(Sound::Wrong);
                self.game_over();
            }
            SubmitOutcome::Correct | SubmitOutcome::Ignored => {}
        }
        outcome
    }

    /// Pointer move, key press or click anywhere on the page
    pub fn user_activity(&mut self) {
        self.arm(TimerKind::Inactivity, self.settings.inactivity_timeout_ms);
    }

    /// Save the finished run under the given initials
    pub fn save_score(&mut self, initials: &str) -> Result<SaveOutcome, HistoryError> {
        let initials = normalize_initials(initials)?;
        if self.score_saved {
            log::debug!("Score already saved for this game");
            return Ok(SaveOutcome::AlreadySaved);
        }
        if self.state.phase != GamePhase::GameOver {
            return Ok(SaveOutcome::NoFinishedGame);
        }

        let (date, time) = platform::local_timestamp();
        let id = self
            .history
            .add(HistoryEntry::new(initials, self.state.score, date, time))?;
        self.score_saved = true;

        self.renderer.hide_screen(Screen::GameOver);
        self.renderer.show_screen(Screen::History);
        Ok(SaveOutcome::Saved(id))
    }

    /// Dismiss the session timeout popup
    pub fn acknowledge_timeout(&mut self) {
        self.renderer.hide_screen(Screen::SessionTimeout);
        round::return_to_idle(&mut self.state);
        self.renderer.show_screen(Screen::Start);
        self.user_activity();
    }

    pub fn open_history(&mut self) {
        self.renderer.show_screen(Screen::History);
    }

    /// Close the history popup, restoring the game-over screen if needed
    pub fn close_history(&mut self) {
        self.renderer.hide_screen(Screen::History);
        if self.state.phase == GamePhase::GameOver {
            self.renderer.show_screen(Screen::GameOver);
        }
    }

    // === Timers ===

    /// Route a timer firing into the state machine
    pub fn on_timer(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::CountdownTick => match round::countdown_tick(&mut self.state) {
                CountdownStep::Show(n) => self.renderer.set_title(&n.to_string()),
                CountdownStep::Begin => {
                    self.disarm(TimerKind::CountdownTick);
                    self.next_round();
                }
                CountdownStep::Ignored => self.disarm(TimerKind::CountdownTick),
            },
            TimerKind::PresentStep => {
                self.timers.remove(&kind);
                self.present_next();
            }
            TimerKind::NextRound => {
                self.timers.remove(&kind);
                if self.state.phase == GamePhase::RoundCleared {
                    self.next_round();
                }
            }
            TimerKind::Inactivity => {
                self.timers.remove(&kind);
                self.time_out();
            }
            TimerKind::TitleCycle => {
                self.title_accent = self.title_accent.next();
                self.renderer.set_title_accent(self.title_accent);
            }
        }
    }

    fn next_round(&mut self) {
        round::advance_sequence(&mut self.state);
        log::debug!("Level {} pattern: {:?}", self.state.level, self.state.pattern);
        self.renderer.set_title(&format!("Level {}", self.state.level));
        self.present_next();
    }

    /// Flash one pattern step and schedule the following one
    fn present_next(&mut self) {
        if let Some(color) = round::present_step(&mut self.state) {
            self.renderer.flash(color);
            self.audio.play(Sound::Tone(color));
        }
        if matches!(self.state.phase, GamePhase::Presenting { .. }) {
            self.arm(TimerKind::PresentStep, self.settings.flash_interval_ms);
        }
    }

    fn game_over(&mut self) {
        log::info!("Game over at level {} with score {}", self.state.level, self.state.score);
        self.disarm_game_timers();
        self.renderer.hide_screen(Screen::Game);
        self.renderer.show_final_score(self.state.score);
        self.renderer.show_screen(Screen::GameOver);
    }

    fn time_out(&mut self) {
        log::info!("Session timed out in {:?}", self.state.phase);
        self.disarm_game_timers();
        round::return_to_idle(&mut self.state);
        self.renderer.hide_screen(Screen::Game);
        self.renderer.hide_screen(Screen::GameOver);
        self.renderer.hide_screen(Screen::History);
        for popup in PAGE_POPUPS {
            self.renderer.hide_screen(popup);
        }
        self.renderer.show_screen(Screen::SessionTimeout);
    }

    /// Schedule a one-shot timer, replacing any pending one of the same kind
    fn arm(&mut self, kind: TimerKind, delay_ms: u32) {
        self.disarm(kind);
        let handle = self.scheduler.after(delay_ms, kind);
        self.timers.insert(kind, handle);
    }

    fn arm_interval(&mut self, kind: TimerKind, period_ms: u32) {
        self.disarm(kind);
        let handle = self.scheduler.every(period_ms, kind);
        self.timers.insert(kind, handle);
    }

    fn disarm(&mut self, kind: TimerKind) {
        if let Some(handle) = self.timers.remove(&kind) {
            self.scheduler.cancel(handle);
        }
    }

    fn disarm_game_timers(&mut self) {
        for kind in GAME_TIMERS {
            self.disarm(kind);
        }
    }

    // === Accessors ===

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    /// History edits and deletions from the history popup
    pub fn history_mut(&mut self) -> &mut HistoryStore<S> {
        &mut self.history
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn score_saved(&self) -> bool {
        self.score_saved
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn scheduler(&self) -> &T {
        &self.scheduler
    }
}

impl<R, A, S> GameSession<R, A, ManualScheduler, S>
where
    R: Renderer,
    A: AudioPlayer,
    S: Storage,
{
    /// Advance the manual clock, delivering every timer that comes due
    pub fn advance_clock(&mut self, ms: u64) {
        let deadline = self.scheduler.now_ms() + ms;
        while let Some(kind) = self.scheduler.pop_due(deadline) {
            self.on_timer(kind);
        }
        self.scheduler.set_now(deadline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::HISTORY_STORAGE_KEY;
    use crate::platform::MemoryStorage;
    use ButtonColor::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Flash(ButtonColor),
        Press(ButtonColor),
        Show(Screen),
        Hide(Screen),
        Title(String),
        FinalScore(u32),
        Accent(ButtonColor),
    }

    #[derive(Default)]
    struct RecordingRenderer {
        calls: Vec<Call>,
    }

    impl Renderer for RecordingRenderer {
        fn flash(&mut self, color: ButtonColor) {
            self.calls.push(Call::Flash(color));
        }
        fn press(&mut self, color: ButtonColor) {
            self.calls.push(Call::Press(color));
        }
        fn show_screen(&mut self, screen: Screen) {
            self.calls.push(Call::Show(screen));
        }
        fn hide_screen(&mut self, screen: Screen) {
            self.calls.push(Call::Hide(screen));
        }
        fn set_title(&mut self, text: &str) {
            self.calls.push(Call::Title(text.to_string()));
        }
        fn show_final_score(&mut self, score: u32) {
            self.calls.push(Call::FinalScore(score));
        }
        fn set_title_accent(&mut self, color: ButtonColor) {
            self.calls.push(Call::Accent(color));
        }
    }

    impl RecordingRenderer {
        fn titles(&self) -> Vec<&str> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Title(t) => Some(t.as_str()),
                    _ => None,
                })
                .collect()
        }

        fn flashes(&self) -> Vec<ButtonColor> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Flash(color) => Some(*color),
                    _ => None,
                })
                .collect()
        }

        fn last_shown(&self) -> Option<Screen> {
            self.calls.iter().rev().find_map(|c| match c {
                Call::Show(s) => Some(*s),
                _ => None,
            })
        }
    }

    #[derive(Default)]
    struct RecordingAudio {
        sounds: Vec<Sound>,
    }

    impl AudioPlayer for RecordingAudio {
        fn play(&mut self, sound: Sound) {
            self.sounds.push(sound);
        }
    }

    type TestSession =
        GameSession<RecordingRenderer, RecordingAudio, ManualScheduler, MemoryStorage>;

    fn session() -> TestSession {
        let mut session = GameSession::new(
            12345,
            Settings::default(),
            HistoryStore::load(MemoryStorage::new()),
            RecordingRenderer::default(),
            RecordingAudio::default(),
            ManualScheduler::new(),
        );
        session.boot();
        session
    }

    /// Start a run and wait out the countdown (3, 2, 1, go)
    fn started() -> TestSession {
        let mut session = session();
        session.start();
        session.advance_clock(4000);
        session
    }

    /// Force a known pattern awaiting input
    fn with_pattern(pattern: &[ButtonColor]) -> TestSession {
        let mut session = started();
        session.state.pattern = pattern.to_vec();
        session.state.level = pattern.len() as u32;
        session.state.user_input.clear();
        session.state.phase = GamePhase::AwaitingInput;
        session
    }

    fn play_back(session: &mut TestSession) {
        let pattern = session.state().pattern.clone();
        for color in pattern {
            session.color_clicked(color);
        }
    }

    #[test]
    fn test_boot_shows_start_and_arms_timers() {
        let session = session();
        assert_eq!(session.renderer().last_shown(), Some(Screen::Start));
        assert!(session.scheduler().is_pending(TimerKind::Inactivity));
        assert!(session.scheduler().is_pending(TimerKind::TitleCycle));
        assert_eq!(session.state().phase, GamePhase::Idle);
    }

    #[test]
    fn test_countdown_then_first_round() {
        let mut session = session();
        session.start();
        assert_eq!(session.state().phase, GamePhase::Countdown { remaining: 3 });

        session.advance_clock(3000);
        assert_eq!(session.renderer().titles(), vec!["Get Ready...", "3", "2", "1"]);
        assert_eq!(session.state().level, 0);

        session.advance_clock(1000);
        assert_eq!(session.state().level, 1);
        assert_eq!(session.state().pattern.len(), 1);
        assert_eq!(session.state().phase, GamePhase::AwaitingInput);
        assert_eq!(session.renderer().titles().last(), Some(&"Level 1"));
        assert_eq!(session.renderer().flashes(), session.state().pattern);
        assert!(!session.scheduler().is_pending(TimerKind::CountdownTick));
    }

    #[test]
    fn test_each_round_replays_full_pattern() {
        let mut session = started();
        play_back(&mut session);
        assert_eq!(session.state().score, 1);
        assert!(session.scheduler().is_pending(TimerKind::NextRound));

        session.advance_clock(1000);
        assert_eq!(session.state().level, 2);
        assert!(matches!(session.state().phase, GamePhase::Presenting { .. }));

        session.advance_clock(600);
        assert_eq!(session.state().phase, GamePhase::AwaitingInput);

        let pattern = session.state().pattern.clone();
        let flashes = session.renderer().flashes();
        // round 1 showed one flash, round 2 replays both steps
        assert_eq!(flashes.len(), 3);
        assert_eq!(&flashes[1..], &pattern[..]);
    }

    #[test]
    fn test_clicks_while_presenting_are_ignored() {
        let mut session = started();
        play_back(&mut session);
        session.advance_clock(1000);

        let first = session.state().pattern[0];
        assert_eq!(session.color_clicked(first), SubmitOutcome::Ignored);
        assert!(session.state().user_input.is_empty());
    }

    #[test]
    fn test_correct_round_scores_and_schedules_next() {
        let mut session = with_pattern(&[Red, Blue]);
        assert_eq!(session.color_clicked(Red), SubmitOutcome::Correct);
        assert_eq!(session.color_clicked(Blue), SubmitOutcome::RoundComplete);
        assert_eq!(session.state().score, 1);
        assert_eq!(session.state().phase, GamePhase::RoundCleared);
        assert!(session.scheduler().is_pending(TimerKind::NextRound));
        let sounds = &session.audio().sounds;
        assert_eq!(
            &sounds[sounds.len() - 2..],
            &[Sound::Tone(Red), Sound::Tone(Blue)]
        );
    }

    #[test]
    fn test_wrong_click_ends_game() {
        let mut session = with_pattern(&[Red, Blue]);
        session.color_clicked(Red);
        assert_eq!(session.color_clicked(Green), SubmitOutcome::Wrong);

        assert_eq!(session.state().phase, GamePhase::GameOver);
        assert!(session.state().pattern.is_empty());
        assert!(session.state().user_input.is_empty());
        assert_eq!(session.audio().sounds.last(), Some(&Sound::Wrong));
        assert_eq!(session.renderer().last_shown(), Some(Screen::GameOver));
        assert!(session.renderer().calls.contains(&Call::FinalScore(0)));
        assert!(!session.scheduler().is_pending(TimerKind::NextRound));
    }

    #[test]
    fn test_save_once_per_game() {
        let mut session = with_pattern(&[Red]);
        session.color_clicked(Red);
        session.advance_clock(1600);
        let wrong = session.state().pattern[0].next();
        assert_eq!(session.color_clicked(wrong), SubmitOutcome::Wrong);

        let first = session.save_score("ab").unwrap();
        assert!(matches!(first, SaveOutcome::Saved(_)));
        assert_eq!(session.save_score("CD").unwrap(), SaveOutcome::AlreadySaved);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history().entries()[0].initials, "AB");
        assert_eq!(session.history().entries()[0].score, 1);
        assert_eq!(session.renderer().last_shown(), Some(Screen::History));
    }

    #[test]
    fn test_save_rejects_empty_initials() {
        let mut session = with_pattern(&[Red]);
        session.color_clicked(Blue);
        let err = session.save_score("  ").unwrap_err();
        assert!(matches!(err, HistoryError::Validation(_)));
        assert!(session.history().is_empty());
        assert!(!session.score_saved());
    }

    #[test]
    fn test_save_without_finished_game() {
        let mut session = session();
        assert_eq!(session.save_score("AB").unwrap(), SaveOutcome::NoFinishedGame);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_new_game_allows_saving_again() {
        let mut session = with_pattern(&[Red]);
        session.color_clicked(Green);
        session.save_score("AB").unwrap();

        session.start();
        assert!(!session.score_saved());
        session.advance_clock(4000);
        let wrong = session.state().pattern[0].next();
        session.color_clicked(wrong);
        assert!(matches!(session.save_score("CD").unwrap(), SaveOutcome::Saved(_)));
        assert_eq!(session.history().len(), 2);

        let json = session
            .history()
            .storage()
            .get_item(HISTORY_STORAGE_KEY)
            .unwrap();
        assert!(json.contains("\"CD\""));
    }

    #[test]
    fn test_start_ignored_mid_run() {
        let mut session = with_pattern(&[Red, Blue]);
        session.color_clicked(Red);
        session.start();
        assert_eq!(session.state().user_input, vec![Red]);
    }

    #[test]
    fn test_inactivity_returns_to_idle() {
        let mut session = started();
        session.advance_clock(180_000);

        assert_eq!(session.state().phase, GamePhase::Idle);
        assert!(session.state().pattern.is_empty());
        assert_eq!(session.renderer().last_shown(), Some(Screen::SessionTimeout));
        for kind in GAME_TIMERS {
            assert!(!session.scheduler().is_pending(kind));
        }

        session.acknowledge_timeout();
        assert_eq!(session.renderer().last_shown(), Some(Screen::Start));
    }

    #[test]
    fn test_activity_replaces_inactivity_timer() {
        let mut session = session();
        let before = session.scheduler().pending_count();
        for _ in 0..100 {
            session.user_activity();
        }
        assert_eq!(session.scheduler().pending_count(), before);
        assert!(session.scheduler().is_pending(TimerKind::Inactivity));
    }

    #[test]
    fn test_timeout_closes_page_popups() {
        let mut session = with_pattern(&[Red]);
        session.color_clicked(Blue);
        session.save_score("AB").unwrap();
        session.renderer.show_screen(Screen::DeleteConfirm);

        session.on_timer(TimerKind::Inactivity);

        for popup in PAGE_POPUPS {
            assert!(session.renderer().calls.contains(&Call::Hide(popup)));
        }
        assert!(session.renderer().calls.contains(&Call::Hide(Screen::History)));
        assert_eq!(session.renderer().last_shown(), Some(Screen::SessionTimeout));
    }

    #[test]
    fn test_activity_postpones_timeout() {
        let mut session = started();
        session.advance_clock(170_000);
        session.user_activity();
        session.advance_clock(170_000);
        assert_eq!(session.state().phase, GamePhase::AwaitingInput);
        assert!(!session.renderer().calls.contains(&Call::Show(Screen::SessionTimeout)));
    }

    #[test]
    fn test_timeout_cancels_pending_round() {
        let mut session = with_pattern(&[Red]);
        session.color_clicked(Red);
        assert!(session.scheduler().is_pending(TimerKind::NextRound));
        session.on_timer(TimerKind::Inactivity);
        assert!(!session.scheduler().is_pending(TimerKind::NextRound));

        // a stale firing after the reset changes nothing
        session.on_timer(TimerKind::NextRound);
        assert_eq!(session.state().phase, GamePhase::Idle);
        assert_eq!(session.state().level, 1);
    }

    #[test]
    fn test_close_history_restores_game_over() {
        let mut session = with_pattern(&[Red]);
        session.color_clicked(Blue);
        session.save_score("AB").unwrap();
        session.close_history();
        assert_eq!(session.renderer().last_shown(), Some(Screen::GameOver));
    }

    #[test]
    fn test_title_accent_cycles() {
        let mut session = session();
        session.advance_clock(2000);
        let accents: Vec<_> = session
            .renderer()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Accent(color) => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(accents, vec![Red, Blue, Green]);
    }

    #[test]
    fn test_reduced_motion_skips_title_cycle() {
        let mut session = GameSession::new(
            1,
            Settings {
                reduced_motion: true,
                ..Default::default()
            },
            HistoryStore::load(MemoryStorage::new()),
            RecordingRenderer::default(),
            RecordingAudio::default(),
            ManualScheduler::new(),
        );
        session.boot();
        assert!(!session.scheduler().is_pending(TimerKind::TitleCycle));
    }
}
