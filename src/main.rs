//! Simon Says entry point
//!
//! Handles platform-specific initialization and wires page events into the
//! game session.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlInputElement};

    use simon_says::audio::AudioManager;
    use simon_says::history::{HistoryListing, parse_min_score};
    use simon_says::platform::web::{
        BrowserScheduler, DomRenderer, LocalStorage, TimerDispatch, set_hidden,
    };
    use simon_says::platform::{Screen, TimerKind};
    use simon_says::{
        ButtonColor, EntryId, GameSession, HistoryError, HistoryStore, SaveOutcome, Settings,
    };

    type WebSession = GameSession<DomRenderer, AudioManager, BrowserScheduler, LocalStorage>;

    /// Session plus popup state that only the page cares about
    struct App {
        session: WebSession,
        document: Document,
        /// Entry awaiting delete confirmation
        pending_delete: Option<EntryId>,
        /// Entry open in the edit popup
        pending_edit: Option<EntryId>,
    }

    impl App {
        fn input_value(&self, id: &str) -> String {
            self.document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                .map(|input| input.value())
                .unwrap_or_default()
        }

        fn set_input_value(&self, id: &str, value: &str) {
            if let Some(input) = self
                .document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            {
                input.set_value(value);
            }
        }

        fn set_popup(&self, popup: Screen, visible: bool) {
            set_hidden(&self.document, popup.element_id(), !visible);
        }

        /// Forget entries picked in popups that a session reset closed
        fn clear_pending(&mut self) {
            self.pending_delete = None;
            self.pending_edit = None;
        }

        fn alert(&self, message: &str) {
            if let Some(window) = web_sys::window() {
                let _ = window.alert_with_message(message);
            }
        }

        /// Rebuild the history list from the current filter fields
        fn render_history(&self) {
            let Some(list) = self.document.get_element_by_id("history-list") else {
                return;
            };
            list.set_inner_html("");

            let min_score = parse_min_score(&self.input_value("min-score"));
            let prefix = self.input_value("initials-filter");
            match self.session.history().listing(min_score, &prefix) {
                HistoryListing::Empty => {
                    self.append_message(&list, "Play a game to see your score stored here!")
                }
                HistoryListing::NoMatches => {
                    self.append_message(&list, "No games meet the criteria.")
                }
                HistoryListing::Entries(entries) => {
                    for entry in entries {
                        if let Some(item) = self.history_item(&entry.summary(), entry.id) {
                            let _ = list.append_child(&item);
                        }
                    }
                }
            }
        }

        fn append_message(&self, list: &Element, text: &str) {
            if let Ok(item) = self.document.create_element("li") {
                item.set_text_content(Some(text));
                let _ = list.append_child(&item);
            }
        }

        fn history_item(&self, summary: &str, id: EntryId) -> Option<Element> {
            let item = self.document.create_element("li").ok()?;
            let details = self.document.create_element("span").ok()?;
            details.set_class_name("score-details");
            details.set_text_content(Some(summary));
            item.append_child(&details).ok()?;

            for class in [
                "fa-solid fa-pen-to-square edit-icon",
                "fa-solid fa-trash-can delete-icon",
            ] {
                let icon = self.document.create_element("i").ok()?;
                icon.set_class_name(class);
                icon.set_attribute("data-id", &id.to_string()).ok()?;
                item.append_child(&icon).ok()?;
            }
            Some(item)
        }

        fn save_score(&mut self) {
            let initials = self.input_value("player-initials");
            match self.session.save_score(&initials) {
                Ok(SaveOutcome::Saved(_)) => self.render_history(),
                Ok(outcome) => log::debug!("Save skipped: {:?}", outcome),
                Err(HistoryError::Validation(_)) => {
                    self.alert("Please enter your initials to save the score.")
                }
                Err(e) => log::warn!("Save failed: {}", e),
            }
        }

        /// Delegated click on an edit/delete icon in the history list
        fn history_icon_clicked(&mut self, target: &Element) {
            let Some(id) = target
                .get_attribute("data-id")
                .and_then(|raw| raw.parse().ok())
                .map(EntryId)
            else {
                return;
            };
            let Some(entry) = self.session.history().find(id) else {
                log::warn!("History entry {} no longer exists", id);
                self.render_history();
                return;
            };

            let classes = target.class_list();
            if classes.contains("delete-icon") {
                if let Some(el) = self.document.get_element_by_id("delete-details") {
                    el.set_text_content(Some(&entry.summary()));
                }
                self.pending_delete = Some(id);
                self.set_popup(Screen::DeleteConfirm, true);
            } else if classes.contains("edit-icon") {
                let initials = entry.initials.clone();
                self.set_input_value("edit-initials", &initials);
                self.pending_edit = Some(id);
                self.set_popup(Screen::EditInitials, true);
            }
        }

        fn confirm_delete(&mut self) {
            if let Some(id) = self.pending_delete.take() {
                if let Err(e) = self.session.history_mut().delete_by_id(id) {
                    log::warn!("Delete failed: {}", e);
                }
                self.render_history();
            }
            self.set_popup(Screen::DeleteConfirm, false);
        }

        fn save_edit(&mut self) {
            let Some(id) = self.pending_edit else {
                self.set_popup(Screen::EditInitials, false);
                return;
            };
            let initials = self.input_value("edit-initials");
            match self.session.history_mut().edit_by_id(id, &initials) {
                Err(HistoryError::Validation(_)) => {
                    self.alert("Please enter valid initials.");
                    return;
                }
                Err(e) => log::warn!("Edit failed: {}", e),
                Ok(()) => {}
            }
            self.pending_edit = None;
            self.render_history();
            self.set_popup(Screen::EditInitials, false);
        }
    }

    /// Attach a handler to an element's event
    fn listen(
        document: &Document,
        id: &str,
        event: &str,
        app: &Rc<RefCell<App>>,
        handler: impl Fn(&mut App, &web_sys::Event) + 'static,
    ) {
        let Some(el) = document.get_element_by_id(id) else {
            log::warn!("Missing element #{}", id);
            return;
        };
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            handler(&mut *app.borrow_mut(), &event);
        });
        let _ = el.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn on_click(
        document: &Document,
        id: &str,
        app: &Rc<RefCell<App>>,
        handler: impl Fn(&mut App) + 'static,
    ) {
        listen(document, id, "click", app, move |app, _| handler(app));
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Simon Says starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };
        let Some(renderer) = DomRenderer::new() else {
            log::error!("Failed to set up DOM renderer");
            return;
        };

        let storage = LocalStorage::open();
        let settings = Settings::load(&storage);
        let audio = AudioManager::new(&settings);
        let history = HistoryStore::load(storage);

        let dispatch = TimerDispatch::default();
        let scheduler = BrowserScheduler::new(window.clone(), dispatch.clone());

        let seed = js_sys::Date::now() as u64;
        let session = GameSession::new(seed, settings, history, renderer, audio, scheduler);
        let app = Rc::new(RefCell::new(App {
            session,
            document: document.clone(),
            pending_delete: None,
            pending_edit: None,
        }));

        // Timer firings go back into the session
        {
            let weak = Rc::downgrade(&app);
            *dispatch.borrow_mut() = Some(Box::new(move |kind: TimerKind| {
                if let Some(app) = weak.upgrade() {
                    let mut app = app.borrow_mut();
                    app.session.on_timer(kind);
                    if kind == TimerKind::Inactivity {
                        app.clear_pending();
                    }
                }
            }));
        }

        setup_game_handlers(&document, &app);
        setup_history_handlers(&document, &app);
        setup_activity_tracking(&document, &app);

        app.borrow_mut().session.boot();
        log::info!("Simon Says running!");
    }

    fn setup_game_handlers(document: &Document, app: &Rc<RefCell<App>>) {
        for color in ButtonColor::ALL {
            on_click(document, color.as_str(), app, move |app| {
                app.session.color_clicked(color);
            });
        }

        on_click(document, "start-bttn", app, |app| app.session.start());
        on_click(document, "restart-bttn", app, |app| app.session.start());
        on_click(document, "save-score-btn", app, |app| app.save_score());
        on_click(document, "timeout-ok-btn", app, |app| {
            app.clear_pending();
            app.session.acknowledge_timeout()
        });

        on_click(document, "help-button", app, |app| app.set_popup(Screen::Help, true));
        on_click(document, "close-popup", app, |app| app.set_popup(Screen::Help, false));
    }

    fn setup_history_handlers(document: &Document, app: &Rc<RefCell<App>>) {
        on_click(document, "game-history-button", app, |app| {
            app.render_history();
            app.session.open_history();
        });
        on_click(document, "close-history", app, |app| app.session.close_history());

        for id in ["min-score", "initials-filter"] {
            listen(document, id, "input", app, |app, _| app.render_history());
        }

        listen(document, "history-list", "click", app, |app, event| {
            if let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) {
                app.history_icon_clicked(&target);
            }
        });

        on_click(document, "delete-yes-btn", app, |app| app.confirm_delete());
        on_click(document, "delete-no-btn", app, |app| {
            app.pending_delete = None;
            app.set_popup(Screen::DeleteConfirm, false);
        });
        on_click(document, "save-edit-btn", app, |app| app.save_edit());
        on_click(document, "cancel-edit-btn", app, |app| {
            app.pending_edit = None;
            app.set_popup(Screen::EditInitials, false);
        });
    }

    /// Any pointer move, key press or click resets the inactivity timer
    fn setup_activity_tracking(document: &Document, app: &Rc<RefCell<App>>) {
        for event in ["mousemove", "keypress", "click"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().session.user_activity();
            });
            let _ =
                document.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Simon Says (native) starting...");
    log::info!("Native mode plays a scripted demo - serve the wasm build for the real game");

    demo::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless autoplay: clears a few rounds, misses one, saves the score
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use simon_says::history::HistoryListing;
    use simon_says::platform::{LogAudio, LogRenderer, ManualScheduler, MemoryStorage};
    use simon_says::sim::SubmitOutcome;
    use simon_says::{GamePhase, GameSession, HistoryStore, Settings};

    const ROUNDS_TO_CLEAR: u32 = 4;

    pub fn run() {
        let storage = MemoryStorage::new();
        let settings = Settings::load(&storage);
        let history = HistoryStore::load(storage);
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let mut session = GameSession::new(
            seed,
            settings,
            history,
            LogRenderer,
            LogAudio,
            ManualScheduler::new(),
        );
        session.boot();
        session.start();

        // Countdown, then wait out each presentation and replay it
        while session.state().phase != GamePhase::GameOver {
            session.advance_clock(100);
            if session.state().phase == GamePhase::Idle {
                log::warn!("Demo timed out");
                break;
            }
            if session.state().phase != GamePhase::AwaitingInput {
                continue;
            }

            let pattern = session.state().pattern.clone();
            if session.state().level > ROUNDS_TO_CLEAR {
                // Deliberately miss the last step
                for color in &pattern[..pattern.len() - 1] {
                    session.color_clicked(*color);
                }
                let miss = pattern[pattern.len() - 1].next();
                session.color_clicked(miss);
            } else {
                for color in pattern {
                    if session.color_clicked(color) == SubmitOutcome::Wrong {
                        break;
                    }
                }
            }
        }

        match session.save_score("cpu") {
            Ok(outcome) => log::info!("Save: {:?}", outcome),
            Err(e) => log::warn!("Save failed: {}", e),
        }

        if let HistoryListing::Entries(entries) = session.history().listing(0, "") {
            println!("\nGame history:");
            for entry in entries {
                println!("  {}", entry.summary());
            }
        }
        log::info!("Best score: {:?}", session.history().best_score());
        println!("✓ Demo finished at level {}", session.state().level);
    }
}
