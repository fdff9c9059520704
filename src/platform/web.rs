//! Browser host
//!
//! LocalStorage, DOM renderer and a `setTimeout`/`setInterval` scheduler.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Window};

use super::{Renderer, Scheduler, Screen, Storage, TimerHandle, TimerKind};
use crate::error::StorageError;
use crate::sim::ButtonColor;

/// Title elements that follow the accent color
const TITLE_SELECTORS: [&str; 7] = [
    ".game-title",
    ".game-over-title",
    ".popup-title",
    ".popup-title-history",
    ".popup-title-session",
    ".popup-title-delete",
    ".popup-title-edit",
];

/// Window LocalStorage
pub struct LocalStorage {
    storage: Option<web_sys::Storage>,
}

impl LocalStorage {
    pub fn open() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if storage.is_none() {
            log::warn!("LocalStorage unavailable - history will not persist");
        }
        Self { storage }
    }
}

impl Storage for LocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = self.storage.as_ref().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|e| StorageError::WriteFailed {
                key: key.to_string(),
                reason: format!("{:?}", e),
            })
    }
}

/// Show or hide an element through its `hidden` class
pub fn set_hidden(document: &Document, id: &str, hidden: bool) {
    let Some(el) = document.get_element_by_id(id) else {
        log::warn!("Missing element #{}", id);
        return;
    };
    let classes = el.class_list();
    let _ = if hidden {
        classes.add_1("hidden")
    } else {
        classes.remove_1("hidden")
    };
}

/// Remove `class` from `el` after `delay_ms`
fn remove_class_later(window: &Window, el: Element, class: &'static str, delay_ms: i32) {
    let callback = Closure::once_into_js(move || {
        let _ = el.class_list().remove_1(class);
    });
    let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        delay_ms,
    );
}

/// `Renderer` backed by the game page's DOM
pub struct DomRenderer {
    window: Window,
    document: Document,
}

impl DomRenderer {
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    fn set_game_over_style(&self, game_over: bool) {
        if let Some(body) = self.document.body() {
            let _ = if game_over {
                body.class_list().add_1("game-over")
            } else {
                body.class_list().remove_1("game-over")
            };
        }
    }

    /// Briefly add `class` to a button
    fn pulse(&self, color: ButtonColor, class: &'static str, duration_ms: i32) {
        if let Some(el) = self.document.get_element_by_id(color.as_str()) {
            let _ = el.class_list().add_1(class);
            remove_class_later(&self.window, el, class, duration_ms);
        }
    }
}

impl Renderer for DomRenderer {
    fn flash(&mut self, color: ButtonColor) {
        self.pulse(color, "flash", 300);
    }

    fn press(&mut self, color: ButtonColor) {
        self.pulse(color, "pressed", 100);
    }

    fn show_screen(&mut self, screen: Screen) {
        match screen {
            Screen::GameOver => self.set_game_over_style(true),
            Screen::Start | Screen::Game => self.set_game_over_style(false),
            Screen::History
            | Screen::SessionTimeout
            | Screen::Help
            | Screen::DeleteConfirm
            | Screen::EditInitials => {}
        }
        set_hidden(&self.document, screen.element_id(), false);
        // Help and history buttons only exist outside the start screen
        let buttons_hidden = screen == Screen::Start;
        if matches!(screen, Screen::Start | Screen::Game) {
            set_hidden(&self.document, "help-button", buttons_hidden);
            set_hidden(&self.document, "game-history-button", buttons_hidden);
        }
    }

    fn hide_screen(&mut self, screen: Screen) {
        set_hidden(&self.document, screen.element_id(), true);
    }

    fn set_title(&mut self, text: &str) {
        if let Some(el) = self.document.get_element_by_id("level-title") {
            el.set_text_content(Some(text));
        }
    }

    fn show_final_score(&mut self, score: u32) {
        if let Some(el) = self.document.get_element_by_id("final-score") {
            el.set_text_content(Some(&format!("Score: {}", score)));
        }
        if let Some(input) = self
            .document
            .get_element_by_id("player-initials")
            .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok())
        {
            input.set_value("");
        }
    }

    fn set_title_accent(&mut self, color: ButtonColor) {
        let style = format!("color: {}", color.as_str());
        for selector in TITLE_SELECTORS {
            if let Ok(Some(el)) = self.document.query_selector(selector) {
                let _ = el.set_attribute("style", &style);
            }
        }
    }
}

/// Receiver for timer firings, installed once the session exists
pub type TimerDispatch = Rc<RefCell<Option<Box<dyn Fn(TimerKind)>>>>;

fn dispatch_timer(dispatch: &TimerDispatch, kind: TimerKind) {
    if let Some(handler) = dispatch.borrow().as_ref() {
        handler(kind);
    }
}

/// `Scheduler` on top of window timers
///
/// Each `TimerKind` gets one callback that lives as long as the scheduler and
/// is handed to every `setTimeout`/`setInterval` of that kind, so cancelled
/// timers leave nothing behind.
pub struct BrowserScheduler {
    window: Window,
    dispatch: TimerDispatch,
    callbacks: HashMap<TimerKind, Closure<dyn FnMut()>>,
    /// Live interval ids (everything else is a timeout)
    intervals: HashSet<i32>,
}

impl BrowserScheduler {
    pub fn new(window: Window, dispatch: TimerDispatch) -> Self {
        Self {
            window,
            dispatch,
            callbacks: HashMap::new(),
            intervals: HashSet::new(),
        }
    }

    fn callback(&mut self, kind: TimerKind) -> &js_sys::Function {
        let dispatch = &self.dispatch;
        self.callbacks
            .entry(kind)
            .or_insert_with(|| {
                let dispatch = dispatch.clone();
                Closure::<dyn FnMut()>::new(move || dispatch_timer(&dispatch, kind))
            })
            .as_ref()
            .unchecked_ref()
    }
}

impl Scheduler for BrowserScheduler {
    fn after(&mut self, delay_ms: u32, kind: TimerKind) -> TimerHandle {
        let window = self.window.clone();
        let callback = self.callback(kind);
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback,
            delay_ms.min(i32::MAX as u32) as i32,
        ) {
            Ok(id) => TimerHandle(id as u32),
            Err(e) => {
                log::error!("setTimeout failed for {:?}: {:?}", kind, e);
                TimerHandle(0)
            }
        }
    }

    fn every(&mut self, period_ms: u32, kind: TimerKind) -> TimerHandle {
        let window = self.window.clone();
        let callback = self.callback(kind);
        match window.set_interval_with_callback_and_timeout_and_arguments_0(
            callback,
            period_ms.min(i32::MAX as u32) as i32,
        ) {
            Ok(id) => {
                self.intervals.insert(id);
                TimerHandle(id as u32)
            }
            Err(e) => {
                log::error!("setInterval failed for {:?}: {:?}", kind, e);
                TimerHandle(0)
            }
        }
    }

    fn cancel(&mut self, handle: TimerHandle) {
        let id = handle.0 as i32;
        if self.intervals.remove(&id) {
            self.window.clear_interval_with_handle(id);
        } else {
            self.window.clear_timeout_with_handle(id);
        }
    }
}
