//! Native host collaborators that only log

use super::{AudioPlayer, Renderer, Screen, Sound};
use crate::sim::ButtonColor;

/// `Renderer` that writes every call to the log
#[derive(Debug, Default)]
pub struct LogRenderer;

impl Renderer for LogRenderer {
    fn flash(&mut self, color: ButtonColor) {
        log::info!("[flash] {}", color);
    }

    fn press(&mut self, color: ButtonColor) {
        log::debug!("[press] {}", color);
    }

    fn show_screen(&mut self, screen: Screen) {
        log::info!("[show] {}", screen.element_id());
    }

    fn hide_screen(&mut self, screen: Screen) {
        log::debug!("[hide] {}", screen.element_id());
    }

    fn set_title(&mut self, text: &str) {
        log::info!("[title] {}", text);
    }

    fn show_final_score(&mut self, score: u32) {
        log::info!("[final] Score: {}", score);
    }

    fn set_title_accent(&mut self, color: ButtonColor) {
        log::trace!("[accent] {}", color);
    }
}

/// `AudioPlayer` that logs instead of playing
#[derive(Debug, Default)]
pub struct LogAudio;

impl AudioPlayer for LogAudio {
    fn play(&mut self, sound: Sound) {
        match sound {
            Sound::Tone(color) => log::debug!("[sound] {}", color),
            Sound::Wrong => log::info!("[sound] wrong"),
        }
    }
}
