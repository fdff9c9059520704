//! Audio system using Web Audio API
//!
//! Procedurally generated button tones - no sound files needed!

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::platform::{AudioPlayer, Sound};
use crate::settings::Settings;
use crate::sim::ButtonColor;

/// Tone length for a button (seconds)
const TONE_SECS: f64 = 0.35;
/// Wrong-answer buzz length (seconds)
const WRONG_SECS: f64 = 0.8;

/// Classic Simon pitches (Hz)
fn tone_frequency(color: ButtonColor) -> f32 {
    match color {
        ButtonColor::Green => 415.3,
        ButtonColor::Red => 310.0,
        ButtonColor::Yellow => 252.0,
        ButtonColor::Blue => 209.0,
    }
}

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    /// Effective volume (0.0 - 1.0), 0 when muted
    volume: f32,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            volume: settings.effective_volume(),
        }
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Button tone - soft attack, held, quick release
    fn play_tone(&self, ctx: &AudioContext, color: ButtonColor, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, tone_frequency(color), OscillatorType::Triangle)
        else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(0.0, t).ok();
        gain.gain().linear_ramp_to_value_at_time(vol * 0.5, t + 0.02).ok();
        gain.gain()
            .set_value_at_time(vol * 0.5, t + TONE_SECS - 0.05)
            .ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + TONE_SECS)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + TONE_SECS + 0.05).ok();
    }

    /// Wrong answer - low sawtooth buzz sliding down
    fn play_wrong(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 90.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.4, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + WRONG_SECS)
            .ok();
        osc.frequency().set_value_at_time(90.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(42.0, t + WRONG_SECS)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + WRONG_SECS + 0.05).ok();
    }
}

impl AudioPlayer for AudioManager {
    fn play(&mut self, sound: Sound) {
        let vol = self.volume;
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match sound {
            Sound::Tone(color) => self.play_tone(ctx, color, vol),
            Sound::Wrong => self.play_wrong(ctx, vol),
        }
    }
}
