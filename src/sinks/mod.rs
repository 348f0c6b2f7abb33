//! Collaborator interfaces
//!
//! The bus drives three outside services: an audio backend, a visual key
//! display and a source of key presses. Each is a trait so the dispatcher can
//! run headless, against the native synth, or against a host window.

pub mod beep;
pub mod keyboard;

pub use beep::{BeepRequest, BeepSink};
pub use keyboard::{
    KeyVisual, KeyboardState, KeyboardView, ScriptedKeys, KEY_ROWS, MAX_PENDING_PRESSES,
};

use crate::samples::Sample;
use crate::synth::SynthController;

/// Audio output boundary
pub trait AudioSink {
    /// Start a tone, replacing any tone in flight
    fn play_tone(&mut self, frequency_hz: f32, duration_secs: f32, volume: f32);

    /// Start a registered sample
    fn play_sample(&mut self, id: u16, sample: &Sample);

    /// Silence all output
    fn stop(&mut self) {}
}

/// Visual key display boundary
///
/// Both calls are idempotent; the last write wins.
pub trait VisualSink {
    /// Turn a key's highlight on or off
    fn set_key_highlighted(&mut self, key: char, highlighted: bool);

    /// Set the color a key shows while highlighted
    fn set_key_color(&mut self, key: char, r: u8, g: u8, b: u8);
}

/// Source of key presses for the key port
pub trait KeySource {
    /// The key pressed since the last poll, if any
    fn poll_pressed_key(&mut self) -> Option<char>;
}

/// Audio sink backed by the native synth engine
#[derive(Debug)]
pub struct SynthSink {
    controller: SynthController,
}

impl SynthSink {
    /// Wrap the bus-side handle of a synth channel
    pub fn new(controller: SynthController) -> Self {
        SynthSink { controller }
    }

    /// The wrapped controller
    pub fn controller(&self) -> &SynthController {
        &self.controller
    }
}

impl AudioSink for SynthSink {
    fn play_tone(&mut self, frequency_hz: f32, duration_secs: f32, volume: f32) {
        self.controller
            .play_tone(frequency_hz, duration_secs, volume);
    }

    fn play_sample(&mut self, _id: u16, sample: &Sample) {
        self.controller
            .play_sample(sample.data.clone(), sample.sample_rate);
    }

    fn stop(&mut self) {
        self.controller.stop();
    }
}
