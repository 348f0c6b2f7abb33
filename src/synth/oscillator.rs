//! Oscillator / Envelope Engine
//!
//! One monophonic sine voice with a fixed length and a linear 20 ms fade at
//! both ends. A new trigger always replaces the running voice; notes are never
//! mixed.

use log::warn;
use std::f32::consts::TAU;

/// Output attenuation applied to every sample to keep headroom
pub const MASTER_SCALE: f32 = 0.3;

/// Fade length is `sample_rate / FADE_DIVISOR` samples (20 ms)
pub const FADE_DIVISOR: u32 = 50;

/// The single voice state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    /// Tone frequency in Hz
    pub frequency: f32,
    /// Current phase in radians, kept in `0..2π`
    pub phase: f32,
    /// Volume (0.0 - 1.0)
    pub volume: f32,
    /// Voice length in samples
    pub total_samples: u32,
    /// Samples rendered so far (`elapsed <= total_samples`)
    pub elapsed: u32,
    /// True while the voice produces sound
    pub active: bool,
}

impl Voice {
    fn silent() -> Self {
        Voice {
            frequency: 440.0,
            phase: 0.0,
            volume: 1.0,
            total_samples: 0,
            elapsed: 0,
            active: false,
        }
    }
}

/// Sine oscillator with fade-in/fade-out envelope
#[derive(Debug, Clone)]
pub struct Oscillator {
    voice: Voice,
    sample_rate: u32,
    fade_samples: u32,
    phase_step: f32,
}

impl Oscillator {
    /// Create an idle oscillator for the given output rate
    pub fn new(sample_rate: u32) -> Self {
        let sample_rate = sample_rate.max(1);
        Oscillator {
            voice: Voice::silent(),
            sample_rate,
            fade_samples: (sample_rate / FADE_DIVISOR).max(1),
            phase_step: 0.0,
        }
    }

    /// Start a new voice, replacing whatever is playing
    ///
    /// Returns false (and leaves the voice untouched) for a frequency that is
    /// not a finite value in `(0, sample_rate / 2]` or a duration that is not
    /// a finite positive number. Volume is clamped to `0..=1`.
    pub fn trigger(&mut self, frequency: f32, duration_secs: f32, volume: f32) -> bool {
        let nyquist = self.sample_rate as f32 / 2.0;
        if !frequency.is_finite() || frequency <= 0.0 || frequency > nyquist {
            warn!("oscillator: invalid frequency {} Hz", frequency);
            return false;
        }
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            warn!("oscillator: invalid duration {} s", duration_secs);
            return false;
        }

        let total = (duration_secs * self.sample_rate as f32).round().max(1.0) as u32;
        self.voice = Voice {
            frequency,
            phase: 0.0,
            volume: if volume.is_finite() { volume.clamp(0.0, 1.0) } else { 0.0 },
            total_samples: total,
            elapsed: 0,
            active: true,
        };
        self.phase_step = TAU * frequency / self.sample_rate as f32;
        true
    }

    /// Silence the voice immediately
    pub fn stop(&mut self) {
        self.voice.active = false;
    }

    /// Envelope gain at a sample index of the current voice
    ///
    /// Rises linearly over the first `fade_samples`, falls linearly over the
    /// last `fade_samples`, 1.0 in between.
    pub fn envelope(&self, elapsed: u32) -> f32 {
        let fade = self.fade_samples as f32;
        let attack = elapsed as f32 / fade;
        let release = self.voice.total_samples.saturating_sub(elapsed) as f32 / fade;
        attack.min(release).min(1.0)
    }

    /// Produce one sample and advance the voice
    ///
    /// Returns 0.0 once the voice has run out.
    pub fn render_next_sample(&mut self) -> f32 {
        if !self.voice.active {
            return 0.0;
        }

        let env = self.envelope(self.voice.elapsed);
        let sample = self.voice.phase.sin() * self.voice.volume * env * MASTER_SCALE;

        self.voice.phase += self.phase_step;
        if self.voice.phase >= TAU {
            self.voice.phase -= TAU;
        }

        self.voice.elapsed += 1;
        if self.voice.elapsed >= self.voice.total_samples {
            self.voice.active = false;
        }

        sample
    }

    /// Fill an interleaved buffer, duplicating the mono voice on every channel
    ///
    /// A trailing partial frame is left untouched.
    pub fn render_interleaved(&mut self, out: &mut [f32], channels: u16) {
        let channels = channels.max(1) as usize;
        for frame in out.chunks_exact_mut(channels) {
            frame.fill(self.render_next_sample());
        }
    }

    /// True while the voice produces sound
    pub fn is_active(&self) -> bool {
        self.voice.active
    }

    /// Current voice state
    pub fn voice(&self) -> &Voice {
        &self.voice
    }

    /// Fade length in samples
    pub fn fade_samples(&self) -> u32 {
        self.fade_samples
    }

    /// Output sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
