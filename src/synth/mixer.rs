//! Output Mixer
//!
//! Sums the tone voice and the sample slot into the final mono signal.
//!
//! Features:
//! - Per-source enable flags
//! - Fixed sample gain so a full-scale recording sits near the tone level
//! - Non-finite input guard and hard clip to `-1.0..=1.0`

use bitflags::bitflags;

bitflags! {
    /// Sources that reach the output
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MixerFlags: u8 {
        /// Sine voice
        const TONE = 0x01;
        /// Sample slot
        const SAMPLE = 0x02;
    }
}

/// Audio Mixer - combines the tone voice and the sample slot
#[derive(Debug, Clone)]
pub struct Mixer {
    flags: MixerFlags,
}

impl Mixer {
    /// Sample gain, matched to the oscillator's master scale
    pub const SAMPLE_GAIN: f32 = 0.5;

    /// Create a mixer with both sources enabled
    pub fn new() -> Self {
        Mixer {
            flags: MixerFlags::all(),
        }
    }

    /// Enable or disable sources
    pub fn set_flags(&mut self, flags: MixerFlags) {
        self.flags = flags;
    }

    /// Currently enabled sources
    pub fn flags(&self) -> MixerFlags {
        self.flags
    }

    /// Mix one tone sample with one PCM sample
    #[inline]
    pub fn mix(&self, tone: f32, sample: f32) -> f32 {
        let mut output = 0.0;
        if self.flags.contains(MixerFlags::TONE) {
            output += tone;
        }
        if self.flags.contains(MixerFlags::SAMPLE) {
            output += sample * Self::SAMPLE_GAIN;
        }

        if output.is_finite() {
            output.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}
