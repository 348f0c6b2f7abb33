//! Waveform Shaper
//!
//! The synth only has a sine oscillator. The wave-type selector nudges the
//! tone's frequency or length to give each type a distinguishable character:
//!
//! | Selector | Type     | Adjustment          |
//! |----------|----------|---------------------|
//! | 0        | Sine     | none                |
//! | 1        | Square   | duration × 0.8      |
//! | 2        | Triangle | frequency × 1.1     |
//! | 3        | Sawtooth | frequency × 0.9     |

use std::fmt;

/// Wave-type selector carried in tone and mode words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum WaveType {
    /// Plain sine
    #[default]
    Sine = 0,
    /// Shortened note
    Square = 1,
    /// Raised pitch
    Triangle = 2,
    /// Lowered pitch
    Sawtooth = 3,
}

impl WaveType {
    /// Map a selector, taken modulo 4
    pub fn from_selector(selector: u8) -> Self {
        match selector % 4 {
            0 => WaveType::Sine,
            1 => WaveType::Square,
            2 => WaveType::Triangle,
            _ => WaveType::Sawtooth,
        }
    }

    /// Adjust `(frequency, duration)` for this wave type
    pub fn shape(self, frequency: f32, duration_secs: f32) -> (f32, f32) {
        match self {
            WaveType::Sine => (frequency, duration_secs),
            WaveType::Square => (frequency, duration_secs * 0.8),
            WaveType::Triangle => (frequency * 1.1, duration_secs),
            WaveType::Sawtooth => (frequency * 0.9, duration_secs),
        }
    }
}

impl fmt::Display for WaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaveType::Sine => write!(f, "Sine"),
            WaveType::Square => write!(f, "Square"),
            WaveType::Triangle => write!(f, "Triangle"),
            WaveType::Sawtooth => write!(f, "Sawtooth"),
        }
    }
}

/// Adjust a tone request for a wave type: `(frequency', duration')`
pub fn shape(frequency: f32, wave: WaveType, duration_secs: f32) -> (f32, f32) {
    wave.shape(frequency, duration_secs)
}
