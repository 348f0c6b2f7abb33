//! Audio Output & Streaming
//!
//! Real-time playback of a [`crate::SynthRenderer`] through the system audio
//! device. The device's callback thread owns the renderer and pulls samples
//! straight from it; the bus keeps only the controller half.

pub mod audio_device;

pub use audio_device::AudioDevice;

use crate::config::{PeripheralConfig, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE};

/// Output stream parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of audio channels
    pub channels: u16,
}

impl StreamConfig {
    /// Stream parameters matching a peripheral configuration
    pub fn from_peripheral(config: &PeripheralConfig) -> Self {
        StreamConfig {
            sample_rate: config.sample_rate,
            channels: config.channels,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
        }
    }
}
