//! Peripheral configuration
//!
//! All tunables of the peripheral set in one serde-friendly struct. Every
//! field has a default, so a JSON file only needs the keys it overrides.

use crate::{Result, TonebusError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Output sample rate used by the device (44.1 kHz)
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Output channel count (mono signal duplicated to stereo)
pub const DEFAULT_CHANNELS: u16 = 2;

/// Frame rate at which highlight timers advance
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// Configuration for a [`crate::PeripheralBus`] and its synth engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeripheralConfig {
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Number of output channels
    pub channels: u16,
    /// Frames per second for highlight timers and trace pacing
    pub frame_rate: u32,
    /// CPU stall cycles reported for every bus transaction (0 or 1)
    pub transaction_delay: u16,
    /// Highlight length for a raw keypress, in frames
    pub keypress_highlight_frames: u32,
    /// Highlight length for an explicit show-key command, in frames
    pub show_key_highlight_frames: u32,
    /// Note length used when a key or combined word has no duration field
    pub key_note_seconds: f32,
    /// Voice volume (0.0 - 1.0)
    pub volume: f32,
    /// Error tone played for unknown sample ids
    pub fallback_tone_hz: f32,
    /// Error tone length in seconds
    pub fallback_tone_seconds: f32,
    /// Capacity of the bus → audio thread command queue
    pub command_queue_capacity: usize,
}

impl Default for PeripheralConfig {
    fn default() -> Self {
        PeripheralConfig {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
            frame_rate: DEFAULT_FRAME_RATE,
            transaction_delay: 0,
            keypress_highlight_frames: 30,
            show_key_highlight_frames: 50,
            key_note_seconds: 0.5,
            volume: 1.0,
            fallback_tone_hz: 200.0,
            fallback_tone_seconds: 0.25,
            command_queue_capacity: 256,
        }
    }
}

impl PeripheralConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PeripheralConfig = serde_json::from_str(json)
            .map_err(|e| TonebusError::ConfigError(format!("Malformed config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            TonebusError::ConfigError(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }

    /// Check that the values can drive the synth and the frame clock
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(TonebusError::ConfigError("sample_rate must be > 0".into()));
        }
        if self.channels == 0 {
            return Err(TonebusError::ConfigError("channels must be > 0".into()));
        }
        if self.frame_rate == 0 {
            return Err(TonebusError::ConfigError("frame_rate must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(TonebusError::ConfigError(format!(
                "volume {} outside 0.0..=1.0",
                self.volume
            )));
        }
        if !(self.key_note_seconds > 0.0 && self.key_note_seconds.is_finite()) {
            return Err(TonebusError::ConfigError(
                "key_note_seconds must be a positive number".into(),
            ));
        }
        if self.command_queue_capacity == 0 {
            return Err(TonebusError::ConfigError(
                "command_queue_capacity must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Samples rendered per highlight frame (rounded down)
    pub fn samples_per_frame(&self) -> u32 {
        self.sample_rate / self.frame_rate
    }
}
