//! Piano Peripheral Bus for small virtual CPUs
//!
//! Emulates a memory-mapped peripheral set for a 16-bit virtual CPU: the CPU
//! issues reads and writes to fixed port addresses, and this crate turns them
//! into sine-tone synthesis, sample playback and visual key feedback.
//!
//! # Features
//! - Bit-exact port table (0x9000..=0x900A) and packed word codecs
//! - Single monophonic sine voice with a 20 ms linear fade envelope
//! - Wave-type shaping, key bindings, RGB-332 key colors
//! - Per-key highlight timers advanced once per frame
//! - Wait-free command queue between the bus thread and the audio thread
//! - WAV sample bank, offline WAV export and bus trace replay
//!
//! # Crate feature flags
//! - `export` (default): Offline WAV rendering (`export`)
//! - `trace` (default): Bus trace parsing and replay (`trace`)
//! - `streaming` (opt-in): Real-time audio output (enables optional `rodio` dep)
//!
//! # Quick start
//! ```no_run
//! use tonebus::{PeripheralBus, PeripheralConfig, SynthSink, synth_channel};
//! use tonebus::bus::BusDevice;
//!
//! let config = PeripheralConfig::default();
//! let (controller, mut renderer) = synth_channel(&config);
//! let mut bus = PeripheralBus::new(config).with_audio(SynthSink::new(controller));
//!
//! bus.write(0x9001, 0x0016); // 440 Hz for 0.1 s
//! let mut block = vec![0.0f32; 2 * 735];
//! renderer.render_interleaved(&mut block, 2);
//! ```

#![warn(missing_docs)]

pub mod bus; // Bus Dispatcher
pub mod config; // Peripheral configuration
#[cfg(feature = "export")]
pub mod export; // Offline WAV rendering
pub mod keys; // Key-State Tracker
pub mod ports; // Port Protocol Decoder
pub mod samples; // Sample registry
pub mod sinks; // Audio / visual / key collaborators
#[cfg(feature = "streaming")]
pub mod streaming; // Audio Output & Streaming
pub mod synth; // Oscillator, shaper and render engine
#[cfg(feature = "trace")]
pub mod trace; // Bus trace replay

/// Error types for peripheral bus setup and I/O
///
/// Bus transactions themselves never fail; these cover configuration,
/// asset loading, export and device setup.
#[derive(thiserror::Error, Debug)]
pub enum TonebusError {
    /// IO error from filesystem or device
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Error while loading a sample
    #[error("Sample error: {0}")]
    SampleError(String),

    /// Error writing audio file
    #[error("Audio file write error: {0}")]
    AudioFileError(String),

    /// Audio device error
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    /// Error while parsing a bus trace
    #[error("Trace parse error on line {line}: {message}")]
    TraceParse {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for TonebusError {
    /// Converts a String into `TonebusError::Other`.
    ///
    /// Prefer the specific variants (`ConfigError`, `SampleError`, ...) where
    /// the caller can tell them apart.
    fn from(msg: String) -> Self {
        TonebusError::Other(msg)
    }
}

impl From<&str> for TonebusError {
    /// Converts a string slice into `TonebusError::Other`.
    fn from(msg: &str) -> Self {
        TonebusError::Other(msg.to_string())
    }
}

/// Result type for peripheral bus operations
pub type Result<T> = std::result::Result<T, TonebusError>;

// Public API exports
pub use bus::{BusDevice, BusRead, PeripheralBus, PeripheralState};
pub use config::PeripheralConfig;
pub use keys::{AudioMode, KeyBinding, KeyTracker};
pub use ports::{Operation, Port};
pub use samples::{Sample, SampleBank};
pub use sinks::{
    AudioSink, BeepRequest, BeepSink, KeySource, KeyboardView, ScriptedKeys, SynthSink, VisualSink,
};
pub use synth::{synth_channel, Oscillator, SynthController, SynthRenderer, WaveType};

#[cfg(feature = "export")]
pub use export::write_wav;
#[cfg(feature = "streaming")]
pub use streaming::{AudioDevice, StreamConfig};
#[cfg(feature = "trace")]
pub use trace::{parse_trace, TraceCommand, TraceRunner};
