//! Audio export
//!
//! Offline rendering of the synth output to audio files.

pub mod wav;

pub use wav::{render_to_wav, write_wav};
