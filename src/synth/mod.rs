//! Synthesis
//!
//! The tone voice, the wave-type shaper, the sample slot, the mixer and the
//! controller/renderer split that carries requests to the audio thread.

pub mod engine;
pub mod mixer;
pub mod oscillator;
pub mod sampler;
pub mod shaper;

pub use engine::{synth_channel, SynthCommand, SynthController, SynthRenderer};
pub use mixer::{Mixer, MixerFlags};
pub use oscillator::{Oscillator, Voice, FADE_DIVISOR, MASTER_SCALE};
pub use sampler::SamplePlayer;
pub use shaper::{shape, WaveType};
