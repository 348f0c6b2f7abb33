//! Synth engine
//!
//! Splits the synth into a bus-side [`SynthController`] and an audio-side
//! [`SynthRenderer`] joined by a wait-free SPSC queue. The renderer is the
//! only owner of the voice; it drains pending commands before every sample,
//! so a trigger is heard on the very next sample and the audio thread never
//! waits on a lock.

use super::mixer::Mixer;
use super::oscillator::Oscillator;
use super::sampler::SamplePlayer;
use crate::config::PeripheralConfig;
use log::warn;
use rtrb::{Consumer, PushError, RingBuffer};
use std::sync::Arc;

/// A request sent from the bus thread to the audio thread
#[derive(Debug, Clone)]
pub enum SynthCommand {
    /// Start a tone, replacing the current voice
    Tone {
        /// Frequency in Hz
        frequency: f32,
        /// Length in seconds
        duration_secs: f32,
        /// Volume (0.0 - 1.0)
        volume: f32,
    },
    /// Start a PCM sample, replacing the current one
    Sample {
        /// Mono sample data
        data: Arc<[f32]>,
        /// Rate the data was recorded at
        sample_rate: u32,
    },
    /// Silence everything
    Stop,
}

/// Bus-side handle of the synth
#[derive(Debug)]
pub struct SynthController {
    tx: rtrb::Producer<SynthCommand>,
    dropped: u64,
}

impl SynthController {
    /// Queue a command; returns false if the queue was full and it was dropped
    pub fn send(&mut self, command: SynthCommand) -> bool {
        match self.tx.push(command) {
            Ok(()) => true,
            Err(PushError::Full(command)) => {
                self.dropped += 1;
                warn!("synth command queue full, dropping {:?}", command);
                false
            }
        }
    }

    /// Queue a tone
    pub fn play_tone(&mut self, frequency: f32, duration_secs: f32, volume: f32) -> bool {
        self.send(SynthCommand::Tone {
            frequency,
            duration_secs,
            volume,
        })
    }

    /// Queue a sample
    pub fn play_sample(&mut self, data: Arc<[f32]>, sample_rate: u32) -> bool {
        self.send(SynthCommand::Sample { data, sample_rate })
    }

    /// Queue a stop
    pub fn stop(&mut self) -> bool {
        self.send(SynthCommand::Stop)
    }

    /// Number of commands lost to a full queue
    pub fn dropped_commands(&self) -> u64 {
        self.dropped
    }
}

/// Audio-side half of the synth
#[derive(Debug)]
pub struct SynthRenderer {
    rx: Consumer<SynthCommand>,
    oscillator: Oscillator,
    sampler: SamplePlayer,
    mixer: Mixer,
    sample_rate: u32,
}

impl SynthRenderer {
    fn new(rx: Consumer<SynthCommand>, sample_rate: u32) -> Self {
        SynthRenderer {
            rx,
            oscillator: Oscillator::new(sample_rate),
            sampler: SamplePlayer::new(sample_rate),
            mixer: Mixer::new(),
            sample_rate,
        }
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.rx.pop() {
            match command {
                SynthCommand::Tone {
                    frequency,
                    duration_secs,
                    volume,
                } => {
                    self.oscillator.trigger(frequency, duration_secs, volume);
                }
                SynthCommand::Sample { data, sample_rate } => {
                    self.sampler.start(data, sample_rate);
                }
                SynthCommand::Stop => {
                    self.oscillator.stop();
                    self.sampler.stop();
                }
            }
        }
    }

    /// Produce one mono sample
    pub fn render_next_sample(&mut self) -> f32 {
        self.drain_commands();
        let tone = self.oscillator.render_next_sample();
        let sample = self.sampler.render_next_sample();
        self.mixer.mix(tone, sample)
    }

    /// Fill an interleaved buffer, duplicating each sample on every channel
    pub fn render_interleaved(&mut self, out: &mut [f32], channels: u16) {
        let channels = channels.max(1) as usize;
        for frame in out.chunks_exact_mut(channels) {
            frame.fill(self.render_next_sample());
        }
    }

    /// Render `count` mono samples into a new buffer
    pub fn render_mono(&mut self, count: usize) -> Vec<f32> {
        (0..count).map(|_| self.render_next_sample()).collect()
    }

    /// True while the voice or the sample slot produces sound, or commands
    /// are waiting to be applied
    pub fn is_active(&self) -> bool {
        self.oscillator.is_active() || self.sampler.is_active() || !self.rx.is_empty()
    }

    /// The tone oscillator
    pub fn oscillator(&self) -> &Oscillator {
        &self.oscillator
    }

    /// The output mixer
    pub fn mixer_mut(&mut self) -> &mut Mixer {
        &mut self.mixer
    }

    /// Output sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Create a connected controller/renderer pair for a configuration
pub fn synth_channel(config: &PeripheralConfig) -> (SynthController, SynthRenderer) {
    let (tx, rx) = RingBuffer::<SynthCommand>::new(config.command_queue_capacity.max(1));
    (
        SynthController { tx, dropped: 0 },
        SynthRenderer::new(rx, config.sample_rate),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::MASTER_SCALE;

    #[test]
    fn test_trigger_heard_on_next_sample() {
        let (mut controller, mut renderer) = synth_channel(&PeripheralConfig::default());
        assert_eq!(renderer.render_next_sample(), 0.0);
        assert!(controller.play_tone(440.0, 0.1, 1.0));
        renderer.render_next_sample();
        assert!(renderer.oscillator().is_active());
        assert_eq!(renderer.oscillator().voice().frequency, 440.0);
        assert_eq!(renderer.oscillator().voice().elapsed, 1);
    }

    #[test]
    fn test_full_queue_drops() {
        let config = PeripheralConfig {
            command_queue_capacity: 2,
            ..PeripheralConfig::default()
        };
        let (mut controller, mut renderer) = synth_channel(&config);
        assert!(controller.play_tone(440.0, 0.1, 1.0));
        assert!(controller.play_tone(550.0, 0.1, 1.0));
        assert!(!controller.play_tone(660.0, 0.1, 1.0));
        assert_eq!(controller.dropped_commands(), 1);

        renderer.render_next_sample();
        // Both queued triggers applied in order, last one wins
        assert_eq!(renderer.oscillator().voice().frequency, 550.0);
    }

    #[test]
    fn test_stop_silences() {
        let (mut controller, mut renderer) = synth_channel(&PeripheralConfig::default());
        controller.play_tone(440.0, 1.0, 1.0);
        renderer.render_mono(100);
        controller.stop();
        assert_eq!(renderer.render_next_sample(), 0.0);
        assert!(!renderer.is_active());
    }

    #[test]
    fn test_tone_and_sample_mix() {
        let (mut controller, mut renderer) = synth_channel(&PeripheralConfig::default());
        controller.play_sample(Arc::from(vec![0.5f32; 10]), 44_100);
        let out = renderer.render_mono(10);
        assert!(out.iter().all(|&s| (s - 0.5 * Mixer::SAMPLE_GAIN).abs() < 1e-6));
        assert!(!renderer.is_active());

        controller.play_tone(440.0, 0.5, 1.0);
        let peak = renderer
            .render_mono(22_050)
            .iter()
            .fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak <= MASTER_SCALE + 1e-6);
    }

    #[test]
    fn test_interleaved_stereo() {
        let (mut controller, mut renderer) = synth_channel(&PeripheralConfig::default());
        controller.play_tone(440.0, 0.1, 1.0);
        let mut block = vec![0.0f32; 2 * 735];
        renderer.render_interleaved(&mut block, 2);
        assert!(block.chunks_exact(2).all(|f| f[0] == f[1]));
        assert!(block.iter().any(|&s| s != 0.0));
    }
}
