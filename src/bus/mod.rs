//! Bus Dispatcher
//!
//! Entry points the CPU calls once per bus cycle. Each transaction is decoded
//! into an [`Operation`], carried out synchronously against the
//! [`PeripheralState`] and the attached sinks, and answered with a fixed
//! per-transaction delay. No transaction ever fails: bad addresses, missing
//! backends and protocol misuse are logged and ignored.

pub mod stats;

pub use stats::BusStats;

use crate::config::PeripheralConfig;
use crate::keys::{ConfigStep, KeyProperty, KeyTracker};
use crate::ports::{Access, CombinedWord, ModeWord, Operation, ToneWord};
use crate::samples::SampleBank;
use crate::sinks::{AudioSink, KeySource, VisualSink};
use log::{debug, info, warn};

/// Answer to a bus read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BusRead {
    /// Word returned to the CPU
    pub data: u16,
    /// Stall cycles for this transaction
    pub delay: u16,
}

/// A memory-mapped device the CPU talks to
pub trait BusDevice {
    /// Read a word at `address`
    fn read(&mut self, address: u16) -> BusRead;

    /// Write a word at `address`, returning the stall cycles
    fn write(&mut self, address: u16, word: u16) -> u16;

    /// Advance per-frame timers
    fn tick_frame(&mut self) {}
}

/// Everything the peripherals remember between transactions
#[derive(Debug, Clone, Default)]
pub struct PeripheralState {
    /// Key bindings, highlight timers and the configuration cursor
    pub keys: KeyTracker,
    /// Registered samples
    pub samples: SampleBank,
}

impl PeripheralState {
    /// Empty state
    pub fn new() -> Self {
        PeripheralState {
            keys: KeyTracker::new(),
            samples: SampleBank::new(),
        }
    }
}

/// The peripheral bus: port decoder, key state and collaborator sinks
pub struct PeripheralBus {
    config: PeripheralConfig,
    state: PeripheralState,
    audio: Option<Box<dyn AudioSink + Send>>,
    visual: Option<Box<dyn VisualSink + Send>>,
    keys: Option<Box<dyn KeySource + Send>>,
    stats: BusStats,
}

impl PeripheralBus {
    /// Create a bus with empty state and no collaborators attached
    pub fn new(config: PeripheralConfig) -> Self {
        PeripheralBus {
            config,
            state: PeripheralState::new(),
            audio: None,
            visual: None,
            keys: None,
            stats: BusStats::new(),
        }
    }

    /// Attach an audio backend
    pub fn with_audio<S: AudioSink + Send + 'static>(mut self, sink: S) -> Self {
        self.audio = Some(Box::new(sink));
        self
    }

    /// Attach a visual key display
    pub fn with_visual<S: VisualSink + Send + 'static>(mut self, sink: S) -> Self {
        self.visual = Some(Box::new(sink));
        self
    }

    /// Attach a key press source
    pub fn with_keys<S: KeySource + Send + 'static>(mut self, source: S) -> Self {
        self.keys = Some(Box::new(source));
        self
    }

    /// Use a preloaded sample bank
    pub fn with_samples(mut self, samples: SampleBank) -> Self {
        self.state.samples = samples;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &PeripheralConfig {
        &self.config
    }

    /// Peripheral state
    pub fn state(&self) -> &PeripheralState {
        &self.state
    }

    /// Mutable peripheral state
    pub fn state_mut(&mut self) -> &mut PeripheralState {
        &mut self.state
    }

    /// Transaction counters
    pub fn stats(&self) -> &BusStats {
        &self.stats
    }

    /// Carry out a decoded operation, returning the word a read would see
    pub fn execute(&mut self, operation: Operation) -> u16 {
        match operation {
            Operation::GetKey => self.get_key(),
            Operation::PlayFrequency(tone) => {
                self.play_tone_word(tone);
                0
            }
            Operation::PlaySampleById(id) => {
                self.play_sample_or_fallback(id);
                0
            }
            Operation::ShowKey(key) => {
                self.show_key(key);
                0
            }
            Operation::SelectOrSetKeyFrequency(word) => {
                self.configure_key(KeyProperty::Frequency, word);
                0
            }
            Operation::SelectOrSetKeySample(word) => {
                self.configure_key(KeyProperty::Sample, word);
                0
            }
            Operation::SelectOrSetKeyColor(word) => {
                self.configure_key(KeyProperty::Color, word);
                0
            }
            Operation::QueryKeyFrequency => self
                .state
                .keys
                .pending_key()
                .and_then(|key| self.state.keys.binding(key).frequency)
                .unwrap_or(0),
            Operation::SetKeyMode(mode) => {
                self.set_key_mode(mode);
                0
            }
            Operation::PlayCombined(combined) => {
                self.play_combined(combined);
                0
            }
            Operation::ListSamples => {
                self.list_samples();
                0
            }
            Operation::GetSampleCount => {
                u16::try_from(self.state.samples.len()).unwrap_or(u16::MAX)
            }
            Operation::Unsupported { port, access } => {
                match access {
                    Access::Read => warn!("read of write-only port {}; returning 0", port),
                    Access::Write(word) => {
                        warn!("write 0x{:04X} to read-only port {}; ignored", word, port)
                    }
                }
                0
            }
            Operation::Unknown(address) => {
                self.stats.record_unknown();
                warn!("access to unknown address 0x{:04X}; ignored", address);
                0
            }
        }
    }

    fn get_key(&mut self) -> u16 {
        let Some(source) = self.keys.as_mut() else {
            debug!("no key source; key read returns 0");
            return 0;
        };
        let Some(raw) = source.poll_pressed_key() else {
            return 0;
        };
        let key = raw.to_ascii_lowercase();
        if !key.is_ascii() {
            debug!("ignoring non-ASCII key press {:?}", raw);
            return 0;
        }

        self.state
            .keys
            .trigger_highlight(key, self.config.keypress_highlight_frames);
        if let Some(visual) = self.visual.as_mut() {
            visual.set_key_highlighted(key, true);
        }
        debug!("key '{}' pressed", key);
        key as u16
    }

    /// Highest frequency a tone may have, further capped at Nyquist
    pub const MAX_TONE_HZ: f32 = 20_000.0;

    fn tone_in_range(&self, frequency: f32) -> bool {
        let nyquist = self.config.sample_rate as f32 / 2.0;
        frequency.is_finite() && frequency > 0.0 && frequency <= Self::MAX_TONE_HZ.min(nyquist)
    }

    fn play_tone(&mut self, frequency: f32, duration_secs: f32) {
        let (frequency, duration_secs) = if self.tone_in_range(frequency) {
            (frequency, duration_secs)
        } else {
            warn!(
                "tone of {} Hz out of range; playing fallback tone",
                frequency
            );
            (
                self.config.fallback_tone_hz,
                self.config.fallback_tone_seconds,
            )
        };
        match self.audio.as_mut() {
            Some(audio) => audio.play_tone(frequency, duration_secs, self.config.volume),
            None => debug!("no audio backend; {} Hz tone dropped", frequency),
        }
    }

    fn play_tone_word(&mut self, tone: ToneWord) {
        let (frequency, duration) = tone
            .wave
            .shape(tone.frequency_hz() as f32, tone.duration_secs());
        debug!(
            "play {} Hz for {:.2} s ({})",
            frequency, duration, tone.wave
        );
        self.play_tone(frequency, duration);
    }

    fn play_sample_or_fallback(&mut self, id: u16) {
        let Some(audio) = self.audio.as_mut() else {
            debug!("no audio backend; sample {} dropped", id);
            return;
        };
        match self.state.samples.get(id) {
            Some(sample) => {
                debug!("play sample {} '{}'", id, sample.name);
                audio.play_sample(id, sample);
            }
            None => {
                warn!("unknown sample id {}; playing fallback tone", id);
                audio.play_tone(
                    self.config.fallback_tone_hz,
                    self.config.fallback_tone_seconds,
                    self.config.volume,
                );
            }
        }
    }

    fn show_key(&mut self, key: char) {
        let binding = self.state.keys.binding(key);
        let (r, g, b) = binding.color_or_default().to_rgb();
        match self.visual.as_mut() {
            Some(visual) => {
                visual.set_key_color(key, r, g, b);
                visual.set_key_highlighted(key, true);
            }
            None => debug!("no visual backend; key '{}' not drawn", key),
        }
        self.state
            .keys
            .trigger_highlight(key, self.config.show_key_highlight_frames);

        let mode = binding.mode_or_default();
        if mode.plays_frequency() {
            if let Some(hz) = binding.frequency {
                let (frequency, duration) = binding
                    .wave_or_default()
                    .shape(hz as f32, self.config.key_note_seconds);
                self.play_tone(frequency, duration);
            }
        }
        if mode.plays_sample() {
            if let Some(id) = binding.sample_id {
                self.play_sample_or_fallback(id);
            }
        }
    }

    fn configure_key(&mut self, property: KeyProperty, word: u16) {
        let step = self.state.keys.configure(property, word);
        if let (KeyProperty::Color, ConfigStep::Bound(key)) = (property, step) {
            let (r, g, b) = self.state.keys.binding(key).color_or_default().to_rgb();
            match self.visual.as_mut() {
                Some(visual) => visual.set_key_color(key, r, g, b),
                None => debug!("no visual backend; color of '{}' not drawn", key),
            }
        }
    }

    fn set_key_mode(&mut self, mode: ModeWord) {
        if mode.is_reserved_mode() {
            debug!("key '{}': reserved mode 3, using Frequency", mode.key);
        }
        self.state.keys.assign_mode(mode.key, mode.mode, mode.wave);
        debug!("key '{}': mode {:?}, wave {}", mode.key, mode.mode, mode.wave);
    }

    fn play_combined(&mut self, combined: CombinedWord) {
        self.play_tone(
            combined.frequency_hz() as f32,
            self.config.key_note_seconds,
        );

        let id = combined.sample_id as u16;
        match (self.audio.as_mut(), self.state.samples.get(id)) {
            (Some(audio), Some(sample)) => audio.play_sample(id, sample),
            (Some(_), None) => warn!("combined play: unknown sample id {}", id),
            (None, _) => {}
        }
    }

    fn list_samples(&self) {
        if self.state.samples.is_empty() {
            info!("no samples loaded");
            return;
        }
        info!("{} samples:", self.state.samples.len());
        for (id, sample) in self.state.samples.iter() {
            info!(
                "  [{}] {} ({} frames, {:.2} s)",
                id,
                sample.name,
                sample.len(),
                sample.duration_secs()
            );
        }
    }
}

impl BusDevice for PeripheralBus {
    fn read(&mut self, address: u16) -> BusRead {
        self.stats.record_read();
        let operation = Operation::decode_read(address);
        debug!("R 0x{:04X} -> {:?}", address, operation);
        BusRead {
            data: self.execute(operation),
            delay: self.config.transaction_delay,
        }
    }

    fn write(&mut self, address: u16, word: u16) -> u16 {
        self.stats.record_write();
        let operation = Operation::decode_write(address, word);
        debug!("W 0x{:04X} 0x{:04X} -> {:?}", address, word, operation);
        self.execute(operation);
        self.config.transaction_delay
    }

    fn tick_frame(&mut self) {
        self.stats.clock_frame();
        for key in self.state.keys.tick() {
            if let Some(visual) = self.visual.as_mut() {
                visual.set_key_highlighted(key, false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::Sample;
    use crate::sinks::ScriptedKeys;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Tone(f32, f32),
        Sample(u16),
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<Event>>>);

    impl Recorder {
        fn events(&self) -> Vec<Event> {
            self.0.lock().clone()
        }
    }

    impl AudioSink for Recorder {
        fn play_tone(&mut self, frequency_hz: f32, duration_secs: f32, _volume: f32) {
            self.0.lock().push(Event::Tone(frequency_hz, duration_secs));
        }

        fn play_sample(&mut self, id: u16, _sample: &Sample) {
            self.0.lock().push(Event::Sample(id));
        }
    }

    fn bus_with_recorder() -> (PeripheralBus, Recorder) {
        let recorder = Recorder::default();
        let bus = PeripheralBus::new(PeripheralConfig::default()).with_audio(recorder.clone());
        (bus, recorder)
    }

    #[test]
    fn test_play_frequency_word() {
        let (mut bus, recorder) = bus_with_recorder();
        assert_eq!(bus.write(0x9001, 0x0016), 0);
        match recorder.events().as_slice() {
            [Event::Tone(f, d)] => {
                assert_eq!(*f, 440.0);
                assert!((d - 0.1).abs() < 1e-6);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_address() {
        let (mut bus, recorder) = bus_with_recorder();
        assert_eq!(bus.read(0x1234), BusRead { data: 0, delay: 0 });
        bus.write(0x1234, 0xFFFF);
        assert!(recorder.events().is_empty());
        assert_eq!(bus.stats().unknown(), 2);
        assert_eq!(bus.state().keys.binding_count(), 0);
    }

    #[test]
    fn test_transaction_delay() {
        let config = PeripheralConfig {
            transaction_delay: 1,
            ..PeripheralConfig::default()
        };
        let mut bus = PeripheralBus::new(config);
        assert_eq!(bus.write(0x9001, 0x0016), 1);
        assert_eq!(bus.read(0x9000).delay, 1);
        assert_eq!(bus.read(0xABCD).delay, 1);
    }

    #[test]
    fn test_unknown_sample_plays_fallback_tone() {
        let (mut bus, recorder) = bus_with_recorder();
        bus.write(0x9002, 9);
        assert_eq!(recorder.events(), vec![Event::Tone(200.0, 0.25)]);
    }

    #[test]
    fn test_known_sample_plays() {
        let (bus, recorder) = bus_with_recorder();
        let mut bank = SampleBank::new();
        bank.insert(4, Sample::new("snare", vec![0.0; 8], 22_050));
        let mut bus = bus.with_samples(bank);
        bus.write(0x9002, 4);
        assert_eq!(recorder.events(), vec![Event::Sample(4)]);
        assert_eq!(bus.read(0x9007).data, 1);
    }

    #[test]
    fn test_get_key_highlights() {
        let keys = ScriptedKeys::new();
        let mut bus = PeripheralBus::new(PeripheralConfig::default()).with_keys(keys.clone());
        assert_eq!(bus.read(0x9000).data, 0);
        keys.push('G');
        assert_eq!(bus.read(0x9000).data, b'g' as u16);
        assert!(bus.state().keys.is_highlighted('g'));
        assert_eq!(bus.state().keys.highlights().remaining('g'), 30);
    }

    #[test]
    fn test_query_key_frequency() {
        let mut bus = PeripheralBus::new(PeripheralConfig::default());
        bus.state_mut().keys.assign_frequency('a', 523);
        assert_eq!(bus.read(0x9004).data, 0);
        bus.write(0x9004, b'a' as u16);
        assert_eq!(bus.read(0x9004).data, 523);
    }

    #[test]
    fn test_missing_backends_are_noops() {
        let mut bus = PeripheralBus::new(PeripheralConfig::default());
        bus.write(0x9001, 0x0016);
        bus.write(0x9002, 0);
        bus.write(0x9003, b'a' as u16);
        bus.write(0x9009, 0x0016);
        bus.write(0x9006, b'a' as u16);
        bus.write(0x9006, 0xE0);
        assert_eq!(bus.state().keys.binding('a').color_or_default().to_rgb(), (252, 0, 0));
        assert!(bus.state().keys.is_highlighted('a'));
        bus.tick_frame();
        assert_eq!(bus.read(0x9000).data, 0);
        assert_eq!(bus.stats().transactions(), 7);
    }

    #[test]
    fn test_out_of_range_key_frequency_plays_fallback_tone() {
        let (mut bus, recorder) = bus_with_recorder();
        bus.write(0x9004, b'a' as u16);
        bus.write(0x9004, 30_000);
        bus.write(0x9003, b'a' as u16);
        assert_eq!(recorder.events(), vec![Event::Tone(200.0, 0.25)]);
    }

    #[test]
    fn test_zero_key_frequency_plays_fallback_tone() {
        let (mut bus, recorder) = bus_with_recorder();
        bus.write(0x9004, b'b' as u16);
        bus.write(0x9004, 0);
        bus.write(0x9003, b'b' as u16);
        assert_eq!(recorder.events(), vec![Event::Tone(200.0, 0.25)]);
    }

    #[test]
    fn test_highest_tone_word_is_in_range() {
        let (mut bus, recorder) = bus_with_recorder();
        // 2770 Hz raised by the triangle shaper stays below the limit
        bus.write(0x9001, 0x2FFF);
        match recorder.events().as_slice() {
            [Event::Tone(f, _)] => assert!((f - 3047.0).abs() < 0.01),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_combined_missing_sample_still_plays_tone() {
        let (mut bus, recorder) = bus_with_recorder();
        bus.write(0x9009, 0x0516);
        assert_eq!(recorder.events(), vec![Event::Tone(440.0, 0.5)]);
    }
}
