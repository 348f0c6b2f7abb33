//! Key-State Tracker
//!
//! Per-key bindings (frequency, sample, color, audio mode, wave type), visual
//! highlight countdowns and the cursor used by the two-phase
//! "select key, then set property" protocol.

pub mod cursor;
pub mod highlight;

pub use cursor::ConfigCursor;
pub use highlight::HighlightTimers;

use crate::ports::words::is_key_symbol;
use crate::ports::Rgb332;
use crate::synth::WaveType;
use bitflags::bitflags;
use log::{debug, warn};
use std::collections::BTreeMap;

bitflags! {
    /// Which sound a key produces when shown
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AudioMode: u8 {
        /// Play the bound frequency
        const FREQUENCY = 0x01;
        /// Play the bound sample
        const SAMPLE = 0x02;
        /// Play both
        const BOTH = Self::FREQUENCY.bits() | Self::SAMPLE.bits();
    }
}

impl AudioMode {
    /// Map the 2-bit mode selector (0=Frequency, 1=Sample, 2=Both, 3=reserved)
    ///
    /// The reserved value reads as Frequency.
    pub fn from_selector(selector: u8) -> Self {
        match selector % 4 {
            1 => AudioMode::SAMPLE,
            2 => AudioMode::BOTH,
            _ => AudioMode::FREQUENCY,
        }
    }

    /// True if the bound frequency should sound
    pub fn plays_frequency(&self) -> bool {
        self.contains(AudioMode::FREQUENCY)
    }

    /// True if the bound sample should sound
    pub fn plays_sample(&self) -> bool {
        self.contains(AudioMode::SAMPLE)
    }
}

impl Default for AudioMode {
    fn default() -> Self {
        AudioMode::FREQUENCY
    }
}

/// Configuration of one key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyBinding {
    /// Bound tone frequency in Hz
    pub frequency: Option<u16>,
    /// Bound sample id
    pub sample_id: Option<u16>,
    /// Bound RGB-332 highlight color
    pub color: Option<Rgb332>,
    /// Bound audio mode
    pub mode: Option<AudioMode>,
    /// Bound wave type
    pub wave: Option<WaveType>,
}

impl KeyBinding {
    /// Highlight color, full white when unset
    pub fn color_or_default(&self) -> Rgb332 {
        self.color.unwrap_or(Rgb332::WHITE)
    }

    /// Audio mode, Frequency when unset
    pub fn mode_or_default(&self) -> AudioMode {
        self.mode.unwrap_or_default()
    }

    /// Wave type, Sine when unset
    pub fn wave_or_default(&self) -> WaveType {
        self.wave.unwrap_or_default()
    }
}

/// Property addressed by a two-phase configuration write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyProperty {
    /// Frequency in Hz (port 0x9004)
    Frequency,
    /// Sample id (port 0x9005)
    Sample,
    /// RGB-332 color (port 0x9006)
    Color,
}

/// Outcome of a two-phase configuration write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigStep {
    /// The word selected a key; the next write binds the property
    Selected(char),
    /// The word was bound to the pending key, cursor cleared
    Bound(char),
    /// No key pending and the word is not a key symbol
    Ignored,
}

/// Per-key bindings, highlight timers and configuration cursor
#[derive(Debug, Clone, Default)]
pub struct KeyTracker {
    bindings: BTreeMap<char, KeyBinding>,
    highlights: HighlightTimers,
    cursor: ConfigCursor,
}

impl KeyTracker {
    /// Create a tracker with no bindings
    pub fn new() -> Self {
        KeyTracker {
            bindings: BTreeMap::new(),
            highlights: HighlightTimers::new(),
            cursor: ConfigCursor::new(),
        }
    }

    #[inline]
    fn normalize(key: char) -> char {
        key.to_ascii_lowercase()
    }

    fn binding_mut(&mut self, key: char) -> &mut KeyBinding {
        self.bindings.entry(Self::normalize(key)).or_default()
    }

    /// Bind a tone frequency to a key
    pub fn assign_frequency(&mut self, key: char, hz: u16) {
        self.binding_mut(key).frequency = Some(hz);
    }

    /// Bind a sample id to a key
    pub fn assign_sample(&mut self, key: char, id: u16) {
        self.binding_mut(key).sample_id = Some(id);
    }

    /// Bind an RGB-332 color to a key
    pub fn assign_color(&mut self, key: char, color: Rgb332) {
        self.binding_mut(key).color = Some(color);
    }

    /// Bind an audio mode and wave type to a key
    pub fn assign_mode(&mut self, key: char, mode: AudioMode, wave: WaveType) {
        let binding = self.binding_mut(key);
        binding.mode = Some(mode);
        binding.wave = Some(wave);
    }

    /// The key's binding, or an empty one if the key was never configured
    pub fn binding(&self, key: char) -> KeyBinding {
        self.bindings
            .get(&Self::normalize(key))
            .copied()
            .unwrap_or_default()
    }

    /// Number of keys that have been configured
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Start or restart a key's highlight
    pub fn trigger_highlight(&mut self, key: char, frames: u32) {
        self.highlights.trigger(Self::normalize(key), frames);
    }

    /// Advance all highlight timers by one frame
    ///
    /// Returns the keys that stopped being highlighted on this frame.
    pub fn tick(&mut self) -> Vec<char> {
        self.highlights.tick()
    }

    /// True while the key's highlight countdown runs
    pub fn is_highlighted(&self, key: char) -> bool {
        self.highlights.is_active(Self::normalize(key))
    }

    /// Read-only view of the highlight timers
    pub fn highlights(&self) -> &HighlightTimers {
        &self.highlights
    }

    /// The key pending configuration, if any
    pub fn pending_key(&self) -> Option<char> {
        self.cursor.pending()
    }

    /// Apply one two-phase configuration write
    ///
    /// With no key pending, a word that is a printable one-byte key symbol
    /// selects that key. With a key pending, the word is the property value
    /// and the cursor is cleared. The magnitude test cannot tell a small
    /// property value from a key symbol when nothing is pending; such a
    /// write selects.
    pub fn configure(&mut self, property: KeyProperty, word: u16) -> ConfigStep {
        match self.cursor.take() {
            Some(key) => {
                match property {
                    KeyProperty::Frequency => self.assign_frequency(key, word),
                    KeyProperty::Sample => self.assign_sample(key, word),
                    KeyProperty::Color => self.assign_color(key, Rgb332::from_word(word)),
                }
                debug!("key '{}': {:?} <- {}", key, property, word);
                ConfigStep::Bound(key)
            }
            None if is_key_symbol(word) => {
                let key = Self::normalize(word as u8 as char);
                self.cursor.select(key);
                ConfigStep::Selected(key)
            }
            None => {
                warn!(
                    "{:?} value 0x{:04X} written with no key selected; ignored",
                    property, word
                );
                ConfigStep::Ignored
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_binding_defaults() {
        let tracker = KeyTracker::new();
        let binding = tracker.binding('q');
        assert_eq!(binding.frequency, None);
        assert_eq!(binding.sample_id, None);
        assert_eq!(binding.color_or_default(), Rgb332::WHITE);
        assert_eq!(binding.mode_or_default(), AudioMode::FREQUENCY);
        assert_eq!(binding.wave_or_default(), WaveType::Sine);
        assert_eq!(tracker.binding_count(), 0);
    }

    #[test]
    fn test_assignments_are_case_insensitive() {
        let mut tracker = KeyTracker::new();
        tracker.assign_frequency('A', 440);
        tracker.assign_sample('a', 3);
        tracker.assign_color('a', Rgb332(0xE0));
        tracker.assign_mode('A', AudioMode::BOTH, WaveType::Triangle);

        let binding = tracker.binding('a');
        assert_eq!(binding.frequency, Some(440));
        assert_eq!(binding.sample_id, Some(3));
        assert_eq!(binding.color, Some(Rgb332(0xE0)));
        assert_eq!(binding.mode, Some(AudioMode::BOTH));
        assert_eq!(binding.wave, Some(WaveType::Triangle));
        assert_eq!(tracker.binding_count(), 1);
    }

    #[test]
    fn test_two_phase_frequency_binding() {
        let mut tracker = KeyTracker::new();
        assert_eq!(
            tracker.configure(KeyProperty::Frequency, b'a' as u16),
            ConfigStep::Selected('a')
        );
        assert_eq!(tracker.pending_key(), Some('a'));
        assert_eq!(
            tracker.configure(KeyProperty::Frequency, 440),
            ConfigStep::Bound('a')
        );
        assert_eq!(tracker.binding('a').frequency, Some(440));
        assert_eq!(tracker.pending_key(), None);
    }

    #[test]
    fn test_value_without_selection_is_ignored() {
        let mut tracker = KeyTracker::new();
        assert_eq!(tracker.configure(KeyProperty::Frequency, 440), ConfigStep::Ignored);
        assert_eq!(tracker.binding_count(), 0);
        assert_eq!(tracker.pending_key(), None);
    }

    #[test]
    fn test_small_value_after_selection_binds() {
        let mut tracker = KeyTracker::new();
        tracker.configure(KeyProperty::Sample, b'S' as u16);
        assert_eq!(tracker.configure(KeyProperty::Sample, 2), ConfigStep::Bound('s'));
        assert_eq!(tracker.binding('s').sample_id, Some(2));
    }

    #[test]
    fn test_color_uses_low_byte() {
        let mut tracker = KeyTracker::new();
        tracker.configure(KeyProperty::Color, b'c' as u16);
        tracker.configure(KeyProperty::Color, 0x12E0);
        assert_eq!(tracker.binding('c').color, Some(Rgb332(0xE0)));
    }

    #[test]
    fn test_highlight_through_tracker() {
        let mut tracker = KeyTracker::new();
        tracker.trigger_highlight('K', 30);
        for _ in 0..29 {
            assert!(tracker.tick().is_empty());
        }
        assert!(tracker.is_highlighted('k'));
        assert_eq!(tracker.tick(), vec!['k']);
        assert!(!tracker.is_highlighted('k'));
    }

    #[test]
    fn test_audio_mode_selectors() {
        assert_eq!(AudioMode::from_selector(0), AudioMode::FREQUENCY);
        assert_eq!(AudioMode::from_selector(1), AudioMode::SAMPLE);
        assert_eq!(AudioMode::from_selector(2), AudioMode::BOTH);
        assert_eq!(AudioMode::from_selector(3), AudioMode::FREQUENCY);
        assert_eq!(AudioMode::from_selector(6), AudioMode::BOTH);
        assert!(AudioMode::BOTH.plays_frequency() && AudioMode::BOTH.plays_sample());
        assert!(!AudioMode::SAMPLE.plays_frequency());
    }
}
