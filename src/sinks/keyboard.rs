//! Shared keyboard view
//!
//! State a host window renders: one cell per key with its highlight flag and
//! color, plus the queue of presses waiting for the CPU to poll. The bus
//! writes through [`VisualSink`], the window reads [`KeyboardView::snapshot`]
//! and feeds presses with [`KeyboardView::press`].

use super::{KeySource, VisualSink};
use log::debug;
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

/// On-screen key rows, top to bottom
pub const KEY_ROWS: [&str; 4] = ["1234567890", "qwertyuiop", "asdfghjkl", "zxcvbnm"];

/// Grey level of an idle number key
const NUMBER_KEY_SHADE: u8 = 60;
/// Grey level of an idle letter key
const LETTER_KEY_SHADE: u8 = 80;
/// Presses kept while the CPU is not polling; older ones are dropped
pub const MAX_PENDING_PRESSES: usize = 16;

/// Display state of one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyVisual {
    /// True while the key is lit
    pub highlighted: bool,
    /// Color shown while lit
    pub color: (u8, u8, u8),
}

impl KeyVisual {
    /// Idle fill color of a key
    pub fn idle_color(key: char) -> (u8, u8, u8) {
        let shade = if key.is_ascii_digit() {
            NUMBER_KEY_SHADE
        } else {
            LETTER_KEY_SHADE
        };
        (shade, shade, shade)
    }

    /// Color to draw right now
    pub fn display_color(&self, key: char) -> (u8, u8, u8) {
        if self.highlighted {
            self.color
        } else {
            Self::idle_color(key)
        }
    }
}

impl Default for KeyVisual {
    fn default() -> Self {
        KeyVisual {
            highlighted: false,
            color: (255, 255, 255),
        }
    }
}

/// Everything the window needs to draw the keyboard
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    keys: BTreeMap<char, KeyVisual>,
    pressed: VecDeque<char>,
}

impl KeyboardState {
    /// State with every on-screen key idle
    pub fn new() -> Self {
        let keys = KEY_ROWS
            .iter()
            .flat_map(|row| row.chars())
            .map(|key| (key, KeyVisual::default()))
            .collect();
        KeyboardState {
            keys,
            pressed: VecDeque::new(),
        }
    }

    /// Display state of a key (idle default for unknown keys)
    pub fn key(&self, key: char) -> KeyVisual {
        self.keys
            .get(&key.to_ascii_lowercase())
            .copied()
            .unwrap_or_default()
    }

    /// Keys that are currently lit
    pub fn highlighted_keys(&self) -> Vec<char> {
        self.keys
            .iter()
            .filter(|(_, v)| v.highlighted)
            .map(|(&k, _)| k)
            .collect()
    }

    /// Presses not yet polled
    pub fn pending_presses(&self) -> usize {
        self.pressed.len()
    }
}

/// Cloneable handle to a [`KeyboardState`] shared with a renderer
#[derive(Debug, Clone)]
pub struct KeyboardView {
    state: Arc<Mutex<KeyboardState>>,
}

impl KeyboardView {
    /// Create a view with every on-screen key idle
    pub fn new() -> Self {
        KeyboardView {
            state: Arc::new(Mutex::new(KeyboardState::new())),
        }
    }

    /// Record a key press for the CPU to poll
    ///
    /// Beyond [`MAX_PENDING_PRESSES`] unpolled presses the oldest is dropped.
    pub fn press(&self, key: char) {
        let mut state = self.state.lock();
        if state.pressed.len() >= MAX_PENDING_PRESSES {
            if let Some(dropped) = state.pressed.pop_front() {
                debug!("key press queue full, dropping '{}'", dropped);
            }
        }
        state.pressed.push_back(key.to_ascii_lowercase());
    }

    /// Copy of the current state for drawing
    pub fn snapshot(&self) -> KeyboardState {
        self.state.lock().clone()
    }
}

impl Default for KeyboardView {
    fn default() -> Self {
        Self::new()
    }
}

impl VisualSink for KeyboardView {
    fn set_key_highlighted(&mut self, key: char, highlighted: bool) {
        let mut state = self.state.lock();
        state
            .keys
            .entry(key.to_ascii_lowercase())
            .or_default()
            .highlighted = highlighted;
    }

    fn set_key_color(&mut self, key: char, r: u8, g: u8, b: u8) {
        let mut state = self.state.lock();
        state.keys.entry(key.to_ascii_lowercase()).or_default().color = (r, g, b);
    }
}

impl KeySource for KeyboardView {
    fn poll_pressed_key(&mut self) -> Option<char> {
        self.state.lock().pressed.pop_front()
    }
}

/// Key source fed from a script, one press per poll
///
/// Clones share the queue, so a replay driver can keep a handle while the
/// bus owns another.
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeys {
    queue: Arc<Mutex<VecDeque<char>>>,
}

impl ScriptedKeys {
    /// Create an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a key press
    pub fn push(&self, key: char) {
        self.queue.lock().push_back(key);
    }

    /// Presses not yet polled
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// True when no press is queued
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

impl KeySource for ScriptedKeys {
    fn poll_pressed_key(&mut self) -> Option<char> {
        self.queue.lock().pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let state = KeyboardState::new();
        assert_eq!(state.keys.len(), 36);
        assert_eq!(KeyVisual::idle_color('1'), (60, 60, 60));
        assert_eq!(KeyVisual::idle_color('q'), (80, 80, 80));
        assert!(state.highlighted_keys().is_empty());
    }

    #[test]
    fn test_visual_updates_visible_through_clone() {
        let view = KeyboardView::new();
        let mut bus_side = view.clone();
        bus_side.set_key_color('A', 255, 0, 0);
        bus_side.set_key_highlighted('a', true);

        let snapshot = view.snapshot();
        assert_eq!(snapshot.highlighted_keys(), vec!['a']);
        assert_eq!(snapshot.key('a').display_color('a'), (255, 0, 0));

        bus_side.set_key_highlighted('a', false);
        assert_eq!(view.snapshot().key('a').display_color('a'), (80, 80, 80));
    }

    #[test]
    fn test_presses_polled_in_order() {
        let view = KeyboardView::new();
        let mut bus_side = view.clone();
        view.press('Q');
        view.press('w');
        assert_eq!(view.snapshot().pending_presses(), 2);
        assert_eq!(bus_side.poll_pressed_key(), Some('q'));
        assert_eq!(bus_side.poll_pressed_key(), Some('w'));
        assert_eq!(bus_side.poll_pressed_key(), None);
    }

    #[test]
    fn test_unpolled_presses_are_bounded() {
        let view = KeyboardView::new();
        let mut bus_side = view.clone();
        for key in "abcdefghijklmnopqrst".chars() {
            view.press(key);
        }
        assert_eq!(view.snapshot().pending_presses(), MAX_PENDING_PRESSES);
        // the four oldest presses were dropped
        assert_eq!(bus_side.poll_pressed_key(), Some('e'));
    }

    #[test]
    fn test_scripted_keys_shared_queue() {
        let script = ScriptedKeys::new();
        let mut source = script.clone();
        script.push('k');
        assert_eq!(script.len(), 1);
        assert_eq!(source.poll_pressed_key(), Some('k'));
        assert!(script.is_empty());
    }
}
