//! Highlight Timers
//!
//! Per-key countdowns for visual feedback, advanced once per display frame.
//!
//! State machine per key:
//! - `Absent → Active(N)` on trigger (a retrigger resets the count)
//! - `Active(n) → Active(n-1)` on tick while n > 1
//! - `Active(1) → Absent` on tick, reported exactly once as expired

use std::collections::BTreeMap;

/// Countdown table keyed by key symbol
#[derive(Debug, Clone, Default)]
pub struct HighlightTimers {
    /// Remaining frames per highlighted key (always >= 1)
    remaining: BTreeMap<char, u32>,
}

impl HighlightTimers {
    /// Create an empty timer table
    pub fn new() -> Self {
        HighlightTimers {
            remaining: BTreeMap::new(),
        }
    }

    /// Start or restart a key's countdown
    ///
    /// A zero-length highlight is ignored.
    pub fn trigger(&mut self, key: char, frames: u32) {
        if frames == 0 {
            return;
        }
        self.remaining.insert(key, frames);
    }

    /// Advance every countdown by one frame
    ///
    /// Returns the keys whose countdown reached zero on this tick, in key
    /// order. Each expiry is reported once; the entry is gone afterwards.
    pub fn tick(&mut self) -> Vec<char> {
        let mut expired = Vec::new();
        self.remaining.retain(|&key, frames| {
            *frames -= 1;
            if *frames == 0 {
                expired.push(key);
                false
            } else {
                true
            }
        });
        expired
    }

    /// True if the key has a running countdown
    pub fn is_active(&self, key: char) -> bool {
        self.remaining.contains_key(&key)
    }

    /// Frames left for a key (0 when not highlighted)
    pub fn remaining(&self, key: char) -> u32 {
        self.remaining.get(&key).copied().unwrap_or(0)
    }

    /// Keys currently highlighted, in key order
    pub fn active_keys(&self) -> impl Iterator<Item = char> + '_ {
        self.remaining.keys().copied()
    }

    /// Number of highlighted keys
    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    /// True if nothing is highlighted
    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thirty_frame_countdown() {
        let mut timers = HighlightTimers::new();
        timers.trigger('k', 30);

        for _ in 0..29 {
            assert!(timers.tick().is_empty());
            assert!(timers.is_active('k'));
        }
        assert_eq!(timers.remaining('k'), 1);

        assert_eq!(timers.tick(), vec!['k']);
        assert!(!timers.is_active('k'));
        // Expiry is reported once only
        assert!(timers.tick().is_empty());
    }

    #[test]
    fn test_retrigger_resets_count() {
        let mut timers = HighlightTimers::new();
        timers.trigger('a', 3);
        timers.tick();
        timers.tick();
        timers.trigger('a', 3);
        assert_eq!(timers.remaining('a'), 3);
    }

    #[test]
    fn test_zero_frames_ignored() {
        let mut timers = HighlightTimers::new();
        timers.trigger('z', 0);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_independent_keys() {
        let mut timers = HighlightTimers::new();
        timers.trigger('a', 1);
        timers.trigger('b', 2);
        assert_eq!(timers.tick(), vec!['a']);
        assert_eq!(timers.active_keys().collect::<Vec<_>>(), vec!['b']);
        assert_eq!(timers.tick(), vec!['b']);
        assert!(timers.is_empty());
    }
}
