//! Configuration Cursor
//!
//! Single slot holding the key that the next property write will configure.

use log::debug;

/// The key pending configuration, if any
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigCursor {
    pending: Option<char>,
}

impl ConfigCursor {
    /// Create an empty cursor
    pub fn new() -> Self {
        ConfigCursor { pending: None }
    }

    /// Select a key for configuration
    ///
    /// A key that was already pending is dropped without ever receiving its
    /// property write, and is returned to the caller.
    pub fn select(&mut self, key: char) -> Option<char> {
        let replaced = self.pending.replace(key);
        if let Some(old) = replaced {
            debug!("config cursor: '{}' replaced pending '{}'", key, old);
        }
        replaced
    }

    /// Take the pending key, clearing the cursor
    pub fn take(&mut self) -> Option<char> {
        self.pending.take()
    }

    /// The pending key without clearing it
    pub fn pending(&self) -> Option<char> {
        self.pending
    }
}
