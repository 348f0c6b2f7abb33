//! Port Protocol Decoder
//!
//! Maps bus addresses onto the fixed peripheral port table and turns each
//! transaction into a typed [`Operation`]. The numeric addresses are an ABI
//! shared with already-compiled programs and must not change.

pub mod words;

pub use words::{CombinedWord, ModeWord, Rgb332, ToneWord};

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::fmt;

/// Peripheral port addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u16)]
pub enum Port {
    /// Read the pressed key (0 if none) - 0x9000
    Key = 0x9000,
    /// Play a packed tone word - 0x9001
    PlayFrequency = 0x9001,
    /// Play a sample by numeric id - 0x9002
    PlaySample = 0x9002,
    /// Highlight a key and sound it according to its mode - 0x9003
    ShowKey = 0x9003,
    /// Select key / bind frequency; reads return the current mapping - 0x9004
    KeyFrequency = 0x9004,
    /// Select key / bind sample id - 0x9005
    KeySample = 0x9005,
    /// Select key / bind RGB-332 color - 0x9006
    KeyColor = 0x9006,
    /// Read the number of available samples - 0x9007
    SampleCount = 0x9007,
    /// Log the available samples - 0x9008
    ListSamples = 0x9008,
    /// Play a packed frequency + sample word - 0x9009
    PlayCombined = 0x9009,
    /// Set a key's audio mode and wave type - 0x900A
    KeyMode = 0x900A,
}

impl Port {
    /// Look up the port at a bus address
    pub fn from_address(address: u16) -> Option<Self> {
        Port::from_u16(address)
    }

    /// The bus address of this port
    pub fn address(self) -> u16 {
        self as u16
    }

    /// True if the CPU may read this port
    pub fn is_readable(self) -> bool {
        matches!(self, Port::Key | Port::KeyFrequency | Port::SampleCount)
    }

    /// True if the CPU may write this port
    pub fn is_writable(self) -> bool {
        !matches!(self, Port::Key | Port::SampleCount)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Port::Key => "KEY",
            Port::PlayFrequency => "PLAY_FREQ",
            Port::PlaySample => "PLAY_SAMPLE",
            Port::ShowKey => "SHOW_KEY",
            Port::KeyFrequency => "KEY_FREQ",
            Port::KeySample => "KEY_SAMPLE",
            Port::KeyColor => "KEY_COLOR",
            Port::SampleCount => "SAMPLE_COUNT",
            Port::ListSamples => "LIST_SAMPLES",
            Port::PlayCombined => "PLAY_COMBINED",
            Port::KeyMode => "KEY_MODE",
        };
        write!(f, "{} (0x{:04X})", name, self.address())
    }
}

/// Direction of a bus transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// CPU reads a word
    Read,
    /// CPU writes a word
    Write(u16),
}

/// A decoded bus transaction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    /// Poll the pressed key
    GetKey,
    /// Play a tone for a fixed duration
    PlayFrequency(ToneWord),
    /// Play a sample by id
    PlaySampleById(u16),
    /// Highlight a key and sound its binding
    ShowKey(char),
    /// Two-phase key selection / frequency binding (raw word)
    SelectOrSetKeyFrequency(u16),
    /// Two-phase key selection / sample binding (raw word)
    SelectOrSetKeySample(u16),
    /// Two-phase key selection / color binding (raw word)
    SelectOrSetKeyColor(u16),
    /// Read back the pending key's frequency binding
    QueryKeyFrequency,
    /// Bind an audio mode and wave type to a key
    SetKeyMode(ModeWord),
    /// Play a tone and a sample together
    PlayCombined(CombinedWord),
    /// Log the registered samples
    ListSamples,
    /// Read the registered sample count
    GetSampleCount,
    /// Known port, wrong direction
    Unsupported {
        /// The port that was accessed
        port: Port,
        /// How it was accessed
        access: Access,
    },
    /// Address outside the port table
    Unknown(u16),
}

impl Operation {
    /// Decode a transaction at `address`
    pub fn decode(address: u16, access: Access) -> Self {
        let Some(port) = Port::from_address(address) else {
            return Operation::Unknown(address);
        };

        match (port, access) {
            (Port::Key, Access::Read) => Operation::GetKey,
            (Port::KeyFrequency, Access::Read) => Operation::QueryKeyFrequency,
            (Port::SampleCount, Access::Read) => Operation::GetSampleCount,
            (_, Access::Read) => Operation::Unsupported { port, access },

            (Port::PlayFrequency, Access::Write(word)) => {
                Operation::PlayFrequency(ToneWord::from_word(word))
            }
            (Port::PlaySample, Access::Write(word)) => Operation::PlaySampleById(word),
            (Port::ShowKey, Access::Write(word)) => Operation::ShowKey(words::key_from_word(word)),
            (Port::KeyFrequency, Access::Write(word)) => Operation::SelectOrSetKeyFrequency(word),
            (Port::KeySample, Access::Write(word)) => Operation::SelectOrSetKeySample(word),
            (Port::KeyColor, Access::Write(word)) => Operation::SelectOrSetKeyColor(word),
            (Port::ListSamples, Access::Write(_)) => Operation::ListSamples,
            (Port::PlayCombined, Access::Write(word)) => {
                Operation::PlayCombined(CombinedWord::from_word(word))
            }
            (Port::KeyMode, Access::Write(word)) => Operation::SetKeyMode(ModeWord::from_word(word)),
            (Port::Key | Port::SampleCount, Access::Write(_)) => {
                Operation::Unsupported { port, access }
            }
        }
    }

    /// Decode a read at `address`
    pub fn decode_read(address: u16) -> Self {
        Self::decode(address, Access::Read)
    }

    /// Decode a write of `word` at `address`
    pub fn decode_write(address: u16, word: u16) -> Self {
        Self::decode(address, Access::Write(word))
    }
}
