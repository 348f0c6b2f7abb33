//! Packed data word codecs
//!
//! Every write to the peripheral set carries one 16-bit word. Depending on the
//! port, the word is split into bit fields:
//!
//! | Word      | bits 0-7        | bits 8-11      | bits 12-15 |
//! |-----------|-----------------|----------------|------------|
//! | Tone      | frequency code  | duration code  | wave type  |
//! | Combined  | frequency code  | sample id (8 bits, 8-15)    ||
//! | Mode      | key symbol      | audio mode     | wave type  |
//! | Color     | RGB-332         | unused         | unused     |

use crate::keys::AudioMode;
use crate::synth::WaveType;

/// Lowest frequency reachable by a frequency code (code 0)
pub const BASE_FREQUENCY_HZ: u16 = 220;

/// Frequency step per code unit
pub const FREQUENCY_STEP_HZ: u16 = 10;

/// Decode an 8-bit frequency code: `220 + code * 10` Hz (220 - 2770 Hz)
#[inline]
pub fn decode_frequency(code: u8) -> u16 {
    BASE_FREQUENCY_HZ + code as u16 * FREQUENCY_STEP_HZ
}

/// Decode a 4-bit duration code: `0.1 + code * 0.1` seconds (0.1 - 1.6 s)
///
/// Only the low nibble is used.
#[inline]
pub fn decode_duration(code: u8) -> f32 {
    ((code & 0x0F) as f32 + 1.0) / 10.0
}

/// Turn the low byte of a word into a key symbol (always lower-cased)
#[inline]
pub fn key_from_word(word: u16) -> char {
    ((word & 0xFF) as u8).to_ascii_lowercase() as char
}

/// True if the word fits in a byte and names a printable ASCII key
#[inline]
pub fn is_key_symbol(word: u16) -> bool {
    word <= 0xFF && (word as u8).is_ascii_graphic()
}

/// Play-frequency word (port 0x9001)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneWord {
    /// Frequency code (bits 0-7)
    pub frequency_code: u8,
    /// Duration code (bits 8-11)
    pub duration_code: u8,
    /// Wave type selector (bits 12-15, reduced mod 4)
    pub wave: WaveType,
}

impl ToneWord {
    /// Split a raw word into its fields
    pub fn from_word(word: u16) -> Self {
        ToneWord {
            frequency_code: (word & 0xFF) as u8,
            duration_code: ((word >> 8) & 0x0F) as u8,
            wave: WaveType::from_selector((word >> 12) as u8),
        }
    }

    /// Pack the fields back into a word
    pub fn to_word(&self) -> u16 {
        self.frequency_code as u16
            | ((self.duration_code as u16 & 0x0F) << 8)
            | ((self.wave as u16) << 12)
    }

    /// Decoded frequency in Hz
    pub fn frequency_hz(&self) -> u16 {
        decode_frequency(self.frequency_code)
    }

    /// Decoded duration in seconds
    pub fn duration_secs(&self) -> f32 {
        decode_duration(self.duration_code)
    }
}

/// Combined frequency + sample word (port 0x9009)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinedWord {
    /// Frequency code (bits 0-7)
    pub frequency_code: u8,
    /// Sample id (bits 8-15)
    pub sample_id: u8,
}

impl CombinedWord {
    /// Split a raw word into its fields
    pub fn from_word(word: u16) -> Self {
        CombinedWord {
            frequency_code: (word & 0xFF) as u8,
            sample_id: (word >> 8) as u8,
        }
    }

    /// Decoded frequency in Hz
    pub fn frequency_hz(&self) -> u16 {
        decode_frequency(self.frequency_code)
    }
}

/// Key mode word (port 0x900A)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeWord {
    /// Key symbol (bits 0-7, lower-cased)
    pub key: char,
    /// Audio mode (bits 8-11, mod 4; reserved value 3 reads as Frequency)
    pub mode: AudioMode,
    /// Raw mode selector after the mod-4 reduction (0-3)
    pub mode_selector: u8,
    /// Wave type (bits 12-15, mod 4)
    pub wave: WaveType,
}

impl ModeWord {
    /// Split a raw word into its fields
    pub fn from_word(word: u16) -> Self {
        let mode_selector = ((word >> 8) & 0x0F) as u8 % 4;
        ModeWord {
            key: key_from_word(word),
            mode: AudioMode::from_selector(mode_selector),
            mode_selector,
            wave: WaveType::from_selector((word >> 12) as u8),
        }
    }

    /// True when the mode field held the reserved value 3
    pub fn is_reserved_mode(&self) -> bool {
        self.mode_selector == 3
    }
}

/// RGB-332 packed color: 3 bits red, 3 bits green, 2 bits blue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb332(pub u8);

impl Rgb332 {
    /// Full white (the color of an unconfigured key)
    pub const WHITE: Rgb332 = Rgb332(0xFF);

    /// Take the low byte of a bus word
    pub fn from_word(word: u16) -> Self {
        Rgb332((word & 0xFF) as u8)
    }

    /// Quantize an 8-bit-per-channel color (lossy)
    pub fn encode(r: u8, g: u8, b: u8) -> Self {
        let r3 = (r as u16 * 7 + 127) / 255;
        let g3 = (g as u16 * 7 + 127) / 255;
        let b2 = (b as u16 * 3 + 127) / 255;
        Rgb332(((r3 << 5) | (g3 << 2) | b2) as u8)
    }

    /// Expand to 8 bits per channel: red and green ×36, blue ×85
    pub fn to_rgb(self) -> (u8, u8, u8) {
        let r = (self.0 >> 5) & 0x07;
        let g = (self.0 >> 2) & 0x07;
        let b = self.0 & 0x03;
        (r * 36, g * 36, b * 85)
    }

    /// The raw packed byte
    pub fn bits(self) -> u8 {
        self.0
    }
}
