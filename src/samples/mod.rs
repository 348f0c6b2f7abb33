//! Sample registry
//!
//! Numbered PCM samples that the CPU plays by id. The bank is an ordered map,
//! so listings and counts are stable and ids never need to be contiguous.

pub mod loader;

pub use loader::WavLoader;

use crate::Result;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// A mono PCM sample
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Display name (file stem when loaded from disk)
    pub name: String,
    /// Mono samples in `-1.0..=1.0`
    pub data: Arc<[f32]>,
    /// Rate the data was recorded at
    pub sample_rate: u32,
}

impl Sample {
    /// Build a sample from owned data
    pub fn new(name: impl Into<String>, data: Vec<f32>, sample_rate: u32) -> Self {
        Sample {
            name: name.into(),
            data: Arc::from(data),
            sample_rate,
        }
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the sample holds no frames
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Playback length in seconds
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.data.len() as f32 / self.sample_rate as f32
    }
}

/// Registry of samples keyed by id
#[derive(Debug, Clone, Default)]
pub struct SampleBank {
    samples: BTreeMap<u16, Sample>,
}

impl SampleBank {
    /// Create an empty bank
    pub fn new() -> Self {
        SampleBank {
            samples: BTreeMap::new(),
        }
    }

    /// Load every WAV file of a directory, ids assigned from 0 in name order
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        WavLoader::load_dir(dir)
    }

    /// Register a sample under an id, returning the sample it replaced
    pub fn insert(&mut self, id: u16, sample: Sample) -> Option<Sample> {
        self.samples.insert(id, sample)
    }

    /// Register a sample under the next free id after the highest in use
    ///
    /// Returns `None` when the id space is exhausted.
    pub fn push(&mut self, sample: Sample) -> Option<u16> {
        let id = match self.samples.keys().next_back() {
            Some(&last) => last.checked_add(1)?,
            None => 0,
        };
        self.samples.insert(id, sample);
        Some(id)
    }

    /// The sample registered under an id
    pub fn get(&self, id: u16) -> Option<&Sample> {
        self.samples.get(&id)
    }

    /// Number of registered samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if no samples are registered
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Registered samples in id order
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Sample)> + '_ {
        self.samples.iter().map(|(&id, sample)| (id, sample))
    }
}
