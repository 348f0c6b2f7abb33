//! WAV Sample Loader
//!
//! Reads WAV files from disk into mono `f32` samples. Integer formats are
//! scaled by their bit depth; multi-channel files are mixed down by averaging.

use super::{Sample, SampleBank};
use crate::{Result, TonebusError};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Loads WAV samples from disk
pub struct WavLoader;

impl WavLoader {
    /// Load one WAV file as a mono sample named after its file stem
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Sample> {
        let path = path.as_ref();
        let mut reader = hound::WavReader::open(path).map_err(|e| {
            TonebusError::SampleError(format!("Failed to open '{}': {}", path.display(), e))
        })?;
        let spec = reader.spec();

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| Self::read_error(path, e))?,
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|e| Self::read_error(path, e))?
            }
        };

        let channels = spec.channels.max(1) as usize;
        let data: Vec<f32> = if channels == 1 {
            interleaved
        } else {
            interleaved
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                .collect()
        };

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        debug!(
            "loaded sample '{}': {} frames @ {} Hz, {} ch",
            name,
            data.len(),
            spec.sample_rate,
            spec.channels
        );
        Ok(Sample::new(name, data, spec.sample_rate))
    }

    /// Load all `*.wav` files in a directory into a bank
    ///
    /// Files are sorted by name; ids are assigned densely from 0.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<SampleBank> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| {
            TonebusError::SampleError(format!(
                "Failed to read sample directory '{}': {}",
                dir.display(),
                e
            ))
        })?;

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_wav = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("wav"))
                .unwrap_or(false);
            if path.is_file() && is_wav {
                paths.push(path);
            }
        }
        paths.sort();

        let mut bank = SampleBank::new();
        for path in paths {
            let sample = Self::load_file(&path)?;
            if bank.push(sample).is_none() {
                return Err(TonebusError::SampleError(
                    "Too many samples for 16-bit ids".to_string(),
                ));
            }
        }

        info!("loaded {} samples from {}", bank.len(), dir.display());
        Ok(bank)
    }

    fn read_error(path: &Path, e: hound::Error) -> TonebusError {
        TonebusError::SampleError(format!("Failed to decode '{}': {}", path.display(), e))
    }
}
