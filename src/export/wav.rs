//! WAV file export functionality

use crate::synth::SynthRenderer;
use crate::{Result, TonebusError};
use log::info;
use std::path::Path;

/// Write interleaved samples to a 16-bit PCM WAV file
///
/// # Examples
///
/// ```no_run
/// use tonebus::export::write_wav;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let silence = vec![0.0f32; 2 * 44_100];
/// write_wav("silence.wav", &silence, 44_100, 2)?;
/// # Ok(())
/// # }
/// ```
pub fn write_wav<P: AsRef<Path>>(
    path: P,
    samples: &[f32],
    sample_rate: u32,
    channels: u16,
) -> Result<()> {
    let path = path.as_ref();
    let mut writer = create_writer(path, sample_rate, channels)?;

    for &sample in samples {
        writer
            .write_sample(to_i16(sample))
            .map_err(|e| TonebusError::AudioFileError(format!("Failed to write sample: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| TonebusError::AudioFileError(format!("Failed to finalize WAV file: {}", e)))?;

    info!(
        "wrote {} frames to {}",
        samples.len() / channels.max(1) as usize,
        path.display()
    );
    Ok(())
}

/// Render `frames` frames straight from a renderer into a WAV file
///
/// Samples are generated and written in chunks, so long renders do not
/// need the whole signal in memory.
pub fn render_to_wav<P: AsRef<Path>>(
    renderer: &mut SynthRenderer,
    path: P,
    frames: usize,
    channels: u16,
) -> Result<()> {
    const FRAMES_PER_CHUNK: usize = 4096;

    let path = path.as_ref();
    let channels = channels.max(1);
    let mut writer = create_writer(path, renderer.sample_rate(), channels)?;
    let mut buffer = vec![0.0f32; FRAMES_PER_CHUNK * channels as usize];

    let mut written = 0;
    while written < frames {
        let chunk = (frames - written).min(FRAMES_PER_CHUNK);
        let slice = &mut buffer[..chunk * channels as usize];
        renderer.render_interleaved(slice, channels);

        for &sample in slice.iter() {
            writer
                .write_sample(to_i16(sample))
                .map_err(|e| TonebusError::AudioFileError(format!("Failed to write sample: {}", e)))?;
        }
        written += chunk;
    }

    writer
        .finalize()
        .map_err(|e| TonebusError::AudioFileError(format!("Failed to finalize WAV file: {}", e)))?;
    Ok(())
}

fn create_writer(
    path: &Path,
    sample_rate: u32,
    channels: u16,
) -> Result<hound::WavWriter<std::io::BufWriter<std::fs::File>>> {
    let spec = hound::WavSpec {
        channels: channels.max(1),
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    hound::WavWriter::create(path, spec).map_err(|e| {
        TonebusError::AudioFileError(format!(
            "Failed to create WAV file '{}': {}",
            path.display(),
            e
        ))
    })
}

#[inline]
fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}
