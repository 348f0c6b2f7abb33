//! Audio device integration using rodio
//!
//! The rodio source owns the synth renderer, so every sample the device asks
//! for is generated on its own thread with no buffering in between.

use super::StreamConfig;
use crate::synth::SynthRenderer;
use crate::{Result, TonebusError};
use rodio::{OutputStream, Sink, Source};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Audio source that pulls from a synth renderer
struct SynthSource {
    renderer: SynthRenderer,
    channels: u16,
    /// Channel of the current frame handed out next
    channel: u16,
    /// Mono sample of the current frame
    current: f32,
    finished: Arc<AtomicBool>,
}

impl SynthSource {
    fn new(renderer: SynthRenderer, channels: u16, finished: Arc<AtomicBool>) -> Self {
        SynthSource {
            renderer,
            channels: channels.max(1),
            channel: 0,
            current: 0.0,
            finished,
        }
    }
}

impl Source for SynthSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.renderer.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

impl Iterator for SynthSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.channel == 0 {
            if self.finished.load(Ordering::Relaxed) {
                return None;
            }
            self.current = self.renderer.render_next_sample();
        }
        self.channel = (self.channel + 1) % self.channels;
        Some(self.current)
    }
}

/// Audio playback device using rodio
pub struct AudioDevice {
    _stream: OutputStream,
    sink: Sink,
    finished: Arc<AtomicBool>,
}

impl AudioDevice {
    /// Open the default output device and start pulling from `renderer`
    pub fn new(config: StreamConfig, renderer: SynthRenderer) -> Result<Self> {
        if renderer.sample_rate() != config.sample_rate {
            return Err(TonebusError::AudioDeviceError(format!(
                "renderer runs at {} Hz, stream configured for {} Hz",
                renderer.sample_rate(),
                config.sample_rate
            )));
        }

        let (stream, stream_handle) = OutputStream::try_default().map_err(|e| {
            TonebusError::AudioDeviceError(format!("Failed to create audio stream: {}", e))
        })?;

        let sink = Sink::try_new(&stream_handle).map_err(|e| {
            TonebusError::AudioDeviceError(format!("Failed to create audio sink: {}", e))
        })?;

        let finished = Arc::new(AtomicBool::new(false));
        sink.append(SynthSource::new(
            renderer,
            config.channels,
            Arc::clone(&finished),
        ));

        Ok(AudioDevice {
            _stream: stream,
            sink,
            finished,
        })
    }

    /// Pause playback
    pub fn pause(&self) {
        self.sink.pause();
    }

    /// Resume playback
    pub fn play(&self) {
        self.sink.play();
    }

    /// Signal that no more samples will be produced
    pub fn finish(&self) {
        self.finished.store(true, Ordering::Relaxed);
    }

    /// Block until the source has ended (call [`Self::finish`] first)
    pub fn wait_for_finish(&self) {
        self.sink.sleep_until_end();
    }
}

impl Drop for AudioDevice {
    fn drop(&mut self) {
        self.finish();
        self.sink.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PeripheralConfig;
    use crate::synth::synth_channel;

    #[test]
    fn test_source_interleaves_frames() {
        let (mut controller, renderer) = synth_channel(&PeripheralConfig::default());
        controller.play_tone(440.0, 0.1, 1.0);
        let mut source = SynthSource::new(renderer, 2, Arc::new(AtomicBool::new(false)));
        for _ in 0..500 {
            let left = source.next().unwrap();
            let right = source.next().unwrap();
            assert_eq!(left, right);
        }
    }

    #[test]
    fn test_source_stops_on_frame_boundary() {
        let (_controller, renderer) = synth_channel(&PeripheralConfig::default());
        let finished = Arc::new(AtomicBool::new(false));
        let mut source = SynthSource::new(renderer, 2, Arc::clone(&finished));
        source.next();
        finished.store(true, Ordering::Relaxed);
        assert!(source.next().is_some());
        assert!(source.next().is_none());
    }

    #[test]
    fn test_device_creation() {
        let (_controller, renderer) = synth_channel(&PeripheralConfig::default());
        match AudioDevice::new(StreamConfig::default(), renderer) {
            Ok(device) => device.finish(),
            Err(err) => eprintln!("Skipping audio device test (backend unavailable): {}", err),
        }
    }
}
