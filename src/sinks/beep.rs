//! Beep fallback
//!
//! For hosts without a mixing engine: every tone becomes one discrete beep
//! request of whole Hz and milliseconds. Samples cannot be beeped, so they
//! sound as a fixed tone for the sample's length.

use super::AudioSink;
use crate::samples::Sample;
use log::debug;
use std::ops::RangeInclusive;

/// One discrete beep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeepRequest {
    /// Frequency in Hz
    pub frequency_hz: u32,
    /// Length in milliseconds (at least 1)
    pub duration_ms: u32,
}

impl BeepRequest {
    /// Frequencies a beep device can represent
    pub const FREQUENCY_RANGE: RangeInclusive<u32> = 37..=32_767;

    /// Frequency substituted for anything outside [`Self::FREQUENCY_RANGE`]
    pub const DEFAULT_FREQUENCY_HZ: u32 = 440;

    /// Build a request, substituting the default for unrepresentable frequencies
    pub fn new(frequency_hz: f32, duration_secs: f32) -> Self {
        let rounded = frequency_hz.round();
        let frequency_hz = if rounded.is_finite()
            && rounded >= *Self::FREQUENCY_RANGE.start() as f32
            && rounded <= *Self::FREQUENCY_RANGE.end() as f32
        {
            rounded as u32
        } else {
            debug!(
                "beep: {} Hz not representable, using {} Hz",
                frequency_hz,
                Self::DEFAULT_FREQUENCY_HZ
            );
            Self::DEFAULT_FREQUENCY_HZ
        };

        let duration_ms = if duration_secs.is_finite() && duration_secs > 0.0 {
            ((duration_secs * 1000.0).round() as u32).max(1)
        } else {
            1
        };

        BeepRequest {
            frequency_hz,
            duration_ms,
        }
    }
}

/// Audio sink that turns requests into beeps handed to a callback
pub struct BeepSink<F>
where
    F: FnMut(BeepRequest),
{
    handler: F,
}

impl<F> BeepSink<F>
where
    F: FnMut(BeepRequest),
{
    /// Tone used for samples
    pub const SAMPLE_TONE_HZ: f32 = 200.0;

    /// Wrap a beep callback
    pub fn new(handler: F) -> Self {
        BeepSink { handler }
    }
}

impl<F> AudioSink for BeepSink<F>
where
    F: FnMut(BeepRequest),
{
    fn play_tone(&mut self, frequency_hz: f32, duration_secs: f32, _volume: f32) {
        (self.handler)(BeepRequest::new(frequency_hz, duration_secs));
    }

    fn play_sample(&mut self, _id: u16, sample: &Sample) {
        (self.handler)(BeepRequest::new(
            Self::SAMPLE_TONE_HZ,
            sample.duration_secs(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(requests: &mut Vec<BeepRequest>, f: impl FnOnce(&mut dyn AudioSink)) {
        let mut sink = BeepSink::new(|r| requests.push(r));
        f(&mut sink);
    }

    #[test]
    fn test_tone_becomes_beep() {
        let mut requests = Vec::new();
        collect(&mut requests, |sink| sink.play_tone(440.0, 0.1, 1.0));
        assert_eq!(
            requests,
            vec![BeepRequest {
                frequency_hz: 440,
                duration_ms: 100
            }]
        );
    }

    #[test]
    fn test_out_of_range_falls_back() {
        assert_eq!(BeepRequest::new(20.0, 0.5).frequency_hz, 440);
        assert_eq!(BeepRequest::new(40_000.0, 0.5).frequency_hz, 440);
        assert_eq!(BeepRequest::new(f32::NAN, 0.5).frequency_hz, 440);
        assert_eq!(BeepRequest::new(37.0, 0.5).frequency_hz, 37);
        assert_eq!(BeepRequest::new(32_767.0, 0.5).frequency_hz, 32_767);
    }

    #[test]
    fn test_duration_at_least_one_ms() {
        assert_eq!(BeepRequest::new(440.0, 0.0).duration_ms, 1);
        assert_eq!(BeepRequest::new(440.0, 0.0001).duration_ms, 1);
        assert_eq!(BeepRequest::new(440.0, 1.6).duration_ms, 1600);
    }

    #[test]
    fn test_sample_sounds_as_tone() {
        let mut requests = Vec::new();
        let sample = Sample::new("kick", vec![0.0; 22_050], 44_100);
        collect(&mut requests, |sink| sink.play_sample(3, &sample));
        assert_eq!(
            requests,
            vec![BeepRequest {
                frequency_hz: 200,
                duration_ms: 500
            }]
        );
    }
}
