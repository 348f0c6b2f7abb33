//! Frame Clock
//!
//! Splits the audio stream into display frames. When the sample rate is not
//! a multiple of the frame rate the remainder is carried, so frame lengths
//! differ by at most one sample and never drift.

use std::time::Duration;

/// Frame/sample position tracker
#[derive(Debug, Clone)]
pub struct FrameClock {
    sample_rate: u32,
    frame_rate: u32,
    /// Frames elapsed
    frame_count: u64,
    /// Samples handed out so far
    sample_count: u64,
}

impl FrameClock {
    /// Create a clock at frame zero
    pub fn new(sample_rate: u32, frame_rate: u32) -> Self {
        FrameClock {
            sample_rate: sample_rate.max(1),
            frame_rate: frame_rate.max(1),
            frame_count: 0,
            sample_count: 0,
        }
    }

    /// Advance one frame, returning the number of samples it spans
    pub fn advance_frame(&mut self) -> usize {
        self.frame_count += 1;
        let target = self.frame_count * self.sample_rate as u64 / self.frame_rate as u64;
        let samples = target - self.sample_count;
        self.sample_count = target;
        samples as usize
    }

    /// Frames elapsed
    pub fn get_frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Samples elapsed
    pub fn get_sample_count(&self) -> u64 {
        self.sample_count
    }

    /// Wall-clock length of one frame
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate as f64)
    }

    /// Get elapsed time in seconds
    pub fn get_elapsed_time(&self) -> f64 {
        self.sample_count as f64 / self.sample_rate as f64
    }

    /// Reset to frame zero
    pub fn reset(&mut self) {
        self.frame_count = 0;
        self.sample_count = 0;
    }
}
