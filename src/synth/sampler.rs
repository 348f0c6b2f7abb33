//! Sample player
//!
//! One PCM slot played alongside the tone voice. Source data at any rate is
//! stepped through with linear interpolation to land on the output rate.

use std::sync::Arc;

/// Single-slot PCM player
#[derive(Debug, Clone)]
pub struct SamplePlayer {
    data: Option<Arc<[f32]>>,
    position: f64,
    step: f64,
    output_rate: u32,
}

impl SamplePlayer {
    /// Create an idle player for the given output rate
    pub fn new(output_rate: u32) -> Self {
        SamplePlayer {
            data: None,
            position: 0.0,
            step: 1.0,
            output_rate: output_rate.max(1),
        }
    }

    /// Start playing `data` recorded at `source_rate`, replacing any sample
    pub fn start(&mut self, data: Arc<[f32]>, source_rate: u32) {
        if data.is_empty() || source_rate == 0 {
            self.data = None;
            return;
        }
        self.step = source_rate as f64 / self.output_rate as f64;
        self.position = 0.0;
        self.data = Some(data);
    }

    /// Stop playback
    pub fn stop(&mut self) {
        self.data = None;
    }

    /// True while a sample is playing
    pub fn is_active(&self) -> bool {
        self.data.is_some()
    }

    /// Produce one output sample (0.0 when idle)
    pub fn render_next_sample(&mut self) -> f32 {
        let Some(data) = self.data.as_ref() else {
            return 0.0;
        };

        let index = self.position as usize;
        if index >= data.len() {
            self.data = None;
            return 0.0;
        }

        let frac = (self.position - index as f64) as f32;
        let current = data[index];
        let next = data.get(index + 1).copied().unwrap_or(current);
        let sample = current + (next - current) * frac;

        self.position += self.step;
        if self.position as usize >= data.len() {
            self.data = None;
        }
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_same_rate_plays_verbatim() {
        let mut player = SamplePlayer::new(44_100);
        player.start(Arc::from(vec![0.1f32, 0.2, 0.3]), 44_100);
        assert_relative_eq!(player.render_next_sample(), 0.1);
        assert_relative_eq!(player.render_next_sample(), 0.2);
        assert_relative_eq!(player.render_next_sample(), 0.3);
        assert!(!player.is_active());
        assert_eq!(player.render_next_sample(), 0.0);
    }

    #[test]
    fn test_half_rate_interpolates() {
        let mut player = SamplePlayer::new(44_100);
        player.start(Arc::from(vec![0.0f32, 1.0]), 22_050);
        assert_relative_eq!(player.render_next_sample(), 0.0);
        assert_relative_eq!(player.render_next_sample(), 0.5);
        assert_relative_eq!(player.render_next_sample(), 1.0);
        assert_relative_eq!(player.render_next_sample(), 1.0);
        assert!(!player.is_active());
    }

    #[test]
    fn test_empty_sample_is_ignored() {
        let mut player = SamplePlayer::new(44_100);
        player.start(Arc::from(Vec::<f32>::new()), 44_100);
        assert!(!player.is_active());
    }
}
