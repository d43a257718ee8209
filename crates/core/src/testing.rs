use crate::synth::RandomSource;
use crate::{Timestamp, VideoEvent, VideoHandle};

/// Small accepted video for tests.
pub fn video() -> VideoHandle {
    VideoHandle::new("clip.mp4", 1024 * 1024)
}

/// Event spanning `start..=end` seconds.
pub fn event(label: &str, start: u32, end: u32, confidence: u8) -> VideoEvent {
    VideoEvent {
        label: label.to_string(),
        start: Timestamp::from_seconds(start),
        end: Timestamp::from_seconds(end),
        confidence,
        thumbnail: None,
    }
}

/// [`RandomSource`] that always lands at the same fraction of the range.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.0
    }
}
