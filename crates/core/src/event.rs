use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

/// A single detected occurrence on the video timeline.
///
/// Events are never edited after synthesis; a new detection run replaces the
/// whole list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEvent {
    /// The query text that produced this event, in its original case.
    #[serde(rename = "event")]
    pub label: String,
    #[serde(rename = "startTime")]
    pub start: Timestamp,
    #[serde(rename = "endTime")]
    pub end: Timestamp,
    /// Percentage in `0..=100`.
    pub confidence: u8,
    /// Opaque reference to the preview image of the source video.
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl VideoEvent {
    /// Inclusive containment check against a playback position in seconds.
    pub fn contains(&self, seconds: f64) -> bool {
        self.start.as_secs_f64() <= seconds && seconds <= self.end.as_secs_f64()
    }

    pub fn duration_secs(&self) -> u32 {
        self.end.seconds().saturating_sub(self.start.seconds())
    }
}
