use crate::event::VideoEvent;
use serde::{Deserialize, Serialize};

/// Confidence cutoff deriving the visible subset of results.
///
/// Thresholds above 100 are allowed and hide everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResultFilter {
    pub min_confidence: u32,
}

impl ResultFilter {
    pub fn new(min_confidence: u32) -> Self {
        Self { min_confidence }
    }

    pub fn accepts(&self, event: &VideoEvent) -> bool {
        u32::from(event.confidence) >= self.min_confidence
    }

    /// Visible events in their canonical order.
    pub fn visible<'a>(&self, events: &'a [VideoEvent]) -> Vec<&'a VideoEvent> {
        events.iter().filter(|event| self.accepts(event)).collect()
    }

    pub fn visible_indices(&self, events: &[VideoEvent]) -> Vec<usize> {
        events
            .iter()
            .enumerate()
            .filter(|(_, event)| self.accepts(event))
            .map(|(index, _)| index)
            .collect()
    }
}

/// Display bucket for a confidence value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn of(confidence: u8) -> Self {
        match confidence {
            90.. => Self::High,
            75..=89 => Self::Medium,
            _ => Self::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}
