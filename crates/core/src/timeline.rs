use crate::event::VideoEvent;
use crate::timestamp::{seconds_to_timestamp, Timestamp};
use serde::Serialize;

/// Position of one event's start along the playback bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerProjection {
    /// Index of the event in the canonical list.
    pub index: usize,
    /// `start / duration * 100`. Not clamped: a synthesis that assumed a
    /// different duration can land outside `0..=100`.
    pub position_percent: f64,
    pub start: Timestamp,
    /// Tooltip text, e.g. `person walking at 00:15`.
    pub title: String,
}

/// Read-only view joining the event list with the player's clock.
///
/// Every query recomputes from the borrowed slice, so it is safe to call on
/// each playback tick.
#[derive(Debug, Clone, Copy)]
pub struct TimelineIndex<'a> {
    events: &'a [VideoEvent],
    duration_secs: Option<f64>,
}

impl<'a> TimelineIndex<'a> {
    /// `duration_secs` is `None` until the player reports metadata.
    pub fn new(events: &'a [VideoEvent], duration_secs: Option<f64>) -> Self {
        Self {
            events,
            duration_secs,
        }
    }

    /// Duration usable as a divisor.
    fn known_duration(&self) -> Option<f64> {
        self.duration_secs
            .filter(|duration| duration.is_finite() && *duration > 0.0)
    }

    /// One marker per event, in list order. Empty while the duration is unknown.
    pub fn markers(&self) -> Vec<MarkerProjection> {
        let Some(duration) = self.known_duration() else {
            return Vec::new();
        };
        self.events
            .iter()
            .enumerate()
            .map(|(index, event)| MarkerProjection {
                index,
                position_percent: event.start.as_secs_f64() / duration * 100.0,
                start: event.start,
                title: format!("{} at {}", event.label, event.start),
            })
            .collect()
    }

    /// Indices of events whose `[start, end]` contains `current_secs`.
    pub fn active_indices(&self, current_secs: f64) -> Vec<usize> {
        self.events
            .iter()
            .enumerate()
            .filter(|(_, event)| event.contains(current_secs))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn active_events(&self, current_secs: f64) -> Vec<&'a VideoEvent> {
        self.events
            .iter()
            .filter(|event| event.contains(current_secs))
            .collect()
    }

    pub fn is_active(&self, index: usize, current_secs: f64) -> bool {
        self.events
            .get(index)
            .is_some_and(|event| event.contains(current_secs))
    }

    /// Where the player should seek when the Nth event is selected.
    pub fn seek_target(&self, index: usize) -> Option<Timestamp> {
        self.events.get(index).map(|event| event.start)
    }

    pub fn duration_label(&self) -> Option<String> {
        self.known_duration().map(seconds_to_timestamp)
    }

    pub fn position_label(current_secs: f64) -> String {
        seconds_to_timestamp(current_secs)
    }
}
