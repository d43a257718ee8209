//! Detector session lifecycle.
//!
//! ```text
//! Idle ──begin──▶ Detecting ──complete──▶ Ready
//!   ▲                 │  ▲                  │
//!   └──────clear──────┘  └──────begin───────┘
//! ```
//!
//! Events live inside [`SessionState::Ready`] only, so leaving `Ready` drops
//! them in the same assignment. Every `begin` takes a fresh generation number
//! and a completion is applied only when it carries the outstanding one.

use crate::event::VideoEvent;
use crate::export::{ExportDocument, ExportError, ExportSettings};
use crate::filter::ResultFilter;
use crate::timeline::TimelineIndex;
use crate::video::VideoHandle;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default "start detection" threshold shown on a fresh form.
pub const DEFAULT_CONFIDENCE_THRESHOLD: u8 = 75;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("invalid query: detection query is empty")]
    InvalidQuery,
    #[error("precondition failed: {0}")]
    Precondition(&'static str),
}

/// Detection sensitivity. Recorded and exported, not used by synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Low,
    #[default]
    Medium,
    High,
}

impl Sensitivity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sensitivity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown sensitivity {other:?}")),
        }
    }
}

/// Form settings that accompany a detection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionSettings {
    pub sensitivity: Sensitivity,
    /// Accepted and exported; synthesis ignores it.
    pub confidence_threshold: u8,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            sensitivity: Sensitivity::Medium,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Detecting { generation: u64 },
    Ready { generation: u64, events: Vec<VideoEvent> },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Detecting { .. } => "detecting",
            Self::Ready { .. } => "ready",
        }
    }
}

/// Everything a runner needs to produce results for one detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionTicket {
    pub generation: u64,
    pub query: String,
    pub thumbnail: Option<String>,
    /// Generation that this ticket superseded, if one was outstanding.
    pub superseded: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied { events: usize },
    /// The generation was cleared or superseded; the result was dropped.
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
    video: Option<VideoHandle>,
    source_query: String,
    settings: DetectionSettings,
    playback_duration_secs: Option<f64>,
    last_generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn video(&self) -> Option<&VideoHandle> {
        self.video.as_ref()
    }

    pub fn source_query(&self) -> &str {
        &self.source_query
    }

    pub fn settings(&self) -> DetectionSettings {
        self.settings
    }

    pub fn playback_duration_secs(&self) -> Option<f64> {
        self.playback_duration_secs
    }

    /// The generation currently being detected, if any.
    pub fn outstanding(&self) -> Option<u64> {
        match self.state {
            SessionState::Detecting { generation } => Some(generation),
            _ => None,
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.outstanding() == Some(generation)
    }

    /// Whether "start detection" is enabled: a video has been accepted.
    pub fn can_start_detection(&self) -> bool {
        self.video.is_some()
    }

    /// Canonical events; empty unless `Ready`.
    pub fn events(&self) -> &[VideoEvent] {
        match &self.state {
            SessionState::Ready { events, .. } => events,
            _ => &[],
        }
    }

    /// Attach a validated video. Any outstanding or finished detection belongs
    /// to the previous video and is discarded.
    pub fn accept_video(&mut self, video: VideoHandle) -> Option<u64> {
        let cancelled = self.outstanding();
        self.state = SessionState::Idle;
        self.video = Some(video);
        self.playback_duration_secs = None;
        cancelled
    }

    /// Move to `Detecting` under a new generation.
    ///
    /// Fails without touching state when the query is blank or no video has
    /// been accepted.
    pub fn begin_detection(
        &mut self,
        query: &str,
        settings: DetectionSettings,
    ) -> Result<DetectionTicket, SessionError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SessionError::InvalidQuery);
        }
        let Some(video) = &self.video else {
            return Err(SessionError::Precondition("no video has been accepted"));
        };
        let thumbnail = video.thumbnail.clone();

        let superseded = self.outstanding();
        self.last_generation += 1;
        let generation = self.last_generation;
        self.state = SessionState::Detecting { generation };
        self.source_query = query.to_string();
        self.settings = settings;

        Ok(DetectionTicket {
            generation,
            query: self.source_query.clone(),
            thumbnail,
            superseded,
        })
    }

    /// Install results for `generation`, or drop them if it is no longer outstanding.
    pub fn complete(&mut self, generation: u64, events: Vec<VideoEvent>) -> Completion {
        if !self.is_current(generation) {
            return Completion::Stale;
        }
        let count = events.len();
        self.state = SessionState::Ready { generation, events };
        Completion::Applied { events: count }
    }

    /// Return an outstanding detection to `Idle`, keeping the video.
    pub fn abandon(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.state = SessionState::Idle;
        true
    }

    /// Reset to a fresh form: no video, no results, default settings.
    /// Returns the generation that was outstanding, if any.
    pub fn clear(&mut self) -> Option<u64> {
        let cancelled = self.outstanding();
        self.state = SessionState::Idle;
        self.video = None;
        self.source_query.clear();
        self.settings = DetectionSettings::default();
        self.playback_duration_secs = None;
        cancelled
    }

    /// Record the real duration once the player has loaded metadata.
    pub fn set_playback_duration(&mut self, seconds: f64) {
        self.playback_duration_secs = Some(seconds);
    }

    pub fn timeline(&self) -> TimelineIndex<'_> {
        TimelineIndex::new(self.events(), self.playback_duration_secs)
    }

    pub fn visible(&self, filter: ResultFilter) -> Vec<&VideoEvent> {
        filter.visible(self.events())
    }

    pub fn export(&self) -> Result<ExportDocument, ExportError> {
        let events = self.events();
        if events.is_empty() {
            return Err(ExportError::NoResults);
        }
        let video = self.video.as_ref().ok_or(ExportError::NoResults)?;
        Ok(ExportDocument {
            video: video.name.clone(),
            detection_settings: ExportSettings {
                event: self.source_query.clone(),
                sensitivity: self.settings.sensitivity,
                confidence_threshold: self.settings.confidence_threshold,
            },
            results: events.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::Timestamp;

    fn event(start: u32, confidence: u8) -> VideoEvent {
        VideoEvent {
            label: "person walking".to_string(),
            start: Timestamp::from_seconds(start),
            end: Timestamp::from_seconds(start + 4),
            confidence,
            thumbnail: None,
        }
    }

    fn session_with_video() -> Session {
        let mut session = Session::new();
        session.accept_video(VideoHandle::new("clip.mp4", 2048));
        session
    }

    #[test]
    fn fresh_session_is_idle_and_disabled() {
        let session = Session::new();
        assert_eq!(session.state(), &SessionState::Idle);
        assert!(session.events().is_empty());
        assert!(!session.can_start_detection());
    }

    #[test]
    fn begin_requires_video() {
        let mut session = Session::new();
        let err = session
            .begin_detection("person walking", DetectionSettings::default())
            .unwrap_err();
        assert!(matches!(err, SessionError::Precondition(_)));
        assert_eq!(session.state(), &SessionState::Idle);
    }

    #[test]
    fn begin_rejects_blank_query() {
        let mut session = session_with_video();
        assert_eq!(
            session.begin_detection("   ", DetectionSettings::default()),
            Err(SessionError::InvalidQuery)
        );
        assert_eq!(session.state(), &SessionState::Idle);
    }

    #[test]
    fn detection_lifecycle_reaches_ready() {
        let mut session = session_with_video();
        let ticket = session
            .begin_detection("  person walking ", DetectionSettings::default())
            .expect("begin");
        assert_eq!(ticket.query, "person walking");
        assert_eq!(ticket.superseded, None);
        assert_eq!(session.state().name(), "detecting");
        assert!(session.events().is_empty());

        let outcome = session.complete(ticket.generation, vec![event(15, 87), event(83, 92)]);
        assert_eq!(outcome, Completion::Applied { events: 2 });
        assert_eq!(session.state().name(), "ready");
        assert_eq!(session.events().len(), 2);
    }

    #[test]
    fn new_detection_replaces_ready_results() {
        let mut session = session_with_video();
        let first = session
            .begin_detection("person walking", DetectionSettings::default())
            .expect("begin");
        session.complete(first.generation, vec![event(15, 87)]);

        let second = session
            .begin_detection("car driving", DetectionSettings::default())
            .expect("begin");
        assert!(second.generation > first.generation);
        assert!(session.events().is_empty());
        assert_eq!(session.source_query(), "car driving");
    }

    #[test]
    fn superseded_completion_is_dropped() {
        let mut session = session_with_video();
        let first = session
            .begin_detection("person walking", DetectionSettings::default())
            .expect("begin");
        let second = session
            .begin_detection("door opening", DetectionSettings::default())
            .expect("begin");
        assert_eq!(second.superseded, Some(first.generation));

        assert_eq!(
            session.complete(first.generation, vec![event(1, 80)]),
            Completion::Stale
        );
        assert_eq!(session.outstanding(), Some(second.generation));
        assert_eq!(
            session.complete(second.generation, vec![event(30, 84)]),
            Completion::Applied { events: 1 }
        );
        assert_eq!(
            session.complete(second.generation, vec![]),
            Completion::Stale
        );
        assert_eq!(session.events().len(), 1);
    }

    #[test]
    fn clear_discards_results_and_outstanding_work() {
        let mut session = session_with_video();
        let ticket = session
            .begin_detection("person walking", DetectionSettings::default())
            .expect("begin");
        session.complete(ticket.generation, vec![event(15, 87)]);
        assert_eq!(session.clear(), None);
        assert_eq!(session.state(), &SessionState::Idle);
        assert!(session.events().is_empty());
        assert!(!session.can_start_detection());

        let mut session = session_with_video();
        let ticket = session
            .begin_detection("person walking", DetectionSettings::default())
            .expect("begin");
        assert_eq!(session.clear(), Some(ticket.generation));
        assert_eq!(
            session.complete(ticket.generation, vec![event(15, 87)]),
            Completion::Stale
        );
        assert_eq!(session.state(), &SessionState::Idle);
        assert!(session.events().is_empty());
        assert_eq!(session.settings(), DetectionSettings::default());
    }

    #[test]
    fn accepting_a_new_video_drops_old_results() {
        let mut session = session_with_video();
        let ticket = session
            .begin_detection("person walking", DetectionSettings::default())
            .expect("begin");
        session.set_playback_duration(200.0);
        assert_eq!(
            session.accept_video(VideoHandle::new("other.webm", 10)),
            Some(ticket.generation)
        );
        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(session.playback_duration_secs(), None);
        assert_eq!(session.video().map(|v| v.name.as_str()), Some("other.webm"));
    }

    #[test]
    fn abandon_only_affects_outstanding_generation() {
        let mut session = session_with_video();
        let ticket = session
            .begin_detection("person walking", DetectionSettings::default())
            .expect("begin");
        assert!(!session.abandon(ticket.generation + 1));
        assert!(session.abandon(ticket.generation));
        assert_eq!(session.state(), &SessionState::Idle);
        assert!(session.can_start_detection());
    }

    #[test]
    fn views_follow_current_results() {
        let mut session = session_with_video();
        let ticket = session
            .begin_detection("person walking", DetectionSettings::default())
            .expect("begin");
        session.complete(ticket.generation, vec![event(10, 87), event(60, 70)]);
        session.set_playback_duration(120.0);

        assert_eq!(session.timeline().active_indices(12.0), vec![0]);
        assert_eq!(session.timeline().markers().len(), 2);
        assert_eq!(session.visible(ResultFilter::new(80)).len(), 1);
    }

    #[test]
    fn sensitivity_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Sensitivity>(), Ok(Sensitivity::High));
        assert_eq!("low".parse::<Sensitivity>(), Ok(Sensitivity::Low));
        assert!("extreme".parse::<Sensitivity>().is_err());
        assert_eq!(Sensitivity::default().to_string(), "medium");
    }
}
