use crate::event::VideoEvent;
use crate::session::Sensitivity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no results to export")]
    NoResults,
    #[error("failed to encode export document: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Downloadable snapshot of a finished detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    /// Original file name of the video.
    pub video: String,
    pub detection_settings: ExportSettings,
    pub results: Vec<VideoEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSettings {
    /// The detection query.
    pub event: String,
    pub sensitivity: Sensitivity,
    pub confidence_threshold: u8,
}

impl ExportDocument {
    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// `detection-results-<unix-millis>.json`
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("detection-results-{}.json", at.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{DetectionSettings, Session};
    use crate::timestamp::Timestamp;
    use crate::video::VideoHandle;
    use chrono::TimeZone;
    use serde_json::Value;

    #[test]
    fn file_name_uses_unix_millis() {
        let at = Utc
            .timestamp_millis_opt(1_718_000_000_123)
            .single()
            .expect("valid millis");
        assert_eq!(
            export_file_name(at),
            "detection-results-1718000000123.json"
        );
    }

    #[test]
    fn empty_session_cannot_export() {
        let session = Session::new();
        assert!(matches!(session.export(), Err(ExportError::NoResults)));
    }

    #[test]
    fn document_has_camel_case_shape() {
        let mut session = Session::new();
        session.accept_video(VideoHandle::new("street.mp4", 4096));
        let ticket = session
            .begin_detection(
                "car driving",
                DetectionSettings {
                    sensitivity: Sensitivity::High,
                    confidence_threshold: 80,
                },
            )
            .expect("begin");
        session.complete(
            ticket.generation,
            vec![VideoEvent {
                label: "car driving".to_string(),
                start: Timestamp::from_seconds(45),
                end: Timestamp::from_seconds(49),
                confidence: 95,
                thumbnail: None,
            }],
        );

        let json = session
            .export()
            .expect("export")
            .to_json_pretty()
            .expect("encode");
        let value: Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(value["video"], "street.mp4");
        assert_eq!(value["detectionSettings"]["event"], "car driving");
        assert_eq!(value["detectionSettings"]["sensitivity"], "high");
        assert_eq!(value["detectionSettings"]["confidenceThreshold"], 80);
        assert_eq!(value["results"][0]["startTime"], "00:45");
        assert_eq!(value["results"][0]["endTime"], "00:49");
        assert_eq!(value["results"][0]["confidence"], 95);

        let back: ExportDocument = serde_json::from_str(&json).expect("decode");
        assert_eq!(back.results.len(), 1);
    }
}
