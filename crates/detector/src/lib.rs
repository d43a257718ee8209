//! Async runtime around an eventscope [`Session`](eventscope_core::Session).
//!
//! Upload and detection progress are simulated by timer tasks. Each task can
//! be cancelled, and starting a detection or clearing the session cancels the
//! in-flight one before the new state becomes visible. Results are published
//! through the session's generation check, so a task that loses a race with a
//! clear never writes into the cleared session.

mod config;
mod detector;

pub use config::{build_catalog, DetectorConfig, TimingProfile};
pub use detector::{DetectionHandle, DetectionOutcome, Detector, UploadOutcome};

use eventscope_core::{CatalogError, SessionError, TimestampError, VideoError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error(transparent)]
    Video(#[from] VideoError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("invalid catalog timestamp: {0}")]
    Timestamp(#[from] TimestampError),
}
