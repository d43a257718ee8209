//! Shared detector/CLI configuration types.
//!
//! `eventscope-detector` and the `eventscope` CLI both read `eventscope.toml`
//! through these types. Turning the raw values into domain objects (catalog
//! entries, video policy, timing profiles) happens in the consuming crates.

use serde::{Deserialize, Serialize};

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "eventscope.toml";

/// Top-level configuration (persisted as `eventscope.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EventscopeConfig {
    #[serde(default)]
    pub detection: DetectionDefaults,
    #[serde(default)]
    pub upload: UploadSettings,
    #[serde(default)]
    pub processing: ProcessingSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionDefaults {
    /// Placeholder video length used by random synthesis.
    #[serde(default = "default_assumed_duration")]
    pub assumed_duration_secs: u32,
    #[serde(default = "default_sensitivity")]
    pub sensitivity: String,
    /// "Start detection" threshold; recorded in exports only.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: u8,
    /// Initial result-filter threshold.
    #[serde(default)]
    pub min_confidence: u8,
}

impl Default for DetectionDefaults {
    fn default() -> Self {
        Self {
            assumed_duration_secs: default_assumed_duration(),
            sensitivity: default_sensitivity(),
            confidence_threshold: default_confidence_threshold(),
            min_confidence: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadSettings {
    #[serde(default = "default_upload_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_upload_max_increment")]
    pub max_increment: f64,
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
    #[serde(default = "default_supported_extensions")]
    pub supported_extensions: Vec<String>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            tick_ms: default_upload_tick_ms(),
            max_increment: default_upload_max_increment(),
            max_file_size_bytes: default_max_file_size(),
            supported_extensions: default_supported_extensions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessingSettings {
    #[serde(default = "default_processing_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_processing_max_increment")]
    pub max_increment: f64,
    /// Pause between reaching 100% and publishing results.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            tick_ms: default_processing_tick_ms(),
            max_increment: default_processing_max_increment(),
            settle_ms: default_settle_ms(),
        }
    }
}

/// Optional replacement for the built-in phrase catalog. Order is match order.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CatalogSettings {
    #[serde(default)]
    pub entries: Vec<CatalogEntrySettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntrySettings {
    pub key: String,
    /// `MM:SS` offsets.
    #[serde(default)]
    pub timestamps: Vec<String>,
    #[serde(default)]
    pub confidences: Vec<u8>,
}

// ── Serde default functions ─────────────────────────────────────────────

fn default_assumed_duration() -> u32 {
    180
}
fn default_sensitivity() -> String {
    "medium".to_string()
}
fn default_confidence_threshold() -> u8 {
    75
}
fn default_upload_tick_ms() -> u64 {
    200
}
fn default_upload_max_increment() -> f64 {
    20.0
}
fn default_max_file_size() -> u64 {
    500 * 1024 * 1024
}
fn default_processing_tick_ms() -> u64 {
    300
}
fn default_processing_max_increment() -> f64 {
    15.0
}
fn default_settle_ms() -> u64 {
    500
}

pub const DEFAULT_SUPPORTED_EXTENSIONS: &[&str] = &[".mp4", ".webm", ".avi", ".mov", ".mkv"];

pub fn default_supported_extensions() -> Vec<String> {
    DEFAULT_SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| (*ext).to_string())
        .collect()
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Repair values that would stall or break the runtime after loading raw TOML.
/// Returns true when any field was updated.
pub fn apply_compat_fallbacks(config: &mut EventscopeConfig) -> bool {
    let mut changed = false;

    if config.detection.assumed_duration_secs == 0 {
        config.detection.assumed_duration_secs = default_assumed_duration();
        changed = true;
    }
    if config.detection.confidence_threshold > 100 {
        config.detection.confidence_threshold = 100;
        changed = true;
    }
    if config.detection.min_confidence > 100 {
        config.detection.min_confidence = 100;
        changed = true;
    }

    // tokio intervals reject a zero period.
    if config.upload.tick_ms == 0 {
        config.upload.tick_ms = 1;
        changed = true;
    }
    if config.processing.tick_ms == 0 {
        config.processing.tick_ms = 1;
        changed = true;
    }
    if !is_positive(config.upload.max_increment) {
        config.upload.max_increment = default_upload_max_increment();
        changed = true;
    }
    if !is_positive(config.processing.max_increment) {
        config.processing.max_increment = default_processing_max_increment();
        changed = true;
    }

    if config.upload.supported_extensions.is_empty() {
        config.upload.supported_extensions = default_supported_extensions();
        changed = true;
    }

    changed
}
