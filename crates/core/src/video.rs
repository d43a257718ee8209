use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Extensions accepted by the upload step, lower-case with a leading dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".mp4", ".webm", ".avi", ".mov", ".mkv"];

/// 500 MiB.
pub const MAX_FILE_SIZE_BYTES: u64 = 500 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VideoError {
    #[error("unsupported file format {extension:?}; use MP4, WebM, AVI, MOV, or MKV")]
    UnsupportedFormat { extension: String },
    #[error("file too large ({}); maximum size is {}", size_label(.size_bytes), size_label(.max_bytes))]
    TooLarge { size_bytes: u64, max_bytes: u64 },
}

/// A video accepted by the upload step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoHandle {
    pub name: String,
    pub size_bytes: u64,
    /// Preview image reference copied onto every synthesized event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl VideoHandle {
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            thumbnail: None,
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }
}

/// Upload acceptance rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoPolicy {
    supported_extensions: Vec<String>,
    max_size_bytes: u64,
}

impl Default for VideoPolicy {
    fn default() -> Self {
        Self {
            supported_extensions: SUPPORTED_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
            max_size_bytes: MAX_FILE_SIZE_BYTES,
        }
    }
}

impl VideoPolicy {
    /// Extensions are normalized to lower-case with a leading dot.
    pub fn new<S: AsRef<str>>(extensions: &[S], max_size_bytes: u64) -> Self {
        let supported_extensions = extensions
            .iter()
            .map(|ext| {
                let ext = ext.as_ref().trim().to_lowercase();
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{ext}")
                }
            })
            .collect();
        Self {
            supported_extensions,
            max_size_bytes,
        }
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    /// Check extension first, then size.
    pub fn validate(&self, video: &VideoHandle) -> Result<(), VideoError> {
        let extension = extension_of(&video.name);
        if !self.supported_extensions.contains(&extension) {
            return Err(VideoError::UnsupportedFormat { extension });
        }
        if video.size_bytes > self.max_size_bytes {
            return Err(VideoError::TooLarge {
                size_bytes: video.size_bytes,
                max_bytes: self.max_size_bytes,
            });
        }
        Ok(())
    }
}

/// Text after the last dot, lower-cased with a leading dot. A name without a
/// dot yields the whole name.
fn extension_of(name: &str) -> String {
    let tail = name.rsplit('.').next().unwrap_or(name);
    format!(".{}", tail.to_lowercase())
}

fn size_label(bytes: &u64) -> String {
    format_file_size(*bytes)
}

const SIZE_UNITS: &[&str] = &["Bytes", "KB", "MB", "GB"];

/// Human-readable size in base-1024 units, at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rendered = format!("{value:.2}");
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", SIZE_UNITS[unit])
}
