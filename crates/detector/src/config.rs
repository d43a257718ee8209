use eventscope_core::{CatalogEntry, EventCatalog, Timestamp, VideoPolicy};
use eventscope_runtime_config::{CatalogSettings, EventscopeConfig};
use std::time::Duration;

use crate::DetectorError;

/// Cadence of one simulated progress bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingProfile {
    pub tick: Duration,
    /// Each tick adds `uniform(0, max_increment)` percent.
    pub max_increment: f64,
    /// Delay between reaching 100% and publishing.
    pub settle: Duration,
}

impl TimingProfile {
    /// Ticks as fast as the timer allows; used by tests and scripted runs.
    pub fn instant() -> Self {
        Self {
            tick: Duration::from_millis(1),
            max_increment: 50.0,
            settle: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    pub assumed_duration_secs: u32,
    pub upload: TimingProfile,
    pub processing: TimingProfile,
    pub video_policy: VideoPolicy,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::from(&EventscopeConfig::default())
    }
}

impl From<&EventscopeConfig> for DetectorConfig {
    fn from(config: &EventscopeConfig) -> Self {
        Self {
            assumed_duration_secs: config.detection.assumed_duration_secs,
            upload: TimingProfile {
                tick: Duration::from_millis(config.upload.tick_ms.max(1)),
                max_increment: config.upload.max_increment,
                settle: Duration::ZERO,
            },
            processing: TimingProfile {
                tick: Duration::from_millis(config.processing.tick_ms.max(1)),
                max_increment: config.processing.max_increment,
                settle: Duration::from_millis(config.processing.settle_ms),
            },
            video_policy: VideoPolicy::new(
                &config.upload.supported_extensions,
                config.upload.max_file_size_bytes,
            ),
        }
    }
}

/// Build the phrase catalog from config, falling back to the built-in table
/// when no entries are configured.
pub fn build_catalog(settings: &CatalogSettings) -> Result<EventCatalog, DetectorError> {
    if settings.entries.is_empty() {
        return Ok(EventCatalog::default());
    }

    let mut catalog = EventCatalog::new();
    for entry in &settings.entries {
        let offsets = entry
            .timestamps
            .iter()
            .map(|raw| raw.parse::<Timestamp>())
            .collect::<Result<Vec<_>, _>>()?;
        catalog.push(CatalogEntry::new(
            &entry.key,
            offsets,
            entry.confidences.clone(),
        )?);
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventscope_core::VideoHandle;
    use eventscope_runtime_config::CatalogEntrySettings;

    #[test]
    fn default_profiles_follow_runtime_defaults() {
        let config = DetectorConfig::default();
        assert_eq!(config.assumed_duration_secs, 180);
        assert_eq!(config.upload.tick, Duration::from_millis(200));
        assert_eq!(config.upload.settle, Duration::ZERO);
        assert_eq!(config.processing.tick, Duration::from_millis(300));
        assert_eq!(config.processing.settle, Duration::from_millis(500));
        assert!(config
            .video_policy
            .validate(&VideoHandle::new("clip.mkv", 1))
            .is_ok());
    }

    #[test]
    fn empty_catalog_settings_use_builtin_catalog() {
        let catalog = build_catalog(&CatalogSettings::default()).expect("catalog");
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn configured_catalog_replaces_builtin() {
        let settings = CatalogSettings {
            entries: vec![CatalogEntrySettings {
                key: "Dog Barking".to_string(),
                timestamps: vec!["00:05".to_string(), "01:10".to_string()],
                confidences: vec![88, 91],
            }],
        };
        let catalog = build_catalog(&settings).expect("catalog");
        assert_eq!(catalog.len(), 1);
        assert!(catalog.find_match("person walking").is_none());
        let entry = catalog.find_match("dog barking loudly").expect("match");
        assert_eq!(entry.key(), "dog barking");
    }

    #[test]
    fn malformed_catalog_settings_are_rejected() {
        let bad_timestamp = CatalogSettings {
            entries: vec![CatalogEntrySettings {
                key: "dog".to_string(),
                timestamps: vec!["5s".to_string()],
                confidences: vec![88],
            }],
        };
        assert!(matches!(
            build_catalog(&bad_timestamp),
            Err(DetectorError::Timestamp(_))
        ));

        let mismatched = CatalogSettings {
            entries: vec![CatalogEntrySettings {
                key: "dog".to_string(),
                timestamps: vec!["00:05".to_string()],
                confidences: vec![],
            }],
        };
        assert!(matches!(
            build_catalog(&mismatched),
            Err(DetectorError::Catalog(_))
        ));
    }
}
