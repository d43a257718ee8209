//! `MM:SS` timestamp codec.
//!
//! Minutes are zero-padded to width 2 and simply grow wider past 99, so
//! `6000` seconds renders as `"100:00"` rather than overflowing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("malformed timestamp {input:?}: expected MM:SS")]
    MissingSeparator { input: String },
    #[error("malformed timestamp {input:?}: {part} is not a number")]
    NotNumeric { input: String, part: &'static str },
}

/// Render a non-negative number of seconds as `MM:SS`.
///
/// Fractional seconds are truncated. Negative or NaN input renders as `00:00`.
pub fn seconds_to_timestamp(seconds: f64) -> String {
    let seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };
    let mins = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{mins:02}:{secs:02}")
}

/// Parse `MM:SS` into whole seconds.
pub fn timestamp_to_seconds(timestamp: &str) -> Result<u32, TimestampError> {
    let (mins, secs) =
        timestamp
            .split_once(':')
            .ok_or_else(|| TimestampError::MissingSeparator {
                input: timestamp.to_string(),
            })?;
    let mins: u32 = mins.parse().map_err(|_| TimestampError::NotNumeric {
        input: timestamp.to_string(),
        part: "minutes",
    })?;
    let secs: u32 = secs.parse().map_err(|_| TimestampError::NotNumeric {
        input: timestamp.to_string(),
        part: "seconds",
    })?;
    Ok(mins.saturating_mul(60).saturating_add(secs))
}

/// Shift a `MM:SS` timestamp by `delta` seconds (floored), saturating at zero.
pub fn add_seconds(timestamp: &str, delta: f64) -> Result<String, TimestampError> {
    let base = timestamp_to_seconds(timestamp)? as f64;
    Ok(seconds_to_timestamp(base + delta.floor()))
}

/// Whole-second position on the playback timeline.
///
/// Displays and serializes as `MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u32);

impl Timestamp {
    pub const fn from_seconds(seconds: u32) -> Self {
        Self(seconds)
    }

    pub const fn seconds(self) -> u32 {
        self.0
    }

    pub fn as_secs_f64(self) -> f64 {
        f64::from(self.0)
    }

    pub const fn saturating_add(self, seconds: u32) -> Self {
        Self(self.0.saturating_add(seconds))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        timestamp_to_seconds(s).map(Self)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
