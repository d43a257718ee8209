//! Stand-in detection generator.
//!
//! Catalog matches replay their canned offsets and confidences; anything else
//! gets a handful of random events spread over the assumed duration. Output
//! order is generation order and doubles as the event's identity ("the Nth
//! event") for anything rendered from the list.

use crate::catalog::{CatalogEntry, EventCatalog};
use crate::event::VideoEvent;
use crate::timestamp::Timestamp;
use thiserror::Error;

/// Placeholder duration used before the real one is known (three minutes).
pub const DEFAULT_ASSUMED_DURATION_SECS: u32 = 180;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    #[error("invalid query: detection query is empty")]
    InvalidQuery,
}

/// Source of uniformly distributed reals.
pub trait RandomSource {
    /// A value in `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;
}

/// [`RandomSource`] backed by `fastrand`.
#[derive(Debug, Clone)]
pub struct FastRandom(fastrand::Rng);

impl FastRandom {
    pub fn new() -> Self {
        Self(fastrand::Rng::new())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self(fastrand::Rng::with_seed(seed))
    }
}

impl Default for FastRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for FastRandom {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.0.f64()
    }
}

fn floor_uniform<R: RandomSource + ?Sized>(rng: &mut R, low: f64, high: f64) -> u32 {
    rng.uniform(low, high).floor().max(0.0) as u32
}

/// Event span in whole seconds, `2..=6`.
fn draw_span<R: RandomSource + ?Sized>(rng: &mut R) -> u32 {
    floor_uniform(rng, 2.0, 7.0)
}

#[derive(Debug, Clone)]
pub struct Synthesizer<'c> {
    catalog: &'c EventCatalog,
    assumed_duration_secs: u32,
}

impl<'c> Synthesizer<'c> {
    pub fn new(catalog: &'c EventCatalog) -> Self {
        Self {
            catalog,
            assumed_duration_secs: DEFAULT_ASSUMED_DURATION_SECS,
        }
    }

    pub fn with_assumed_duration(mut self, seconds: u32) -> Self {
        self.assumed_duration_secs = seconds;
        self
    }

    /// Produce events for `query`. Labels keep the query's original case.
    pub fn synthesize<R: RandomSource + ?Sized>(
        &self,
        query: &str,
        thumbnail: Option<&str>,
        rng: &mut R,
    ) -> Result<Vec<VideoEvent>, SynthesisError> {
        if query.trim().is_empty() {
            return Err(SynthesisError::InvalidQuery);
        }

        let events = match self.catalog.find_match(query) {
            Some(entry) => Self::replay(entry, query, thumbnail, rng),
            None => self.generate(query, thumbnail, rng),
        };
        Ok(events)
    }

    fn replay<R: RandomSource + ?Sized>(
        entry: &CatalogEntry,
        query: &str,
        thumbnail: Option<&str>,
        rng: &mut R,
    ) -> Vec<VideoEvent> {
        entry
            .templates()
            .map(|(offset, confidence)| VideoEvent {
                label: query.to_string(),
                start: offset,
                end: offset.saturating_add(draw_span(rng)),
                confidence,
                thumbnail: thumbnail.map(str::to_string),
            })
            .collect()
    }

    fn generate<R: RandomSource + ?Sized>(
        &self,
        query: &str,
        thumbnail: Option<&str>,
        rng: &mut R,
    ) -> Vec<VideoEvent> {
        let count = 2 + floor_uniform(rng, 0.0, 4.0);
        let duration = f64::from(self.assumed_duration_secs);
        (0..count)
            .map(|_| {
                let start = Timestamp::from_seconds(floor_uniform(rng, 0.0, duration));
                let end = start.saturating_add(draw_span(rng));
                let confidence = 75 + floor_uniform(rng, 0.0, 21.0).min(20) as u8;
                VideoEvent {
                    label: query.to_string(),
                    start,
                    end,
                    confidence,
                    thumbnail: thumbnail.map(str::to_string),
                }
            })
            .collect()
    }
}
