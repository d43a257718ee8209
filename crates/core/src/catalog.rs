//! Seed table of known phrases and their canned detections.
//!
//! Matching is first-match-wins over declaration order. Two entries that could
//! both match a query are disambiguated only by which one was declared first,
//! never by how specific the match is.

use crate::timestamp::Timestamp;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog entry has an empty key")]
    EmptyKey,
    #[error("catalog entry {key:?} has {offsets} offsets but {confidences} confidences")]
    LengthMismatch {
        key: String,
        offsets: usize,
        confidences: usize,
    },
}

/// One canned detection template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    key: String,
    offsets: Vec<Timestamp>,
    confidences: Vec<u8>,
}

impl CatalogEntry {
    /// Build an entry; the key is stored lower-cased.
    pub fn new(
        key: &str,
        offsets: Vec<Timestamp>,
        confidences: Vec<u8>,
    ) -> Result<Self, CatalogError> {
        let key = key.trim().to_lowercase();
        if key.is_empty() {
            return Err(CatalogError::EmptyKey);
        }
        if offsets.len() != confidences.len() {
            return Err(CatalogError::LengthMismatch {
                key,
                offsets: offsets.len(),
                confidences: confidences.len(),
            });
        }
        Ok(Self {
            key,
            offsets,
            confidences,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// `(offset, confidence)` pairs in declaration order.
    pub fn templates(&self) -> impl Iterator<Item = (Timestamp, u8)> + '_ {
        self.offsets
            .iter()
            .copied()
            .zip(self.confidences.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Decides whether a lower-cased query selects an entry.
pub type MatchPredicate = fn(&CatalogEntry, &str) -> bool;

/// The lower-cased query contains the key, or the key contains the query's
/// first whitespace-delimited token.
pub fn phrase_or_leading_token(entry: &CatalogEntry, lowered_query: &str) -> bool {
    if lowered_query.contains(entry.key()) {
        return true;
    }
    lowered_query
        .split_whitespace()
        .next()
        .is_some_and(|token| entry.key().contains(token))
}

#[derive(Debug, Clone)]
struct CatalogRule {
    predicate: MatchPredicate,
    entry: CatalogEntry,
}

const DEFAULT_ENTRIES: &[(&str, &[u32], &[u8])] = &[
    ("person walking", &[15, 83, 165], &[87, 92, 78]),
    ("car driving", &[45, 130], &[95, 89]),
    ("door opening", &[30, 110], &[84, 91]),
    ("phone ringing", &[65], &[96]),
];

/// Ordered list of `(predicate, template)` rules.
#[derive(Debug, Clone)]
pub struct EventCatalog {
    rules: Vec<CatalogRule>,
}

impl EventCatalog {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Catalog from the given entries, all using [`phrase_or_leading_token`].
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut catalog = Self::new();
        for entry in entries {
            catalog.push(entry);
        }
        catalog
    }

    /// Append an entry with the standard predicate. Later entries lose ties.
    pub fn push(&mut self, entry: CatalogEntry) {
        self.push_with(phrase_or_leading_token, entry);
    }

    pub fn push_with(&mut self, predicate: MatchPredicate, entry: CatalogEntry) {
        self.rules.push(CatalogRule { predicate, entry });
    }

    /// First entry whose predicate accepts `query`, scanning in declaration order.
    pub fn find_match(&self, query: &str) -> Option<&CatalogEntry> {
        let lowered = query.to_lowercase();
        self.rules
            .iter()
            .find(|rule| (rule.predicate)(&rule.entry, &lowered))
            .map(|rule| &rule.entry)
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.rules.iter().map(|rule| &rule.entry)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for EventCatalog {
    fn default() -> Self {
        Self::from_entries(DEFAULT_ENTRIES.iter().map(|(key, offsets, confidences)| {
            CatalogEntry {
                key: (*key).to_string(),
                offsets: offsets.iter().copied().map(Timestamp::from_seconds).collect(),
                confidences: confidences.to_vec(),
            }
        }))
    }
}
