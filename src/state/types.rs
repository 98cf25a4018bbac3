//! State types for tracking replication progress
//!
//! Serialized as `{"bookmarks": {"<stream>": {"since": "<cursor>"}}}` and
//! persisted between runs.

use super::cursor::{Cursor, CursorValue};
use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Complete replication state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Per-stream bookmarks
    #[serde(default, deserialize_with = "without_null_bookmarks")]
    pub bookmarks: BTreeMap<String, Bookmark>,
}

/// Bookmark for a single stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Everything up to and including this instant has been emitted
    pub since: Cursor,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Current bookmark for a stream
    pub fn bookmark(&self, stream: &str) -> Option<Cursor> {
        self.bookmarks.get(stream).map(|b| b.since)
    }

    /// Move a stream's bookmark forward
    ///
    /// An absent candidate is a no-op. A candidate earlier than the stored
    /// bookmark is ignored. Returns whether the stored bookmark changed.
    pub fn advance(&mut self, stream: &str, candidate: Option<CursorValue>) -> Result<bool> {
        let Some(candidate) = candidate else {
            return Ok(false);
        };
        let candidate = candidate.to_cursor()?;

        match self.bookmarks.get_mut(stream) {
            Some(bookmark) if candidate < bookmark.since => Ok(false),
            Some(bookmark) => {
                let moved = candidate > bookmark.since;
                bookmark.since = candidate;
                Ok(moved)
            }
            None => {
                self.bookmarks
                    .insert(stream.to_string(), Bookmark { since: candidate });
                Ok(true)
            }
        }
    }

    /// Lower bound for the next incremental pull of a stream
    ///
    /// The stored bookmark wins, then the configured start date; `None`
    /// means no lower bound.
    pub fn starting_point(&self, stream: &str, start_date: Option<Cursor>) -> Option<Cursor> {
        self.bookmark(stream).or(start_date)
    }
}

/// Older state files carry `"stream": null` for streams never replicated
fn without_null_bookmarks<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, Bookmark>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: BTreeMap<String, Option<Bookmark>> = BTreeMap::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(stream, bookmark)| bookmark.map(|b| (stream, b)))
        .collect())
}
