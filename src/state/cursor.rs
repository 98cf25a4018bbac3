//! Canonical replication cursor
//!
//! The API hands back progress markers in several shapes: epoch seconds on
//! legacy timelines, RFC 3339 strings with offsets on revisioned resources,
//! and bare `YYYY-MM-DD HH:MM:SS` values on older payloads. Every one of them
//! is converted to a [`Cursor`] (a UTC instant truncated to whole seconds)
//! at ingestion, so bookmarks are only ever compared temporally.

use crate::error::{Error, Result};
use crate::types::{JsonValue, Record};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Wire format of a cursor
pub const CURSOR_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A replication watermark
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor(DateTime<Utc>);

impl Cursor {
    /// Build a cursor from epoch seconds
    pub fn from_epoch(seconds: i64) -> Result<Self> {
        DateTime::from_timestamp(seconds, 0)
            .map(Self)
            .ok_or_else(|| Error::state(format!("epoch {seconds} is out of range")))
    }

    /// Build a cursor from any UTC instant
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        // Sub-second precision never survives the wire format
        Self(DateTime::from_timestamp(at.timestamp(), 0).unwrap_or(at))
    }

    /// Parse a formatted timestamp
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();

        if let Ok(at) = DateTime::parse_from_rfc3339(text) {
            return Ok(Self::from_datetime(at.with_timezone(&Utc)));
        }
        if let Ok(at) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%z") {
            return Ok(Self::from_datetime(at.with_timezone(&Utc)));
        }
        for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
                return Ok(Self::from_datetime(naive.and_utc()));
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return Ok(Self::from_datetime(midnight.and_utc()));
            }
        }
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(seconds) = text.parse::<i64>() {
                return Self::from_epoch(seconds);
            }
        }

        Err(Error::state(format!("unrecognised timestamp '{text}'")))
    }

    /// Interpret a JSON scalar as a cursor
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::String(s) => Self::parse(s).ok(),
            JsonValue::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .and_then(|secs| Self::from_epoch(secs).ok()),
            _ => None,
        }
    }

    /// Epoch seconds
    pub fn epoch(&self) -> i64 {
        self.0.timestamp()
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(CURSOR_FORMAT))
    }
}

impl FromStr for Cursor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Cursor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Cursor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Epoch(i64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Cursor::parse(&text).map_err(serde::de::Error::custom),
            Raw::Epoch(seconds) => Cursor::from_epoch(seconds).map_err(serde::de::Error::custom),
        }
    }
}

/// A bookmark candidate as it arrives from a payload or caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorValue {
    /// Epoch seconds
    Epoch(i64),
    /// A formatted timestamp
    Text(String),
    /// Already canonical
    Cursor(Cursor),
}

impl CursorValue {
    /// Convert to the canonical representation
    pub fn to_cursor(&self) -> Result<Cursor> {
        match self {
            Self::Epoch(seconds) => Cursor::from_epoch(*seconds),
            Self::Text(text) => Cursor::parse(text),
            Self::Cursor(cursor) => Ok(*cursor),
        }
    }
}

impl From<i64> for CursorValue {
    fn from(seconds: i64) -> Self {
        Self::Epoch(seconds)
    }
}

impl From<&str> for CursorValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for CursorValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Cursor> for CursorValue {
    fn from(cursor: Cursor) -> Self {
        Self::Cursor(cursor)
    }
}

/// Fields consulted on the last record of a batch, most trusted first
const LATEST_FIELDS: [&str; 3] = ["updated", "timestamp", "datetime"];

/// Derive the bookmark candidate from the last record of a batch
///
/// `updated` wins over a raw `timestamp`; a field that is present but
/// unparseable falls through to the next one.
pub fn latest(batch: &[Record]) -> Option<Cursor> {
    let last = batch.last()?;

    for field in LATEST_FIELDS {
        let Some(value) = last.get(field) else {
            continue;
        };
        match Cursor::from_json(value) {
            Some(cursor) => return Some(cursor),
            None if !value.is_null() => {
                warn!(field, value = %value, "Ignoring unparseable bookmark field");
            }
            None => {}
        }
    }

    None
}
