//! Messages of the record-stream protocol

use crate::types::{JsonValue, Record};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One line of output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Describes a stream; precedes its records
    Schema {
        stream: String,
        schema: JsonValue,
        key_properties: Vec<String>,
    },
    /// One normalized record
    Record {
        stream: String,
        record: Record,
        time_extracted: String,
    },
    /// Replication state after a flushed bookmark update
    State { value: JsonValue },
}

impl Message {
    /// Create a schema message
    pub fn schema(
        stream: impl Into<String>,
        schema: JsonValue,
        key_properties: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::Schema {
            stream: stream.into(),
            schema,
            key_properties: key_properties.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a record message extracted at `time_extracted`
    pub fn record(stream: impl Into<String>, record: Record, time_extracted: &str) -> Self {
        Self::Record {
            stream: stream.into(),
            record,
            time_extracted: time_extracted.to_string(),
        }
    }

    /// Create a state message
    pub fn state(value: JsonValue) -> Self {
        Self::State { value }
    }

    /// Stream this message belongs to, if any
    pub fn stream(&self) -> Option<&str> {
        match self {
            Self::Schema { stream, .. } | Self::Record { stream, .. } => Some(stream),
            Self::State { .. } => None,
        }
    }

    /// Check if this is a record message
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }

    /// Check if this is a state message
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State { .. })
    }
}

/// Extraction timestamp in the protocol's format
pub fn extraction_time() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
