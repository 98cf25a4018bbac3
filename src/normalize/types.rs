//! Normalizer types and traits

use crate::error::{Error, Result};
use crate::types::{JsonValue, Record};

/// Per-page facts a normalizer may need
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeContext<'a> {
    /// Parent identifier for child resources
    pub parent_id: Option<&'a str>,
}

impl<'a> NormalizeContext<'a> {
    /// Context for a child resource page
    pub fn for_parent(parent_id: &'a str) -> Self {
        Self {
            parent_id: Some(parent_id),
        }
    }
}

/// Trait for flattening raw payload rows into output records
///
/// Implementations are pure: the same row always yields the same record and
/// the row itself is never modified.
pub trait RecordNormalizer: Send + Sync + std::fmt::Debug {
    /// Normalize one row of the records array
    fn normalize(&self, row: &JsonValue, ctx: &NormalizeContext<'_>) -> Result<Record>;
}

/// Locate the records array of a page
///
/// A missing or null field is an empty page; anything other than an array
/// is a malformed payload.
pub fn extract_records<'a>(body: &'a JsonValue, records_path: &str) -> Result<&'a [JsonValue]> {
    match body.get(records_path) {
        None | Some(JsonValue::Null) => Ok(&[]),
        Some(JsonValue::Array(rows)) => Ok(rows),
        Some(other) => Err(Error::decode(format!(
            "'{records_path}' should be an array, got {}",
            kind_of(other)
        ))),
    }
}

/// Short name of a JSON value's type, for error messages
pub(crate) fn kind_of(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
