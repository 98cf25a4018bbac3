//! Normalizer implementations
//!
//! Each normalizer flattens the rows of one family of resources.

use super::types::{kind_of, NormalizeContext, RecordNormalizer};
use crate::catalog::{NormalizerKind, PARENT_TAG_FIELD};
use crate::error::{Error, Result};
use crate::types::{lookup, scalar_token, JsonObject, JsonValue, Record};

/// Build the normalizer for a descriptor's normalizer tag
pub fn normalizer_for(kind: NormalizerKind) -> Box<dyn RecordNormalizer> {
    match kind {
        NormalizerKind::Passthrough => Box::new(PassthroughNormalizer),
        NormalizerKind::Events => Box::new(EventNormalizer),
        NormalizerKind::Profiles => Box::new(ProfileNormalizer),
        NormalizerKind::Membership => Box::new(MembershipNormalizer),
    }
}

/// Normalize every row of a page and tag child records with their parent
pub fn normalize_page(
    rows: &[JsonValue],
    normalizer: &dyn RecordNormalizer,
    ctx: &NormalizeContext<'_>,
) -> Result<Vec<Record>> {
    rows.iter()
        .map(|row| {
            let mut record = normalizer.normalize(row, ctx)?;
            if let Some(parent_id) = ctx.parent_id {
                record.insert(PARENT_TAG_FIELD.to_string(), JsonValue::from(parent_id));
            }
            Ok(record)
        })
        .collect()
}

// ============================================================================
// Helpers
// ============================================================================

fn as_row(row: &JsonValue) -> Result<&JsonObject> {
    row.as_object()
        .ok_or_else(|| Error::decode(format!("row should be an object, got {}", kind_of(row))))
}

/// The row's `attributes` object; absent or null reads as empty
fn attributes(row: &JsonObject) -> Result<JsonObject> {
    match row.get("attributes") {
        None | Some(JsonValue::Null) => Ok(JsonObject::new()),
        Some(JsonValue::Object(attributes)) => Ok(attributes.clone()),
        Some(other) => Err(Error::decode(format!(
            "'attributes' should be an object, got {}",
            kind_of(other)
        ))),
    }
}

/// The row's own identifier, which every revisioned row must carry
fn row_id(row: &JsonObject) -> Result<JsonValue> {
    match row.get("id") {
        Some(id @ (JsonValue::String(_) | JsonValue::Number(_))) => Ok(id.clone()),
        _ => Err(Error::decode("row is missing its 'id'")),
    }
}

fn relationship_id(row: &JsonValue, relationship: &str) -> Option<String> {
    lookup(row, &format!("relationships.{relationship}.data.id")).and_then(scalar_token)
}

// ============================================================================
// Normalizers
// ============================================================================

/// Leaves rows untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughNormalizer;

impl RecordNormalizer for PassthroughNormalizer {
    fn normalize(&self, row: &JsonValue, _ctx: &NormalizeContext<'_>) -> Result<Record> {
        as_row(row).cloned()
    }
}

/// Flattens event rows and hoists their metric and profile ids
#[derive(Debug, Clone, Copy, Default)]
pub struct EventNormalizer;

impl RecordNormalizer for EventNormalizer {
    fn normalize(&self, row: &JsonValue, _ctx: &NormalizeContext<'_>) -> Result<Record> {
        let object = as_row(row)?;
        let mut record = attributes(object)?;

        if let Some(metric_id) = relationship_id(row, "metric") {
            record.insert("metric_id".to_string(), JsonValue::from(metric_id));
        }

        match relationship_id(row, "profile") {
            Some(profile_id) => {
                record.insert("profile_id".to_string(), JsonValue::from(profile_id));
            }
            None => {
                let missing = record.get("profile_id").map_or(true, JsonValue::is_null);
                if missing {
                    record.insert("profile_id".to_string(), JsonValue::from(""));
                }
            }
        }

        record.insert("id".to_string(), row_id(object)?);
        Ok(record)
    }
}

/// Flattens profile rows, keeping the nested attributes alongside
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileNormalizer;

impl RecordNormalizer for ProfileNormalizer {
    fn normalize(&self, row: &JsonValue, _ctx: &NormalizeContext<'_>) -> Result<Record> {
        let object = as_row(row)?;
        let nested = attributes(object)?;
        let mut record = nested.clone();

        record.insert("id".to_string(), row_id(object)?);
        if let Some(updated) = nested.get("updated").filter(|v| !v.is_null()) {
            record.insert("timestamp".to_string(), updated.clone());
        }
        record.insert("attributes".to_string(), JsonValue::Object(nested));

        Ok(record)
    }
}

/// Projects membership rows down to `{id, list_id, email}`
#[derive(Debug, Clone, Copy, Default)]
pub struct MembershipNormalizer;

impl RecordNormalizer for MembershipNormalizer {
    fn normalize(&self, row: &JsonValue, ctx: &NormalizeContext<'_>) -> Result<Record> {
        let object = as_row(row)?;
        let attributes = attributes(object)?;

        let mut record = Record::new();
        record.insert("id".to_string(), row_id(object)?);
        record.insert(
            PARENT_TAG_FIELD.to_string(),
            ctx.parent_id.map_or(JsonValue::Null, JsonValue::from),
        );
        record.insert(
            "email".to_string(),
            attributes.get("email").cloned().unwrap_or(JsonValue::Null),
        );
        Ok(record)
    }
}
