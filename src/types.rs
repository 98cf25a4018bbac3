//! Common types used throughout the tap
//!
//! Shared type aliases and small utility types used across modules.

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// One flat output record
pub type Record = JsonObject;

// ============================================================================
// Utilities
// ============================================================================

/// Follow a dotted path through nested JSON objects
pub fn lookup<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    path.split('.')
        .try_fold(value, |current, part| current.as_object()?.get(part))
}

/// Read a JSON scalar as a non-empty string token (strings and numbers only)
pub fn scalar_token(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
