//! Tests for the normalize module

use super::*;
use crate::catalog::NormalizerKind;
use crate::error::Error;
use crate::types::Record;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

fn none() -> NormalizeContext<'static> {
    NormalizeContext::default()
}

// ============================================================================
// Records Array Tests
// ============================================================================

#[test]
fn test_extract_records() {
    let body = json!({"data": [{"id": 1}, {"id": 2}]});
    assert_eq!(extract_records(&body, "data").unwrap().len(), 2);
}

#[test]
fn test_extract_records_absent_or_null_is_empty() {
    assert!(extract_records(&json!({"links": {}}), "data")
        .unwrap()
        .is_empty());
    assert!(extract_records(&json!({"records": null}), "records")
        .unwrap()
        .is_empty());
}

#[test]
fn test_extract_records_non_array_is_malformed() {
    let err = extract_records(&json!({"data": {"id": 1}}), "data").unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert!(err.to_string().contains("an object"));
}

// ============================================================================
// Event Tests
// ============================================================================

#[test]
fn test_event_hoists_relationship_ids() {
    let row = json!({
        "type": "event",
        "id": "evt_1",
        "attributes": {"datetime": "2023-01-01T00:00:00+00:00", "uuid": "u-1"},
        "relationships": {
            "metric": {"data": {"type": "metric", "id": "m_9"}},
            "profile": {"data": {"type": "profile", "id": "abc"}}
        }
    });

    let normalized = EventNormalizer.normalize(&row, &none()).unwrap();
    assert_eq!(
        normalized,
        record(json!({
            "datetime": "2023-01-01T00:00:00+00:00",
            "uuid": "u-1",
            "metric_id": "m_9",
            "profile_id": "abc",
            "id": "evt_1"
        }))
    );
}

#[test]
fn test_event_profile_id_from_relationship_without_attribute() {
    let row = json!({
        "id": "evt_2",
        "attributes": {"timestamp": 1_672_531_200},
        "relationships": {"profile": {"data": {"id": "abc"}}}
    });

    let normalized = EventNormalizer.normalize(&row, &none()).unwrap();
    assert_eq!(normalized["profile_id"], json!("abc"));
}

#[test]
fn test_event_missing_profile_defaults_to_empty() {
    let absent = json!({"id": "e", "attributes": {}});
    assert_eq!(
        EventNormalizer.normalize(&absent, &none()).unwrap()["profile_id"],
        json!("")
    );

    let null = json!({
        "id": "e",
        "attributes": {"profile_id": null},
        "relationships": {"profile": {"data": null}}
    });
    assert_eq!(
        EventNormalizer.normalize(&null, &none()).unwrap()["profile_id"],
        json!("")
    );
}

#[test]
fn test_event_keeps_existing_profile_attribute() {
    let row = json!({"id": "e", "attributes": {"profile_id": "legacy"}});
    assert_eq!(
        EventNormalizer.normalize(&row, &none()).unwrap()["profile_id"],
        json!("legacy")
    );
}

#[test]
fn test_event_without_metric_has_no_metric_id() {
    let row = json!({"id": "e", "attributes": {}});
    let normalized = EventNormalizer.normalize(&row, &none()).unwrap();
    assert!(!normalized.contains_key("metric_id"));
}

#[test]
fn test_event_malformed_rows() {
    assert!(EventNormalizer.normalize(&json!("evt"), &none()).is_err());
    assert!(EventNormalizer
        .normalize(&json!({"id": "e", "attributes": [1, 2]}), &none())
        .is_err());
    assert!(EventNormalizer
        .normalize(&json!({"attributes": {}}), &none())
        .is_err());
}

// ============================================================================
// Profile Tests
// ============================================================================

#[test]
fn test_profile_flattens_and_keeps_nested() {
    let row = json!({
        "type": "profile",
        "id": "p_1",
        "attributes": {"email": "a@example.com", "updated": "2023-03-04T05:06:07+00:00"}
    });

    let normalized = ProfileNormalizer.normalize(&row, &none()).unwrap();
    assert_eq!(
        normalized,
        record(json!({
            "email": "a@example.com",
            "updated": "2023-03-04T05:06:07+00:00",
            "id": "p_1",
            "timestamp": "2023-03-04T05:06:07+00:00",
            "attributes": {
                "email": "a@example.com",
                "updated": "2023-03-04T05:06:07+00:00"
            }
        }))
    );
}

#[test]
fn test_profile_without_updated_has_no_timestamp() {
    let row = json!({"id": "p_2", "attributes": {"email": "b@example.com"}});
    let normalized = ProfileNormalizer.normalize(&row, &none()).unwrap();
    assert!(!normalized.contains_key("timestamp"));
    assert_eq!(normalized["id"], json!("p_2"));
}

// ============================================================================
// Membership Tests
// ============================================================================

#[test]
fn test_membership_projection() {
    let row = json!({
        "id": "p_1",
        "attributes": {"email": "a@example.com", "first_name": "Ada"},
        "links": {"self": "https://example.com/p_1"}
    });

    let normalized = MembershipNormalizer
        .normalize(&row, &NormalizeContext::for_parent("L1"))
        .unwrap();
    assert_eq!(
        normalized,
        record(json!({"id": "p_1", "list_id": "L1", "email": "a@example.com"}))
    );
}

#[test]
fn test_membership_missing_email_is_null() {
    let row = json!({"id": "p_1", "attributes": {}});
    let normalized = MembershipNormalizer
        .normalize(&row, &NormalizeContext::for_parent("S1"))
        .unwrap();
    assert_eq!(normalized["email"], Value::Null);
}

// ============================================================================
// Page Tests
// ============================================================================

#[test]
fn test_passthrough_is_unchanged() {
    let row = json!({"object": "person", "email": "x@example.com", "nested": {"a": 1}});
    assert_eq!(
        PassthroughNormalizer.normalize(&row, &none()).unwrap(),
        record(row)
    );
}

#[test]
fn test_normalize_page_tags_every_child_record() {
    let rows = vec![
        json!({"email": "a@example.com"}),
        json!({"email": "b@example.com", "list_id": "stale"}),
    ];
    let normalizer = normalizer_for(NormalizerKind::Passthrough);

    for parent in ["L1", "L2"] {
        let records = normalize_page(
            &rows,
            normalizer.as_ref(),
            &NormalizeContext::for_parent(parent),
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r["list_id"] == json!(parent)));
    }
}

#[test]
fn test_normalize_page_without_parent_adds_nothing() {
    let rows = vec![json!({"id": 1})];
    let records = normalize_page(&rows, &PassthroughNormalizer, &none()).unwrap();
    assert_eq!(records, vec![record(json!({"id": 1}))]);
}

#[test]
fn test_normalize_page_stops_at_malformed_row() {
    let rows = vec![json!({"id": "ok", "attributes": {}}), json!(42)];
    let err = normalize_page(&rows, &EventNormalizer, &none()).unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[test]
fn test_renormalizing_same_payload_is_identical() {
    let body = json!({
        "data": [
            {
                "id": "evt_1",
                "attributes": {"profile_id": null},
                "relationships": {"metric": {"data": {"id": "m"}}}
            },
            {
                "id": "p_1",
                "attributes": {"updated": "2023-01-01T00:00:00+00:00"}
            }
        ]
    });
    let snapshot = body.clone();
    let rows = extract_records(&body, "data").unwrap();

    for kind in [
        NormalizerKind::Events,
        NormalizerKind::Profiles,
        NormalizerKind::Membership,
        NormalizerKind::Passthrough,
    ] {
        let normalizer = normalizer_for(kind);
        let ctx = NormalizeContext::for_parent("L1");
        let first = normalize_page(rows, normalizer.as_ref(), &ctx).unwrap();
        let second = normalize_page(rows, normalizer.as_ref(), &ctx).unwrap();
        assert_eq!(first, second);
    }

    assert_eq!(body, snapshot);
}
