//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: config → HTTP requests → message stream → state file

use klaviyo_tap::config::{Catalog, CatalogEntry, TapConfig};
use klaviyo_tap::engine::{discover, SyncEngine};
use klaviyo_tap::error::{Error, ErrorKind};
use klaviyo_tap::http::{Fetcher, HttpClient};
use klaviyo_tap::output::{JsonLinesSink, MemorySink};
use klaviyo_tap::state::StateManager;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer, extra: Value) -> TapConfig {
    let mut value = json!({
        "api_key": "pk_live",
        "start_date": "2023-01-01T00:00:00Z",
        "base_url": server.uri(),
        "requests_per_second": 0,
        "max_retries": 1
    });
    if let (Some(base), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
        base.extend(extra.clone());
    }
    TapConfig::from_value(value).unwrap()
}

fn client(config: &TapConfig) -> Arc<dyn Fetcher> {
    Arc::new(HttpClient::new(config.http_config(), &config.credentials()).unwrap())
}

fn selected(stream: &str, tap_stream_id: &str) -> CatalogEntry {
    let mut entry = CatalogEntry::new(stream, tap_stream_id, &[], json!({"type": "object"}));
    entry.select();
    entry
}

fn lines(output: Vec<u8>) -> Vec<Value> {
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn read_state(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

// ============================================================================
// Sync Integration Tests
// ============================================================================

#[tokio::test]
async fn test_events_sync_then_resume() {
    let mock_server = MockServer::start().await;
    let next = format!("{}/api/events/?page%5Bcursor%5D=p2", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .and(query_param("page[cursor]", "p2"))
        .and(header("Authorization", "Klaviyo-API-Key pk_live"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "e2",
                "attributes": {"datetime": "2023-02-02T08:00:00+00:00"},
                "relationships": {"profile": {"data": null}}
            }],
            "links": {"next": null}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .and(query_param("filter", "greater-than(datetime,2023-01-01T00:00:00Z)"))
        .and(query_param("sort", "datetime"))
        .and(header("revision", "2024-02-15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "e1",
                "attributes": {"datetime": "2023-02-01T08:00:00+00:00"},
                "relationships": {
                    "metric": {"data": {"id": "m_1"}},
                    "profile": {"data": {"id": "abc"}}
                }
            }],
            "links": {"next": next}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .and(query_param("filter", "greater-than(datetime,2023-02-02T08:00:00Z)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [],
            "links": {"next": null}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");
    let config = config(&mock_server, json!({}));
    let catalog = Catalog::new(vec![selected("events", "events")]);

    // First run
    let mut engine = SyncEngine::new(
        client(&config),
        config.clone(),
        StateManager::from_file(&state_path).unwrap(),
        JsonLinesSink::new(Vec::new()),
    );
    let stats = engine.sync(&catalog).await.unwrap();
    assert_eq!(stats.records_synced, 2);

    let messages = lines(engine.into_sink().into_inner());
    let types: Vec<&str> = messages
        .iter()
        .map(|m| m["type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["SCHEMA", "RECORD", "STATE", "RECORD", "STATE", "STATE"]);
    assert_eq!(messages[1]["record"]["profile_id"], "abc");
    assert_eq!(messages[1]["record"]["metric_id"], "m_1");
    assert_eq!(messages[3]["record"]["profile_id"], "");
    assert_eq!(
        messages[5]["value"],
        json!({"bookmarks": {"events": {"since": "2023-02-02T08:00:00Z"}}})
    );
    assert_eq!(
        read_state(&state_path),
        json!({"bookmarks": {"events": {"since": "2023-02-02T08:00:00Z"}}})
    );

    // Second run resumes from the saved bookmark
    let mut engine = SyncEngine::new(
        client(&config),
        config,
        StateManager::from_file(&state_path).unwrap(),
        MemorySink::new(),
    );
    let stats = engine.sync(&catalog).await.unwrap();
    assert_eq!(stats.records_synced, 0);
    assert_eq!(
        engine.state().bookmark("events").unwrap().to_string(),
        "2023-02-02T08:00:00Z"
    );
}

#[tokio::test]
async fn test_legacy_streams_sync() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/lists"))
        .and(query_param("api_key", "pk_live"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"uuid": "L1", "list_name": "Newsletter"}],
            "end": 0,
            "total": 1
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/group/L1/members/all"))
        .and(query_param("marker", "77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{"email": "b@example.com"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/group/L1/members/all"))
        .and(query_param("api_key", "pk_live"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{"email": "a@example.com"}],
            "marker": 77
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/metric/m_open/timeline"))
        .and(query_param("since", "1672531200"))
        .and(query_param("sort", "asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "t1", "timestamp": 1_675_209_600, "event_name": "Opened Email"}],
            "next": null
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = config(&mock_server, json!({"list_ids": "L1"}));
    let catalog = Catalog::new(vec![
        selected("lists", "lists"),
        selected("list_members", "list_members"),
        selected("open", "m_open"),
    ]);

    let mut engine = SyncEngine::new(
        client(&config),
        config,
        StateManager::in_memory(),
        MemorySink::new(),
    );
    engine.sync(&catalog).await.unwrap();

    let sink = engine.sink();
    assert_eq!(sink.schema_streams(), vec!["lists", "list_members", "open"]);
    assert_eq!(sink.records("lists")[0]["uuid"], "L1");

    let members = sink.records("list_members");
    assert_eq!(members.len(), 2);
    assert!(members.iter().all(|r| r["list_id"] == "L1"));

    assert_eq!(
        engine.state().bookmark("open").unwrap().to_string(),
        "2023-02-01T00:00:00Z"
    );
    assert!(engine.state().bookmark("lists").is_none());
}

#[tokio::test]
async fn test_missing_parent_ids_makes_no_requests() {
    let mock_server = MockServer::start().await;
    let config = config(&mock_server, json!({}));
    let catalog = Catalog::new(vec![
        selected("events", "events"),
        selected("segment_members", "segment_members"),
    ]);

    let mut engine = SyncEngine::new(
        client(&config),
        config,
        StateManager::in_memory(),
        MemorySink::new(),
    );
    let err = engine.sync(&catalog).await.unwrap_err();

    assert!(matches!(err, Error::MissingParentIds { .. }));
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rate_limited_page_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/metrics/"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/metrics/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "m1", "type": "metric"}],
            "links": {"next": null}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = config(&mock_server, json!({}));
    let mut engine = SyncEngine::new(
        client(&config),
        config,
        StateManager::in_memory(),
        MemorySink::new(),
    );
    engine
        .sync(&Catalog::new(vec![selected("metrics2", "metrics2")]))
        .await
        .unwrap();

    assert_eq!(engine.sink().records("metrics2").len(), 1);
}

#[tokio::test]
async fn test_auth_failure_aborts_run() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/profiles/"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = config(&mock_server, json!({}));
    let mut engine = SyncEngine::new(
        client(&config),
        config,
        StateManager::in_memory(),
        MemorySink::new(),
    );
    let err = engine
        .sync(&Catalog::new(vec![selected("profiles", "profiles")]))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 401, .. }));
    assert_eq!(err.kind(), ErrorKind::Fatal);
}

// ============================================================================
// Discovery Integration Tests
// ============================================================================

#[tokio::test]
async fn test_discover_over_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/metrics"))
        .and(query_param("api_key", "pk_live"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": "m_recv", "name": "Received Email"},
                {"id": "m_other", "name": "Viewed Product"}
            ],
            "end": 1,
            "total": 2
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = config(&mock_server, json!({}));
    let client = client(&config);
    let catalog = discover(client.as_ref(), &config).await.unwrap();

    assert_eq!(catalog.streams[0].stream, "receive");
    assert_eq!(catalog.streams[0].tap_stream_id, "m_recv");
    assert!(catalog.entry("events").is_some());
    assert!(catalog.entry("segment_members").is_some());

    let round_trip = Catalog::from_json(&serde_json::to_string(&catalog).unwrap()).unwrap();
    assert_eq!(round_trip, catalog);
}
