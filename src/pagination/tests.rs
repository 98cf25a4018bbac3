//! Tests for pagination module

use super::*;
use crate::catalog::{descriptor, LinkLocation, PaginationKind};
use crate::error::Error;
use crate::http::{HttpClient, HttpClientConfig, ScriptedFetcher};
use crate::auth::Credentials;
use futures::TryStreamExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_case::test_case;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(url: &str) -> PageRequest {
    PageRequest::new(url)
}

async fn collect(
    fetcher: &ScriptedFetcher,
    stream: &str,
    first: PageRequest,
) -> crate::error::Result<Vec<Page>> {
    let resource = descriptor(stream).unwrap();
    let paginator = paginator_for(resource.pagination);
    pages(fetcher, resource, paginator.as_ref(), first)
        .try_collect()
        .await
}

// ============================================================================
// PageRequest Tests
// ============================================================================

#[test]
fn test_set_param_replaces_in_place() {
    let mut req = request("https://x").with_query([
        ("sort".to_string(), "asc".to_string()),
        ("since".to_string(), "1".to_string()),
    ]);
    req.set_param("since", "2");
    req.set_param("page", "3");

    assert_eq!(
        req.query,
        vec![
            ("sort".to_string(), "asc".to_string()),
            ("since".to_string(), "2".to_string()),
            ("page".to_string(), "3".to_string()),
        ]
    );
    assert_eq!(req.param("since"), Some("2"));
    assert_eq!(req.param("missing"), None);
}

#[test]
fn test_first_request_appends_paginator_params() {
    let paginator = PageIndexPaginator::default();
    let first = first_request(
        "https://x/api/v1/lists",
        vec![("sort".to_string(), "asc".to_string())],
        &paginator,
    );
    assert_eq!(first.param("sort"), Some("asc"));
    assert_eq!(first.param("page"), Some("0"));
}

// ============================================================================
// Link Pagination Tests
// ============================================================================

#[test]
fn test_body_links_follows_next_verbatim() {
    let paginator = LinkPaginator::new(LinkLocation::BodyLinks);
    let current = request("https://x/api/events/")
        .with_query([("sort".to_string(), "datetime".to_string())]);
    let body = json!({"links": {"next": "https://x/api/events/?page%5Bcursor%5D=abc"}});

    match paginator.next_request(&body, &current).unwrap() {
        NextPage::Continue(next) => {
            assert_eq!(next.url, "https://x/api/events/?page%5Bcursor%5D=abc");
            assert!(next.query.is_empty());
        }
        NextPage::Done => panic!("Expected another page"),
    }
}

#[test_case(json!({"links": {"next": null}}) ; "null next")]
#[test_case(json!({"links": {"next": ""}}) ; "empty next")]
#[test_case(json!({"links": {}}) ; "absent next")]
#[test_case(json!({"data": []}) ; "absent links")]
fn test_body_links_terminates(body: Value) {
    let paginator = LinkPaginator::new(LinkLocation::BodyLinks);
    assert!(paginator
        .next_request(&body, &request("https://x"))
        .unwrap()
        .is_done());
}

#[test]
fn test_next_token_resent_as_since() {
    let paginator = LinkPaginator::new(LinkLocation::NextToken);
    let current = request("https://x/api/v1/metric/m/timeline").with_query([
        ("sort".to_string(), "asc".to_string()),
        ("since".to_string(), "1672531200".to_string()),
    ]);

    let NextPage::Continue(next) = paginator
        .next_request(&json!({"next": "tok-2"}), &current)
        .unwrap()
    else {
        panic!("Expected another page");
    };
    assert_eq!(next.url, current.url);
    assert_eq!(next.param("sort"), Some("asc"));
    assert_eq!(next.param("since"), Some("tok-2"));
    assert_eq!(next.query.len(), 2);

    assert!(paginator
        .next_request(&json!({"next": null}), &next)
        .unwrap()
        .is_done());
}

// ============================================================================
// Page Index Tests
// ============================================================================

#[test]
fn test_page_index_stops_on_last_page() {
    let paginator = PageIndexPaginator::default();
    let current = request("https://x").with_query(paginator.initial_params());
    let next = paginator
        .next_request(&json!({"end": 24, "total": 25}), &current)
        .unwrap();
    assert_eq!(next, NextPage::Done);
}

#[test]
fn test_page_index_requests_next_index() {
    let paginator = PageIndexPaginator::default();
    let mut current = request("https://x").with_query(paginator.initial_params());
    current.set_param("page", "3");

    let NextPage::Continue(next) = paginator
        .next_request(&json!({"end": 10, "total": 50}), &current)
        .unwrap()
    else {
        panic!("Expected another page");
    };
    assert_eq!(next.param("page"), Some("4"));
}

#[test]
fn test_page_index_empty_collection_stops() {
    let paginator = PageIndexPaginator::default();
    assert!(paginator
        .next_request(&json!({"end": 0, "total": 0}), &request("https://x"))
        .unwrap()
        .is_done());
}

#[test_case(json!({"total": 5}) ; "missing end")]
#[test_case(json!({"end": 1}) ; "missing total")]
#[test_case(json!({"end": "x", "total": 5}) ; "non numeric end")]
fn test_page_index_malformed(body: Value) {
    let err = PageIndexPaginator::default()
        .next_request(&body, &request("https://x"))
        .unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

// ============================================================================
// Marker Tests
// ============================================================================

#[test]
fn test_marker_echoed_until_absent() {
    let paginator = MarkerPaginator::default();
    assert!(paginator.initial_params().is_empty());

    let NextPage::Continue(next) = paginator
        .next_request(&json!({"records": [], "marker": 12345}), &request("https://x"))
        .unwrap()
    else {
        panic!("Expected another page");
    };
    assert_eq!(next.param("marker"), Some("12345"));

    for body in [json!({"records": []}), json!({"marker": null}), json!({"marker": ""})] {
        assert!(paginator.next_request(&body, &next).unwrap().is_done());
    }
}

#[test]
fn test_paginator_for_tags() {
    let link = paginator_for(PaginationKind::Link(LinkLocation::BodyLinks));
    assert!(link.initial_params().is_empty());

    let index = paginator_for(PaginationKind::PageIndex);
    assert_eq!(index.initial_params(), vec![("page".to_string(), "0".to_string())]);
}

// ============================================================================
// Driver Tests
// ============================================================================

#[tokio::test]
async fn test_link_follow_yields_exactly_two_pages() {
    let fetcher = ScriptedFetcher::new([
        json!({"data": [{"id": "1"}], "links": {"next": "https://x/api/events/?page=2"}}),
        json!({"data": [{"id": "2"}], "links": {"next": null}}),
    ]);

    let pages = collect(&fetcher, "events", request("https://x/api/events/"))
        .await
        .unwrap();

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].index, 0);
    assert_eq!(pages[1].index, 1);
    assert_eq!(pages[1].body["data"][0]["id"], "2");

    let requests = fetcher.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].1.url, "https://x/api/events/?page=2");
}

#[tokio::test]
async fn test_index_driver_terminates_on_provided_pages() {
    let fetcher = ScriptedFetcher::new([
        json!({"data": [], "end": 49, "total": 150}),
        json!({"data": [], "end": 99, "total": 150}),
        json!({"data": [], "end": 149, "total": 150}),
    ]);
    let paginator = PageIndexPaginator::default();
    let first = first_request("https://x/api/v1/lists", Vec::new(), &paginator);

    let pages = collect(&fetcher, "lists", first).await.unwrap();
    assert_eq!(pages.len(), 3);

    let indexes: Vec<String> = fetcher
        .requests()
        .iter()
        .map(|(_, r)| r.param("page").unwrap().to_string())
        .collect();
    assert_eq!(indexes, vec!["0", "1", "2"]);
}

#[tokio::test]
async fn test_marker_driver_terminates() {
    let fetcher = ScriptedFetcher::new([
        json!({"records": [{"email": "a@x"}], "marker": "m1"}),
        json!({"records": [{"email": "b@x"}], "marker": "m2"}),
        json!({"records": [{"email": "c@x"}]}),
    ]);

    let pages = collect(&fetcher, "list_members", request("https://x/api/v2/group/L1/members/all"))
        .await
        .unwrap();

    assert_eq!(pages.len(), 3);
    assert_eq!(fetcher.requests()[2].1.param("marker"), Some("m2"));
}

#[tokio::test]
async fn test_driver_stops_at_first_error() {
    let fetcher = ScriptedFetcher::new([json!({"data": [], "end": 0})]);
    let err = collect(&fetcher, "lists", request("https://x/api/v1/lists"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_driver_is_lazy() {
    let fetcher = ScriptedFetcher::new([
        json!({"data": [], "links": {"next": "https://x/2"}}),
        json!({"data": [], "links": {"next": null}}),
    ]);
    let resource = descriptor("metrics2").unwrap();
    let paginator = paginator_for(resource.pagination);
    let stream = pages(&fetcher, resource, paginator.as_ref(), request("https://x/1"));
    futures::pin_mut!(stream);

    assert!(stream.try_next().await.unwrap().is_some());
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_link_follow_over_http() {
    let mock_server = MockServer::start().await;
    let second = format!("{}/api/lists/?page%5Bcursor%5D=c2", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/api/lists/"))
        .and(query_param("page[cursor]", "c2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": [{"id": "L2"}], "links": {"next": null}})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/lists/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": [{"id": "L1"}], "links": {"next": second}})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HttpClient::new(
        HttpClientConfig::builder().no_rate_limit().max_retries(0).build(),
        &Credentials::api_key("pk_test"),
    )
    .unwrap();
    let resource = descriptor("lists2").unwrap();
    let paginator = paginator_for(resource.pagination);
    let first = request(&format!("{}/api/lists/", mock_server.uri()));

    let pages: Vec<Page> = pages(&client, resource, paginator.as_ref(), first)
        .try_collect()
        .await
        .unwrap();

    let ids: Vec<&str> = pages
        .iter()
        .map(|p| p.body["data"][0]["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["L1", "L2"]);
}
