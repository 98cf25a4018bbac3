//! Tests for the auth module

use super::*;
use crate::catalog::ApiGeneration;

fn build(auth: &Authenticator, api: ApiGeneration) -> reqwest::Request {
    let client = reqwest::Client::new();
    let req = client.get("https://example.com/api");
    auth.apply(req, api).build().unwrap()
}

#[test]
fn test_legacy_uses_query_param() {
    let auth = Authenticator::new(&Credentials::api_key("pk_123"));
    let built = build(&auth, ApiGeneration::Legacy);

    assert_eq!(built.url().query(), Some("api_key=pk_123"));
    assert!(built.headers().get("Authorization").is_none());
}

#[test]
fn test_revisioned_uses_api_key_header() {
    let auth = Authenticator::new(&Credentials::api_key("pk_123"));
    let built = build(&auth, ApiGeneration::Revisioned);

    assert_eq!(
        built.headers().get("Authorization").unwrap(),
        "Klaviyo-API-Key pk_123"
    );
    assert!(built.url().query().is_none());
}

#[test]
fn test_revisioned_oauth_uses_bearer() {
    let auth = Authenticator::new(&Credentials::oauth("tok"));
    let built = build(&auth, ApiGeneration::Revisioned);

    assert_eq!(built.headers().get("Authorization").unwrap(), "Bearer tok");
}

#[test]
fn test_legacy_oauth_still_uses_query_param() {
    let auth = Authenticator::new(&Credentials::oauth("tok"));
    let built = build(&auth, ApiGeneration::Legacy);

    assert_eq!(built.url().query(), Some("api_key=tok"));
}

#[test]
fn test_auth_for() {
    let credentials = Credentials::api_key("pk_123");
    assert_eq!(
        credentials.auth_for(ApiGeneration::Revisioned),
        AuthConfig::ApiKey {
            location: Location::Header,
            header_name: Some("Authorization".to_string()),
            query_param: None,
            prefix: Some("Klaviyo-API-Key ".to_string()),
            value: "pk_123".to_string(),
        }
    );
    assert_eq!(
        Credentials::oauth("tok").auth_for(ApiGeneration::Revisioned),
        AuthConfig::Bearer {
            token: "tok".to_string()
        }
    );
}

#[test]
fn test_credentials_debug_redacts_key() {
    let rendered = format!("{:?}", Credentials::api_key("pk_secret"));
    assert!(!rendered.contains("pk_secret"));
    assert!(rendered.contains("redacted"));
}
