//! Configuration types for the tap
//!
//! Two documents drive a run: the tap config (credentials, start date,
//! parent ids and HTTP tuning) and the catalog (which streams to sync).
//! Both are plain JSON loaded through serde.

use crate::auth::Credentials;
use crate::catalog::ParentKind;
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::state::Cursor;
use crate::types::{scalar_token, JsonValue};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default API host
pub const DEFAULT_BASE_URL: &str = "https://a.klaviyo.com";

// ============================================================================
// Tap Config
// ============================================================================

/// Tap configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// Private API key, or an OAuth access token when `refresh_token` is set
    #[serde(default)]
    pub api_key: String,

    /// Earliest instant replicated by incremental streams
    #[serde(default)]
    pub start_date: Option<String>,

    /// Lists whose members are replicated
    #[serde(default, deserialize_with = "id_list")]
    pub list_ids: Vec<String>,

    /// Segments whose members are replicated
    #[serde(default, deserialize_with = "id_list")]
    pub segment_ids: Vec<String>,

    /// Present when the account authorized through OAuth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// API host
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Client-side request rate (0 disables limiting)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_per_second: Option<u32>,

    /// Retries after the first attempt of each request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,

    /// Per-request timeout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_seconds: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl TapConfig {
    /// Create a config with the two required fields
    pub fn new(api_key: impl Into<String>, start_date: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            start_date: Some(start_date.into()),
            list_ids: Vec::new(),
            segment_ids: Vec::new(),
            refresh_token: None,
            base_url: default_base_url(),
            requests_per_second: None,
            max_retries: None,
            request_timeout_seconds: None,
            user_agent: None,
        }
    }

    /// Point the tap at another host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the parent ids of one kind
    pub fn with_parent_ids(
        mut self,
        parent: ParentKind,
        ids: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let ids = ids.into_iter().map(Into::into).collect();
        match parent {
            ParentKind::List => self.list_ids = ids,
            ParentKind::Segment => self.segment_ids = ids,
        }
        self
    }

    /// Parse and validate a config value
    pub fn from_value(value: JsonValue) -> Result<Self> {
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate inline JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json).context("Invalid config JSON")?;
        Self::from_value(value)
    }

    /// Load and validate a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&contents)
    }

    /// Check required fields and value formats
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::missing_field("api_key"));
        }
        self.start_cursor()?;
        url::Url::parse(&self.base_url)
            .map_err(|e| Error::invalid_value("base_url", e.to_string()))?;
        if self.request_timeout_seconds == Some(0) {
            return Err(Error::invalid_value(
                "request_timeout_seconds",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Configured start date as a cursor
    pub fn start_cursor(&self) -> Result<Cursor> {
        let text = self
            .start_date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::missing_field("start_date"))?;
        Cursor::parse(text).map_err(|e| Error::invalid_value("start_date", e.to_string()))
    }

    /// Configured ids for a parent kind
    pub fn parent_ids(&self, parent: ParentKind) -> &[String] {
        match parent {
            ParentKind::List => &self.list_ids,
            ParentKind::Segment => &self.segment_ids,
        }
    }

    /// Credentials the HTTP layer authenticates with
    pub fn credentials(&self) -> Credentials {
        let oauth = self
            .refresh_token
            .as_deref()
            .is_some_and(|token| !token.is_empty());
        if oauth {
            Credentials::oauth(&self.api_key)
        } else {
            Credentials::api_key(&self.api_key)
        }
    }

    /// HTTP client settings with the config's overrides applied
    pub fn http_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder();
        if let Some(seconds) = self.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        if let Some(retries) = self.max_retries {
            builder = builder.max_retries(retries);
        }
        match self.requests_per_second {
            Some(0) => builder = builder.no_rate_limit(),
            Some(rps) => builder = builder.rate_limit(RateLimiterConfig::per_second(rps)),
            None => {}
        }
        if let Some(ref agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }
        builder.build()
    }
}

impl std::fmt::Debug for TapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapConfig")
            .field("api_key", &"<redacted>")
            .field("start_date", &self.start_date)
            .field("list_ids", &self.list_ids)
            .field("segment_ids", &self.segment_ids)
            .field("oauth", &self.refresh_token.is_some())
            .field("base_url", &self.base_url)
            .field("requests_per_second", &self.requests_per_second)
            .field("max_retries", &self.max_retries)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish_non_exhaustive()
    }
}

/// Accept ids as a JSON array, a comma-separated string, or null
fn id_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    match value {
        JsonValue::Null => Ok(Vec::new()),
        JsonValue::String(s) => Ok(s
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect()),
        JsonValue::Array(items) => Ok(items.iter().filter_map(scalar_token).collect()),
        other => Err(serde::de::Error::custom(format!(
            "expected a list of ids or a comma-separated string, got {other}"
        ))),
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Streams available to (or chosen for) a sync
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub streams: Vec<CatalogEntry>,
}

/// One catalog stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Stream name, which selects the resource
    pub stream: String,

    /// Remote identifier; the metric id for timeline streams
    #[serde(default)]
    pub tap_stream_id: String,

    #[serde(default, deserialize_with = "key_list")]
    pub key_properties: Vec<String>,

    #[serde(default)]
    pub schema: JsonValue,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<JsonValue>,
}

/// Accept key properties as a single string or a list
fn key_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Keys {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<Keys>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Keys::One(key)) if key.is_empty() => Vec::new(),
        Some(Keys::One(key)) => vec![key],
        Some(Keys::Many(keys)) => keys,
    })
}

impl CatalogEntry {
    /// Create an unselected entry
    pub fn new(
        stream: impl Into<String>,
        tap_stream_id: impl Into<String>,
        key_properties: &[&str],
        schema: JsonValue,
    ) -> Self {
        Self {
            stream: stream.into(),
            tap_stream_id: tap_stream_id.into(),
            key_properties: key_properties.iter().map(|k| (*k).to_string()).collect(),
            schema,
            metadata: Vec::new(),
        }
    }

    /// Check if the entry is chosen for sync
    ///
    /// Either `schema.selected` or the stream-level metadata entry (empty
    /// breadcrumb) may carry the flag.
    pub fn is_selected(&self) -> bool {
        if self.schema.get("selected").and_then(JsonValue::as_bool) == Some(true) {
            return true;
        }
        self.metadata.iter().any(|entry| {
            let stream_level = entry
                .get("breadcrumb")
                .and_then(JsonValue::as_array)
                .is_some_and(Vec::is_empty);
            stream_level
                && entry
                    .pointer("/metadata/selected")
                    .and_then(JsonValue::as_bool)
                    == Some(true)
        })
    }

    /// Mark the entry selected through its schema
    pub fn select(&mut self) {
        if let Some(schema) = self.schema.as_object_mut() {
            schema.insert("selected".to_string(), JsonValue::Bool(true));
        } else {
            self.schema = serde_json::json!({ "selected": true });
        }
    }
}

impl Catalog {
    /// Create a catalog from entries
    pub fn new(streams: Vec<CatalogEntry>) -> Self {
        Self { streams }
    }

    /// Parse inline JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid catalog JSON")
    }

    /// Load a catalog file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
        Self::from_json(&contents)
    }

    /// Entries chosen for sync, in catalog order
    pub fn selected(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.streams.iter().filter(|entry| entry.is_selected())
    }

    /// Find an entry by stream name
    pub fn entry(&self, stream: &str) -> Option<&CatalogEntry> {
        self.streams.iter().find(|entry| entry.stream == stream)
    }
}
