//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.

use crate::error::Result;
use serde_json::Value;

/// One request to send: an absolute URL plus ordered query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Absolute URL
    pub url: String,
    /// Query parameters, sent in order
    pub query: Vec<(String, String)>,
}

impl PageRequest {
    /// Create a request with no query parameters
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
        }
    }

    /// Append query parameters
    #[must_use]
    pub fn with_query(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(params);
        self
    }

    /// Replace a parameter, appending it when absent
    pub fn set_param(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.query.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.query.push((key.to_string(), value)),
        }
    }

    /// Value of a parameter
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// One fetched page
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Zero-based position in the sequence
    pub index: usize,
    /// HTTP status of the response
    pub status: u16,
    /// Decoded JSON body
    pub body: Value,
}

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// More pages available
    Continue(PageRequest),
    /// No more pages
    Done,
}

impl NextPage {
    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Trait for pagination strategies
///
/// A strategy never keeps its own position; everything it needs is in the
/// request that produced the page and the page body.
pub trait Paginator: Send + Sync + std::fmt::Debug {
    /// Parameters added to the first request
    fn initial_params(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Decide what follows `body`, which was fetched with `current`
    fn next_request(&self, body: &Value, current: &PageRequest) -> Result<NextPage>;
}
