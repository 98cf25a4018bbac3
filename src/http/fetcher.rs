//! The seam between the pull engine and the network

use crate::catalog::ResourceDescriptor;
use crate::error::Result;
use crate::pagination::PageRequest;
use async_trait::async_trait;
use serde_json::Value;

/// A successful response with its decoded body
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    /// HTTP status code
    pub status: u16,
    /// Decoded JSON body
    pub body: Value,
}

/// Fetches one page of a resource
///
/// Implementations own authentication, retries and telemetry; callers only
/// see a decoded body or a classified error.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `request` on behalf of `resource`
    async fn fetch(&self, resource: &ResourceDescriptor, request: &PageRequest) -> Result<Fetched>;
}

/// Replays canned bodies in order and records every request
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ScriptedFetcher {
    bodies: std::sync::Mutex<std::collections::VecDeque<Value>>,
    requests: std::sync::Mutex<Vec<(String, PageRequest)>>,
}

#[cfg(test)]
impl ScriptedFetcher {
    pub(crate) fn new(bodies: impl IntoIterator<Item = Value>) -> Self {
        Self {
            bodies: std::sync::Mutex::new(bodies.into_iter().collect()),
            requests: std::sync::Mutex::default(),
        }
    }

    /// Resource name and request of every fetch, in order
    pub(crate) fn requests(&self) -> Vec<(String, PageRequest)> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[cfg(test)]
#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, resource: &ResourceDescriptor, request: &PageRequest) -> Result<Fetched> {
        self.requests
            .lock()
            .unwrap()
            .push((resource.name.to_string(), request.clone()));
        let body = self.bodies.lock().unwrap().pop_front().ok_or_else(|| {
            crate::error::Error::http_status(404, format!("no scripted body for {}", request.url))
        })?;
        Ok(Fetched { status: 200, body })
    }
}
