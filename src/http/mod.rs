//! HTTP client module
//!
//! Provides the page fetcher with retry, rate limiting, and backoff.
//!
//! # Features
//!
//! - **Automatic Retries**: Transient failures retried with exponential backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Telemetry**: One `http_request_duration` timer per attempt
//! - **Authentication**: Legacy query key or revisioned header per resource

mod client;
mod fetcher;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use fetcher::{Fetched, Fetcher};
pub use rate_limit::{RateLimiter, RateLimiterConfig};

#[cfg(test)]
pub(crate) use fetcher::ScriptedFetcher;
