//! HTTP client with retry and rate limiting
//!
//! Provides the HTTP client the engine pulls pages through. It handles:
//! - Per-generation authentication and the revision header
//! - Automatic retries with exponential backoff
//! - Rate limiting to prevent API throttling
//! - Request timing telemetry
//! - Error classification for retry decisions

use super::fetcher::{Fetched, Fetcher};
use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::auth::{Authenticator, Credentials};
use crate::catalog::{ApiGeneration, ResourceDescriptor, REVISION};
use crate::error::{Error, Result};
use crate::metrics::{Outcome, Timer};
use crate::pagination::PageRequest;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::warn;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff, also the ceiling for `Retry-After`
    pub max_backoff: Duration,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 9,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(60),
            rate_limit: Some(RateLimiterConfig::default()),
            user_agent: format!("klaviyo-tap/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }

    /// Total attempts per request, first try included
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set the initial and maximum backoff delays
    pub fn backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    authenticator: Authenticator,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a client that authenticates with `credentials`
    pub fn new(config: HttpClientConfig, credentials: &Credentials) -> Result<Self> {
        Self::with_authenticator(config, Authenticator::new(credentials))
    }

    /// Create a client with an explicit authenticator
    pub fn with_authenticator(config: HttpClientConfig, authenticator: Authenticator) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            authenticator,
            rate_limiter,
        })
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// GET a JSON document, retrying transient failures
    ///
    /// `endpoint` names the resource in telemetry and logs.
    pub async fn get_json(
        &self,
        endpoint: &str,
        api: ApiGeneration,
        request: &PageRequest,
    ) -> Result<Fetched> {
        let attempts = self.config.attempts();
        let mut attempt = 0;

        loop {
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            let error = match self.send_once(endpoint, api, request).await {
                Ok(fetched) => return Ok(fetched),
                Err(e) if e.is_retryable() => e,
                Err(e) => return Err(e),
            };

            attempt += 1;
            if attempt >= attempts {
                return Err(Error::RetriesExhausted {
                    attempts,
                    last: Box::new(error),
                });
            }

            let delay = self.retry_delay(&error, attempt - 1);
            warn!(
                endpoint,
                attempt,
                max_attempts = attempts,
                ?delay,
                error = %error,
                "Request failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Send a single attempt
    async fn send_once(
        &self,
        endpoint: &str,
        api: ApiGeneration,
        request: &PageRequest,
    ) -> Result<Fetched> {
        let mut req = self.client.get(&request.url);
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if api == ApiGeneration::Revisioned {
            req = req
                .header("revision", REVISION)
                .header("accept", "application/json");
        }
        req = self.authenticator.apply(req, api);

        let timer = Timer::start(endpoint);
        let response = match req.send().await {
            Ok(response) => response,
            Err(e) => {
                timer.finish(None, Outcome::Failed);
                return Err(self.classify_send_error(e));
            }
        };

        let status = response.status();
        let outcome = if status.is_success() {
            Outcome::Succeeded
        } else {
            Outcome::Failed
        };
        timer.finish(Some(status.as_u16()), outcome);

        if status == StatusCode::TOO_MANY_REQUESTS {
            if let Some(retry_after_seconds) = extract_retry_after(&response) {
                return Err(Error::RateLimited {
                    retry_after_seconds,
                });
            }
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        let text = response
            .text()
            .await
            .map_err(|e| self.classify_send_error(e))?;
        let body = serde_json::from_str(&text)
            .map_err(|e| Error::decode(format!("{endpoint} returned a non-JSON body: {e}")))?;

        Ok(Fetched {
            status: status.as_u16(),
            body,
        })
    }

    fn classify_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            #[allow(clippy::cast_possible_truncation)]
            return Error::Timeout {
                timeout_ms: self.config.timeout.as_millis() as u64,
            };
        }
        Error::Http(e)
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        std::cmp::min(
            self.config.initial_backoff.saturating_mul(factor),
            self.config.max_backoff,
        )
    }

    /// Delay before retrying after `error`
    ///
    /// A server-sent `Retry-After` wins over the computed backoff but never
    /// exceeds `max_backoff`.
    pub fn retry_delay(&self, error: &Error, attempt: u32) -> Duration {
        match error {
            Error::RateLimited {
                retry_after_seconds,
            } => std::cmp::min(
                Duration::from_secs(*retry_after_seconds),
                self.config.max_backoff,
            ),
            _ => self.calculate_backoff(attempt),
        }
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn fetch(&self, resource: &ResourceDescriptor, request: &PageRequest) -> Result<Fetched> {
        self.get_json(resource.name, resource.request.api, request)
            .await
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Extract the retry-after header value in seconds
fn extract_retry_after(response: &Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}
