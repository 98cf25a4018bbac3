//! Run telemetry
//!
//! Timers and counters are logged as `METRIC: {json}` lines through
//! `tracing` under the `klaviyo_tap::metrics` target, so they land on stderr
//! next to the rest of the log and never mix with the message stream.

use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::info;

/// Log target for metric points
pub const TARGET: &str = "klaviyo_tap::metrics";

/// Metric name of the per-request timer
pub const HTTP_REQUEST_DURATION: &str = "http_request_duration";

/// Metric name of the per-stream record counter
pub const RECORD_COUNT: &str = "record_count";

/// Kind of metric point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Timer,
    Counter,
}

/// One emitted measurement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricPoint {
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    pub metric: &'static str,
    pub value: Value,
    pub tags: Map<String, Value>,
}

impl MetricPoint {
    /// Write the point to the log
    pub fn log(&self) {
        match serde_json::to_string(self) {
            Ok(json) => info!(target: TARGET, "METRIC: {json}"),
            Err(e) => info!(target: TARGET, error = %e, "Failed to serialize metric"),
        }
    }
}

/// Outcome tag of a timed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed,
}

impl Outcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

/// Times one HTTP request against a resource
#[derive(Debug)]
pub struct Timer {
    endpoint: String,
    started: Instant,
}

impl Timer {
    /// Start timing a request
    pub fn start(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            started: Instant::now(),
        }
    }

    /// Stop the timer and log the point
    ///
    /// `status_code` is absent when no response arrived.
    pub fn finish(self, status_code: Option<u16>, outcome: Outcome) -> MetricPoint {
        let mut tags = Map::new();
        tags.insert("endpoint".to_string(), Value::from(self.endpoint));
        tags.insert(
            "http_status_code".to_string(),
            status_code.map_or(Value::Null, Value::from),
        );
        tags.insert("status".to_string(), Value::from(outcome.as_str()));

        let point = MetricPoint {
            metric_type: MetricType::Timer,
            metric: HTTP_REQUEST_DURATION,
            value: Value::from(self.started.elapsed().as_secs_f64()),
            tags,
        };
        point.log();
        point
    }
}

/// Counts records emitted for a stream
#[derive(Debug)]
pub struct Counter {
    endpoint: String,
    value: u64,
}

impl Counter {
    /// Create a counter for a stream
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            value: 0,
        }
    }

    /// Add to the count
    pub fn increment(&mut self, by: u64) {
        self.value += by;
    }

    /// Current count
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Log the final count
    pub fn finish(self) -> MetricPoint {
        let mut tags = Map::new();
        tags.insert("endpoint".to_string(), Value::from(self.endpoint));

        let point = MetricPoint {
            metric_type: MetricType::Counter,
            metric: RECORD_COUNT,
            value: Value::from(self.value),
            tags,
        };
        point.log();
        point
    }
}
