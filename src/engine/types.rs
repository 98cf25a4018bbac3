//! Engine types
//!
//! The validated plan for one stream and the statistics of a run.

use crate::catalog::ResourceDescriptor;
use crate::config::CatalogEntry;
use std::collections::BTreeMap;

/// One selected stream that passed pre-flight validation
#[derive(Debug, Clone)]
pub struct SyncTask {
    /// The catalog entry as selected
    pub entry: CatalogEntry,
    /// Resource the stream name resolved to
    pub resource: &'static ResourceDescriptor,
    /// Metric id substituted into timeline paths
    pub metric_id: Option<String>,
    /// Parent ids for child resources, in config order
    pub parent_ids: Vec<String>,
}

impl SyncTask {
    /// Stream name
    pub fn stream(&self) -> &str {
        &self.entry.stream
    }

    /// Key properties to announce, falling back to the descriptor's
    pub fn key_properties(&self) -> Vec<String> {
        if self.entry.key_properties.is_empty() {
            self.resource
                .key_properties
                .iter()
                .map(|k| (*k).to_string())
                .collect()
        } else {
            self.entry.key_properties.clone()
        }
    }
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncStats {
    /// Total records emitted
    pub records_synced: usize,
    /// Total pages fetched
    pub pages_fetched: usize,
    /// Total streams synced
    pub streams_synced: usize,
    /// Total parents synced across child streams
    pub parents_synced: usize,
    /// Records emitted per stream
    pub stream_records: BTreeMap<String, usize>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add records for a stream
    pub fn add_records(&mut self, stream: &str, count: usize) {
        self.records_synced += count;
        *self.stream_records.entry(stream.to_string()).or_default() += count;
    }

    /// Add a page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Add a stream
    pub fn add_stream(&mut self) {
        self.streams_synced += 1;
    }

    /// Add a parent
    pub fn add_parent(&mut self) {
        self.parents_synced += 1;
    }

    /// Records emitted for one stream
    pub fn records_for(&self, stream: &str) -> usize {
        self.stream_records.get(stream).copied().unwrap_or(0)
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
