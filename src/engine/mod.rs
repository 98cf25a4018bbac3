//! Execution engine module
//!
//! Main read loop and stream orchestration.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - Validates the selection, then drives each stream through
//!   its incremental, full or per-parent loop
//! - `discover` - Builds the catalog from the account's metrics
//! - `SyncStats` - Counters of a run
//!
//! Every selected stream is checked before the first request goes out. A
//! stream then moves through `schema emitted -> loop -> done`; any error
//! aborts the run with the last persisted state intact.

mod discovery;
mod types;

pub use discovery::{discover, permissive_schema, select_runnable};
pub use types::{SyncStats, SyncTask};

use crate::catalog::{descriptor, Replication};
use crate::config::{Catalog, CatalogEntry, TapConfig};
use crate::error::{Error, Result};
use crate::http::Fetcher;
use crate::metrics::Counter;
use crate::normalize::{extract_records, normalize_page, normalizer_for, NormalizeContext};
use crate::output::{Message, Sink};
use crate::pagination::{first_request, pages, paginator_for, PageRequest, Paginator};
use crate::state::{latest, Cursor, StateManager};
use futures::TryStreamExt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Sync engine for orchestrating data extraction
pub struct SyncEngine<S: Sink> {
    /// Page source
    fetcher: Arc<dyn Fetcher>,
    /// Tap configuration
    config: TapConfig,
    /// State manager
    state: StateManager,
    /// Message destination
    sink: S,
    /// Statistics
    stats: SyncStats,
}

impl<S: Sink> SyncEngine<S> {
    /// Create a new sync engine
    pub fn new(fetcher: Arc<dyn Fetcher>, config: TapConfig, state: StateManager, sink: S) -> Self {
        Self {
            fetcher,
            config,
            state,
            sink,
            stats: SyncStats::default(),
        }
    }

    /// Get the state manager
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Get the sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the engine, returning the sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Build the catalog from the account's metrics
    pub async fn discover(&self) -> Result<Catalog> {
        discover(self.fetcher.as_ref(), &self.config).await
    }

    /// Validate every selected stream before any network call
    pub fn plan(&self, catalog: &Catalog) -> Result<Vec<SyncTask>> {
        catalog
            .selected()
            .map(|entry| self.plan_stream(entry))
            .collect()
    }

    fn plan_stream(&self, entry: &CatalogEntry) -> Result<SyncTask> {
        let resource = descriptor(&entry.stream).ok_or_else(|| Error::StreamNotFound {
            stream: entry.stream.clone(),
        })?;

        let parent_ids = match resource.parent() {
            Some(parent) => {
                let ids = self.config.parent_ids(parent);
                if ids.is_empty() {
                    return Err(Error::missing_parents(&entry.stream, parent));
                }
                ids.to_vec()
            }
            None => Vec::new(),
        };

        let metric_id = if resource.needs_metric_id() {
            let id = entry.tap_stream_id.trim();
            if id.is_empty() {
                return Err(Error::config(format!(
                    "Stream '{}' needs its metric id as tap_stream_id",
                    entry.stream
                )));
            }
            Some(id.to_string())
        } else {
            None
        };

        Ok(SyncTask {
            entry: entry.clone(),
            resource,
            metric_id,
            parent_ids,
        })
    }

    /// Sync every selected stream of `catalog`
    pub async fn sync(&mut self, catalog: &Catalog) -> Result<SyncStats> {
        let start = Instant::now();
        let tasks = self.plan(catalog)?;
        let start_date = self.config.start_cursor()?;
        info!(streams = tasks.len(), "Starting sync");

        for task in &tasks {
            self.sync_task(task, start_date).await?;
        }

        self.emit_state()?;
        self.sink.flush()?;

        self.stats.set_duration(start.elapsed().as_millis() as u64);
        info!(
            streams = self.stats.streams_synced,
            records = self.stats.records_synced,
            pages = self.stats.pages_fetched,
            duration_ms = self.stats.duration_ms,
            "Sync complete"
        );
        Ok(self.stats.clone())
    }

    async fn sync_task(&mut self, task: &SyncTask, start_date: Cursor) -> Result<()> {
        let resource = task.resource;
        let stream = task.stream();
        info!(stream, "Syncing stream");

        self.sink.write(&Message::schema(
            stream,
            task.entry.schema.clone(),
            task.key_properties(),
        ))?;

        let paginator = paginator_for(resource.pagination);
        let mut counter = Counter::new(stream);

        match resource.replication {
            Replication::Incremental => {
                let lower = self.state.starting_point(stream, Some(start_date));
                debug!(stream, lower = ?lower.map(|c| c.to_string()), "Resuming");
                let url = resource.url(&self.config.base_url, task.metric_id.as_deref())?;
                let first = first_request(url, resource.first_page_query(lower), paginator.as_ref());
                self.pull(task, paginator.as_ref(), first, None, &mut counter)
                    .await?;
            }
            Replication::Full => {
                let url = resource.url(&self.config.base_url, None)?;
                let first = first_request(
                    url,
                    resource.first_page_query(Some(start_date)),
                    paginator.as_ref(),
                );
                self.pull(task, paginator.as_ref(), first, None, &mut counter)
                    .await?;
            }
            Replication::Child(_) => {
                for parent_id in &task.parent_ids {
                    debug!(stream, parent_id = %parent_id, "Syncing parent");
                    let url = resource.url(&self.config.base_url, Some(parent_id))?;
                    let first =
                        first_request(url, resource.first_page_query(None), paginator.as_ref());
                    self.pull(task, paginator.as_ref(), first, Some(parent_id), &mut counter)
                        .await?;
                    self.stats.add_parent();
                }
            }
        }

        self.stats.add_stream();
        info!(stream, records = counter.value(), "Finished stream");
        counter.finish();
        Ok(())
    }

    /// Emit every page of one pull, advancing the bookmark after each
    async fn pull(
        &mut self,
        task: &SyncTask,
        paginator: &dyn Paginator,
        first: PageRequest,
        parent_id: Option<&str>,
        counter: &mut Counter,
    ) -> Result<()> {
        let resource = task.resource;
        let stream = task.stream();
        let normalizer = normalizer_for(resource.normalizer);
        let ctx = parent_id.map_or_else(NormalizeContext::default, NormalizeContext::for_parent);

        let fetcher = Arc::clone(&self.fetcher);
        let pages = pages(fetcher.as_ref(), resource, paginator, first);
        futures::pin_mut!(pages);

        while let Some(page) = pages.try_next().await? {
            self.stats.add_page();

            let rows = extract_records(&page.body, resource.records_path)?;
            let records = normalize_page(rows, normalizer.as_ref(), &ctx)?;
            if records.is_empty() {
                debug!(stream, page = page.index, "Empty page");
                continue;
            }

            let candidate = if resource.is_incremental() {
                latest(&records)
            } else {
                None
            };

            let count = records.len();
            self.sink.write_records(stream, records)?;
            self.sink.flush()?;
            counter.increment(count as u64);
            self.stats.add_records(stream, count);

            if let Some(candidate) = candidate {
                if self.state.advance(stream, Some(candidate.into()))? {
                    self.state.checkpoint().await?;
                    self.emit_state()?;
                    self.sink.flush()?;
                }
            }
        }

        Ok(())
    }

    fn emit_state(&mut self) -> Result<()> {
        let value = self.state.to_value()?;
        self.sink.write(&Message::state(value))
    }
}
