//! Catalog discovery
//!
//! Timeline streams exist only for metrics the account actually has, so
//! discovery pages through the legacy metrics list and keeps the metrics
//! named in [`EVENT_MAPPINGS`](crate::catalog::EVENT_MAPPINGS). Every other
//! resource is always offered.

use crate::catalog::{all, descriptor, stream_for_metric};
use crate::config::{Catalog, CatalogEntry, TapConfig};
use crate::error::{Error, Result};
use crate::http::Fetcher;
use crate::normalize::extract_records;
use crate::pagination::{first_request, pages, paginator_for};
use crate::types::{scalar_token, JsonValue};
use futures::TryStreamExt;
use serde_json::json;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Schema offered for every discovered stream
pub fn permissive_schema() -> JsonValue {
    json!({"type": "object", "additionalProperties": true})
}

/// Build the catalog: one timeline per known metric, then the fixed streams
pub async fn discover(fetcher: &dyn Fetcher, config: &TapConfig) -> Result<Catalog> {
    let metrics = descriptor("metrics").ok_or_else(|| Error::StreamNotFound {
        stream: "metrics".to_string(),
    })?;
    let paginator = paginator_for(metrics.pagination);
    let url = metrics.url(&config.base_url, None)?;
    let first = first_request(url, metrics.first_page_query(None), paginator.as_ref());

    let mut entries = Vec::new();
    let mut seen = HashSet::new();

    let pages = pages(fetcher, metrics, paginator.as_ref(), first);
    futures::pin_mut!(pages);

    while let Some(page) = pages.try_next().await? {
        for row in extract_records(&page.body, metrics.records_path)? {
            let Some(stream) = row
                .get("name")
                .and_then(JsonValue::as_str)
                .and_then(stream_for_metric)
            else {
                continue;
            };
            let Some(metric_id) = row.get("id").and_then(scalar_token) else {
                warn!(stream, "Metric has no id, skipping");
                continue;
            };
            if !seen.insert(stream) {
                warn!(stream, metric_id = %metric_id, "Duplicate metric, keeping the first");
                continue;
            }

            let key_properties = descriptor(stream).map_or(&["id"][..], |r| r.key_properties);
            entries.push(CatalogEntry::new(
                stream,
                metric_id,
                key_properties,
                permissive_schema(),
            ));
        }
    }
    info!(metric_streams = entries.len(), "Discovered metric streams");

    entries.extend(
        all()
            .iter()
            .filter(|resource| !resource.needs_metric_id())
            .map(|resource| {
                CatalogEntry::new(
                    resource.name,
                    resource.name,
                    resource.key_properties,
                    permissive_schema(),
                )
            }),
    );

    Ok(Catalog::new(entries))
}

/// Select every stream that can run with `config`
///
/// Child streams stay unselected when their parent ids are not configured.
pub fn select_runnable(catalog: &mut Catalog, config: &TapConfig) {
    for entry in &mut catalog.streams {
        let runnable = descriptor(&entry.stream).is_some_and(|resource| {
            resource
                .parent()
                .map_or(true, |parent| !config.parent_ids(parent).is_empty())
        });

        if runnable {
            entry.select();
        } else {
            debug!(stream = %entry.stream, "Leaving stream unselected");
        }
    }
}
