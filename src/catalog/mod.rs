//! Resource catalog module
//!
//! One static table describes every resource the tap can pull. The engine
//! looks a stream up by name and builds its paginator and normalizer from
//! the descriptor's tags.
//!
//! # Overview
//!
//! - `ResourceDescriptor` - Path, paging, flattening and replication rules
//! - `descriptor` - Lookup by stream name
//! - `EVENT_MAPPINGS` - Metric names replicated as legacy timelines

mod resources;
mod types;

pub use resources::{all, descriptor, stream_for_metric, EVENT_MAPPINGS};
pub use types::{
    ApiGeneration, CursorFilter, LinkLocation, NormalizerKind, PaginationKind, ParentKind,
    Replication, RequestProfile, ResourceDescriptor, METRIC_PLACEHOLDER, PARENT_TAG_FIELD,
    REVISION,
};
