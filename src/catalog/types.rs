//! Resource descriptor types
//!
//! A [`ResourceDescriptor`] says everything the engine needs to pull one
//! resource: where it lives, how it pages, how its rows are flattened and
//! how its progress is tracked. Descriptors are immutable static data.

use crate::error::{Error, Result};
use crate::state::Cursor;

/// API revision header sent to revisioned resources
pub const REVISION: &str = "2024-02-15";

/// Which generation of the remote API a resource belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiGeneration {
    /// `/api/v1` and `/api/v2/group`, key passed as a query parameter
    Legacy,
    /// Date-revisioned JSON:API resources, key passed in a header
    Revisioned,
}

/// Kind of parent a child resource is partitioned by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentKind {
    List,
    Segment,
}

impl ParentKind {
    /// Config key listing the parent identifiers
    pub fn config_key(&self) -> &'static str {
        match self {
            Self::List => "list_ids",
            Self::Segment => "segment_ids",
        }
    }

    /// Placeholder substituted in the path template
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::List => "{list_id}",
            Self::Segment => "{segment_id}",
        }
    }
}

/// Field every child record is tagged with, for list and segment parents alike
pub const PARENT_TAG_FIELD: &str = "list_id";

/// Placeholder for the metric identifier of a legacy timeline
pub const METRIC_PLACEHOLDER: &str = "{metric_id}";

/// Where a link-follow resource finds its continuation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkLocation {
    /// `links.next` holds an absolute URL requested verbatim
    BodyLinks,
    /// Top-level `next` holds a token re-sent as the `since` parameter
    NextToken,
}

/// Pagination strategy tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationKind {
    /// Follow a pointer carried in the payload
    Link(LinkLocation),
    /// `page=0,1,2...` until `end >= total - 1`
    PageIndex,
    /// Opaque `marker` per parent
    Marker,
}

/// Normalizer tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizerKind {
    Passthrough,
    Events,
    Profiles,
    Membership,
}

/// How progress is tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replication {
    /// Resumes from a bookmark
    Incremental,
    /// Pulled completely on every run
    Full,
    /// Pulled completely once per configured parent id
    Child(ParentKind),
}

/// How the lower bound of a pull is expressed on the first request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorFilter {
    /// No lower bound sent
    None,
    /// `since=<epoch seconds>`
    SinceEpoch,
    /// `filter=greater-than(<field>,<cursor>)`
    GreaterThan(&'static str),
}

/// Request-shaping rules for a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestProfile {
    pub api: ApiGeneration,
    pub sort: Option<&'static str>,
    pub filter: CursorFilter,
    pub extra_params: &'static [(&'static str, &'static str)],
}

/// Everything known about one pullable resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Stream name
    pub name: &'static str,
    /// Primary key fields
    pub key_properties: &'static [&'static str],
    /// Path template, relative to the base URL
    pub path: &'static str,
    /// Field of the payload holding the records array
    pub records_path: &'static str,
    pub pagination: PaginationKind,
    pub normalizer: NormalizerKind,
    pub replication: Replication,
    pub request: RequestProfile,
}

impl ResourceDescriptor {
    /// Check if this resource resumes from a bookmark
    pub fn is_incremental(&self) -> bool {
        self.replication == Replication::Incremental
    }

    /// Parent kind for child resources
    pub fn parent(&self) -> Option<ParentKind> {
        match self.replication {
            Replication::Child(parent) => Some(parent),
            _ => None,
        }
    }

    /// Check if the path needs a metric identifier
    pub fn needs_metric_id(&self) -> bool {
        self.path.contains(METRIC_PLACEHOLDER)
    }

    /// Render the path template with the identifier it requires
    pub fn render_path(&self, id: Option<&str>) -> Result<String> {
        let placeholder = match self.parent() {
            Some(parent) => Some(parent.placeholder()),
            None if self.needs_metric_id() => Some(METRIC_PLACEHOLDER),
            None => None,
        };

        match (placeholder, id) {
            (None, _) => Ok(self.path.to_string()),
            (Some(placeholder), Some(id)) if !id.is_empty() => {
                Ok(self.path.replace(placeholder, id))
            }
            (Some(placeholder), _) => Err(Error::config(format!(
                "Stream '{}' needs a value for {placeholder}",
                self.name
            ))),
        }
    }

    /// Build the full URL of the first request
    pub fn url(&self, base_url: &str, id: Option<&str>) -> Result<String> {
        let path = self.render_path(id)?;
        let base = url::Url::parse(base_url)?;
        Ok(base.join(&path)?.to_string())
    }

    /// Query parameters of the first request
    ///
    /// `lower` is the lower bound of the pull; it is only sent when the
    /// resource declares a cursor filter.
    pub fn first_page_query(&self, lower: Option<Cursor>) -> Vec<(String, String)> {
        let mut query = Vec::new();

        if let Some(sort) = self.request.sort {
            query.push(("sort".to_string(), sort.to_string()));
        }

        match (self.request.filter, lower) {
            (CursorFilter::SinceEpoch, Some(lower)) => {
                query.push(("since".to_string(), lower.epoch().to_string()));
            }
            (CursorFilter::GreaterThan(field), Some(lower)) => {
                query.push(("filter".to_string(), format!("greater-than({field},{lower})")));
            }
            _ => {}
        }

        for (key, value) in self.request.extra_params {
            query.push((key.to_string(), value.to_string()));
        }

        query
    }
}
