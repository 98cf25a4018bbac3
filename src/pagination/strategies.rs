//! Pagination strategy implementations

use super::types::{NextPage, PageRequest, Paginator};
use crate::catalog::{LinkLocation, PaginationKind};
use crate::error::{Error, Result};
use crate::types::{lookup, scalar_token};
use serde_json::Value;

/// Build the paginator for a descriptor's pagination tag
pub fn paginator_for(kind: PaginationKind) -> Box<dyn Paginator> {
    match kind {
        PaginationKind::Link(location) => Box::new(LinkPaginator::new(location)),
        PaginationKind::PageIndex => Box::new(PageIndexPaginator::default()),
        PaginationKind::Marker => Box::new(MarkerPaginator::default()),
    }
}

// ============================================================================
// Link Pagination
// ============================================================================

/// Follows a continuation pointer carried in the payload
///
/// With [`LinkLocation::BodyLinks`] the pointer is an absolute URL requested
/// verbatim. With [`LinkLocation::NextToken`] it is a token re-sent as the
/// `since` parameter of the same URL.
#[derive(Debug, Clone)]
pub struct LinkPaginator {
    location: LinkLocation,
}

impl LinkPaginator {
    /// Create a new link paginator
    pub fn new(location: LinkLocation) -> Self {
        Self { location }
    }
}

impl Paginator for LinkPaginator {
    fn next_request(&self, body: &Value, current: &PageRequest) -> Result<NextPage> {
        match self.location {
            LinkLocation::BodyLinks => Ok(lookup(body, "links.next")
                .and_then(Value::as_str)
                .filter(|next| !next.is_empty())
                .map_or(NextPage::Done, |next| {
                    NextPage::Continue(PageRequest::new(next))
                })),
            LinkLocation::NextToken => {
                let Some(token) = body.get("next").and_then(scalar_token) else {
                    return Ok(NextPage::Done);
                };
                let mut next = current.clone();
                next.set_param("since", token);
                Ok(NextPage::Continue(next))
            }
        }
    }
}

// ============================================================================
// Page Index Pagination
// ============================================================================

/// Zero-based `page` parameter, stopping once `end >= total - 1`
#[derive(Debug, Clone)]
pub struct PageIndexPaginator {
    page_param: String,
}

impl Default for PageIndexPaginator {
    fn default() -> Self {
        Self {
            page_param: "page".to_string(),
        }
    }
}

impl Paginator for PageIndexPaginator {
    fn initial_params(&self) -> Vec<(String, String)> {
        vec![(self.page_param.clone(), "0".to_string())]
    }

    fn next_request(&self, body: &Value, current: &PageRequest) -> Result<NextPage> {
        let end = required_integer(body, "end")?;
        let total = required_integer(body, "total")?;

        if end >= total - 1 {
            return Ok(NextPage::Done);
        }

        let page = current
            .param(&self.page_param)
            .and_then(|p| p.parse::<u64>().ok())
            .unwrap_or(0);

        let mut next = current.clone();
        next.set_param(&self.page_param, (page + 1).to_string());
        Ok(NextPage::Continue(next))
    }
}

fn required_integer(body: &Value, field: &str) -> Result<i64> {
    body.get(field)
        .and_then(|v| v.as_i64().or_else(|| v.as_str()?.parse().ok()))
        .ok_or_else(|| Error::decode(format!("index page is missing integer '{field}'")))
}

// ============================================================================
// Marker Pagination
// ============================================================================

/// Opaque `marker` token echoed back until the payload stops returning one
#[derive(Debug, Clone)]
pub struct MarkerPaginator {
    marker_param: String,
}

impl Default for MarkerPaginator {
    fn default() -> Self {
        Self {
            marker_param: "marker".to_string(),
        }
    }
}

impl Paginator for MarkerPaginator {
    fn next_request(&self, body: &Value, current: &PageRequest) -> Result<NextPage> {
        let Some(marker) = body.get(&self.marker_param).and_then(scalar_token) else {
            return Ok(NextPage::Done);
        };

        let mut next = current.clone();
        next.set_param(&self.marker_param, marker);
        Ok(NextPage::Continue(next))
    }
}
