//! Page stream driver
//!
//! Turns a paginator and a fetcher into a lazy stream of pages. Each page is
//! fetched only when the consumer asks for it, so records of one page are
//! emitted (and state persisted) before the next request goes out.

use super::types::{NextPage, Page, PageRequest, Paginator};
use crate::catalog::ResourceDescriptor;
use crate::error::Result;
use crate::http::Fetcher;
use futures::stream::{self, Stream};
use tracing::debug;

/// Stream the pages of one resource, starting from `first`
///
/// The stream is finite (it ends when the paginator reports
/// [`NextPage::Done`]) and stops at the first error.
pub fn pages<'a>(
    fetcher: &'a dyn Fetcher,
    resource: &'a ResourceDescriptor,
    paginator: &'a dyn Paginator,
    first: PageRequest,
) -> impl Stream<Item = Result<Page>> + Send + 'a {
    stream::try_unfold(Some((first, 0usize)), move |pending| async move {
        let Some((request, index)) = pending else {
            return Ok(None);
        };

        let fetched = fetcher.fetch(resource, &request).await?;
        debug!(
            stream = resource.name,
            page = index,
            url = %request.url,
            "Fetched page"
        );

        let following = match paginator.next_request(&fetched.body, &request)? {
            NextPage::Continue(next) => Some((next, index + 1)),
            NextPage::Done => None,
        };

        let page = Page {
            index,
            status: fetched.status,
            body: fetched.body,
        };
        Ok(Some((page, following)))
    })
}

/// First request of a pull: the descriptor's query followed by the
/// paginator's initial parameters
pub fn first_request(
    url: impl Into<String>,
    resource_query: Vec<(String, String)>,
    paginator: &dyn Paginator,
) -> PageRequest {
    PageRequest::new(url)
        .with_query(resource_query)
        .with_query(paginator.initial_params())
}
