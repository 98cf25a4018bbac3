//! Pagination module
//!
//! Supports: Link-follow (`links.next` URL or `next` token), page index,
//! per-parent marker
//!
//! # Overview
//!
//! Each strategy looks at the page just fetched and the request that
//! produced it and decides the next request. The driver turns a strategy
//! into a lazy, finite stream of pages.

mod driver;
mod strategies;
mod types;

pub use driver::{first_request, pages};
pub use strategies::{paginator_for, LinkPaginator, MarkerPaginator, PageIndexPaginator};
pub use types::{NextPage, Page, PageRequest, Paginator};

#[cfg(test)]
mod tests;
