//! Record normalizer module
//!
//! Supports: passthrough, events, profiles, list/segment membership
//!
//! # Overview
//!
//! Revisioned resources nest their fields under `attributes` and link to
//! other objects through `relationships`. Normalizers turn each row into a
//! flat record, adding derived fields where a resource needs them. They
//! only fail on rows whose structure is wrong, never on missing optional
//! fields.

mod normalizers;
mod types;

pub use normalizers::{
    normalize_page, normalizer_for, EventNormalizer, MembershipNormalizer, PassthroughNormalizer,
    ProfileNormalizer,
};
pub use types::{extract_records, NormalizeContext, RecordNormalizer};

#[cfg(test)]
mod tests;
