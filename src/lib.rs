// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # klaviyo-tap
//!
//! Pulls records from the Klaviyo REST API and emits them as a
//! `SCHEMA`/`RECORD`/`STATE` message stream, resuming incrementally from
//! persisted bookmarks.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use klaviyo_tap::{config::{Catalog, TapConfig}, engine::SyncEngine, http::HttpClient,
//!     output::JsonLinesSink, state::StateManager, Result};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = TapConfig::from_file("config.json")?;
//!     let client = HttpClient::new(config.http_config(), &config.credentials())?;
//!     let catalog = Catalog::from_file("catalog.json")?;
//!
//!     let mut engine = SyncEngine::new(
//!         Arc::new(client),
//!         config,
//!         StateManager::from_file("state.json")?,
//!         JsonLinesSink::stdout(),
//!     );
//!     engine.sync(&catalog).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │            SyncEngine (pre-flight, stream loops)             │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────┬───────────┬──────┴──────┬────────────┬───────────┐
//! │ Catalog  │   HTTP    │  Paginate   │ Normalize  │  Output   │
//! ├──────────┼───────────┼─────────────┼────────────┼───────────┤
//! │ Legacy   │ Retry     │ Link follow │ Events     │ SCHEMA    │
//! │ Revision │ Rate Limit│ Page index  │ Profiles   │ RECORD    │
//! │ Children │ Telemetry │ Marker      │ Membership │ STATE     │
//! └──────────┴───────────┴─────────────┴────────────┴───────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the tap
pub mod error;

/// Common types and type aliases
pub mod types;

/// Per-generation authentication
pub mod auth;

/// Resource descriptor table
pub mod catalog;

/// HTTP client with retry and rate limiting
pub mod http;

/// Request timers and record counters
pub mod metrics;

/// Pagination strategies
pub mod pagination;

/// Record normalizers
pub mod normalize;

/// Bookmarks and checkpointing
pub mod state;

/// Message stream output
pub mod output;

/// Stream orchestration and discovery
pub mod engine;

/// Tap config and catalog documents
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
