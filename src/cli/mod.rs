//! CLI module
//!
//! Command-line interface for running the tap.
//!
//! # Commands
//!
//! - `discover` - Print the catalog of available streams
//! - `sync` - Replicate selected streams as a message stream on stdout

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
