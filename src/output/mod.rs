//! Output module
//!
//! Emits the record-stream protocol: `SCHEMA`, `RECORD` and `STATE`
//! messages, one JSON document per line.
//!
//! # Overview
//!
//! - `Message` - The three protocol messages
//! - `Sink` - Where messages go (stdout in the binary)
//! - `MemorySink` - Collects messages for inspection

mod message;
mod sink;

pub use message::{extraction_time, Message};
pub use sink::{JsonLinesSink, MemorySink, Sink};
