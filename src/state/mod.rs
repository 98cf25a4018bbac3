//! State management module
//!
//! Handles bookmark tracking, checkpointing, and resumability.
//! State is persisted after every emitted page so an interrupted run
//! resumes where the last flushed page left off.
//!
//! # Overview
//!
//! The state module provides:
//! - `Cursor` - Canonical, temporally ordered bookmark value
//! - `State` - Per-stream bookmarks with the monotonic-advance rule
//! - `StateManager` - File-based state persistence

mod cursor;
mod manager;
mod types;

pub use cursor::{latest, Cursor, CursorValue, CURSOR_FORMAT};
pub use manager::StateManager;
pub use types::{Bookmark, State};
