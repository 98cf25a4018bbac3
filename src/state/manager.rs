//! State manager implementation
//!
//! Owns the run's single [`State`] and provides file-based persistence with
//! atomic writes. The engine is the only writer.

use super::cursor::{Cursor, CursorValue};
use super::types::State;
use crate::error::{Error, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// State manager for persisting and loading state
#[derive(Debug, Clone)]
pub struct StateManager {
    /// Path to the state file (empty = in-memory)
    path: PathBuf,
    /// Current state
    state: State,
}

impl StateManager {
    /// Create a state manager that checkpoints to `path`, starting empty
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            state: State::new(),
        }
    }

    /// Create an in-memory state manager (no file persistence)
    pub fn in_memory() -> Self {
        Self::with_state(State::new())
    }

    /// Create an in-memory state manager seeded with `state`
    pub fn with_state(state: State) -> Self {
        Self {
            path: PathBuf::new(),
            state,
        }
    }

    /// Create a state manager from a file, loading existing state if present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| Error::State {
                message: format!("Failed to read state file: {e}"),
            })?;
            if contents.trim().is_empty() {
                State::new()
            } else {
                serde_json::from_str(&contents).map_err(|e| Error::State {
                    message: format!("Failed to parse state file: {e}"),
                })?
            }
        } else {
            State::new()
        };

        Ok(Self { path, state })
    }

    /// Create an in-memory state manager from inline JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let state: State = serde_json::from_str(json).map_err(|e| Error::State {
            message: format!("Failed to parse state JSON: {e}"),
        })?;

        Ok(Self::with_state(state))
    }

    /// Current state
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Current bookmark for a stream
    pub fn bookmark(&self, stream: &str) -> Option<Cursor> {
        self.state.bookmark(stream)
    }

    /// Lower bound for the next incremental pull of a stream
    pub fn starting_point(&self, stream: &str, start_date: Option<Cursor>) -> Option<Cursor> {
        self.state.starting_point(stream, start_date)
    }

    /// Monotonically advance a stream's bookmark (not persisted until
    /// [`checkpoint`](Self::checkpoint))
    pub fn advance(&mut self, stream: &str, candidate: Option<CursorValue>) -> Result<bool> {
        let moved = self.state.advance(stream, candidate)?;
        if let Some(since) = self.state.bookmark(stream) {
            if moved {
                info!(stream, %since, "Replicated up to");
            } else {
                debug!(stream, %since, "Bookmark unchanged");
            }
        }
        Ok(moved)
    }

    /// Persist current state to the configured file
    pub async fn checkpoint(&self) -> Result<()> {
        if self.is_in_memory() {
            return Ok(());
        }
        self.save_to_file(&self.path).await
    }

    /// Save state to a specific file path
    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.state).map_err(|e| Error::State {
            message: format!("Failed to serialize state: {e}"),
        })?;

        // Write to temp file first, then rename for atomicity
        let path = path.as_ref();
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::State {
                message: format!("Failed to write state file: {e}"),
            })?;

        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| Error::State {
                message: format!("Failed to rename state file: {e}"),
            })?;

        Ok(())
    }

    /// Export state as a JSON value
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(&self.state).map_err(|e| Error::State {
            message: format!("Failed to serialize state: {e}"),
        })
    }

    /// Export state as JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.state).map_err(|e| Error::State {
            message: format!("Failed to serialize state: {e}"),
        })
    }

    /// Get the state file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str().is_empty()
    }
}
