//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::{Catalog, TapConfig};
use crate::engine::{discover, select_runnable, SyncEngine};
use crate::error::{Error, Result};
use crate::http::{Fetcher, HttpClient};
use crate::output::JsonLinesSink;
use crate::state::StateManager;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Discover => self.discover().await,
            Commands::Sync { catalog } => self.sync(catalog.as_deref()).await,
        }
    }

    /// Load configuration
    fn load_config(&self) -> Result<TapConfig> {
        // Inline config takes precedence
        if let Some(json) = &self.cli.config_json {
            return TapConfig::from_json(json);
        }

        match &self.cli.config {
            Some(path) => TapConfig::from_file(path),
            None => Err(Error::config(
                "No configuration given (use --config or --config-json)",
            )),
        }
    }

    /// Load state
    fn load_state(&self) -> Result<StateManager> {
        // Inline state takes precedence
        if let Some(state_json) = &self.cli.state_json {
            StateManager::from_json(state_json)
        } else if let Some(path) = &self.cli.state {
            StateManager::from_file(path)
        } else {
            Ok(StateManager::in_memory())
        }
    }

    fn build_client(config: &TapConfig) -> Result<Arc<dyn Fetcher>> {
        let client = HttpClient::new(config.http_config(), &config.credentials())?;
        Ok(Arc::new(client))
    }

    /// Discover available streams
    async fn discover(&self) -> Result<()> {
        let config = self.load_config()?;
        let client = Self::build_client(&config)?;

        let catalog = discover(client.as_ref(), &config).await?;
        info!(streams = catalog.streams.len(), "Discovery complete");

        self.output_message(&serde_json::to_value(&catalog)?);
        Ok(())
    }

    /// Sync selected streams
    async fn sync(&self, catalog_path: Option<&Path>) -> Result<()> {
        let config = self.load_config()?;
        let state = self.load_state()?;
        let client = Self::build_client(&config)?;

        let catalog = match catalog_path {
            Some(path) => Catalog::from_file(path)?,
            None => {
                let mut catalog = discover(client.as_ref(), &config).await?;
                select_runnable(&mut catalog, &config);
                catalog
            }
        };

        let mut engine = SyncEngine::new(client, config, state, JsonLinesSink::stdout());
        let stats = engine.sync(&catalog).await?;

        info!(
            streams = stats.streams_synced,
            records = stats.records_synced,
            duration_ms = stats.duration_ms,
            "Sync finished"
        );
        Ok(())
    }

    /// Output a JSON document
    fn output_message(&self, msg: &Value) {
        println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
    }
}
