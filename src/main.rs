// Allow common clippy pedantic lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! Klaviyo tap CLI
//!
//! Messages go to stdout; logs and metrics go to stderr.

use clap::Parser;
use klaviyo_tap::cli::{Cli, Runner};
use klaviyo_tap::error::ErrorKind;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await {
        tracing::error!(error = %e, "Run failed");
        eprintln!("Error: {e}");
        let code = match e.kind() {
            ErrorKind::Configuration => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}
