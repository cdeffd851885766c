//! MEGA-DATA command-line client
//!
//! Run with:
//! ```bash
//! cargo run -p megadata-cli -- --help
//! ```
//!
//! Configuration is loaded from `megadata.toml` and `MEGADATA_*` variables.

mod cli;
mod commands;
mod output;

use clap::Parser;
use std::process::ExitCode;
use tracing::error;

use megadata_client::ServiceError;
use megadata_common::{try_init_tracing_with_config, AppConfig, TracingConfig};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(path) = &cli.session_file {
        config.session.file.clone_from(path);
    }

    let mut tracing = TracingConfig::cli(config.log.json);
    if cli.verbose {
        tracing = tracing.verbose();
    }
    if let Err(e) = try_init_tracing_with_config(tracing) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    match commands::run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("error: {e:#}");
            if e
                .downcast_ref::<ServiceError>()
                .is_some_and(ServiceError::is_auth_error)
            {
                eprintln!("hint: sign in again with `megadata login`");
            }
            ExitCode::FAILURE
        }
    }
}
