//! Command implementations

mod config;
mod ingest;
mod inspect;
mod layers;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use pasargis_core::config::LayeredConfig;
use pasargis_core::error::IngestError;
use std::path::Path;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let layered = load_config(&cli)?;

    let result = match cli.command {
        Commands::Ingest(args) => ingest::execute(args, &layered.resolve(), &output).await,
        Commands::Layers(args) => layers::execute(args, &layered.resolve(), &output).await,
        Commands::Inspect(args) => inspect::execute(args, &output).await,
        Commands::Config => config::execute(&layered, &output),
    };

    if let Err(err) = &result {
        if let Some(ingest_err) = err.downcast_ref::<IngestError>() {
            output.ingest_error(ingest_err);
        }
    }
    result
}

/// Defaults, then the optional TOML file, then environment, then flags
fn load_config(cli: &Cli) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();
    if let Some(path) = &cli.config {
        config = config
            .load_from_file(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?;
    }
    let mut config = config.load_from_env();
    config.update_from_cli(cli.config_overrides());
    Ok(config)
}

/// Read an input file into memory
async fn read_input(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// Client-declared file name used for format dispatch
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
