//! Inspect command implementation

use crate::cli::InspectArgs;
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use pasargis_ingest::archive;
use serde::Serialize;

#[derive(Serialize)]
struct InspectOutput {
    gdb_name: String,
    /// Path of the geodatabase relative to the archive root
    path: String,
    strategy: String,
}

pub async fn execute(args: InspectArgs, output: &OutputWriter) -> Result<()> {
    let data = super::read_input(&args.file).await?;
    let extract_dir = tempfile::Builder::new()
        .prefix("temp_gdb_")
        .tempdir()
        .context("Failed to create extraction directory")?;

    let root = extract_dir.path().to_path_buf();
    let location = tokio::task::spawn_blocking(move || archive::inspect_archive(data, &root))
        .await
        .context("Archive inspection task failed")??;

    let relative = location
        .path
        .strip_prefix(extract_dir.path())
        .unwrap_or(&location.path)
        .display()
        .to_string();

    if output.is_json() {
        return output.result(InspectOutput {
            gdb_name: location.name(),
            path: relative,
            strategy: location.strategy.to_string(),
        });
    }

    output.success(format!("Found {}", location.name()));
    output.kv("Path", relative);
    output.kv("Detected by", location.strategy);
    Ok(())
}
