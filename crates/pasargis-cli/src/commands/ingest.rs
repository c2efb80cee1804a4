//! Ingest command implementation

use crate::cli::IngestArgs;
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use pasargis_core::config::IngestSettings;
use pasargis_ingest::IngestPipeline;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct IngestOutput {
    input: String,
    output: String,
    reprojected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    features_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    available_layers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    converted_file: Option<String>,
}

pub async fn execute(args: IngestArgs, settings: &IngestSettings, output: &OutputWriter) -> Result<()> {
    let filename = super::display_name(&args.file);
    let data = super::read_input(&args.file).await?;

    let pipeline = IngestPipeline::from_settings(settings);
    let outcome = pipeline.ingest(&filename, data, args.layer.as_deref()).await?;

    let destination = args.output.unwrap_or_else(|| default_output_path(&args.file));
    tokio::fs::write(&destination, outcome.payload())
        .await
        .with_context(|| format!("Failed to write {}", destination.display()))?;

    if output.is_json() {
        return output.result(IngestOutput {
            input: args.file.display().to_string(),
            output: destination.display().to_string(),
            reprojected: outcome.reprojected,
            features_count: outcome.features_count,
            available_layers: outcome.available_layers,
            converted_file: outcome.converted_file,
        });
    }

    output.success(format!("Wrote {}", destination.display()));
    output.kv("Reprojected", if outcome.reprojected { "yes (Web Mercator → WGS84)" } else { "no" });
    if let Some(count) = outcome.features_count {
        output.kv("Features", count);
    }
    if let Some(file) = &outcome.converted_file {
        output.kv("Converted layer", file);
    }
    if let Some(layers) = outcome.available_layers.filter(|l| l.len() > 1) {
        output.section("Available Layers");
        for (i, layer) in layers.iter().enumerate() {
            output.item(i + 1, layer);
        }
        output.info("Pick one with --layer <NAME>");
    }
    Ok(())
}

/// `<dir>/<stem>.wgs84.geojson` next to the input
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}.wgs84.geojson", stem))
}
