//! Layers command implementation

use crate::cli::LayersArgs;
use crate::output::OutputWriter;
use anyhow::Result;
use pasargis_core::config::IngestSettings;
use pasargis_ingest::IngestPipeline;
use serde::Serialize;

#[derive(Serialize)]
struct LayersOutput {
    gdb_name: String,
    layers: Vec<String>,
}

pub async fn execute(args: LayersArgs, settings: &IngestSettings, output: &OutputWriter) -> Result<()> {
    let filename = super::display_name(&args.file);
    let data = super::read_input(&args.file).await?;

    let pipeline = IngestPipeline::from_settings(settings);
    let listing = pipeline.list_gdb_layers(&filename, data).await?;

    if output.is_json() {
        return output.result(LayersOutput {
            gdb_name: listing.gdb_name,
            layers: listing.layers,
        });
    }

    output.section(format!("Layers in {}", listing.gdb_name));
    if listing.layers.is_empty() {
        output.info("The conversion tool reported no layers");
    }
    for (i, layer) in listing.layers.iter().enumerate() {
        output.item(i + 1, layer);
    }
    Ok(())
}
