use pasargis_core::models::GisLayer;
use pasargis_ingest::{IngestOutcome, LayerListing};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self { status: "ok", service: "pasargis-api" }
    }
}

/// Plain acknowledgement
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Layer upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub layer: GisLayer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reprojected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_layers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted_file: Option<String>,
}

impl UploadResponse {
    pub fn from_outcome(layer: GisLayer, outcome: IngestOutcome) -> Self {
        let message = match (&outcome.converted_file, outcome.reprojected) {
            (Some(_), _) => "GDB file converted and uploaded",
            (None, true) => "GeoJSON uploaded and converted to WGS84",
            (None, false) => "GeoJSON uploaded",
        };

        Self {
            message: message.to_string(),
            layer,
            reprojected: Some(outcome.reprojected),
            features_count: outcome.features_count,
            available_layers: outcome.available_layers,
            converted_file: outcome.converted_file,
        }
    }
}

/// Feature classes found in an uploaded geodatabase
#[derive(Debug, Serialize)]
pub struct GdbLayersResponse {
    pub layers: Vec<String>,
    pub gdb_name: String,
}

impl From<LayerListing> for GdbLayersResponse {
    fn from(listing: LayerListing) -> Self {
        Self {
            layers: listing.layers,
            gdb_name: listing.gdb_name,
        }
    }
}
