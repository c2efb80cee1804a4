//! Error types for Pasar GIS

use std::path::PathBuf;
use thiserror::Error;

/// Maximum number of diagnostic items carried by [`IngestError::GeodatabaseNotFound`].
pub const MAX_DIAGNOSTIC_ITEMS: usize = 30;

#[derive(Debug, Error)]
pub enum IngestError {
    // Upload errors
    #[error("Invalid GeoJSON file: {reason}")]
    InvalidGeoJson { reason: String },

    #[error("Unsupported file format '.{extension}'. Use .zip (containing a .gdb), .json, or .geojson")]
    UnsupportedFormat { extension: String },

    #[error("Failed to open ZIP archive: {reason}")]
    ArchiveOpen { reason: String },

    #[error("No .gdb folder found inside the ZIP archive")]
    GeodatabaseNotFound {
        zip_entries: Vec<String>,
        extracted_items: Vec<String>,
    },

    // Converter errors
    #[error("Conversion tool not found at {path}")]
    ConverterUnavailable { path: PathBuf },

    #[error("Conversion tool is missing a required dependency. Install: pip install geopandas fiona pyproj shapely")]
    MissingDependency { output: String },

    #[error("GDB conversion failed (exit code {})", exit_code_label(.exit_code))]
    ConversionFailed {
        exit_code: Option<i32>,
        output: String,
    },

    #[error("Conversion succeeded but produced no GeoJSON files")]
    EmptyConversion { output: String },

    #[error("Conversion output is not valid GeoJSON: {reason}")]
    InvalidConversionOutput { reason: String },

    #[error("Conversion timed out after {seconds} seconds")]
    ConversionTimeout { seconds: u64 },

    // Layer errors
    #[error("GIS layer not found: {id}")]
    LayerNotFound { id: u64 },

    #[error("Invalid value for {field}: {reason}")]
    Validation { field: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    #[error("Background task failed: {0}")]
    Task(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// Whether the failure was caused by the uploaded content rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidGeoJson { .. }
                | Self::UnsupportedFormat { .. }
                | Self::ArchiveOpen { .. }
                | Self::GeodatabaseNotFound { .. }
                | Self::Validation { .. }
        )
    }

    /// Actionable guidance for the uploader, when there is any.
    pub fn help(&self) -> Option<&'static str> {
        match self {
            Self::GeodatabaseNotFound { .. } => Some(
                "Make sure the ZIP contains a .gdb folder (e.g. PasarRejomulyo.gdb/) holding .gdbtable files.",
            ),
            Self::UnsupportedFormat { .. } => {
                Some("Upload a .zip archive containing a .gdb folder, or a .json/.geojson file.")
            }
            Self::ConverterUnavailable { .. } => {
                Some("Ensure gis-tools/convert_gdb_to_geojson.py exists or set PASARGIS_CONVERTER_SCRIPT.")
            }
            _ => None,
        }
    }

    /// Captured converter output attached to conversion failures.
    pub fn tool_output(&self) -> Option<&str> {
        match self {
            Self::MissingDependency { output }
            | Self::ConversionFailed { output, .. }
            | Self::EmptyConversion { output } => Some(output),
            _ => None,
        }
    }
}

fn exit_code_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

pub type Result<T> = std::result::Result<T, IngestError>;
