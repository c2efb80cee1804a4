//! Pasar GIS Ingest - GeoJSON and File Geodatabase upload pipeline
//!
//! The pipeline accepts an uploaded file, locates a `.gdb` folder inside zip
//! archives, delegates geodatabase reading to an external conversion tool, and
//! normalizes the resulting GeoJSON to WGS84.

pub mod archive;
pub mod convert;
pub mod pipeline;
pub mod workspace;

pub use archive::{DetectionStrategy, GdbLocation};
pub use convert::{GdbConverter, ScriptConverter, ToolOutput};
pub use pipeline::{IngestOutcome, IngestPipeline, LayerListing, UploadFormat};
pub use workspace::ArchiveWorkspace;
