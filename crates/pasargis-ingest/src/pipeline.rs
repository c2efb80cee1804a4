//! Ingestion orchestrator: dispatches an upload by format and produces a
//! WGS84 GeoJSON document ready to be stored on a layer.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pasargis_core::config::IngestSettings;
use pasargis_core::error::{IngestError, Result};
use serde_json::Value;

use crate::archive::{self, GdbLocation};
use crate::convert::{self, GdbConverter, ScriptConverter};
use crate::workspace::ArchiveWorkspace;

/// Upload kinds accepted by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    GeoJson,
    Zip,
}

impl UploadFormat {
    /// Detect the format from the client-declared filename's extension
    pub fn from_filename(filename: &str) -> Result<Self> {
        let extension = extension_of(filename);
        match extension.as_str() {
            "json" | "geojson" => Ok(Self::GeoJson),
            "zip" => Ok(Self::Zip),
            _ => Err(IngestError::UnsupportedFormat { extension }),
        }
    }
}

fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Result of a successful ingest
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// Normalized GeoJSON document
    pub document: Value,
    /// Whether the document was converted from Web Mercator
    pub reprojected: bool,
    /// Feature count, reported for geodatabase uploads
    pub features_count: Option<usize>,
    /// Layer names produced by the conversion tool
    pub available_layers: Option<Vec<String>>,
    /// File name of the converted layer that was used
    pub converted_file: Option<String>,
}

impl IngestOutcome {
    /// Compact JSON text of the document, with non-ASCII characters unescaped
    pub fn payload(&self) -> String {
        self.document.to_string()
    }
}

/// Feature classes of an uploaded geodatabase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerListing {
    pub layers: Vec<String>,
    pub gdb_name: String,
}

/// Upload pipeline for GeoJSON files and zipped File Geodatabases
#[derive(Clone)]
pub struct IngestPipeline {
    converter: Arc<dyn GdbConverter>,
    workspace_root: PathBuf,
}

impl IngestPipeline {
    pub fn new(converter: Arc<dyn GdbConverter>, workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            converter,
            workspace_root: workspace_root.into(),
        }
    }

    /// Pipeline backed by the external conversion script
    pub fn from_settings(settings: &IngestSettings) -> Self {
        Self::new(
            Arc::new(ScriptConverter::from_settings(settings)),
            settings.workspace_root.clone(),
        )
    }

    /// Turn an uploaded file into a WGS84 GeoJSON document.
    ///
    /// Nothing is persisted here; callers store [`IngestOutcome::payload`]
    /// only after this returns `Ok`.
    pub async fn ingest(
        &self,
        filename: &str,
        data: Vec<u8>,
        layer_hint: Option<&str>,
    ) -> Result<IngestOutcome> {
        let format = UploadFormat::from_filename(filename)?;
        tracing::info!(filename, format = ?format, bytes = data.len(), "Ingesting upload");

        match format {
            UploadFormat::GeoJson => self.ingest_geojson(data).await,
            UploadFormat::Zip => self.ingest_archive(data, layer_hint).await,
        }
    }

    /// List the feature classes of a zipped geodatabase without converting it
    pub async fn list_gdb_layers(&self, filename: &str, data: Vec<u8>) -> Result<LayerListing> {
        if UploadFormat::from_filename(filename)? != UploadFormat::Zip {
            return Err(IngestError::UnsupportedFormat {
                extension: extension_of(filename),
            });
        }

        let pipeline = self.clone();
        detached(async move {
            let workspace = ArchiveWorkspace::create(&pipeline.workspace_root)?;
            let result = pipeline.list_in(&workspace, data).await;
            workspace.close();
            result
        })
        .await
    }

    async fn ingest_geojson(&self, data: Vec<u8>) -> Result<IngestOutcome> {
        let (document, reprojected) = blocking(move || {
            let mut document = parse_geojson(&data)
                .map_err(|reason| IngestError::InvalidGeoJson { reason })?;
            let reprojected = pasargis_geo::normalize_to_wgs84(&mut document);
            Ok((document, reprojected))
        })
        .await?;

        tracing::info!(reprojected, "GeoJSON upload normalized");

        Ok(IngestOutcome {
            document,
            reprojected,
            features_count: None,
            available_layers: None,
            converted_file: None,
        })
    }

    /// The workspace is owned by a spawned task and closed only after
    /// extraction and conversion finish, even if the caller is dropped.
    async fn ingest_archive(&self, data: Vec<u8>, layer_hint: Option<&str>) -> Result<IngestOutcome> {
        let pipeline = self.clone();
        let layer_hint = layer_hint.map(str::to_string);
        detached(async move {
            let workspace = ArchiveWorkspace::create(&pipeline.workspace_root)?;
            let result = pipeline
                .convert_in(&workspace, data, layer_hint.as_deref())
                .await;
            workspace.close();
            result
        })
        .await
    }

    async fn convert_in(
        &self,
        workspace: &ArchiveWorkspace,
        data: Vec<u8>,
        layer_hint: Option<&str>,
    ) -> Result<IngestOutcome> {
        let location = self.locate(workspace, data).await?;

        let conversion = convert::run_conversion(
            self.converter.as_ref(),
            &location.path,
            workspace.output_dir(),
            layer_hint,
        )
        .await?;

        let available_layers: Vec<String> = conversion.files.iter().map(|f| file_stem(f)).collect();
        let chosen = choose_file(&conversion.files, layer_hint)
            .ok_or_else(|| IngestError::EmptyConversion {
                output: conversion.output.clone(),
            })?
            .to_path_buf();
        let converted_file = chosen
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        tracing::info!(
            converted_file = %converted_file,
            available = available_layers.len(),
            "Reading converted layer"
        );

        let (document, reprojected) = blocking(move || {
            let data = std::fs::read(&chosen)?;
            let mut document = parse_geojson(&data)
                .map_err(|reason| IngestError::InvalidConversionOutput { reason })?;
            let reprojected = pasargis_geo::normalize_to_wgs84(&mut document);
            Ok((document, reprojected))
        })
        .await?;

        let features_count = document
            .get("features")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);

        Ok(IngestOutcome {
            document,
            reprojected,
            features_count: Some(features_count),
            available_layers: Some(available_layers),
            converted_file: Some(converted_file),
        })
    }

    async fn list_in(&self, workspace: &ArchiveWorkspace, data: Vec<u8>) -> Result<LayerListing> {
        let location = self.locate(workspace, data).await?;
        let layers = convert::list_layers(self.converter.as_ref(), &location.path).await?;

        tracing::info!(gdb = %location.name(), layer_count = layers.len(), "Listed geodatabase layers");

        Ok(LayerListing {
            layers,
            gdb_name: location.name(),
        })
    }

    async fn locate(&self, workspace: &ArchiveWorkspace, data: Vec<u8>) -> Result<GdbLocation> {
        let extract_dir = workspace.extract_dir().to_path_buf();
        let location = blocking(move || archive::inspect_archive(data, &extract_dir)).await?;

        tracing::info!(
            gdb_path = %location.path.display(),
            strategy = %location.strategy,
            "Located geodatabase"
        );
        Ok(location)
    }
}

/// Parse uploaded bytes as a GeoJSON object
fn parse_geojson(data: &[u8]) -> std::result::Result<Value, String> {
    let value: Value = serde_json::from_slice(data).map_err(|e| e.to_string())?;
    if !value.is_object() {
        return Err("expected a JSON object".to_string());
    }
    Ok(value)
}

/// File whose stem equals the hint, otherwise the first file
fn choose_file<'a>(files: &'a [PathBuf], layer_hint: Option<&str>) -> Option<&'a Path> {
    layer_hint
        .and_then(|hint| files.iter().find(|f| file_stem(f) == hint))
        .or_else(|| files.first())
        .map(PathBuf::as_path)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Spawn `task` and wait for it; dropping the returned future leaves the task
/// running to completion.
async fn detached<T, F>(task: F) -> Result<T>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(task)
        .await
        .map_err(|e| IngestError::Task(e.to_string()))?
}

async fn blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| IngestError::Task(e.to_string()))?
}
