use axum::extract::Multipart;
use pasargis_core::models::LayerId;

use crate::dto::UploadResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// Multipart fields of an upload request
#[derive(Debug)]
pub struct UploadForm {
    pub filename: String,
    pub data: Vec<u8>,
    /// Feature class to convert when the archive holds several
    pub layer_name: Option<String>,
}

impl UploadForm {
    /// Read the `file` part and the optional `layer_name` field
    pub async fn from_multipart(multipart: &mut Multipart) -> Result<Self, ApiError> {
        let mut file = None;
        let mut layer_name = None;

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            ApiError::new(e.status(), "Failed to parse multipart form").with_detail(e.body_text())
        })? {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "file" => {
                    let filename = field.file_name().unwrap_or("upload").to_string();
                    let data = field.bytes().await.map_err(|e| {
                        ApiError::new(e.status(), "Failed to read file data")
                            .with_detail(e.body_text())
                    })?;
                    file = Some((filename, data.to_vec()));
                }
                "layer_name" => {
                    let value = field.text().await.map_err(|e| {
                        ApiError::new(e.status(), "Failed to read layer_name")
                            .with_detail(e.body_text())
                    })?;
                    let value = value.trim();
                    if !value.is_empty() {
                        layer_name = Some(value.to_string());
                    }
                }
                _ => {}
            }
        }

        let (filename, data) = file.ok_or_else(|| {
            ApiError::unprocessable("No file provided")
                .with_detail("Expected a 'file' field in the multipart form")
        })?;

        Ok(Self {
            filename,
            data,
            layer_name,
        })
    }
}

/// Service for replacing a layer's GeoJSON from an uploaded file
pub struct UploadService;

impl UploadService {
    /// Run the ingestion pipeline and store the result on the layer.
    ///
    /// The stored payload is only replaced after the pipeline succeeds.
    pub async fn upload(
        state: &AppState,
        layer_id: LayerId,
        form: UploadForm,
    ) -> Result<UploadResponse, ApiError> {
        if state.layer_store.get_layer(layer_id).await?.is_none() {
            return Err(ApiError::not_found(format!("GIS layer not found: {}", layer_id)));
        }

        let outcome = state
            .pipeline
            .ingest(&form.filename, form.data, form.layer_name.as_deref())
            .await?;

        let layer = state.layer_store.set_geojson(layer_id, outcome.payload()).await?;

        tracing::info!(
            layer_id = %layer_id,
            filename = %form.filename,
            reprojected = outcome.reprojected,
            features_count = ?outcome.features_count,
            "Layer GeoJSON replaced"
        );

        Ok(UploadResponse::from_outcome(layer, outcome))
    }
}
