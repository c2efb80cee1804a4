use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use pasargis_core::models::LayerId;

use crate::dto::{GdbLayersResponse, UploadResponse};
use crate::error::ApiError;
use crate::services::{UploadForm, UploadService};
use crate::state::AppState;

pub async fn upload_layer_file(
    State(state): State<Arc<AppState>>,
    Path(layer_id): Path<u64>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let form = UploadForm::from_multipart(&mut multipart).await?;

    tracing::info!(
        layer_id,
        filename = %form.filename,
        size = form.data.len(),
        layer_name = ?form.layer_name,
        "Received layer upload"
    );

    let response = UploadService::upload(&state, LayerId(layer_id), form).await?;
    Ok(Json(response))
}

pub async fn list_gdb_layers(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<GdbLayersResponse>, ApiError> {
    let form = UploadForm::from_multipart(&mut multipart).await?;

    tracing::info!(filename = %form.filename, size = form.data.len(), "Listing geodatabase layers");

    let listing = state.pipeline.list_gdb_layers(&form.filename, form.data).await?;
    Ok(Json(listing.into()))
}
