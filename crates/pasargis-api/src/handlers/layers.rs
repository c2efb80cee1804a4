use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use pasargis_core::models::{GisLayer, LayerId, LayerUpdate, NewLayer};

use crate::dto::{LayerListQuery, MessageResponse};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_layers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LayerListQuery>,
) -> Result<Json<Vec<GisLayer>>, ApiError> {
    tracing::info!(pasar_id = ?query.pasar_id, "Listing GIS layers");

    let layers = state.layer_store.list_layers(query.pasar_id).await?;
    Ok(Json(layers))
}

pub async fn create_layer(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewLayer>,
) -> Result<(StatusCode, Json<GisLayer>), ApiError> {
    request.validate()?;

    let layer = state.layer_store.create_layer(request).await?;
    tracing::info!(layer_id = %layer.id, name = %layer.name, "Created GIS layer");

    Ok((StatusCode::CREATED, Json(layer)))
}

pub async fn update_layer(
    State(state): State<Arc<AppState>>,
    Path(layer_id): Path<u64>,
    Json(request): Json<LayerUpdate>,
) -> Result<Json<GisLayer>, ApiError> {
    request.validate()?;

    let layer = state.layer_store.update_layer(LayerId(layer_id), request).await?;
    tracing::info!(layer_id, "Updated GIS layer");

    Ok(Json(layer))
}

pub async fn delete_layer(
    State(state): State<Arc<AppState>>,
    Path(layer_id): Path<u64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.layer_store.delete_layer(LayerId(layer_id)).await?;
    tracing::info!(layer_id, "Deleted GIS layer");

    Ok(Json(MessageResponse::new("Layer deleted")))
}
