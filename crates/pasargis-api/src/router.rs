use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        // Health
        .route("/health", get(handlers::health_check))

        // GIS layers
        .route("/api/admin/layers", get(handlers::list_layers).post(handlers::create_layer))
        .route(
            "/api/admin/layers/{layer_id}",
            put(handlers::update_layer).delete(handlers::delete_layer),
        )

        // Uploads
        .route("/api/admin/layers/{layer_id}/upload", post(handlers::upload_layer_file))
        .route("/api/admin/gdb/layers", post(handlers::list_gdb_layers))

        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
