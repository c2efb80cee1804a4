use async_trait::async_trait;

use crate::error::Result;
use crate::models::{GisLayer, LayerId, LayerUpdate, NewLayer};

/// Port for GIS layer persistence
#[async_trait]
pub trait LayerStore: Send + Sync {
    /// List layers ordered by `sort_order`, optionally restricted to one market
    async fn list_layers(&self, pasar_id: Option<u64>) -> Result<Vec<GisLayer>>;

    /// Retrieve a layer by ID
    async fn get_layer(&self, id: LayerId) -> Result<Option<GisLayer>>;

    /// Create a new layer and return it with its assigned ID
    async fn create_layer(&self, layer: NewLayer) -> Result<GisLayer>;

    /// Apply a partial update
    async fn update_layer(&self, id: LayerId, update: LayerUpdate) -> Result<GisLayer>;

    /// Replace the layer's GeoJSON payload in a single write
    async fn set_geojson(&self, id: LayerId, geojson: String) -> Result<GisLayer>;

    /// Delete a layer
    async fn delete_layer(&self, id: LayerId) -> Result<()>;
}
