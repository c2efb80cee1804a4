//! In-memory layer storage for development and testing.
//!
//! This implementation uses `RwLock::unwrap()` intentionally. Lock poisoning
//! only occurs when another thread panicked while holding the lock, which is
//! an unrecoverable state.

use async_trait::async_trait;
use chrono::Utc;
use pasargis_core::error::{IngestError, Result};
use pasargis_core::models::{GisLayer, LayerId, LayerUpdate, NewLayer};
use pasargis_core::ports::LayerStore;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory implementation of LayerStore
#[derive(Debug, Clone, Default)]
pub struct MemoryLayerStore {
    layers: Arc<RwLock<HashMap<LayerId, GisLayer>>>,
    next_id: Arc<RwLock<u64>>,
}

impl MemoryLayerStore {
    /// Create a new in-memory layer store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored layers
    pub fn len(&self) -> usize {
        self.layers.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn allocate_id(&self) -> LayerId {
        let mut next_id = self.next_id.write().unwrap();
        *next_id += 1;
        LayerId(*next_id)
    }
}

#[async_trait]
impl LayerStore for MemoryLayerStore {
    async fn list_layers(&self, pasar_id: Option<u64>) -> Result<Vec<GisLayer>> {
        let layers = self.layers.read().unwrap();
        let mut result: Vec<GisLayer> = layers
            .values()
            .filter(|l| pasar_id.map_or(true, |id| l.pasar_id == id))
            .cloned()
            .collect();
        result.sort_by_key(|l| (l.sort_order, l.id));
        Ok(result)
    }

    async fn get_layer(&self, id: LayerId) -> Result<Option<GisLayer>> {
        Ok(self.layers.read().unwrap().get(&id).cloned())
    }

    async fn create_layer(&self, layer: NewLayer) -> Result<GisLayer> {
        let id = self.allocate_id();
        let layer = GisLayer::from_new(id, layer, Utc::now());
        self.layers.write().unwrap().insert(id, layer.clone());

        tracing::debug!(layer_id = %id, "Created layer");
        Ok(layer)
    }

    async fn update_layer(&self, id: LayerId, update: LayerUpdate) -> Result<GisLayer> {
        let mut layers = self.layers.write().unwrap();
        let layer = layers
            .get_mut(&id)
            .ok_or(IngestError::LayerNotFound { id: id.0 })?;
        layer.apply(update, Utc::now());
        Ok(layer.clone())
    }

    async fn set_geojson(&self, id: LayerId, geojson: String) -> Result<GisLayer> {
        let mut layers = self.layers.write().unwrap();
        let layer = layers
            .get_mut(&id)
            .ok_or(IngestError::LayerNotFound { id: id.0 })?;
        layer.geojson = Some(geojson);
        layer.updated_at = Utc::now();

        tracing::debug!(layer_id = %id, "Replaced layer GeoJSON");
        Ok(layer.clone())
    }

    async fn delete_layer(&self, id: LayerId) -> Result<()> {
        self.layers
            .write()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(IngestError::LayerNotFound { id: id.0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pasargis_core::models::LayerType;

    fn new_layer(pasar_id: u64, name: &str, sort_order: i32) -> NewLayer {
        NewLayer {
            pasar_id,
            name: name.to_string(),
            layer_type: LayerType::Polygon,
            geojson: None,
            color: None,
            opacity: None,
            is_active: true,
            sort_order,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_layer() {
        let store = MemoryLayerStore::new();

        let created = store.create_layer(new_layer(1, "Kios", 0)).await.unwrap();
        let fetched = store.get_layer(created.id).await.unwrap().unwrap();

        assert_eq!(created.id, LayerId(1));
        assert_eq!(fetched.name, "Kios");
        assert!(store.get_layer(LayerId(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let store = MemoryLayerStore::new();
        store.create_layer(new_layer(1, "Jalan", 2)).await.unwrap();
        store.create_layer(new_layer(1, "Batas", 0)).await.unwrap();
        store.create_layer(new_layer(2, "Los", 1)).await.unwrap();

        let names: Vec<_> = store
            .list_layers(Some(1))
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["Batas", "Jalan"]);

        assert_eq!(store.list_layers(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_set_geojson_and_update() {
        let store = MemoryLayerStore::new();
        let layer = store.create_layer(new_layer(1, "Kios", 0)).await.unwrap();

        let updated = store
            .set_geojson(layer.id, r#"{"type":"FeatureCollection","features":[]}"#.to_string())
            .await
            .unwrap();
        assert!(updated.geojson.unwrap().contains("FeatureCollection"));

        let renamed = store
            .update_layer(
                layer.id,
                LayerUpdate {
                    name: Some("Kios Lantai 1".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Kios Lantai 1");
        assert!(renamed.geojson.is_some());
    }

    #[tokio::test]
    async fn test_missing_layer_errors() {
        let store = MemoryLayerStore::new();

        assert!(matches!(
            store.set_geojson(LayerId(5), "{}".to_string()).await,
            Err(IngestError::LayerNotFound { id: 5 })
        ));
        assert!(matches!(
            store.delete_layer(LayerId(5)).await,
            Err(IngestError::LayerNotFound { id: 5 })
        ));
    }

    #[tokio::test]
    async fn test_delete_layer() {
        let store = MemoryLayerStore::new();
        let layer = store.create_layer(new_layer(1, "Kios", 0)).await.unwrap();

        store.delete_layer(layer.id).await.unwrap();

        assert!(store.is_empty());
    }
}
