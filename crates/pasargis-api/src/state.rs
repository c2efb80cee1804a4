use pasargis_core::ports::LayerStore;
use pasargis_ingest::IngestPipeline;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub layer_store: Arc<dyn LayerStore>,
    pub pipeline: IngestPipeline,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        layer_store: Arc<dyn LayerStore>,
        pipeline: IngestPipeline,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            layer_store,
            pipeline,
            max_upload_bytes,
        }
    }
}
