use serde::Deserialize;

/// Query string of the layer list endpoint
#[derive(Debug, Default, Deserialize)]
pub struct LayerListQuery {
    pub pasar_id: Option<u64>,
}
