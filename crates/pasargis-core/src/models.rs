//! Domain models

pub mod layer;

pub use layer::{GisLayer, LayerId, LayerType, LayerUpdate, NewLayer};
