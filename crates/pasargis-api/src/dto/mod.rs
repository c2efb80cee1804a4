mod request;
mod response;

pub use request::LayerListQuery;
pub use response::{GdbLayersResponse, HealthResponse, MessageResponse, UploadResponse};
