mod health;
mod layers;
mod upload;

pub use health::health_check;
pub use layers::{create_layer, delete_layer, list_layers, update_layer};
pub use upload::{list_gdb_layers, upload_layer_file};
