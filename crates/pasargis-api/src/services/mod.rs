mod upload;

pub use upload::{UploadForm, UploadService};
