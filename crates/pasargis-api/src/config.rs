use std::env;
use std::path::PathBuf;

use pasargis_core::config::{IngestSettings, LayeredConfig};
use pasargis_core::error::Result;

/// API server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub cors_origin: String,
    /// Optional TOML file layered under the environment
    pub config_path: Option<PathBuf>,
    pub ingest: IngestSettings,
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let port = env::var("PASARGIS_PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(3001);

        let cors_origin = env::var("PASARGIS_CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let config_path = env::var("PASARGIS_CONFIG").ok().map(PathBuf::from);

        let mut layered = LayeredConfig::with_defaults();
        if let Some(path) = &config_path {
            layered = layered.load_from_file(path)?;
        }
        let ingest = layered.load_from_env().resolve();

        Ok(Self {
            port,
            cors_origin,
            config_path,
            ingest,
        })
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
