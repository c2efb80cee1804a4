use crate::error::{IngestError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default upload ceiling for GDB archives (50 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Default wall-clock limit for one conversion tool run
pub const DEFAULT_CONVERT_TIMEOUT_SECS: u64 = 120;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for the ingestion pipeline
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub converter_program: ConfigValue<String>,
    pub converter_script: ConfigValue<PathBuf>,
    pub convert_timeout_secs: ConfigValue<u64>,
    pub workspace_root: ConfigValue<PathBuf>,
    pub max_upload_bytes: ConfigValue<usize>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            converter_program: ConfigValue::new("python".to_string(), ConfigSource::Default),
            converter_script: ConfigValue::new(
                PathBuf::from("gis-tools/convert_gdb_to_geojson.py"),
                ConfigSource::Default,
            ),
            convert_timeout_secs: ConfigValue::new(
                DEFAULT_CONVERT_TIMEOUT_SECS,
                ConfigSource::Default,
            ),
            workspace_root: ConfigValue::new(env::temp_dir(), ConfigSource::Default),
            max_upload_bytes: ConfigValue::new(DEFAULT_MAX_UPLOAD_BYTES, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| IngestError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| IngestError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(converter) = file_config.converter {
            if let Some(program) = converter.program {
                self.converter_program.update(program, ConfigSource::File);
            }
            if let Some(script) = converter.script {
                self.converter_script.update(script, ConfigSource::File);
            }
            if let Some(timeout) = converter.timeout_secs {
                self.convert_timeout_secs.update(parse_timeout(timeout)?, ConfigSource::File);
            }
        }

        if let Some(root) = file_config.workspace_root {
            self.workspace_root.update(root, ConfigSource::File);
        }

        if let Some(max) = file_config.max_upload_bytes {
            self.max_upload_bytes.update(max, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // PASARGIS_CONVERTER_PROGRAM
        if let Ok(program) = env::var("PASARGIS_CONVERTER_PROGRAM") {
            self.converter_program.update(program, ConfigSource::Environment);
        }

        // PASARGIS_CONVERTER_SCRIPT
        if let Ok(script) = env::var("PASARGIS_CONVERTER_SCRIPT") {
            self.converter_script.update(PathBuf::from(script), ConfigSource::Environment);
        }

        // PASARGIS_CONVERT_TIMEOUT_SECS
        if let Ok(timeout_str) = env::var("PASARGIS_CONVERT_TIMEOUT_SECS") {
            match timeout_str.parse::<u64>() {
                Ok(timeout) if timeout > 0 => {
                    self.convert_timeout_secs.update(timeout, ConfigSource::Environment)
                }
                _ => tracing::warn!(
                    "Invalid PASARGIS_CONVERT_TIMEOUT_SECS value '{}': expected a positive integer",
                    timeout_str
                ),
            }
        }

        // PASARGIS_WORKSPACE_ROOT
        if let Ok(root) = env::var("PASARGIS_WORKSPACE_ROOT") {
            self.workspace_root.update(PathBuf::from(root), ConfigSource::Environment);
        }

        // PASARGIS_MAX_UPLOAD_BYTES
        if let Ok(max_str) = env::var("PASARGIS_MAX_UPLOAD_BYTES") {
            match max_str.parse::<usize>() {
                Ok(max) => self.max_upload_bytes.update(max, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid PASARGIS_MAX_UPLOAD_BYTES value '{}': expected byte count",
                    max_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(program) = overrides.converter_program {
            self.converter_program.update(program, ConfigSource::Cli);
        }

        if let Some(script) = overrides.converter_script {
            self.converter_script.update(script, ConfigSource::Cli);
        }

        if let Some(timeout) = overrides.convert_timeout_secs {
            self.convert_timeout_secs.update(timeout, ConfigSource::Cli);
        }
    }

    /// Collapse the layered values into plain settings
    pub fn resolve(&self) -> IngestSettings {
        IngestSettings {
            converter_program: self.converter_program.value.clone(),
            converter_script: self.converter_script.value.clone(),
            convert_timeout: Duration::from_secs(self.convert_timeout_secs.value),
            workspace_root: self.workspace_root.value.clone(),
            max_upload_bytes: self.max_upload_bytes.value,
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "converter_program".to_string(),
            (self.converter_program.value.clone(), self.converter_program.source),
        );

        map.insert(
            "converter_script".to_string(),
            (self.converter_script.value.display().to_string(), self.converter_script.source),
        );

        map.insert(
            "convert_timeout".to_string(),
            (format!("{}s", self.convert_timeout_secs.value), self.convert_timeout_secs.source),
        );

        map.insert(
            "workspace_root".to_string(),
            (self.workspace_root.value.display().to_string(), self.workspace_root.source),
        );

        map.insert(
            "max_upload_bytes".to_string(),
            (self.max_upload_bytes.value.to_string(), self.max_upload_bytes.source),
        );

        map
    }
}

/// Effective ingestion settings after layering
#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub converter_program: String,
    pub converter_script: PathBuf,
    pub convert_timeout: Duration,
    pub workspace_root: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        LayeredConfig::with_defaults().resolve()
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    converter: Option<ConverterSection>,
    workspace_root: Option<PathBuf>,
    max_upload_bytes: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize)]
struct ConverterSection {
    program: Option<String>,
    script: Option<PathBuf>,
    timeout_secs: Option<u64>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub converter_program: Option<String>,
    pub converter_script: Option<PathBuf>,
    pub convert_timeout_secs: Option<u64>,
}

fn parse_timeout(secs: u64) -> Result<u64> {
    if secs == 0 {
        return Err(IngestError::ConfigInvalid {
            key: "converter.timeout_secs".to_string(),
            reason: "Timeout must be at least one second".to_string(),
        });
    }
    Ok(secs)
}
