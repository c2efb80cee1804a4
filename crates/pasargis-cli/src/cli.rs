use clap::{Parser, Subcommand};
use pasargis_core::config::CliConfigOverrides;
use std::path::PathBuf;

/// Pasar GIS - GeoJSON and File Geodatabase ingestion
#[derive(Parser, Debug)]
#[command(name = "pasargis")]
#[command(about = "Convert GeoJSON and zipped File Geodatabases to WGS84 GeoJSON", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// TOML configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Interpreter used to run the conversion script
    #[arg(long, global = true, value_name = "PROGRAM")]
    pub converter_program: Option<String>,

    /// Geodatabase conversion script
    #[arg(long, global = true, value_name = "PATH")]
    pub converter_script: Option<PathBuf>,

    /// Conversion timeout in seconds
    #[arg(long, global = true, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn config_overrides(&self) -> CliConfigOverrides {
        CliConfigOverrides {
            converter_program: self.converter_program.clone(),
            converter_script: self.converter_script.clone(),
            convert_timeout_secs: self.timeout,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert an upload (.json, .geojson, or .zip with a .gdb) to WGS84 GeoJSON
    Ingest(IngestArgs),

    /// List the feature classes of a zipped geodatabase
    Layers(LayersArgs),

    /// Locate the geodatabase inside a zip archive
    Inspect(InspectArgs),

    /// Show the effective configuration and where each value came from
    Config,
}

#[derive(Parser, Debug)]
pub struct IngestArgs {
    /// File to ingest
    pub file: PathBuf,

    /// Feature class to convert when the geodatabase holds several
    #[arg(long, value_name = "NAME")]
    pub layer: Option<String>,

    /// Where to write the GeoJSON (defaults to `<name>.wgs84.geojson`)
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct LayersArgs {
    /// Zip archive containing a .gdb folder
    pub file: PathBuf,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Zip archive to inspect
    pub file: PathBuf,
}
