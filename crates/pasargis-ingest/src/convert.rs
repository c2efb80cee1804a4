//! External geodatabase-to-GeoJSON conversion tool
//!
//! The tool is a process boundary: it is given a `.gdb` folder and an output
//! directory and writes one `.geojson` file per feature class. Everything here
//! talks to it through [`GdbConverter`] so tests can substitute a stub.

use async_trait::async_trait;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use pasargis_core::config::IngestSettings;
use pasargis_core::error::{IngestError, Result};
use tokio::process::Command;

/// Output markers that mean the tool's Python environment lacks a package
pub const DEPENDENCY_MARKERS: &[&str] = &["No module named", "ImportError"];

/// Exit status and merged stdout/stderr of one tool run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub output: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Port for the geodatabase conversion tool
#[async_trait]
pub trait GdbConverter: Send + Sync {
    /// Convert the geodatabase, writing `.geojson` files into `output_dir`
    async fn convert(
        &self,
        gdb_path: &Path,
        output_dir: &Path,
        layer: Option<&str>,
    ) -> Result<ToolOutput>;

    /// Print the geodatabase's feature classes as `<n>. <name>` lines
    async fn list_layers(&self, gdb_path: &Path) -> Result<ToolOutput>;
}

/// Files produced by a successful conversion
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    /// `.geojson` files in the output directory, sorted by path
    pub files: Vec<PathBuf>,
    pub output: String,
}

/// Converter that runs a script through an interpreter, e.g.
/// `python convert_gdb_to_geojson.py --input <gdb> --output <dir>`.
///
/// Arguments are passed to the process directly, one argument per path, so
/// paths with spaces need no quoting.
#[derive(Debug, Clone)]
pub struct ScriptConverter {
    program: String,
    script: PathBuf,
    timeout: Duration,
}

impl ScriptConverter {
    pub fn new(program: impl Into<String>, script: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            script: script.into(),
            timeout,
        }
    }

    pub fn from_settings(settings: &IngestSettings) -> Self {
        Self::new(
            settings.converter_program.clone(),
            settings.converter_script.clone(),
            settings.convert_timeout,
        )
    }

    /// Arguments for a conversion run (after the script path)
    pub fn convert_args(gdb_path: &Path, output_dir: &Path, layer: Option<&str>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--input".into(),
            gdb_path.as_os_str().to_owned(),
            "--output".into(),
            output_dir.as_os_str().to_owned(),
        ];
        if let Some(layer) = layer {
            args.push("--layer".into());
            args.push(layer.into());
        }
        args
    }

    /// Arguments for a listing run (after the script path)
    pub fn list_args(gdb_path: &Path) -> Vec<OsString> {
        vec!["--input".into(), gdb_path.as_os_str().to_owned(), "--list".into()]
    }

    async fn run(&self, args: Vec<OsString>) -> Result<ToolOutput> {
        if !self.script.is_file() {
            return Err(IngestError::ConverterUnavailable {
                path: self.script.clone(),
            });
        }

        tracing::info!(
            program = %self.program,
            script = %self.script.display(),
            args = ?args,
            "Running conversion tool"
        );

        let mut command = Command::new(&self.program);
        command
            .arg(&self.script)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(IngestError::ConverterUnavailable {
                    path: PathBuf::from(&self.program),
                })
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                tracing::warn!(timeout_secs = self.timeout.as_secs(), "Conversion tool timed out");
                return Err(IngestError::ConversionTimeout {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let result = ToolOutput {
            exit_code: output.status.code(),
            output: merge_output(&output.stdout, &output.stderr),
        };

        tracing::debug!(exit_code = ?result.exit_code, "Conversion tool finished");
        Ok(result)
    }
}

#[async_trait]
impl GdbConverter for ScriptConverter {
    async fn convert(
        &self,
        gdb_path: &Path,
        output_dir: &Path,
        layer: Option<&str>,
    ) -> Result<ToolOutput> {
        self.run(Self::convert_args(gdb_path, output_dir, layer)).await
    }

    async fn list_layers(&self, gdb_path: &Path) -> Result<ToolOutput> {
        self.run(Self::list_args(gdb_path)).await
    }
}

fn merge_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut text = String::from_utf8_lossy(stdout).into_owned();
    let stderr = String::from_utf8_lossy(stderr);
    if !stderr.is_empty() {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&stderr);
    }
    text.trim_end().to_string()
}

/// Run a conversion and collect the produced files.
///
/// A non-zero exit or an empty output directory is an error.
pub async fn run_conversion(
    converter: &dyn GdbConverter,
    gdb_path: &Path,
    output_dir: &Path,
    layer: Option<&str>,
) -> Result<ConversionOutcome> {
    let result = converter.convert(gdb_path, output_dir, layer).await?;
    if !result.success() {
        return Err(classify_failure(result));
    }

    let files = collect_geojson_files(output_dir)?;
    if files.is_empty() {
        return Err(IngestError::EmptyConversion {
            output: result.output,
        });
    }

    tracing::info!(file_count = files.len(), "Conversion produced GeoJSON files");
    Ok(ConversionOutcome {
        files,
        output: result.output,
    })
}

/// Run the tool's listing mode and parse the layer names it prints
pub async fn list_layers(converter: &dyn GdbConverter, gdb_path: &Path) -> Result<Vec<String>> {
    let result = converter.list_layers(gdb_path).await?;
    if !result.success() {
        return Err(classify_failure(result));
    }
    Ok(parse_layer_listing(&result.output))
}

/// Map a failed tool run to a dependency error or a generic conversion failure
pub fn classify_failure(result: ToolOutput) -> IngestError {
    if DEPENDENCY_MARKERS.iter().any(|m| result.output.contains(m)) {
        tracing::error!(exit_code = ?result.exit_code, "Conversion tool is missing a dependency");
        IngestError::MissingDependency {
            output: result.output,
        }
    } else {
        tracing::error!(exit_code = ?result.exit_code, "Conversion tool failed");
        IngestError::ConversionFailed {
            exit_code: result.exit_code,
            output: result.output,
        }
    }
}

/// Extract names from `<index>. <name>` lines, in order
pub fn parse_layer_listing(text: &str) -> Vec<String> {
    text.lines().filter_map(parse_listing_line).collect()
}

fn parse_listing_line(line: &str) -> Option<String> {
    let (index, rest) = line.trim().split_once('.')?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let name = rest.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// `.geojson` files directly inside `dir`, sorted by path
pub fn collect_geojson_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && has_extension(p, "geojson"))
        .collect();
    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}
