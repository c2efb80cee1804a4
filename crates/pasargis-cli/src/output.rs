use console::style;
use pasargis_core::error::IngestError;
use serde::Serialize;
use std::fmt::Display;

/// Output format mode
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Human,
    Json,
}

pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self {
            format: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Human
            },
        }
    }

    pub fn success(&self, message: impl Display) {
        if let OutputFormat::Human = self.format {
            println!("{} {}", style("✓").green().bold(), message);
        }
    }

    pub fn info(&self, message: impl Display) {
        if let OutputFormat::Human = self.format {
            println!("{} {}", style("ℹ").blue().bold(), message);
        }
    }

    pub fn kv(&self, key: impl Display, value: impl Display) {
        if let OutputFormat::Human = self.format {
            println!("{}: {}", style(key).bold(), value);
        }
    }

    pub fn item(&self, index: usize, value: impl Display) {
        if let OutputFormat::Human = self.format {
            println!("  {:>2}. {}", index, value);
        }
    }

    pub fn section(&self, title: impl Display) {
        if let OutputFormat::Human = self.format {
            println!("\n{}", style(title).bold().underlined());
        }
    }

    /// Print a machine-readable result; ignored in human mode
    pub fn result<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if let OutputFormat::Json = self.format {
            let output = serde_json::json!({
                "status": "success",
                "data": data,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Ok(())
    }

    /// Report a pipeline failure with its guidance and captured tool output
    pub fn ingest_error(&self, err: &IngestError) {
        match self.format {
            OutputFormat::Human => {
                eprintln!("{} {}", style("✗").red().bold(), err);
                if let Some(help) = err.help() {
                    eprintln!("  {} {}", style("help:").cyan(), help);
                }
                if let Some(output) = err.tool_output().filter(|o| !o.is_empty()) {
                    eprintln!("{}", style("Conversion tool output:").dim());
                    for line in output.lines() {
                        eprintln!("  {}", line);
                    }
                }
                if let IngestError::GeodatabaseNotFound {
                    zip_entries,
                    extracted_items,
                } = err
                {
                    eprintln!("{}", style("Archive entries:").dim());
                    zip_entries.iter().for_each(|e| eprintln!("  {}", e));
                    eprintln!("{}", style("Extracted items:").dim());
                    extracted_items.iter().for_each(|e| eprintln!("  {}", e));
                }
            }
            OutputFormat::Json => {
                let mut output = serde_json::json!({
                    "status": "error",
                    "message": err.to_string(),
                });
                if let Some(help) = err.help() {
                    output["help"] = help.into();
                }
                if let Some(detail) = err.tool_output() {
                    output["detail"] = detail.into();
                }
                if let IngestError::GeodatabaseNotFound {
                    zip_entries,
                    extracted_items,
                } = err
                {
                    output["zip_entries"] = zip_entries.clone().into();
                    output["extracted_items"] = extracted_items.clone().into();
                }
                eprintln!("{:#}", output);
            }
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }
}
