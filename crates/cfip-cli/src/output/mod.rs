//! Console output for pipeline results.

use cfip::PipelineOutput;
use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summary with colors
    #[default]
    Pretty,
    /// JSON output
    Json,
    /// One bare address per line
    Plain,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
            Self::Plain => write!(f, "plain"),
        }
    }
}

/// JSON shape of a pipeline run
#[derive(Debug, Serialize)]
struct RunReport<'a> {
    records: Vec<&'a str>,
    addresses: &'a [String],
    written_to: Option<String>,
}

/// Print the result of a pipeline run.
pub fn print_run(
    format: OutputFormat,
    output: &PipelineOutput,
    written_to: Option<&Path>,
    no_color: bool,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let report = RunReport {
                records: output.records.iter().map(cfip::Candidate::as_str).collect(),
                addresses: &output.addresses,
                written_to: written_to.map(|p| p.display().to_string()),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Plain => {
            for address in &output.addresses {
                println!("{address}");
            }
        }
        OutputFormat::Pretty => {
            let header = format!("{} candidates kept", output.records.len());
            if no_color {
                println!("{header}");
            } else {
                println!("{}", header.bold());
            }
            for record in &output.records {
                if no_color {
                    println!("  {:<40} {record}", record.ip());
                } else {
                    println!("  {:<40} {}", record.ip().cyan(), record.as_str().dimmed());
                }
            }
            println!("{} addresses selected", output.addresses.len());
            if let Some(path) = written_to {
                println!("Written to {}", path.display());
            }
        }
    }
    Ok(())
}

/// Print a notice that nothing was found and nothing was changed.
pub fn print_empty(format: OutputFormat, no_color: bool) {
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "records": [], "addresses": [] })),
        OutputFormat::Plain => {}
        OutputFormat::Pretty => {
            let msg = "No matching candidates; output file and DNS left untouched.";
            if no_color {
                println!("{msg}");
            } else {
                println!("{}", msg.yellow());
            }
        }
    }
}
