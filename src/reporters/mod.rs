//! Output reporters for lexdrift analysis results
//!
//! Supports multiple output formats:
//! - `csv` - One CSV file per table (default)
//! - `json` - One JSON array per table
//!
//! plus a colored terminal summary (`text`). Diagnostics are always JSON.

pub mod csv;
pub mod json;
pub mod text;

use crate::models::SentenceRow;
use crate::pipeline::Analysis;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Supported table formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: csv, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Get the file extension for a format
pub fn file_extension(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Csv => "csv",
        OutputFormat::Json => "json",
    }
}

/// Render one table in `format`
pub fn render_table<T>(rows: &[T], format: OutputFormat) -> Result<String>
where
    T: csv::CsvRecord + Serialize,
{
    match format {
        OutputFormat::Csv => csv::render(rows),
        OutputFormat::Json => json::render(rows),
    }
}

/// Write `<dir>/<name>.<ext>` and return its path
pub fn write_table<T>(dir: &Path, name: &str, rows: &[T], format: OutputFormat) -> Result<PathBuf>
where
    T: csv::CsvRecord + Serialize,
{
    let path = dir.join(format!("{}.{}", name, file_extension(format)));
    let content = render_table(rows, format)?;
    std::fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(path)
}

/// Write every result table of `analysis` plus `diagnostics.json` into `dir`.
///
/// The replicate table is only written when `keep_replicates` is set.
pub fn write_analysis(
    analysis: &Analysis,
    dir: &Path,
    format: OutputFormat,
    keep_replicates: bool,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut written = vec![
        write_table(dir, "year_frequencies", &analysis.year_rows(), format)?,
        write_table(dir, "article_frequencies", &analysis.article_rows(), format)?,
        write_table(dir, "trends", analysis.trend_rows(), format)?,
        write_table(dir, "standard_errors", &analysis.standard_error_rows(), format)?,
        write_table(dir, "inflections", &analysis.inflection_rows(), format)?,
    ];
    if keep_replicates {
        written.push(write_table(dir, "replicates", &analysis.replicate_rows(), format)?);
    }

    let diagnostics_path = dir.join("diagnostics.json");
    std::fs::write(&diagnostics_path, json::render(&analysis.diagnostics)?)
        .with_context(|| format!("Failed to write {}", diagnostics_path.display()))?;
    written.push(diagnostics_path);

    Ok(written)
}

/// Write the sentence export to `path`, or to stdout when `path` is `None`
pub fn write_sentences(rows: &[SentenceRow], path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let content = render_table(rows, format)?;
    match path {
        Some(p) => {
            if let Some(parent) = p.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(p, content).with_context(|| format!("Failed to write {}", p.display()))?;
            info!("Wrote {} sentences to {}", rows.len(), p.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}
