//! CSV reporter
//!
//! Each output table is a flat list of fixed-shape rows; [`CsvRecord`] gives
//! the header and the cells of one row.

use crate::models::{
    ArticleFrequencyRow, InflectionRow, ReplicateRow, SentenceRow, StandardErrorRow, TrendResult,
    YearFrequencyRow,
};
use anyhow::Result;
use std::io::Write;

pub trait CsvRecord {
    const HEADER: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write one row, quoting cells where needed
pub fn write_row<W: Write>(mut w: W, row: &[String]) -> std::io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, ",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/// Header line followed by one line per row
pub fn write_table<W: Write, T: CsvRecord>(mut w: W, rows: &[T]) -> Result<()> {
    let header: Vec<String> = T::HEADER.iter().map(|h| h.to_string()).collect();
    write_row(&mut w, &header)?;
    for row in rows {
        write_row(&mut w, &row.cells())?;
    }
    Ok(())
}

pub fn render<T: CsvRecord>(rows: &[T]) -> Result<String> {
    let mut buf = Vec::new();
    write_table(&mut buf, rows)?;
    Ok(String::from_utf8(buf)?)
}

impl CsvRecord for YearFrequencyRow {
    const HEADER: &'static [&'static str] = &["stem", "year", "count", "total_words", "frequency"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.stem.clone(),
            self.year.to_string(),
            self.count.to_string(),
            self.total_words.to_string(),
            self.frequency.to_string(),
        ]
    }
}

impl CsvRecord for ArticleFrequencyRow {
    const HEADER: &'static [&'static str] = &["stem", "article_id", "count"];

    fn cells(&self) -> Vec<String> {
        vec![self.stem.clone(), self.article_id.clone(), self.count.to_string()]
    }
}

impl CsvRecord for TrendResult {
    const HEADER: &'static [&'static str] = &[
        "stem",
        "correlation",
        "raw_p_value",
        "adjusted_p_value",
        "observations",
        "significant",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.stem.clone(),
            self.correlation.to_string(),
            self.raw_p_value.to_string(),
            self.adjusted_p_value.to_string(),
            self.observations.to_string(),
            self.significant.to_string(),
        ]
    }
}

impl CsvRecord for StandardErrorRow {
    const HEADER: &'static [&'static str] = &["stem", "year", "standard_error"];

    fn cells(&self) -> Vec<String> {
        vec![self.stem.clone(), self.year.to_string(), self.standard_error.to_string()]
    }
}

impl CsvRecord for ReplicateRow {
    const HEADER: &'static [&'static str] = &["stem", "year", "replicate", "frequency"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.stem.clone(),
            self.year.to_string(),
            self.replicate.to_string(),
            self.frequency.to_string(),
        ]
    }
}

impl CsvRecord for InflectionRow {
    const HEADER: &'static [&'static str] = &["stem", "surface_form", "count"];

    fn cells(&self) -> Vec<String> {
        vec![self.stem.clone(), self.surface_form.clone(), self.count.to_string()]
    }
}

impl CsvRecord for SentenceRow {
    const HEADER: &'static [&'static str] = &["stem", "year", "article_id", "sentence"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.stem.clone(),
            self.year.to_string(),
            self.article_id.clone(),
            self.sentence.clone(),
        ]
    }
}
