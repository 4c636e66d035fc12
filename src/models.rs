//! Output row types shared by the pipeline stages and the reporters
//!
//! Every table the pipeline produces is a flat `Vec` of one of these
//! fixed-shape records.

use serde::{Deserialize, Serialize};

/// One (stem, year) cell of the zero-filled per-year table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearFrequencyRow {
    pub stem: String,
    pub year: i32,
    pub count: u64,
    /// Post-stop-word token count for the year
    pub total_words: u64,
    /// count / total_words, 0 when the year has no tokens
    pub frequency: f64,
}

/// One (stem, article) cell of the zero-filled per-article table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleFrequencyRow {
    pub stem: String,
    pub article_id: String,
    pub count: u64,
}

/// Correlation test outcome for one stem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub stem: String,
    /// Spearman rank correlation with time
    pub correlation: f64,
    pub raw_p_value: f64,
    /// Benjamini-Hochberg adjusted
    pub adjusted_p_value: f64,
    /// Number of observations in the tested series
    pub observations: usize,
    /// Positive correlation and adjusted p below alpha
    pub significant: bool,
    /// Bootstrap standard error per year, aligned with the corpus years.
    /// Empty for stems that were not bootstrapped.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub standard_error_per_year: Vec<f64>,
}

/// Bootstrap standard error for one (stem, year)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardErrorRow {
    pub stem: String,
    pub year: i32,
    pub standard_error: f64,
}

/// One replicate's frequency for one (stem, year)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicateRow {
    pub stem: String,
    pub year: i32,
    pub replicate: usize,
    pub frequency: f64,
}

/// Surface form count under a stem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InflectionRow {
    pub stem: String,
    pub surface_form: String,
    pub count: u64,
}

/// Sentence containing one of the requested stems
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceRow {
    pub stem: String,
    pub year: i32,
    pub article_id: String,
    pub sentence: String,
}
