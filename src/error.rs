//! Error taxonomy for the analysis pipeline
//!
//! Only pipeline-level invariant violations are errors. Per-record and
//! per-stem problems (dropped articles, untestable series) are collected
//! into [`crate::pipeline::Diagnostics`] and never abort a run.

use thiserror::Error;

/// Fatal errors raised by the library
#[derive(Error, Debug)]
pub enum LexError {
    #[error("Corpus is empty after ingestion ({dropped} records dropped)")]
    EmptyCorpus { dropped: usize },

    #[error(
        "No stem meets the prevalence thresholds (>= {min_years} years and >= {min_articles} articles)"
    )]
    NoEligibleStems { min_years: usize, min_articles: usize },

    #[error("No stem shows a significant positive trend at alpha = {alpha} ({tested} stems tested)")]
    NoSignificantTrends { alpha: f64, tested: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse corpus JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse config TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type LexResult<T> = Result<T, LexError>;
