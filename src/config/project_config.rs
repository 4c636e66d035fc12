//! Project-level configuration support
//!
//! Loads configuration from `lexdrift.toml` in the working directory, or from
//! the user config directory (`~/.config/lexdrift/config.toml`) as a fallback.
//!
//! # Configuration Format
//!
//! ```toml
//! # lexdrift.toml
//!
//! [corpus]
//! min_year = 1900
//! max_year = 2024
//!
//! [tokenizer]
//! extra_stop_words = ["et", "al", "fig"]
//! min_token_chars = 2
//!
//! [filter]
//! year_coverage = 0.6666666666666666
//! article_coverage = 0.1
//!
//! [trend]
//! alpha = 0.05
//! unit = "year"
//!
//! [bootstrap]
//! replicates = 500
//! seed = 42
//!
//! [[exceptions]]
//! id = "10.1000/xyz123"
//! action = "exclude"
//! reason = "erratum"
//! ```

use crate::corpus::ExceptionEntry;
use crate::error::{LexError, LexResult};
use crate::reporters::OutputFormat;
use crate::trend::TrendUnit;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "lexdrift.toml";

/// Project configuration loaded from lexdrift.toml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub corpus: CorpusConfig,
    pub tokenizer: TokenizerConfig,
    pub filter: FilterConfig,
    pub trend: TrendConfig,
    pub bootstrap: BootstrapConfig,
    pub output: OutputConfig,
    /// Per-article ingestion exceptions, keyed by article id
    pub exceptions: Vec<ExceptionEntry>,
}

/// Ingestion window
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Oldest plausible publication year
    pub min_year: i32,
    /// Newest year admitted (default: current year)
    pub max_year: Option<i32>,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            min_year: 1900,
            max_year: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Added on top of the built-in English stop-word list
    pub extra_stop_words: Vec<String>,
    /// Optional file with one stop word per line
    pub stop_words_file: Option<PathBuf>,
    /// Tokens shorter than this (in chars) are discarded
    pub min_token_chars: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            extra_stop_words: Vec::new(),
            stop_words_file: None,
            min_token_chars: 2,
        }
    }
}

/// Prevalence thresholds, as fractions of the corpus
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    /// min_year_coverage = ceil(num_years * year_coverage)
    pub year_coverage: f64,
    /// min_article_coverage = ceil(num_articles * article_coverage)
    pub article_coverage: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            year_coverage: 2.0 / 3.0,
            article_coverage: 0.1,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrendConfig {
    /// FDR significance level
    pub alpha: f64,
    /// Observation unit of the correlation test
    pub unit: TrendUnit,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            unit: TrendUnit::Year,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub replicates: usize,
    pub seed: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            replicates: 500,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            dir: PathBuf::from("lexdrift-out"),
        }
    }
}

impl ProjectConfig {
    /// Check value ranges. Called once after loading and CLI overrides.
    pub fn validate(&self) -> LexResult<()> {
        let ratio_ok = |r: f64| r > 0.0 && r <= 1.0;
        if !ratio_ok(self.filter.year_coverage) {
            return Err(LexError::InvalidConfig(format!(
                "filter.year_coverage must be in (0, 1], got {}",
                self.filter.year_coverage
            )));
        }
        if !ratio_ok(self.filter.article_coverage) {
            return Err(LexError::InvalidConfig(format!(
                "filter.article_coverage must be in (0, 1], got {}",
                self.filter.article_coverage
            )));
        }
        if !(self.trend.alpha > 0.0 && self.trend.alpha < 1.0) {
            return Err(LexError::InvalidConfig(format!(
                "trend.alpha must be in (0, 1), got {}",
                self.trend.alpha
            )));
        }
        if self.bootstrap.replicates < 2 {
            return Err(LexError::InvalidConfig(format!(
                "bootstrap.replicates must be at least 2, got {}",
                self.bootstrap.replicates
            )));
        }
        if let Some(max) = self.corpus.max_year {
            if max < self.corpus.min_year {
                return Err(LexError::InvalidConfig(format!(
                    "corpus.max_year ({}) is before corpus.min_year ({})",
                    max, self.corpus.min_year
                )));
            }
        }
        Ok(())
    }

    /// Stop words from `extra_stop_words` and `stop_words_file`, lower-cased
    pub fn extra_stop_words(&self) -> LexResult<Vec<String>> {
        let mut words: Vec<String> = self
            .tokenizer
            .extra_stop_words
            .iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        if let Some(path) = &self.tokenizer.stop_words_file {
            let content = std::fs::read_to_string(path)?;
            words.extend(
                content
                    .lines()
                    .map(|l| l.trim())
                    .filter(|l| !l.is_empty() && !l.starts_with('#'))
                    .map(|l| l.to_lowercase()),
            );
        }

        Ok(words)
    }
}

/// Load configuration from the first source found:
/// 1. `lexdrift.toml` in `dir`
/// 2. User config (~/.config/lexdrift/config.toml)
/// 3. Defaults
///
/// A file that fails to parse is skipped with a warning.
pub fn load_config(dir: &Path) -> ProjectConfig {
    let candidates = std::iter::once(dir.join(CONFIG_FILE_NAME)).chain(user_config_path());

    for path in candidates {
        if !path.exists() {
            continue;
        }
        match load_config_from(&path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
            }
        }
    }

    debug!("No config found, using defaults");
    ProjectConfig::default()
}

/// Load configuration from an explicit TOML file
pub fn load_config_from(path: &Path) -> LexResult<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig = toml::from_str(&content)?;
    Ok(config)
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("lexdrift").join("config.toml"))
}

/// Written by `lexdrift init`
pub const EXAMPLE_CONFIG: &str = r#"# lexdrift configuration

[corpus]
# Records outside [min_year, max_year] are dropped at ingestion
min_year = 1900
# max_year = 2024

[tokenizer]
# Added to the built-in English stop-word list
extra_stop_words = ["et", "al", "fig", "figure", "table"]
# stop_words_file = "stopwords.txt"
min_token_chars = 2

[filter]
# A stem must occur in ceil(num_years * year_coverage) years
year_coverage = 0.6666666666666666
# ... and in ceil(num_articles * article_coverage) articles
article_coverage = 0.1

[trend]
alpha = 0.05
# "year" correlates per-year frequency with year.
# "article" correlates per-article frequency with article year (small corpora).
unit = "year"

[bootstrap]
replicates = 500
seed = 42

[output]
format = "csv"
dir = "lexdrift-out"

# Articles needing special handling, keyed by id/DOI
# [[exceptions]]
# id = "10.1000/xyz123"
# action = "exclude"
# reason = "erratum, not a research article"
#
# [[exceptions]]
# id = "10.1000/abc"
# action = "year"
# year = 2011
# reason = "online-first date differs from issue year"
"#;
