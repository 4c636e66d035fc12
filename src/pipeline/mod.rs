//! Analysis pipeline
//!
//! Orchestrates the full analysis over an ingested corpus:
//! 1. Tokenize, stem and aggregate per-year / per-article counts
//! 2. Keep prevalent stems
//! 3. Test each stem for a trend over time, FDR-adjusted
//! 4. Bootstrap standard errors for the significant stems
//! 5. Index surface forms of the significant stems
//!
//! Fatal conditions (empty corpus, nothing prevalent, nothing significant)
//! are checked before the bootstrap runs.

use crate::bootstrap::{Bootstrap, BootstrapEstimate};
use crate::config::ProjectConfig;
use crate::corpus::{Corpus, IngestionIssue};
use crate::error::{LexError, LexResult};
use crate::frequency::filter::{filter_prevalent, PrevalenceThresholds};
use crate::frequency::FrequencyTables;
use crate::inflection::{index_inflections, inflection_rows, InflectionTable};
use crate::models::{
    ArticleFrequencyRow, InflectionRow, ReplicateRow, StandardErrorRow, TrendResult, YearFrequencyRow,
};
use crate::text::Tokenizer;
use crate::trend::{test_trends, TrendReport, TrendUnit, UntestableStem};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

/// Long-running stages that report progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Tokenize,
    Filter,
    Trend,
    Bootstrap,
    Inflections,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Tokenize => "Tokenizing articles",
            Stage::Filter => "Filtering stems",
            Stage::Trend => "Testing trends",
            Stage::Bootstrap => "Bootstrapping",
            Stage::Inflections => "Indexing inflections",
        };
        write!(f, "{}", name)
    }
}

/// Receives progress from the pipeline. Called from rayon workers.
pub trait StageObserver: Sync {
    /// `total` is the number of [`StageObserver::advance`] calls to expect, 0 if unknown
    fn begin(&self, _stage: Stage, _total: u64) {}
    fn advance(&self) {}
    fn finish(&self, _stage: Stage, _summary: &str) {}
}

/// Discards all progress
pub struct Silent;

impl StageObserver for Silent {}

/// Everything a run found out besides its result tables
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub articles: usize,
    pub years: Vec<i32>,
    pub journals: Vec<(String, usize)>,
    pub dropped_records: Vec<IngestionIssue>,
    pub vocabulary_size: usize,
    pub thresholds: PrevalenceThresholds,
    pub eligible_stems: usize,
    pub tested_stems: usize,
    pub untestable_stems: Vec<UntestableStem>,
    pub significant_stems: usize,
    pub alpha: f64,
    pub unit: TrendUnit,
    pub replicates: usize,
    pub seed: u64,
    pub elapsed_ms: u64,
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Prevalent stems only
    pub tables: FrequencyTables,
    pub trends: TrendReport,
    pub bootstrap: BootstrapEstimate,
    pub inflections: Vec<InflectionTable>,
    pub diagnostics: Diagnostics,
}

impl Analysis {
    pub fn year_rows(&self) -> Vec<YearFrequencyRow> {
        self.tables.year_rows()
    }

    pub fn article_rows(&self) -> Vec<ArticleFrequencyRow> {
        self.tables.article_rows()
    }

    /// All testable stems, ranked
    pub fn trend_rows(&self) -> &[TrendResult] {
        &self.trends.results
    }

    pub fn significant(&self) -> impl Iterator<Item = &TrendResult> {
        self.trends.significant()
    }

    pub fn standard_error_rows(&self) -> Vec<StandardErrorRow> {
        self.bootstrap.standard_error_rows()
    }

    pub fn replicate_rows(&self) -> Vec<ReplicateRow> {
        self.bootstrap.replicate_rows()
    }

    pub fn inflection_rows(&self) -> Vec<InflectionRow> {
        inflection_rows(&self.inflections)
    }

    pub fn inflections_for(&self, stem: &str) -> Option<&InflectionTable> {
        self.inflections.iter().find(|t| t.stem == stem)
    }
}

/// Full analysis pipeline.
#[derive(Debug)]
pub struct Pipeline {
    tokenizer: Tokenizer,
    year_coverage: f64,
    article_coverage: f64,
    unit: TrendUnit,
    alpha: f64,
    replicates: usize,
    seed: u64,
}

impl Pipeline {
    /// Create a pipeline with default thresholds
    pub fn new(tokenizer: Tokenizer) -> Self {
        let defaults = ProjectConfig::default();
        Self {
            tokenizer,
            year_coverage: defaults.filter.year_coverage,
            article_coverage: defaults.filter.article_coverage,
            unit: defaults.trend.unit,
            alpha: defaults.trend.alpha,
            replicates: defaults.bootstrap.replicates,
            seed: defaults.bootstrap.seed,
        }
    }

    /// Build tokenizer and thresholds from a (validated) project config
    pub fn from_config(config: &ProjectConfig) -> LexResult<Self> {
        config.validate()?;
        let tokenizer = Tokenizer::english(config.extra_stop_words()?)
            .with_min_chars(config.tokenizer.min_token_chars);
        Ok(Self::new(tokenizer)
            .with_coverage(config.filter.year_coverage, config.filter.article_coverage)
            .with_unit(config.trend.unit)
            .with_alpha(config.trend.alpha)
            .with_replicates(config.bootstrap.replicates)
            .with_seed(config.bootstrap.seed))
    }

    pub fn with_coverage(mut self, year_coverage: f64, article_coverage: f64) -> Self {
        self.year_coverage = year_coverage;
        self.article_coverage = article_coverage;
        self
    }

    pub fn with_unit(mut self, unit: TrendUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_replicates(mut self, replicates: usize) -> Self {
        self.replicates = replicates;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Run every stage over `corpus`.
    ///
    /// `dropped` are the records rejected at ingestion; they are carried into
    /// the diagnostics.
    pub fn run(
        &self,
        corpus: &Corpus,
        dropped: Vec<IngestionIssue>,
        observer: &dyn StageObserver,
    ) -> LexResult<Analysis> {
        let start = Instant::now();

        // Fewer than two replicates would report a standard error of exactly 0
        if self.replicates < 2 {
            return Err(LexError::InvalidConfig(format!(
                "bootstrap replicates must be at least 2, got {}",
                self.replicates
            )));
        }

        if corpus.is_empty() {
            return Err(LexError::EmptyCorpus {
                dropped: dropped.len(),
            });
        }

        // Stage 1: aggregate
        observer.begin(Stage::Tokenize, corpus.len() as u64);
        let all = FrequencyTables::build(corpus, &self.tokenizer, || observer.advance());
        observer.finish(
            Stage::Tokenize,
            &format!("{} articles, {} distinct stems", corpus.len(), all.num_stems()),
        );

        // Stage 2: prevalence
        observer.begin(Stage::Filter, 0);
        let thresholds = PrevalenceThresholds::for_tables(&all, self.year_coverage, self.article_coverage);
        let tables = filter_prevalent(&all, thresholds)?;
        observer.finish(
            Stage::Filter,
            &format!(
                "{} prevalent stems (>= {} years, >= {} articles)",
                tables.num_stems(),
                thresholds.min_years,
                thresholds.min_articles
            ),
        );

        // Stage 3: trend test
        observer.begin(Stage::Trend, 0);
        let mut trends = test_trends(&tables, self.unit, self.alpha);
        let significant = trends.significant_stems();
        observer.finish(
            Stage::Trend,
            &format!(
                "{} significant of {} tested ({} untestable)",
                significant.len(),
                trends.results.len(),
                trends.untestable.len()
            ),
        );
        if significant.is_empty() {
            return Err(LexError::NoSignificantTrends {
                alpha: self.alpha,
                tested: trends.results.len(),
            });
        }

        // Stage 4: bootstrap
        observer.begin(Stage::Bootstrap, self.replicates as u64);
        let bootstrap =
            Bootstrap::new(self.replicates, self.seed).estimate(&tables, &significant, || observer.advance());
        observer.finish(
            Stage::Bootstrap,
            &format!("{} replicates for {} stems", bootstrap.num_replicates(), significant.len()),
        );
        for result in trends.results.iter_mut().filter(|r| r.significant) {
            if let Some(errors) = bootstrap.standard_errors_for(&result.stem) {
                result.standard_error_per_year = errors.to_vec();
            }
        }

        // Stage 5: inflections
        observer.begin(Stage::Inflections, 0);
        let inflections = index_inflections(corpus, &self.tokenizer, &significant);
        observer.finish(Stage::Inflections, &format!("{} stems indexed", inflections.len()));

        let diagnostics = Diagnostics {
            articles: corpus.len(),
            years: tables.years().to_vec(),
            journals: corpus.journal_counts(),
            dropped_records: dropped,
            vocabulary_size: all.num_stems(),
            thresholds,
            eligible_stems: tables.num_stems(),
            tested_stems: trends.results.len(),
            untestable_stems: trends.untestable.clone(),
            significant_stems: significant.len(),
            alpha: self.alpha,
            unit: self.unit,
            replicates: self.replicates,
            seed: self.seed,
            elapsed_ms: start.elapsed().as_millis() as u64,
        };
        debug!("Diagnostics: {:?}", diagnostics);
        info!(
            "Analysis complete in {}ms: {} significant trends",
            diagnostics.elapsed_ms, diagnostics.significant_stems
        );

        Ok(Analysis {
            tables,
            trends,
            bootstrap,
            inflections,
            diagnostics,
        })
    }
}
