//! Trend tester
//!
//! Correlates each stem's frequency with publication year (Spearman), adjusts
//! the p-values of all testable stems with Benjamini-Hochberg and marks
//! stems with a positive coefficient and an adjusted p below alpha as
//! significant. Stems whose series is constant or too short are reported as
//! untestable and left out of the ranking.

use crate::frequency::FrequencyTables;
use crate::models::TrendResult;
use crate::stats::{benjamini_hochberg, spearman, CorrelationError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// What one observation of the correlation test is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendUnit {
    /// (year, stem frequency in that year): one point per corpus year
    #[default]
    Year,
    /// (article year, stem frequency in that article): one point per article
    Article,
}

impl std::str::FromStr for TrendUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "year" | "years" => Ok(TrendUnit::Year),
            "article" | "articles" => Ok(TrendUnit::Article),
            _ => Err(format!("Unknown trend unit '{}'. Valid units: year, article", s)),
        }
    }
}

impl std::fmt::Display for TrendUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendUnit::Year => write!(f, "year"),
            TrendUnit::Article => write!(f, "article"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UntestableReason {
    /// Zero variance; the correlation is undefined
    ConstantSeries,
    TooFewPoints { n: usize },
    MisalignedSeries,
}

impl From<CorrelationError> for UntestableReason {
    fn from(e: CorrelationError) -> Self {
        match e {
            CorrelationError::Constant => UntestableReason::ConstantSeries,
            CorrelationError::TooFewPoints(n) => UntestableReason::TooFewPoints { n },
            CorrelationError::LengthMismatch => UntestableReason::MisalignedSeries,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UntestableStem {
    pub stem: String,
    pub reason: UntestableReason,
}

/// Ranked trend results
#[derive(Debug, Clone)]
pub struct TrendReport {
    pub alpha: f64,
    pub unit: TrendUnit,
    /// All testable stems, by correlation descending then stem ascending
    pub results: Vec<TrendResult>,
    pub untestable: Vec<UntestableStem>,
}

impl TrendReport {
    /// Significant positive trends, in ranking order
    pub fn significant(&self) -> impl Iterator<Item = &TrendResult> {
        self.results.iter().filter(|r| r.significant)
    }

    pub fn significant_stems(&self) -> Vec<String> {
        self.significant().map(|r| r.stem.clone()).collect()
    }

    pub fn num_significant(&self) -> usize {
        self.significant().count()
    }

    pub fn get(&self, stem: &str) -> Option<&TrendResult> {
        self.results.iter().find(|r| r.stem == stem)
    }
}

/// Test every stem in `tables` for a monotonic trend over time
pub fn test_trends(tables: &FrequencyTables, unit: TrendUnit, alpha: f64) -> TrendReport {
    let x: Vec<f64> = match unit {
        TrendUnit::Year => tables.years().iter().map(|&y| f64::from(y)).collect(),
        TrendUnit::Article => tables.article_years().into_iter().map(f64::from).collect(),
    };

    let stems: Vec<&str> = tables.stems().map(|(s, _)| s).collect();
    let outcomes: Vec<(&str, Result<crate::stats::Correlation, CorrelationError>)> = stems
        .par_iter()
        .map(|&stem| {
            let y = match unit {
                TrendUnit::Year => tables.year_frequencies(stem),
                TrendUnit::Article => tables.article_frequencies(stem),
            }
            .unwrap_or_default();
            (stem, spearman(&x, &y))
        })
        .collect();

    let mut tested = Vec::new();
    let mut untestable = Vec::new();
    for (stem, outcome) in outcomes {
        match outcome {
            Ok(c) => tested.push((stem, c)),
            Err(e) => {
                let reason = UntestableReason::from(e);
                debug!("Stem '{}' untestable: {:?}", stem, reason);
                untestable.push(UntestableStem {
                    stem: stem.to_string(),
                    reason,
                });
            }
        }
    }

    let raw: Vec<f64> = tested.iter().map(|(_, c)| c.p_value).collect();
    let adjusted = benjamini_hochberg(&raw);

    let mut results: Vec<TrendResult> = tested
        .into_iter()
        .zip(adjusted)
        .map(|((stem, c), adj)| TrendResult {
            stem: stem.to_string(),
            correlation: c.coefficient,
            raw_p_value: c.p_value,
            adjusted_p_value: adj,
            observations: c.n,
            significant: adj < alpha && c.coefficient > 0.0,
            standard_error_per_year: Vec::new(),
        })
        .collect();

    results.sort_by(|a, b| {
        b.correlation
            .total_cmp(&a.correlation)
            .then_with(|| a.stem.cmp(&b.stem))
    });

    let report = TrendReport {
        alpha,
        unit,
        results,
        untestable,
    };
    info!(
        "Tested {} stems by {}: {} significant positive trends, {} untestable",
        report.results.len(),
        unit,
        report.num_significant(),
        report.untestable.len()
    );
    report
}
