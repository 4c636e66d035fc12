//! Prevalence filter
//!
//! A stem is kept only if it occurs in enough distinct years AND enough
//! distinct articles. Both thresholds are derived from corpus size, which
//! filtering does not change, so applying the filter twice is a no-op.

use super::{FrequencyTables, StemCounts};
use crate::error::{LexError, LexResult};
use serde::Serialize;
use tracing::info;

/// Resolved coverage thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrevalenceThresholds {
    pub min_years: usize,
    pub min_articles: usize,
}

impl PrevalenceThresholds {
    /// `ceil(num_years * year_ratio)` and `ceil(num_articles * article_ratio)`, at least 1
    pub fn from_ratios(num_years: usize, num_articles: usize, year_ratio: f64, article_ratio: f64) -> Self {
        Self {
            min_years: ceil_fraction(num_years, year_ratio),
            min_articles: ceil_fraction(num_articles, article_ratio),
        }
    }

    pub fn for_tables(tables: &FrequencyTables, year_ratio: f64, article_ratio: f64) -> Self {
        Self::from_ratios(
            tables.years().len(),
            tables.num_articles(),
            year_ratio,
            article_ratio,
        )
    }

    pub fn accepts(&self, counts: &StemCounts) -> bool {
        counts.years_present() >= self.min_years && counts.articles_present() >= self.min_articles
    }
}

/// Ceiling with a small tolerance so that e.g. 3 * (2/3) resolves to 2, not 3
fn ceil_fraction(n: usize, ratio: f64) -> usize {
    let raw = n as f64 * ratio;
    ((raw - 1e-9).ceil().max(1.0)) as usize
}

/// Reduce the tables to prevalent stems.
///
/// Fails with [`LexError::NoEligibleStems`] when nothing survives.
pub fn filter_prevalent(
    tables: &FrequencyTables,
    thresholds: PrevalenceThresholds,
) -> LexResult<FrequencyTables> {
    let filtered = tables.retain(|_, counts| thresholds.accepts(counts));

    info!(
        "Prevalence filter kept {} of {} stems (>= {} years, >= {} articles)",
        filtered.num_stems(),
        tables.num_stems(),
        thresholds.min_years,
        thresholds.min_articles
    );

    if filtered.is_empty() {
        return Err(LexError::NoEligibleStems {
            min_years: thresholds.min_years,
            min_articles: thresholds.min_articles,
        });
    }
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;
    use crate::frequency::tests::{article, tokenizer};

    fn corpus() -> Corpus {
        // "genome" in every year and most articles, "lineage" in one year only,
        // "relic" in one article only
        Corpus::from_articles(vec![
            article("a1", 2000, "genome lineage lineage"),
            article("a2", 2000, "genome relic"),
            article("a3", 2001, "genome samples"),
            article("a4", 2002, "genome samples"),
            article("a5", 2002, "samples"),
        ])
    }

    #[test]
    fn test_threshold_rounding() {
        let t = PrevalenceThresholds::from_ratios(3, 5, 2.0 / 3.0, 0.1);
        assert_eq!(t, PrevalenceThresholds { min_years: 2, min_articles: 1 });

        let t = PrevalenceThresholds::from_ratios(10, 250, 2.0 / 3.0, 0.1);
        assert_eq!(t, PrevalenceThresholds { min_years: 7, min_articles: 25 });

        let t = PrevalenceThresholds::from_ratios(6, 101, 2.0 / 3.0, 0.1);
        assert_eq!(t, PrevalenceThresholds { min_years: 4, min_articles: 11 });
    }

    #[test]
    fn test_both_thresholds_must_hold() {
        let tables = FrequencyTables::build(&corpus(), &tokenizer(), || {});
        let thresholds = PrevalenceThresholds {
            min_years: 2,
            min_articles: 2,
        };
        let filtered = filter_prevalent(&tables, thresholds).unwrap();
        let kept: Vec<&str> = filtered.stems().map(|(s, _)| s).collect();
        // lineage: 1 year, 1 article; relic: 1 year, 1 article
        assert_eq!(kept, vec!["genom", "sampl"]);
    }

    #[test]
    fn test_year_coverage_alone_is_not_enough() {
        let tables = FrequencyTables::build(&corpus(), &tokenizer(), || {});
        let thresholds = PrevalenceThresholds {
            min_years: 1,
            min_articles: 4,
        };
        let filtered = filter_prevalent(&tables, thresholds).unwrap();
        let kept: Vec<&str> = filtered.stems().map(|(s, _)| s).collect();
        assert_eq!(kept, vec!["genom"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let tables = FrequencyTables::build(&corpus(), &tokenizer(), || {});
        let thresholds = PrevalenceThresholds::for_tables(&tables, 2.0 / 3.0, 0.3);
        let once = filter_prevalent(&tables, thresholds).unwrap();
        let again_thresholds = PrevalenceThresholds::for_tables(&once, 2.0 / 3.0, 0.3);
        assert_eq!(thresholds, again_thresholds);
        let twice = filter_prevalent(&once, again_thresholds).unwrap();
        assert_eq!(once.year_rows(), twice.year_rows());
    }

    #[test]
    fn test_empty_result_is_fatal() {
        let tables = FrequencyTables::build(&corpus(), &tokenizer(), || {});
        let thresholds = PrevalenceThresholds {
            min_years: 4,
            min_articles: 1,
        };
        match filter_prevalent(&tables, thresholds) {
            Err(LexError::NoEligibleStems { min_years, .. }) => assert_eq!(min_years, 4),
            other => panic!("expected NoEligibleStems, got {:?}", other.map(|t| t.num_stems())),
        }
    }

    #[test]
    fn test_filtered_rows_are_zero_filled() {
        let tables = FrequencyTables::build(&corpus(), &tokenizer(), || {});
        let filtered = filter_prevalent(
            &tables,
            PrevalenceThresholds {
                min_years: 2,
                min_articles: 2,
            },
        )
        .unwrap();
        let rows = filtered.year_rows();
        assert_eq!(rows.len(), 2 * 3);
        assert!(rows
            .iter()
            .any(|r| r.stem == "sampl" && r.year == 2000 && r.count == 0));
    }
}
