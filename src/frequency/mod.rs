//! Per-year and per-article stem frequency tables
//!
//! Articles are tokenized in parallel; each worker produces a partial
//! aggregate for its article and the partials are folded in corpus order.
//! Counts are sums, so the result does not depend on scheduling.
//!
//! Tables are zero-filled: every stem has a count for every corpus year and
//! every article, 0 where it never occurs. Per-year counts are stored densely
//! (years are few); per-article counts are stored sparsely and read back with
//! 0 as the default.

pub mod filter;

use crate::corpus::Corpus;
use crate::models::{ArticleFrequencyRow, YearFrequencyRow};
use crate::text::Tokenizer;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::info;

/// Counts for one stem
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StemCounts {
    /// Indexed like [`FrequencyTables::years`]
    by_year: Vec<u64>,
    /// article index -> count, non-zero entries only
    by_article: BTreeMap<usize, u64>,
}

impl StemCounts {
    pub fn by_year(&self) -> &[u64] {
        &self.by_year
    }

    /// Number of years with a non-zero count
    pub fn years_present(&self) -> usize {
        self.by_year.iter().filter(|&&c| c > 0).count()
    }

    /// Number of articles with a non-zero count
    pub fn articles_present(&self) -> usize {
        self.by_article.len()
    }

    pub fn article_count(&self, article: usize) -> u64 {
        self.by_article.get(&article).copied().unwrap_or(0)
    }

    /// Non-zero (article index, count) pairs, ascending by index
    pub fn article_counts(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.by_article.iter().map(|(&a, &c)| (a, c))
    }

    pub fn total(&self) -> u64 {
        self.by_year.iter().sum()
    }
}

/// Stem counts of a single article
#[derive(Debug, Default)]
struct ArticlePartial {
    total: u64,
    counts: FxHashMap<String, u64>,
}

fn count_article(tokenizer: &Tokenizer, body: &str) -> ArticlePartial {
    let mut partial = ArticlePartial::default();
    for stem in tokenizer.stems(body) {
        partial.total += 1;
        *partial.counts.entry(stem).or_insert(0) += 1;
    }
    partial
}

/// Zero-filled frequency tables for a corpus
#[derive(Debug, Clone, Default)]
pub struct FrequencyTables {
    /// Distinct corpus years, ascending
    years: Vec<i32>,
    /// Token count per year, aligned with `years`
    year_totals: Vec<u64>,
    article_ids: Vec<String>,
    /// Index into `years` for each article
    article_year_idx: Vec<usize>,
    /// Token count per article
    article_totals: Vec<u64>,
    stems: BTreeMap<String, StemCounts>,
}

impl FrequencyTables {
    /// Tokenize every article and aggregate stem counts.
    ///
    /// `on_article` is called once per processed article (progress reporting).
    pub fn build<F>(corpus: &Corpus, tokenizer: &Tokenizer, on_article: F) -> Self
    where
        F: Fn() + Sync,
    {
        let partials: Vec<ArticlePartial> = corpus
            .articles()
            .par_iter()
            .map(|article| {
                let partial = count_article(tokenizer, &article.body);
                on_article();
                partial
            })
            .collect();

        let years = corpus.years();
        let year_index: FxHashMap<i32, usize> =
            years.iter().enumerate().map(|(i, &y)| (y, i)).collect();

        let mut tables = FrequencyTables {
            year_totals: vec![0; years.len()],
            article_ids: Vec::with_capacity(corpus.len()),
            article_year_idx: Vec::with_capacity(corpus.len()),
            article_totals: Vec::with_capacity(corpus.len()),
            stems: BTreeMap::new(),
            years,
        };

        for (article_idx, (article, partial)) in corpus.articles().iter().zip(partials).enumerate() {
            let y = year_index[&article.year];
            tables.year_totals[y] += partial.total;
            tables.article_ids.push(article.id.clone());
            tables.article_year_idx.push(y);
            tables.article_totals.push(partial.total);

            let num_years = tables.years.len();
            for (stem, count) in partial.counts {
                let entry = tables.stems.entry(stem).or_insert_with(|| StemCounts {
                    by_year: vec![0; num_years],
                    by_article: BTreeMap::new(),
                });
                entry.by_year[y] += count;
                entry.by_article.insert(article_idx, count);
            }
        }

        info!(
            "Aggregated {} tokens into {} stems across {} years",
            tables.year_totals.iter().sum::<u64>(),
            tables.stems.len(),
            tables.years.len()
        );
        tables
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn year_totals(&self) -> &[u64] {
        &self.year_totals
    }

    pub fn num_articles(&self) -> usize {
        self.article_ids.len()
    }

    pub fn article_ids(&self) -> &[String] {
        &self.article_ids
    }

    pub fn article_totals(&self) -> &[u64] {
        &self.article_totals
    }

    /// Year of each article, by article index
    pub fn article_years(&self) -> Vec<i32> {
        self.article_year_idx.iter().map(|&i| self.years[i]).collect()
    }

    /// Index into [`Self::years`] of each article
    pub fn article_year_indices(&self) -> &[usize] {
        &self.article_year_idx
    }

    pub fn num_stems(&self) -> usize {
        self.stems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stems.is_empty()
    }

    pub fn contains(&self, stem: &str) -> bool {
        self.stems.contains_key(stem)
    }

    pub fn stem(&self, stem: &str) -> Option<&StemCounts> {
        self.stems.get(stem)
    }

    /// Stems in lexical order
    pub fn stems(&self) -> impl Iterator<Item = (&str, &StemCounts)> {
        self.stems.iter().map(|(s, c)| (s.as_str(), c))
    }

    /// count / total words per year, aligned with `years()`
    pub fn year_frequencies(&self, stem: &str) -> Option<Vec<f64>> {
        let counts = self.stems.get(stem)?;
        Some(
            counts
                .by_year
                .iter()
                .zip(&self.year_totals)
                .map(|(&c, &t)| ratio(c, t))
                .collect(),
        )
    }

    /// count / total words per article, by article index
    pub fn article_frequencies(&self, stem: &str) -> Option<Vec<f64>> {
        let counts = self.stems.get(stem)?;
        Some(
            self.article_totals
                .iter()
                .enumerate()
                .map(|(i, &t)| ratio(counts.article_count(i), t))
                .collect(),
        )
    }

    /// New tables holding only the stems accepted by `keep`
    pub fn retain<P>(&self, mut keep: P) -> FrequencyTables
    where
        P: FnMut(&str, &StemCounts) -> bool,
    {
        FrequencyTables {
            years: self.years.clone(),
            year_totals: self.year_totals.clone(),
            article_ids: self.article_ids.clone(),
            article_year_idx: self.article_year_idx.clone(),
            article_totals: self.article_totals.clone(),
            stems: self
                .stems
                .iter()
                .filter(|(s, c)| keep(s, c))
                .map(|(s, c)| (s.clone(), c.clone()))
                .collect(),
        }
    }

    /// Zero-filled per-year rows: one per (stem, year)
    pub fn year_rows(&self) -> Vec<YearFrequencyRow> {
        let mut rows = Vec::with_capacity(self.stems.len() * self.years.len());
        for (stem, counts) in &self.stems {
            for (y, &year) in self.years.iter().enumerate() {
                let count = counts.by_year[y];
                let total_words = self.year_totals[y];
                rows.push(YearFrequencyRow {
                    stem: stem.clone(),
                    year,
                    count,
                    total_words,
                    frequency: ratio(count, total_words),
                });
            }
        }
        rows
    }

    /// Zero-filled per-article rows: one per (stem, article)
    pub fn article_rows(&self) -> Vec<ArticleFrequencyRow> {
        let mut rows = Vec::with_capacity(self.stems.len() * self.article_ids.len());
        for (stem, counts) in &self.stems {
            for (i, id) in self.article_ids.iter().enumerate() {
                rows.push(ArticleFrequencyRow {
                    stem: stem.clone(),
                    article_id: id.clone(),
                    count: counts.article_count(i),
                });
            }
        }
        rows
    }
}

pub(crate) fn ratio(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::corpus::Article;

    pub(crate) fn article(id: &str, year: i32, body: &str) -> Article {
        Article {
            id: id.to_string(),
            year,
            journal: "Test Journal".to_string(),
            title: format!("Article {}", id),
            body: body.to_string(),
        }
    }

    pub(crate) fn tokenizer() -> Tokenizer {
        Tokenizer::with_stop_words(["the", "a", "of", "and", "in", "was", "were"])
    }

    fn sample_corpus() -> Corpus {
        Corpus::from_articles(vec![
            article("a1", 2000, "the genome was sequenced"),
            article("a2", 2000, "genome genome lineage"),
            article("a3", 2002, "lineage of ancient samples"),
        ])
    }

    #[test]
    fn test_year_totals_and_counts() {
        let tables = FrequencyTables::build(&sample_corpus(), &tokenizer(), || {});
        assert_eq!(tables.years(), &[2000, 2002]);
        // a1: genome sequenced (2), a2: genome genome lineage (3), a3: lineage ancient samples (3)
        assert_eq!(tables.year_totals(), &[5, 3]);
        assert_eq!(tables.article_totals(), &[2, 3, 3]);

        let genome = tables.stem("genom").unwrap();
        assert_eq!(genome.by_year(), &[3, 0]);
        assert_eq!(genome.article_count(0), 1);
        assert_eq!(genome.article_count(1), 2);
        assert_eq!(genome.article_count(2), 0);
        assert_eq!(genome.articles_present(), 2);
        assert_eq!(genome.years_present(), 1);
    }

    #[test]
    fn test_zero_filling_is_total() {
        let tables = FrequencyTables::build(&sample_corpus(), &tokenizer(), || {});
        let rows = tables.year_rows();
        assert_eq!(rows.len(), tables.num_stems() * tables.years().len());
        for (stem, _) in tables.stems() {
            let n = rows.iter().filter(|r| r.stem == stem).count();
            assert_eq!(n, tables.years().len());
        }

        let article_rows = tables.article_rows();
        assert_eq!(article_rows.len(), tables.num_stems() * 3);
        assert!(article_rows
            .iter()
            .any(|r| r.stem == "ancient" && r.article_id == "a1" && r.count == 0));
    }

    #[test]
    fn test_frequency_bounds() {
        let tables = FrequencyTables::build(&sample_corpus(), &tokenizer(), || {});
        for row in tables.year_rows() {
            assert!(row.count <= row.total_words);
            assert!((0.0..=1.0).contains(&row.frequency));
        }
        let freq = tables.year_frequencies("lineag").unwrap();
        assert!((freq[0] - 1.0 / 5.0).abs() < 1e-12);
        assert!((freq[1] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_aggregation_independent_of_input_order() {
        let forward = FrequencyTables::build(&sample_corpus(), &tokenizer(), || {});
        let mut reversed: Vec<Article> = sample_corpus().articles().to_vec();
        reversed.reverse();
        let backward = FrequencyTables::build(&Corpus::from_articles(reversed), &tokenizer(), || {});
        assert_eq!(forward.year_rows(), backward.year_rows());
    }

    #[test]
    fn test_progress_callback_once_per_article() {
        let calls = std::sync::atomic::AtomicUsize::new(0);
        FrequencyTables::build(&sample_corpus(), &tokenizer(), || {
            calls.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        });
        assert_eq!(calls.into_inner(), 3);
    }

    #[test]
    fn test_retain_keeps_denominators() {
        let tables = FrequencyTables::build(&sample_corpus(), &tokenizer(), || {});
        let only = tables.retain(|s, _| s == "genom");
        assert_eq!(only.num_stems(), 1);
        assert_eq!(only.year_totals(), tables.year_totals());
        assert_eq!(only.article_totals(), tables.article_totals());
    }
}
