//! Article-level bootstrap for per-year frequency standard errors
//!
//! Each replicate resamples article indices with replacement (same size as
//! the corpus) and re-aggregates per-year counts of the selected stems and
//! per-year token totals from the per-article profiles already held by the
//! frequency tables. Replicate `r` owns an RNG seeded with `seed + r`, so the
//! output is identical for any number of worker threads.
//!
//! Replicates run in parallel and only return their own result; the
//! standard-deviation reduction happens once all of them are done.

use crate::frequency::{ratio, FrequencyTables};
use crate::models::{ReplicateRow, StandardErrorRow};
use crate::stats::sample_std_dev;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{info, warn};

/// Frequencies produced by one replicate
#[derive(Debug, Clone)]
struct Replicate {
    /// [stem][year]; years with no resampled article hold 0
    frequencies: Vec<Vec<f64>>,
}

/// Standard errors and raw replicate frequencies for the selected stems
#[derive(Debug, Clone, Default)]
pub struct BootstrapEstimate {
    years: Vec<i32>,
    stems: Vec<String>,
    /// [stem][year]
    standard_errors: Vec<Vec<f64>>,
    replicates: Vec<Replicate>,
}

impl BootstrapEstimate {
    pub fn num_replicates(&self) -> usize {
        self.replicates.len()
    }

    pub fn stems(&self) -> &[String] {
        &self.stems
    }

    /// Standard error per year for `stem`, aligned with the corpus years
    pub fn standard_errors_for(&self, stem: &str) -> Option<&[f64]> {
        let idx = self.stems.iter().position(|s| s == stem)?;
        Some(&self.standard_errors[idx])
    }

    /// One row per (stem, year)
    pub fn standard_error_rows(&self) -> Vec<StandardErrorRow> {
        let mut rows = Vec::with_capacity(self.stems.len() * self.years.len());
        for (stem, errors) in self.stems.iter().zip(&self.standard_errors) {
            for (&year, &standard_error) in self.years.iter().zip(errors) {
                rows.push(StandardErrorRow {
                    stem: stem.clone(),
                    year,
                    standard_error,
                });
            }
        }
        rows
    }

    /// Fixed-shape replicate table: one row per (stem, year, replicate)
    pub fn replicate_rows(&self) -> Vec<ReplicateRow> {
        let mut rows =
            Vec::with_capacity(self.stems.len() * self.years.len() * self.replicates.len());
        for (s, stem) in self.stems.iter().enumerate() {
            for (y, &year) in self.years.iter().enumerate() {
                for (replicate, rep) in self.replicates.iter().enumerate() {
                    rows.push(ReplicateRow {
                        stem: stem.clone(),
                        year,
                        replicate,
                        frequency: rep.frequencies[s][y],
                    });
                }
            }
        }
        rows
    }
}

/// Resampling settings
#[derive(Debug, Clone, Copy)]
pub struct Bootstrap {
    pub replicates: usize,
    pub seed: u64,
}

impl Bootstrap {
    pub fn new(replicates: usize, seed: u64) -> Self {
        Self { replicates, seed }
    }

    /// Run all replicates for `stems`.
    ///
    /// Stems not present in `tables` are skipped with a warning.
    /// `on_replicate` is called once per finished replicate.
    pub fn estimate<F>(&self, tables: &FrequencyTables, stems: &[String], on_replicate: F) -> BootstrapEstimate
    where
        F: Fn() + Sync,
    {
        let selected: Vec<String> = stems
            .iter()
            .filter(|s| {
                let known = tables.contains(s);
                if !known {
                    warn!("Skipping bootstrap for unknown stem '{}'", s);
                }
                known
            })
            .cloned()
            .collect();

        let num_articles = tables.num_articles();
        let num_years = tables.years().len();

        // Per-article profile of the selected stems: (stem index, count), non-zero only
        let mut profiles: Vec<Vec<(usize, u64)>> = vec![Vec::new(); num_articles];
        for (s, stem) in selected.iter().enumerate() {
            if let Some(counts) = tables.stem(stem) {
                for (article, count) in counts.article_counts() {
                    profiles[article].push((s, count));
                }
            }
        }

        let replicates: Vec<Replicate> = if num_articles == 0 || selected.is_empty() {
            Vec::new()
        } else {
            (0..self.replicates)
                .into_par_iter()
                .map(|r| {
                    let rep = resample(
                        self.seed.wrapping_add(r as u64),
                        tables.article_year_indices(),
                        tables.article_totals(),
                        &profiles,
                        selected.len(),
                        num_years,
                    );
                    on_replicate();
                    rep
                })
                .collect()
        };

        // Barrier passed: reduce across replicates
        let scale = (num_articles.max(1) as f64).sqrt();
        let mut standard_errors = vec![vec![0.0; num_years]; selected.len()];
        let mut column = Vec::with_capacity(replicates.len());
        for (s, errors) in standard_errors.iter_mut().enumerate() {
            for (y, se) in errors.iter_mut().enumerate() {
                column.clear();
                column.extend(replicates.iter().map(|rep| rep.frequencies[s][y]));
                *se = sample_std_dev(&column) / scale;
            }
        }

        info!(
            "Bootstrap: {} replicates over {} articles for {} stems",
            replicates.len(),
            num_articles,
            selected.len()
        );

        BootstrapEstimate {
            years: tables.years().to_vec(),
            stems: selected,
            standard_errors,
            replicates,
        }
    }
}

fn resample(
    seed: u64,
    article_years: &[usize],
    article_totals: &[u64],
    profiles: &[Vec<(usize, u64)>],
    num_stems: usize,
    num_years: usize,
) -> Replicate {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let n = article_years.len();

    let mut totals = vec![0u64; num_years];
    let mut counts = vec![vec![0u64; num_years]; num_stems];
    for _ in 0..n {
        let a = rng.random_range(0..n);
        let y = article_years[a];
        totals[y] += article_totals[a];
        for &(s, c) in &profiles[a] {
            counts[s][y] += c;
        }
    }

    Replicate {
        frequencies: counts
            .iter()
            .map(|row| row.iter().zip(&totals).map(|(&c, &t)| ratio(c, t)).collect())
            .collect(),
    }
}
