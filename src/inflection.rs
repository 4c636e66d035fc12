//! Surface forms behind each stem
//!
//! A second tokenization pass over the corpus that keeps the surface form of
//! every token whose stem is in the requested set. Forms are listed by count
//! descending, ties by the form itself.

use crate::corpus::Corpus;
use crate::models::InflectionRow;
use crate::text::Tokenizer;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::info;

/// Surface forms of one stem, most frequent first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InflectionTable {
    pub stem: String,
    pub forms: Vec<(String, u64)>,
}

impl InflectionTable {
    /// Most frequent surface form
    pub fn dominant(&self) -> Option<&str> {
        self.forms.first().map(|(form, _)| form.as_str())
    }

    pub fn total(&self) -> u64 {
        self.forms.iter().map(|(_, c)| c).sum()
    }
}

type FormCounts = FxHashMap<usize, FxHashMap<String, u64>>;

/// Tables for `stems`, in the order given
pub fn index_inflections(corpus: &Corpus, tokenizer: &Tokenizer, stems: &[String]) -> Vec<InflectionTable> {
    let wanted: FxHashMap<&str, usize> = stems.iter().enumerate().map(|(i, s)| (s.as_str(), i)).collect();

    let partials: Vec<FormCounts> = corpus
        .articles()
        .par_iter()
        .map(|article| {
            let mut counts = FormCounts::default();
            for token in tokenizer.tokens(&article.body) {
                if let Some(&idx) = wanted.get(token.stem.as_str()) {
                    *counts.entry(idx).or_default().entry(token.surface).or_insert(0) += 1;
                }
            }
            counts
        })
        .collect();

    let mut merged: Vec<FxHashMap<String, u64>> = vec![FxHashMap::default(); stems.len()];
    for partial in partials {
        for (idx, forms) in partial {
            for (form, count) in forms {
                *merged[idx].entry(form).or_insert(0) += count;
            }
        }
    }

    let tables: Vec<InflectionTable> = stems
        .iter()
        .zip(merged)
        .map(|(stem, forms)| {
            let mut forms: Vec<(String, u64)> = forms.into_iter().collect();
            forms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            InflectionTable {
                stem: stem.clone(),
                forms,
            }
        })
        .collect();

    info!("Indexed surface forms for {} stems", tables.len());
    tables
}

/// Flatten to `(stem, surface_form, count)` rows, table order preserved
pub fn inflection_rows(tables: &[InflectionTable]) -> Vec<InflectionRow> {
    tables
        .iter()
        .flat_map(|t| {
            t.forms.iter().map(move |(form, count)| InflectionRow {
                stem: t.stem.clone(),
                surface_form: form.clone(),
                count: *count,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::tests::{article, tokenizer};

    fn corpus() -> Corpus {
        Corpus::from_articles(vec![
            article("a", 2000, "Discordant dates and discordance between discordant samples"),
            article("b", 2001, "the discordance was resolved; ancient samples agree"),
            article("c", 2002, "Ancient DNA from ancient sample sites"),
        ])
    }

    #[test]
    fn test_forms_sorted_by_count_then_surface() {
        let stems = vec!["discord".to_string()];
        let tables = index_inflections(&corpus(), &tokenizer(), &stems);
        assert_eq!(tables.len(), 1);
        assert_eq!(
            tables[0].forms,
            vec![("discordance".to_string(), 2), ("discordant".to_string(), 2)]
        );
        assert_eq!(tables[0].dominant(), Some("discordance"));
        assert_eq!(tables[0].total(), 4);
    }

    #[test]
    fn test_surface_forms_are_lowercased() {
        let stems = vec!["ancient".to_string(), "sampl".to_string()];
        let tables = index_inflections(&corpus(), &tokenizer(), &stems);
        assert_eq!(tables[0].forms, vec![("ancient".to_string(), 3)]);
        assert_eq!(
            tables[1].forms,
            vec![("samples".to_string(), 2), ("sample".to_string(), 1)]
        );
    }

    #[test]
    fn test_unseen_stem_yields_empty_table() {
        let stems = vec!["zzz".to_string()];
        let tables = index_inflections(&corpus(), &tokenizer(), &stems);
        assert!(tables[0].forms.is_empty());
        assert_eq!(tables[0].dominant(), None);
    }

    #[test]
    fn test_rows_follow_table_order() {
        let stems = vec!["sampl".to_string(), "ancient".to_string()];
        let tables = index_inflections(&corpus(), &tokenizer(), &stems);
        let rows = inflection_rows(&tables);
        let flat: Vec<(&str, &str, u64)> = rows
            .iter()
            .map(|r| (r.stem.as_str(), r.surface_form.as_str(), r.count))
            .collect();
        assert_eq!(
            flat,
            vec![
                ("sampl", "samples", 2),
                ("sampl", "sample", 1),
                ("ancient", "ancient", 3),
            ]
        );
    }
}
