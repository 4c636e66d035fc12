//! Sentence export for qualitative review
//!
//! Emits every sentence of the corpus that contains a surface form of one of
//! the requested stems, with the article's year. Rows follow corpus order,
//! then sentence order, then the order in which stems were requested.

use crate::corpus::Corpus;
use crate::models::SentenceRow;
use crate::text::Tokenizer;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tracing::info;
use unicode_segmentation::UnicodeSegmentation;

pub fn export_sentences(corpus: &Corpus, tokenizer: &Tokenizer, stems: &[String]) -> Vec<SentenceRow> {
    if stems.is_empty() {
        return Vec::new();
    }

    let per_article: Vec<Vec<SentenceRow>> = corpus
        .articles()
        .par_iter()
        .map(|article| {
            let mut rows = Vec::new();
            for sentence in article.body.unicode_sentences() {
                let sentence = sentence.trim();
                if sentence.is_empty() {
                    continue;
                }
                let present: FxHashSet<String> = tokenizer.stems(sentence).collect();
                for stem in stems.iter().filter(|s| present.contains(s.as_str())) {
                    rows.push(SentenceRow {
                        stem: stem.clone(),
                        year: article.year,
                        article_id: article.id.clone(),
                        sentence: sentence.to_string(),
                    });
                }
            }
            rows
        })
        .collect();

    let rows: Vec<SentenceRow> = per_article.into_iter().flatten().collect();
    info!("Exported {} sentences for {} stems", rows.len(), stems.len());
    rows
}
