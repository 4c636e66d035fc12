//! Sentences command: qualitative export for chosen stems

use super::progress::create_spinner_style;
use super::{load_corpus, with_workers};
use crate::config::ProjectConfig;
use crate::reporters::{self, OutputFormat};
use crate::sentences::export_sentences;
use crate::text::Tokenizer;
use anyhow::Result;
use console::style;
use indicatif::ProgressBar;
use rustc_hash::FxHashSet;
use std::path::Path;
use std::time::Duration;

#[allow(clippy::too_many_arguments)]
pub fn run(
    corpus_path: &Path,
    config: &ProjectConfig,
    stems: &[String],
    words: &[String],
    output: Option<&Path>,
    format: OutputFormat,
    workers: usize,
    quiet: bool,
) -> Result<()> {
    let tokenizer = Tokenizer::english(config.extra_stop_words()?)
        .with_min_chars(config.tokenizer.min_token_chars);

    let mut wanted: Vec<String> = stems.iter().map(|s| s.trim().to_lowercase()).collect();
    wanted.extend(words.iter().map(|w| tokenizer.stem(w.trim())));
    let mut seen = FxHashSet::default();
    wanted.retain(|s| !s.is_empty() && seen.insert(s.clone()));
    if wanted.is_empty() {
        anyhow::bail!("Give at least one --stem or --word");
    }

    let (corpus, _dropped) = load_corpus(corpus_path, config, quiet)?;

    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(create_spinner_style());
    spinner.set_message(format!("Scanning sentences for {}...", wanted.join(", ")));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let rows = with_workers(workers, || export_sentences(&corpus, &tokenizer, &wanted))?;

    spinner.finish_with_message(format!(
        "{}Found {} sentences",
        style("✓ ").green(),
        style(rows.len()).cyan()
    ));

    reporters::write_sentences(&rows, output, format)
}
