//! Analyze command: full trend analysis of a corpus snapshot

use super::progress::TerminalProgress;
use super::{load_corpus, with_workers};
use crate::config::ProjectConfig;
use crate::pipeline::Pipeline;
use crate::reporters;
use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

pub fn run(
    corpus_path: &Path,
    config: &ProjectConfig,
    keep_replicates: bool,
    top: usize,
    workers: usize,
    quiet: bool,
) -> Result<()> {
    let start = Instant::now();
    debug!("Analyze config: {:?}", config);

    let (corpus, dropped) = load_corpus(corpus_path, config, quiet)?;
    let pipeline = Pipeline::from_config(config)?;
    let progress = TerminalProgress::new(quiet);

    let analysis = with_workers(workers, || pipeline.run(&corpus, dropped, &progress))?
        .context("Analysis failed")?;

    let written = reporters::write_analysis(&analysis, &config.output.dir, config.output.format, keep_replicates)?;

    if !quiet {
        print!("{}", reporters::text::render(&analysis, top)?);
        println!(
            "\n{}Wrote {} files to {} in {:.1}s",
            style("✓ ").green(),
            style(written.len()).cyan(),
            style(config.output.dir.display()).cyan(),
            start.elapsed().as_secs_f64()
        );
    }
    Ok(())
}
