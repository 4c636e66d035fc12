//! CLI command definitions and handlers

mod analyze;
mod init;
mod progress;
mod sentences;
mod stem;

use crate::config::{load_config, load_config_from, ProjectConfig};
use crate::corpus::{load_snapshot, Corpus, ExceptionList, IngestOptions, IngestionIssue};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use std::path::{Path, PathBuf};

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// Parse a fraction in (0, 1]
fn parse_ratio(s: &str) -> Result<f64, String> {
    let r: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if r > 0.0 && r <= 1.0 {
        Ok(r)
    } else {
        Err("must be greater than 0 and at most 1".to_string())
    }
}

/// lexdrift - longitudinal word-frequency trends in journal articles
#[derive(Parser, Debug)]
#[command(name = "lexdrift")]
#[command(
    version,
    about = "Detect words whose frequency trends with publication year across a corpus of journal articles",
    long_about = "lexdrift tokenizes and stems a corpus snapshot of journal articles, builds \
per-year and per-article frequency tables, keeps stems that are prevalent across years and \
articles, tests each for a monotonic trend over time (Spearman, Benjamini-Hochberg FDR), \
bootstraps standard errors and lists the surface forms behind each trending stem.",
    after_help = "\
Examples:
  lexdrift init                                   Write an example lexdrift.toml
  lexdrift analyze corpus.jsonl                   Analyze and write CSV tables to ./lexdrift-out
  lexdrift analyze corpus.json -f json -o out     JSON tables in ./out
  lexdrift analyze corpus.jsonl --unit article    One observation per article (small corpora)
  lexdrift sentences corpus.jsonl --stem ancient  Sentences containing a stem
  lexdrift stem discordant discordance            Show the stem of each word"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel workers (1-64)
    #[arg(long, global = true, default_value = "8", value_parser = parse_workers)]
    pub workers: usize,

    /// Config file (default: ./lexdrift.toml, then ~/.config/lexdrift/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Suppress progress bars and the summary
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write an example lexdrift.toml config file
    Init {
        /// Directory to write into
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Run the full trend analysis on a corpus snapshot
    #[command(after_help = "\
Examples:
  lexdrift analyze corpus.jsonl
  lexdrift analyze corpus.jsonl --replicates 1000 --seed 7
  lexdrift analyze corpus.jsonl --alpha 0.01 --keep-replicates")]
    Analyze {
        /// Corpus snapshot (.json array or .jsonl / .ndjson lines)
        corpus: PathBuf,

        /// Output directory (default from config: lexdrift-out)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Table format: csv, json
        #[arg(long, short = 'f', value_parser = ["csv", "json"])]
        format: Option<String>,

        /// FDR significance level
        #[arg(long)]
        alpha: Option<f64>,

        /// Observation unit of the trend test: year, article
        #[arg(long, value_parser = ["year", "article"])]
        unit: Option<String>,

        /// Fraction of corpus years a stem must occur in
        #[arg(long, value_parser = parse_ratio)]
        year_coverage: Option<f64>,

        /// Fraction of articles a stem must occur in
        #[arg(long, value_parser = parse_ratio)]
        article_coverage: Option<f64>,

        /// Bootstrap replicates
        #[arg(long)]
        replicates: Option<usize>,

        /// Bootstrap seed
        #[arg(long)]
        seed: Option<u64>,

        /// Also write the raw per-replicate frequency table
        #[arg(long)]
        keep_replicates: bool,

        /// Trending stems shown in the summary
        #[arg(long, default_value = "20")]
        top: usize,
    },

    /// Export every sentence that contains one of the given stems
    Sentences {
        /// Corpus snapshot (.json array or .jsonl / .ndjson lines)
        corpus: PathBuf,

        /// Stem to look for (repeatable)
        #[arg(long = "stem", short = 's')]
        stems: Vec<String>,

        /// Word whose stem to look for (repeatable)
        #[arg(long = "word", short = 'w')]
        words: Vec<String>,

        /// Output file (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Output format: csv, json
        #[arg(long, short = 'f', default_value = "csv", value_parser = ["csv", "json"])]
        format: String,
    },

    /// Print the stem of each word
    Stem {
        #[arg(required = true)]
        words: Vec<String>,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { ref path, force } => init::run(path, force),

        Commands::Stem { ref words } => {
            let config = resolve_config(cli.config.as_deref())?;
            stem::run(&config, words)
        }

        Commands::Analyze {
            ref corpus,
            ref output,
            ref format,
            alpha,
            ref unit,
            year_coverage,
            article_coverage,
            replicates,
            seed,
            keep_replicates,
            top,
        } => {
            let mut config = resolve_config(cli.config.as_deref())?;
            if let Some(dir) = output {
                config.output.dir = dir.clone();
            }
            if let Some(f) = format {
                config.output.format = f.parse()?;
            }
            if let Some(a) = alpha {
                config.trend.alpha = a;
            }
            if let Some(u) = unit {
                config.trend.unit = u.parse().map_err(anyhow::Error::msg)?;
            }
            if let Some(r) = year_coverage {
                config.filter.year_coverage = r;
            }
            if let Some(r) = article_coverage {
                config.filter.article_coverage = r;
            }
            if let Some(r) = replicates {
                config.bootstrap.replicates = r;
            }
            if let Some(s) = seed {
                config.bootstrap.seed = s;
            }
            config.validate()?;

            analyze::run(
                corpus,
                &config,
                keep_replicates,
                top,
                cli.workers,
                cli.quiet,
            )
        }

        Commands::Sentences {
            ref corpus,
            ref stems,
            ref words,
            ref output,
            ref format,
        } => {
            let config = resolve_config(cli.config.as_deref())?;
            sentences::run(
                corpus,
                &config,
                stems,
                words,
                output.as_deref(),
                format.parse()?,
                cli.workers,
                cli.quiet,
            )
        }
    }
}

/// Explicit `--config` must load; otherwise fall back leniently
fn resolve_config(explicit: Option<&Path>) -> Result<ProjectConfig> {
    match explicit {
        Some(path) => load_config_from(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => {
            let cwd = std::env::current_dir().context("Failed to read working directory")?;
            Ok(load_config(&cwd))
        }
    }
}

/// Load, apply exceptions, validate and normalize a snapshot
fn load_corpus(path: &Path, config: &ProjectConfig, quiet: bool) -> Result<(Corpus, Vec<IngestionIssue>)> {
    let (records, mut issues) =
        load_snapshot(path).with_context(|| format!("Failed to read corpus {}", path.display()))?;
    let exceptions = ExceptionList::new(&config.exceptions)?;
    let options = IngestOptions::new(config.corpus.min_year, config.corpus.max_year);

    let (corpus, dropped) = Corpus::ingest(records, &options, &exceptions);
    issues.extend(dropped);

    if !quiet {
        eprintln!(
            "{}Loaded {} articles from {} ({} records dropped)",
            style("✓ ").green(),
            style(corpus.len()).cyan(),
            style(path.display()).cyan(),
            style(issues.len()).yellow()
        );
    }
    Ok((corpus, issues))
}

/// Run `f` on a rayon pool with `workers` threads
fn with_workers<T, F>(workers: usize, f: F) -> Result<T>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;
    Ok(pool.install(f))
}
