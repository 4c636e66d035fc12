//! Terminal progress for pipeline stages

use crate::pipeline::{Stage, StageObserver};
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Create spinner progress style
pub(super) fn create_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Create bar progress style
pub(super) fn create_bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░  ")
}

/// One bar (known length) or spinner per stage
pub(super) struct TerminalProgress {
    multi: MultiProgress,
    current: Mutex<Option<ProgressBar>>,
    bar_style: ProgressStyle,
    spinner_style: ProgressStyle,
}

impl TerminalProgress {
    pub(super) fn new(quiet: bool) -> Self {
        let multi = if quiet {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        } else {
            MultiProgress::new()
        };
        Self {
            multi,
            current: Mutex::new(None),
            bar_style: create_bar_style(),
            spinner_style: create_spinner_style(),
        }
    }
}

impl StageObserver for TerminalProgress {
    fn begin(&self, stage: Stage, total: u64) {
        let bar = if total > 0 {
            let bar = self.multi.add(ProgressBar::new(total));
            bar.set_style(self.bar_style.clone());
            bar
        } else {
            let spinner = self.multi.add(ProgressBar::new_spinner());
            spinner.set_style(self.spinner_style.clone());
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner
        };
        bar.set_message(format!("{}...", stage));
        if let Ok(mut current) = self.current.lock() {
            *current = Some(bar);
        }
    }

    fn advance(&self) {
        if let Ok(current) = self.current.lock() {
            if let Some(bar) = current.as_ref() {
                bar.inc(1);
            }
        }
    }

    fn finish(&self, stage: Stage, summary: &str) {
        if let Ok(mut current) = self.current.lock() {
            if let Some(bar) = current.take() {
                bar.finish_with_message(format!("{}{}: {}", style("✓ ").green(), stage, summary));
            }
        }
    }
}
