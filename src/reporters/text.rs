//! Text (terminal) summary of an analysis

use crate::pipeline::Analysis;
use anyhow::Result;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";

/// Number of surface forms listed per stem
const FORMS_SHOWN: usize = 3;

/// Render the top `limit` significant stems plus corpus and diagnostics counts
pub fn render(analysis: &Analysis, limit: usize) -> Result<String> {
    let d = &analysis.diagnostics;
    let mut out = String::new();

    out.push_str(&format!("\n{BOLD}lexdrift trend analysis{RESET}\n"));
    out.push_str(&format!("{DIM}──────────────────────────────────────{RESET}\n"));
    let span = match (d.years.first(), d.years.last()) {
        (Some(first), Some(last)) => format!("{}-{}", first, last),
        _ => "-".to_string(),
    };
    out.push_str(&format!(
        "Articles: {}  Years: {} ({})  Stems: {} -> {} prevalent\n",
        d.articles,
        d.years.len(),
        span,
        d.vocabulary_size,
        d.eligible_stems
    ));
    out.push_str(&format!(
        "Thresholds: >= {} years, >= {} articles  Alpha: {}  Unit: {}\n\n",
        d.thresholds.min_years, d.thresholds.min_articles, d.alpha, d.unit
    ));

    out.push_str(&format!(
        "{BOLD}TRENDING STEMS{RESET} ({} significant of {} tested)\n",
        d.significant_stems, d.tested_stems
    ));
    out.push_str(&format!(
        "{DIM}  #   STEM              RHO     ADJ P      MEAN SE    FORMS{RESET}\n"
    ));
    out.push_str(&format!(
        "{DIM}  ─────────────────────────────────────────────────────────────────{RESET}\n"
    ));

    for (i, result) in analysis.significant().take(limit).enumerate() {
        let mean_se = if result.standard_error_per_year.is_empty() {
            0.0
        } else {
            result.standard_error_per_year.iter().sum::<f64>() / result.standard_error_per_year.len() as f64
        };
        let forms = analysis
            .inflections_for(&result.stem)
            .map(|t| {
                t.forms
                    .iter()
                    .take(FORMS_SHOWN)
                    .map(|(form, count)| format!("{} ({})", form, count))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();

        let stem: String = result.stem.chars().take(16).collect();
        out.push_str(&format!(
            "  {:<3} {GREEN}{:<16}{RESET} {:>6.3}  {:<9.2e}  {:<9.2e}  {DIM}{}{RESET}\n",
            i + 1,
            stem,
            result.correlation,
            result.adjusted_p_value,
            mean_se,
            forms
        ));
    }

    let remaining = d.significant_stems.saturating_sub(limit);
    if remaining > 0 {
        out.push_str(&format!("{DIM}  ... and {} more{RESET}\n", remaining));
    }

    if !d.dropped_records.is_empty() || !d.untestable_stems.is_empty() {
        out.push('\n');
        out.push_str(&format!(
            "{YELLOW}{} records dropped at ingestion, {} stems untestable{RESET}\n",
            d.dropped_records.len(),
            d.untestable_stems.len()
        ));
    }

    Ok(out)
}
