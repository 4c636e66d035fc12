//! Article body cleanup
//!
//! Removes in-text citations in parentheses or square brackets and all digits,
//! then drops the single-character leftovers (a lone `.` or `-` between two
//! spaces) and collapses doubled spaces.
//!
//! Parenthesis and bracket matching is non-greedy and not nesting-aware:
//! `(a (b) c)` leaves ` c)` behind. This mirrors the reference corpus
//! preparation and is kept as a known limitation.

use regex::Regex;
use std::sync::OnceLock;

static PARENTHESIZED: OnceLock<Regex> = OnceLock::new();
static BRACKETED: OnceLock<Regex> = OnceLock::new();
static DIGITS: OnceLock<Regex> = OnceLock::new();

fn parenthesized() -> &'static Regex {
    PARENTHESIZED.get_or_init(|| Regex::new(r"(?s)\(.*?\)").expect("valid regex"))
}

fn bracketed() -> &'static Regex {
    BRACKETED.get_or_init(|| Regex::new(r"(?s)\[.*?\]").expect("valid regex"))
}

fn digits() -> &'static Regex {
    DIGITS.get_or_init(|| Regex::new(r"\d").expect("valid regex"))
}

/// Clean a raw article body.
///
/// Text without parentheses, brackets or digits is returned unchanged, so the
/// function is idempotent.
pub fn normalize(text: &str) -> String {
    let touched = parenthesized().is_match(text)
        || bracketed().is_match(text)
        || digits().is_match(text);
    if !touched {
        return text.to_string();
    }

    let text = parenthesized().replace_all(text, "");
    let text = bracketed().replace_all(&text, "");
    let text = digits().replace_all(&text, "");

    text.lines()
        .map(squeeze_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse space runs and drop orphaned one-character punctuation tokens
fn squeeze_line(line: &str) -> String {
    line.split(' ')
        .filter(|tok| !tok.is_empty() && !is_orphan(tok))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_orphan(tok: &str) -> bool {
    let mut chars = tok.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => !c.is_alphanumeric(),
        _ => false,
    }
}
