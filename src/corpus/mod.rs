//! Article corpus: data model, snapshot loading and ingestion validation
//!
//! Scrapers hand over a serialized snapshot (JSON array or JSON Lines) of
//! article records. Ingestion applies the exception list, validates each
//! record, normalizes its body and drops whatever fails. Dropped records are
//! reported as [`IngestionIssue`]s and never abort the run.

mod exceptions;

pub use exceptions::{Applied, ExceptionAction, ExceptionEntry, ExceptionList};

use crate::error::{LexError, LexResult};
use crate::text::normalize;
use chrono::Datelike;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// A single ingested article. Immutable once part of a [`Corpus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Stable link or DOI
    pub id: String,
    pub year: i32,
    pub journal: String,
    pub title: String,
    /// Main text only, already normalized
    pub body: String,
}

/// Record as produced by a scraper, before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawArticle {
    #[serde(default, alias = "link", alias = "doi")]
    pub id: Option<String>,
    /// Number or numeric string
    #[serde(default)]
    pub year: Option<serde_json::Value>,
    #[serde(default)]
    pub journal: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "text")]
    pub body: Option<String>,
}

/// Why a record was dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IngestionReason {
    Unparsable { message: String },
    MissingId,
    EmptyBody,
    EmptyAfterNormalization,
    InvalidYear { value: String },
    OutOfWindow { year: i32 },
    DuplicateId,
    Excluded { reason: String },
}

impl std::fmt::Display for IngestionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestionReason::Unparsable { message } => write!(f, "unparsable record: {}", message),
            IngestionReason::MissingId => write!(f, "missing id"),
            IngestionReason::EmptyBody => write!(f, "empty body"),
            IngestionReason::EmptyAfterNormalization => write!(f, "body empty after normalization"),
            IngestionReason::InvalidYear { value } => write!(f, "invalid year '{}'", value),
            IngestionReason::OutOfWindow { year } => write!(f, "year {} outside analysis window", year),
            IngestionReason::DuplicateId => write!(f, "duplicate id"),
            IngestionReason::Excluded { reason } => write!(f, "excluded: {}", reason),
        }
    }
}

/// A dropped record
#[derive(Debug, Clone, Serialize)]
pub struct IngestionIssue {
    /// Position in the snapshot (line number - 1 for JSON Lines)
    pub index: usize,
    pub id: Option<String>,
    pub reason: IngestionReason,
}

/// Ingestion settings
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub min_year: i32,
    pub max_year: i32,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            min_year: 1900,
            max_year: chrono::Utc::now().year(),
        }
    }
}

impl IngestOptions {
    pub fn new(min_year: i32, max_year: Option<i32>) -> Self {
        Self {
            min_year,
            max_year: max_year.unwrap_or_else(|| chrono::Utc::now().year()),
        }
    }
}

/// Ordered, validated article collection.
///
/// Invariants: every article has a non-empty body, a unique id and a year
/// within the ingestion window; articles are sorted by (year, id).
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    articles: Vec<Article>,
}

impl Corpus {
    /// Build a corpus from already-valid articles (sorted on construction).
    ///
    /// Bodies are taken as-is; use [`Corpus::ingest`] for untrusted input.
    pub fn from_articles(mut articles: Vec<Article>) -> Self {
        articles.sort_by(|a, b| a.year.cmp(&b.year).then_with(|| a.id.cmp(&b.id)));
        Self { articles }
    }

    /// Validate and normalize raw records.
    ///
    /// Returns the corpus together with one issue per dropped record.
    pub fn ingest(
        records: Vec<RawArticle>,
        options: &IngestOptions,
        exceptions: &ExceptionList,
    ) -> (Corpus, Vec<IngestionIssue>) {
        let mut issues = Vec::new();
        let mut articles = Vec::with_capacity(records.len());
        let mut seen_ids: FxHashSet<String> = FxHashSet::default();
        let mut matched_exceptions: FxHashSet<String> = FxHashSet::default();

        for (index, record) in records.into_iter().enumerate() {
            let id = record.id.clone();
            let record = match exceptions.apply(record, &mut matched_exceptions) {
                Applied::Keep(r) => r,
                Applied::Excluded { reason } => {
                    issues.push(IngestionIssue {
                        index,
                        id,
                        reason: IngestionReason::Excluded { reason },
                    });
                    continue;
                }
            };

            match validate_record(record, options) {
                Ok(article) => {
                    if !seen_ids.insert(article.id.clone()) {
                        issues.push(IngestionIssue {
                            index,
                            id,
                            reason: IngestionReason::DuplicateId,
                        });
                        continue;
                    }
                    articles.push(article);
                }
                Err(reason) => issues.push(IngestionIssue { index, id, reason }),
            }
        }

        exceptions.report_unmatched(&matched_exceptions);

        for issue in &issues {
            warn!(
                "Dropped record #{} ({}): {}",
                issue.index,
                issue.id.as_deref().unwrap_or("<no id>"),
                issue.reason
            );
        }

        let corpus = Corpus::from_articles(articles);
        info!(
            "Ingested {} articles ({} dropped) spanning {} years",
            corpus.len(),
            issues.len(),
            corpus.years().len()
        );
        (corpus, issues)
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn get(&self, index: usize) -> Option<&Article> {
        self.articles.get(index)
    }

    /// Distinct publication years, ascending
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.articles.iter().map(|a| a.year).collect();
        years.dedup();
        years
    }

    /// Number of articles per journal, sorted by journal name
    pub fn journal_counts(&self) -> Vec<(String, usize)> {
        let mut counts: std::collections::BTreeMap<&str, usize> = Default::default();
        for article in &self.articles {
            *counts.entry(article.journal.as_str()).or_insert(0) += 1;
        }
        counts.into_iter().map(|(j, c)| (j.to_string(), c)).collect()
    }
}

/// Turn a raw record into an article, or say why it cannot be one
fn validate_record(record: RawArticle, options: &IngestOptions) -> Result<Article, IngestionReason> {
    let id = match record.id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return Err(IngestionReason::MissingId),
    };

    let year = parse_year(record.year.as_ref())?;
    if year < options.min_year || year > options.max_year {
        return Err(IngestionReason::OutOfWindow { year });
    }

    let body = record.body.unwrap_or_default();
    if body.trim().is_empty() {
        return Err(IngestionReason::EmptyBody);
    }
    let body = normalize(&body);
    if body.trim().is_empty() {
        return Err(IngestionReason::EmptyAfterNormalization);
    }

    Ok(Article {
        id,
        year,
        journal: record.journal.unwrap_or_default().trim().to_string(),
        title: record.title.unwrap_or_default().trim().to_string(),
        body,
    })
}

/// Accept `2011` or `"2011"`; anything that is not a 4-digit year is invalid
fn parse_year(value: Option<&serde_json::Value>) -> Result<i32, IngestionReason> {
    let invalid = |v: String| Err(IngestionReason::InvalidYear { value: v });
    let year = match value {
        Some(serde_json::Value::Number(n)) => match n.as_i64() {
            Some(y) => y,
            None => return invalid(n.to_string()),
        },
        Some(serde_json::Value::String(s)) => match s.trim().parse::<i64>() {
            Ok(y) => y,
            Err(_) => return invalid(s.clone()),
        },
        Some(other) => return invalid(other.to_string()),
        None => return invalid(String::new()),
    };
    if !(1000..=9999).contains(&year) {
        return invalid(year.to_string());
    }
    Ok(year as i32)
}

/// Load raw records from a snapshot file.
///
/// `.jsonl` / `.ndjson` files are read line by line and unparsable lines are
/// reported as issues; anything else must be a single JSON array whose
/// elements that fail to parse are reported the same way.
pub fn load_snapshot(path: &Path) -> LexResult<(Vec<RawArticle>, Vec<IngestionIssue>)> {
    let content = std::fs::read_to_string(path)?;
    let is_lines = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("jsonl") || e.eq_ignore_ascii_case("ndjson"))
        .unwrap_or(false);

    if is_lines {
        return Ok(parse_json_lines(&content));
    }

    // Only a non-array document is fatal; bad elements are dropped one by one
    let values: Vec<serde_json::Value> = serde_json::from_str(&content).map_err(LexError::from)?;
    let (records, issues) = parse_json_array(values);
    debug!(
        "Loaded {} records from {} ({} unparsable)",
        records.len(),
        path.display(),
        issues.len()
    );
    Ok((records, issues))
}

fn parse_json_array(values: Vec<serde_json::Value>) -> (Vec<RawArticle>, Vec<IngestionIssue>) {
    let mut records = Vec::with_capacity(values.len());
    let mut issues = Vec::new();
    for (index, value) in values.into_iter().enumerate() {
        let id = ["id", "link", "doi"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
            .map(|s| s.trim().to_string());
        match serde_json::from_value::<RawArticle>(value) {
            Ok(r) => records.push(r),
            Err(e) => issues.push(IngestionIssue {
                index,
                id,
                reason: IngestionReason::Unparsable {
                    message: e.to_string(),
                },
            }),
        }
    }
    (records, issues)
}

fn parse_json_lines(content: &str) -> (Vec<RawArticle>, Vec<IngestionIssue>) {
    let mut records = Vec::new();
    let mut issues = Vec::new();
    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<RawArticle>(line) {
            Ok(r) => records.push(r),
            Err(e) => issues.push(IngestionIssue {
                index,
                id: None,
                reason: IngestionReason::Unparsable {
                    message: e.to_string(),
                },
            }),
        }
    }
    (records, issues)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, year: serde_json::Value, body: &str) -> RawArticle {
        RawArticle {
            id: Some(id.to_string()),
            year: Some(year),
            journal: Some("Journal".into()),
            title: Some("Title".into()),
            body: Some(body.to_string()),
        }
    }

    fn options() -> IngestOptions {
        IngestOptions::new(1900, Some(2030))
    }

    #[test]
    fn test_ingest_drops_invalid_records() {
        let records = vec![
            raw("a", 2010.into(), "valid text here"),
            raw("b", 1850.into(), "too old"),
            raw("c", "20x1".into(), "bad year"),
            raw("d", 2011.into(), "   "),
            raw("a", 2012.into(), "duplicate id"),
            RawArticle {
                id: None,
                year: Some(2010.into()),
                body: Some("no id".into()),
                ..Default::default()
            },
        ];
        let (corpus, issues) = Corpus::ingest(records, &options(), &ExceptionList::default());
        assert_eq!(corpus.len(), 1);
        assert_eq!(issues.len(), 5);
        assert_eq!(issues[0].reason, IngestionReason::OutOfWindow { year: 1850 });
        assert!(matches!(issues[1].reason, IngestionReason::InvalidYear { .. }));
        assert_eq!(issues[2].reason, IngestionReason::EmptyBody);
        assert_eq!(issues[3].reason, IngestionReason::DuplicateId);
        assert_eq!(issues[4].reason, IngestionReason::MissingId);
    }

    #[test]
    fn test_year_accepts_numeric_string() {
        let (corpus, issues) = Corpus::ingest(
            vec![raw("a", "2015".into(), "some words")],
            &options(),
            &ExceptionList::default(),
        );
        assert!(issues.is_empty());
        assert_eq!(corpus.articles()[0].year, 2015);
    }

    #[test]
    fn test_body_is_normalized_on_ingest() {
        let (corpus, _) = Corpus::ingest(
            vec![raw("a", 2015.into(), "shown before (Smith 2001) in 42 cases")],
            &options(),
            &ExceptionList::default(),
        );
        assert_eq!(corpus.articles()[0].body, "shown before in cases");
    }

    #[test]
    fn test_body_empty_after_normalization() {
        let (corpus, issues) = Corpus::ingest(
            vec![raw("a", 2015.into(), "(1) [2] 345")],
            &options(),
            &ExceptionList::default(),
        );
        assert!(corpus.is_empty());
        assert_eq!(issues[0].reason, IngestionReason::EmptyAfterNormalization);
    }

    #[test]
    fn test_corpus_sorted_by_year_then_id() {
        let (corpus, _) = Corpus::ingest(
            vec![
                raw("z", 2012.into(), "text"),
                raw("b", 2010.into(), "text"),
                raw("a", 2012.into(), "text"),
            ],
            &options(),
            &ExceptionList::default(),
        );
        let ids: Vec<&str> = corpus.articles().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "z"]);
        assert_eq!(corpus.years(), vec![2010, 2012]);
    }

    #[test]
    fn test_exception_list_applied_before_validation() {
        let exceptions = ExceptionList::new(&[
            ExceptionEntry {
                id: "old".into(),
                action: ExceptionAction::Year,
                year: Some(2001),
                reason: "scraper picked up reprint year".into(),
            },
            ExceptionEntry {
                id: "erratum".into(),
                action: ExceptionAction::Exclude,
                year: None,
                reason: "erratum".into(),
            },
        ])
        .unwrap();
        let (corpus, issues) = Corpus::ingest(
            vec![
                raw("old", 1801.into(), "text"),
                raw("erratum", 2001.into(), "text"),
            ],
            &options(),
            &exceptions,
        );
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.articles()[0].year, 2001);
        assert_eq!(
            issues[0].reason,
            IngestionReason::Excluded {
                reason: "erratum".into()
            }
        );
    }

    #[test]
    fn test_load_snapshot_json_and_jsonl() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("corpus.json");
        std::fs::write(
            &json_path,
            r#"[{"link": "x", "year": 2001, "journal": "J", "title": "T", "body": "b"}]"#,
        )
        .unwrap();
        let (records, issues) = load_snapshot(&json_path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_deref(), Some("x"));
        assert!(issues.is_empty());

        let jsonl_path = dir.path().join("corpus.jsonl");
        std::fs::write(
            &jsonl_path,
            "{\"id\": \"x\", \"year\": 2001, \"body\": \"b\"}\nnot json\n\n{\"id\": \"y\", \"year\": \"2002\", \"body\": \"c\"}\n",
        )
        .unwrap();
        let (records, issues) = load_snapshot(&jsonl_path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].index, 1);
    }

    #[test]
    fn test_load_snapshot_json_array_drops_bad_element() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");
        std::fs::write(
            &path,
            r#"[{"id":"a","year":2001,"body":"good text"},{"id":"b","year":2002,"body":42},7]"#,
        )
        .unwrap();
        let (records, issues) = load_snapshot(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_deref(), Some("a"));
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].index, 1);
        assert_eq!(issues[0].id.as_deref(), Some("b"));
        assert!(matches!(issues[0].reason, IngestionReason::Unparsable { .. }));
        assert_eq!(issues[1].index, 2);
        assert_eq!(issues[1].id, None);
    }

    #[test]
    fn test_load_snapshot_rejects_malformed_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");
        std::fs::write(&path, "{ not an array").unwrap();
        assert!(matches!(load_snapshot(&path), Err(LexError::Json(_))));
    }

    #[test]
    fn test_journal_counts() {
        let corpus = Corpus::from_articles(vec![
            Article {
                id: "1".into(),
                year: 2000,
                journal: "B".into(),
                title: String::new(),
                body: "x".into(),
            },
            Article {
                id: "2".into(),
                year: 2000,
                journal: "A".into(),
                title: String::new(),
                body: "x".into(),
            },
            Article {
                id: "3".into(),
                year: 2001,
                journal: "A".into(),
                title: String::new(),
                body: "x".into(),
            },
        ]);
        assert_eq!(
            corpus.journal_counts(),
            vec![("A".to_string(), 2), ("B".to_string(), 1)]
        );
    }
}
