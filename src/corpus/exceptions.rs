//! Declarative per-article exceptions
//!
//! Journals occasionally publish records that break the ingestion contract:
//! errata indexed as articles, issue years that differ from the online date.
//! Instead of patching records by position, each fix is listed in config
//! against the article's stable id together with a `reason` tag.

use super::RawArticle;
use crate::error::{LexError, LexResult};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionAction {
    /// Drop the record before validation
    Exclude,
    /// Replace the record's year with `year`
    Year,
}

/// One `[[exceptions]]` entry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExceptionEntry {
    pub id: String,
    pub action: ExceptionAction,
    #[serde(default)]
    pub year: Option<i32>,
    /// Justification tag, carried into diagnostics
    pub reason: String,
}

/// Outcome of looking a record up in the exception list
#[derive(Debug)]
pub enum Applied {
    Keep(RawArticle),
    Excluded { reason: String },
}

/// Exception entries indexed by article id
#[derive(Debug, Default)]
pub struct ExceptionList {
    entries: FxHashMap<String, ExceptionEntry>,
}

impl ExceptionList {
    pub fn new(entries: &[ExceptionEntry]) -> LexResult<Self> {
        let mut map = FxHashMap::default();
        for entry in entries {
            if entry.action == ExceptionAction::Year && entry.year.is_none() {
                return Err(LexError::InvalidConfig(format!(
                    "exception for '{}' has action \"year\" but no year",
                    entry.id
                )));
            }
            if map.insert(entry.id.trim().to_string(), entry.clone()).is_some() {
                return Err(LexError::InvalidConfig(format!(
                    "duplicate exception entry for '{}'",
                    entry.id
                )));
            }
        }
        Ok(Self { entries: map })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply the matching entry, if any, and record the id as seen.
    ///
    /// Ids are compared after trimming, as validation stores them trimmed.
    pub fn apply(&self, mut record: RawArticle, seen: &mut FxHashSet<String>) -> Applied {
        let Some(id) = record.id.as_deref().map(str::trim) else {
            return Applied::Keep(record);
        };
        let Some((key, entry)) = self.entries.get_key_value(id) else {
            return Applied::Keep(record);
        };
        seen.insert(key.clone());

        match entry.action {
            ExceptionAction::Exclude => Applied::Excluded {
                reason: entry.reason.clone(),
            },
            ExceptionAction::Year => {
                record.year = entry.year.map(serde_json::Value::from);
                Applied::Keep(record)
            }
        }
    }

    /// Warn about entries that matched no record
    pub fn report_unmatched(&self, seen: &FxHashSet<String>) {
        let mut unmatched: Vec<&str> = self
            .entries
            .keys()
            .filter(|id| !seen.contains(*id))
            .map(String::as_str)
            .collect();
        unmatched.sort_unstable();
        for id in unmatched {
            warn!("Exception entry '{}' matched no article", id);
        }
    }
}
