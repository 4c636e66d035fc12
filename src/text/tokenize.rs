//! Word tokenization, stop-word removal and Snowball stemming
//!
//! The tokenizer holds no mutable state, so one instance is shared by
//! reference across rayon workers and every call to [`Tokenizer::tokens`]
//! starts a fresh pass.
//!
//! Besides stop words, tokens with no alphabetic character and tokens shorter
//! than the minimum length (2 by default) are dropped. Per-year and
//! per-article word totals count only the tokens that pass all three checks;
//! `with_min_chars(1)` keeps single-letter words in those totals.

use rust_stemmers::{Algorithm, Stemmer};
use rustc_hash::FxHashSet;
use unicode_segmentation::UnicodeSegmentation;

/// One word occurrence: the lower-cased surface form and its stem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub surface: String,
    pub stem: String,
}

/// Default minimum token length in chars
const DEFAULT_MIN_CHARS: usize = 2;

pub struct Tokenizer {
    stop_words: FxHashSet<String>,
    stemmer: Stemmer,
    min_chars: usize,
}

impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer")
            .field("stop_words_count", &self.stop_words.len())
            .field("min_chars", &self.min_chars)
            .finish()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::english(std::iter::empty::<String>())
    }
}

impl Tokenizer {
    /// Built-in English stop words plus `extra`
    pub fn english<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let builtin = stop_words::get(stop_words::LANGUAGE::English);
        let words = builtin
            .iter()
            .map(|w| w.to_string())
            .chain(extra.into_iter().map(|w| w.as_ref().to_string()));
        Self::with_stop_words(words)
    }

    /// Only the given stop words (matched case-insensitively)
    pub fn with_stop_words<I, S>(stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stop_words: stop_words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
            stemmer: Stemmer::create(Algorithm::English),
            min_chars: DEFAULT_MIN_CHARS,
        }
    }

    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars.max(1);
        self
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(&word.to_lowercase())
    }

    /// Stem a single word (lower-cased first)
    pub fn stem(&self, word: &str) -> String {
        self.stemmer.stem(&word.to_lowercase()).into_owned()
    }

    /// Lazily tokenize `text` into (surface, stem) pairs
    pub fn tokens<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Token> + 'a {
        text.unicode_words().filter_map(move |word| {
            let surface = word.to_lowercase();
            if surface.chars().count() < self.min_chars
                || !surface.chars().any(char::is_alphabetic)
                || self.stop_words.contains(&surface)
            {
                return None;
            }
            let stem = self.stemmer.stem(&surface).into_owned();
            Some(Token { surface, stem })
        })
    }

    /// Stems only, for callers that do not need surface forms
    pub fn stems<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        self.tokens(text).map(|t| t.stem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Tokenizer {
        Tokenizer::with_stop_words(["the", "and", "of", "a", "were"])
    }

    #[test]
    fn test_lowercases_and_removes_stop_words() {
        let tok = small();
        let surfaces: Vec<String> = tok
            .tokens("The Results and THE methods of a study")
            .map(|t| t.surface)
            .collect();
        assert_eq!(surfaces, vec!["results", "methods", "study"]);
    }

    #[test]
    fn test_stop_words_case_insensitive() {
        let tok = Tokenizer::with_stop_words(["ET", "Al"]);
        assert!(tok.is_stop_word("et"));
        assert!(tok.is_stop_word("AL"));
        assert_eq!(tok.tokens("Smith et al").count(), 1);
    }

    #[test]
    fn test_stemming_is_many_to_one() {
        let tok = small();
        assert_eq!(tok.stem("discordant"), tok.stem("discordance"));
        assert_eq!(tok.stem("discordant"), "discord");
        assert_eq!(tok.stem("sequences"), tok.stem("sequencing"));
    }

    #[test]
    fn test_stemming_is_deterministic() {
        let tok = small();
        let first = tok.stem("phylogenetic");
        let second = tok.stem("phylogenetic");
        assert_eq!(first, second);
    }

    #[test]
    fn test_min_chars_and_non_alphabetic() {
        let tok = small().with_min_chars(3);
        let surfaces: Vec<String> = tok.tokens("an ox ran to the barn").map(|t| t.surface).collect();
        assert_eq!(surfaces, vec!["ran", "barn"]);

        let tok = small();
        assert_eq!(tok.tokens("x y z").count(), 0);
        assert_eq!(tok.with_min_chars(1).tokens("x y z 42").count(), 3);
    }

    #[test]
    fn test_restartable() {
        let tok = small();
        let text = "ancient genomes were sequenced";
        let first: Vec<Token> = tok.tokens(text).collect();
        let second: Vec<Token> = tok.tokens(text).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_default_list_removes_common_words() {
        let tok = Tokenizer::default();
        assert!(tok.is_stop_word("the"));
        assert!(tok.is_stop_word("and"));
        assert!(tok.tokens("the and of").next().is_none());
    }

    #[test]
    fn test_extra_stop_words() {
        let tok = Tokenizer::english(["lineage"]);
        assert!(tok.is_stop_word("lineage"));
    }
}
