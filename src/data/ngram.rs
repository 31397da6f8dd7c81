// ============================================================
// Layer 4 — N-Gram Extraction
// ============================================================
// Turns raw text into a SET of token strings. Which tokens a text
// produces is a strategy choice:
//
//   NGramKind::Unigram          "Buy it now"  → {buy, it, now}
//   NGramKind::FilteredUnigram  "Buy it now"  → {buy, now}
//   NGramKind::FilteredBigram   "Buy it now"  → {buy, now, buy now}
//   NGramKind::CharTrigram      "refund"      → {ref, efu, fun, und}
//
// The kind is part of the saved classifier config, so a model is
// always queried with the same strategy it was trained with.
//
// Why a set and not a list?
//   The vectorizer only records whether a token is present, not how
//   often. "buy buy buy" and "buy" produce the same input row, and
//   the order of words never matters.
//
// Why filter short words?
//   Words of one or two letters ("a", "to", "my") show up in nearly
//   every call regardless of its category. They add input neurons
//   without helping the network separate values.
//
// Why character trigrams?
//   Call transcripts are full of typos and inflections ("refund",
//   "refunded", "refnd"). Trigrams let those share most of their
//   coordinates, at the cost of a much larger vocabulary.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::preprocessor::Preprocessor;

/// Words shorter than this carry little signal ("a", "to", "my").
pub const MIN_SIGNIFICANT_WORD_LEN: usize = 3;

// ─── Strategy trait ───────────────────────────────────────────────────────────
/// A pluggable text → token-set extractor.
///
/// Implementations must be deterministic: the same text always yields
/// the same set, or a restored model would see different inputs.
pub trait NGramStrategy: Send + Sync + fmt::Debug {
    /// Normalise `text` and return its distinct tokens.
    fn extract(&self, text: &str) -> HashSet<String>;

    /// The configuration value that selects this strategy.
    fn kind(&self) -> NGramKind;
}

// ─── Unigram ──────────────────────────────────────────────────────────────────
/// Every normalised word.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unigram;

impl NGramStrategy for Unigram {
    fn extract(&self, text: &str) -> HashSet<String> {
        Preprocessor::new().words(text).into_iter().collect()
    }

    fn kind(&self) -> NGramKind {
        NGramKind::Unigram
    }
}

// ─── FilteredUnigram ──────────────────────────────────────────────────────────
/// Normalised words of at least `min_len` characters.
#[derive(Debug, Clone, Copy)]
pub struct FilteredUnigram {
    /// Shortest word kept, counted in characters (not bytes)
    min_len: usize,
}

impl FilteredUnigram {
    pub fn new(min_len: usize) -> Self {
        Self { min_len }
    }

    fn significant_words(&self, text: &str) -> Vec<String> {
        Preprocessor::new()
            .words(text)
            .into_iter()
            .filter(|w| w.chars().count() >= self.min_len)
            .collect()
    }
}

impl Default for FilteredUnigram {
    fn default() -> Self {
        Self::new(MIN_SIGNIFICANT_WORD_LEN)
    }
}

impl NGramStrategy for FilteredUnigram {
    fn extract(&self, text: &str) -> HashSet<String> {
        self.significant_words(text).into_iter().collect()
    }

    fn kind(&self) -> NGramKind {
        NGramKind::FilteredUnigram
    }
}

// ─── FilteredBigram ───────────────────────────────────────────────────────────
/// Filtered unigrams plus every adjacent pair of them, joined by a space.
#[derive(Debug, Default, Clone, Copy)]
pub struct FilteredBigram {
    words: FilteredUnigram,
}

impl NGramStrategy for FilteredBigram {
    fn extract(&self, text: &str) -> HashSet<String> {
        let words = self.words.significant_words(text);
        let pairs = words.windows(2).map(|pair| pair.join(" "));

        let mut tokens: HashSet<String> = pairs.collect();
        tokens.extend(words);
        tokens
    }

    fn kind(&self) -> NGramKind {
        NGramKind::FilteredBigram
    }
}

// ─── CharNGram ────────────────────────────────────────────────────────────────
/// Character n-grams taken inside each normalised word. Words shorter
/// than `n` contribute themselves whole.
#[derive(Debug, Clone, Copy)]
pub struct CharNGram {
    n: usize,
}

impl CharNGram {
    pub fn new(n: usize) -> Self {
        Self { n: n.max(1) }
    }
}

impl NGramStrategy for CharNGram {
    fn extract(&self, text: &str) -> HashSet<String> {
        let mut tokens = HashSet::new();

        for word in Preprocessor::new().words(text) {
            let chars: Vec<char> = word.chars().collect();
            if chars.len() <= self.n {
                tokens.insert(word);
                continue;
            }
            for window in chars.windows(self.n) {
                tokens.insert(window.iter().collect());
            }
        }

        tokens
    }

    fn kind(&self) -> NGramKind {
        NGramKind::CharTrigram
    }
}

// ─── NGramKind ────────────────────────────────────────────────────────────────
/// Configuration-level selector for a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NGramKind {
    Unigram,
    #[default]
    FilteredUnigram,
    FilteredBigram,
    CharTrigram,
}

impl NGramKind {
    pub fn strategy(self) -> Box<dyn NGramStrategy> {
        match self {
            NGramKind::Unigram         => Box::new(Unigram),
            NGramKind::FilteredUnigram => Box::new(FilteredUnigram::default()),
            NGramKind::FilteredBigram  => Box::new(FilteredBigram::default()),
            NGramKind::CharTrigram     => Box::new(CharNGram::new(3)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NGramKind::Unigram         => "unigram",
            NGramKind::FilteredUnigram => "filtered-unigram",
            NGramKind::FilteredBigram  => "filtered-bigram",
            NGramKind::CharTrigram     => "char-trigram",
        }
    }
}

impl fmt::Display for NGramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NGramKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unigram"          => Ok(NGramKind::Unigram),
            "filtered-unigram" => Ok(NGramKind::FilteredUnigram),
            "filtered-bigram"  => Ok(NGramKind::FilteredBigram),
            "char-trigram"     => Ok(NGramKind::CharTrigram),
            other => Err(format!(
                "unknown n-gram kind '{other}' \
                 (expected unigram, filtered-unigram, filtered-bigram or char-trigram)"
            )),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_unigram_collapses_duplicates() {
        assert_eq!(Unigram.extract("Buy, buy BUY it"), set(&["buy", "it"]));
    }

    #[test]
    fn test_filtered_unigram_drops_short_words() {
        let tokens = FilteredUnigram::default().extract("I want to buy");
        assert_eq!(tokens, set(&["want", "buy"]));
    }

    #[test]
    fn test_filtered_bigram_adds_adjacent_pairs() {
        let tokens = FilteredBigram::default().extract("cancel my refund today");
        assert_eq!(
            tokens,
            set(&["cancel", "refund", "today", "cancel refund", "refund today"])
        );
    }

    #[test]
    fn test_char_ngram_windows_inside_words() {
        let tokens = CharNGram::new(3).extract("refund go");
        assert_eq!(tokens, set(&["ref", "efu", "fun", "und", "go"]));
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [
            NGramKind::Unigram,
            NGramKind::FilteredUnigram,
            NGramKind::FilteredBigram,
            NGramKind::CharTrigram,
        ] {
            assert_eq!(kind.as_str().parse::<NGramKind>(), Ok(kind));
            assert_eq!(kind.strategy().kind(), kind);
        }
        assert!("trigram".parse::<NGramKind>().is_err());
    }
}
