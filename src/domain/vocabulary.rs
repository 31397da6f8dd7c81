// ============================================================
// Layer 3 — Vocabulary
// ============================================================
// The fixed, ordered set of words a recognizer understands.
// Each word's id is its 1-based coordinate in the input vector,
// so a vocabulary of N words always yields vectors of length N.
//
// Lookups go by text, never by id. A vocabulary is built once
// and shared read-only (Arc<Vocabulary>) by every recognizer.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::error::{ClassifierError, Result};

/// A known word and its vector coordinate (1-based).
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct VocabularyWord {
    pub id:   u32,
    pub text: String,
}

impl VocabularyWord {
    pub fn new(id: u32, text: impl Into<String>) -> Self {
        Self { id, text: text.into() }
    }
}

// Identity is the text content, not the id.
impl PartialEq for VocabularyWord {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl std::hash::Hash for VocabularyWord {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

/// Ordered word list with a text → position index.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    words: Vec<VocabularyWord>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from words that already carry ids.
    ///
    /// Ids must be unique and cover `1..=words.len()`, and texts must be
    /// unique, otherwise vector coordinates would collide or overflow.
    pub fn new(words: Vec<VocabularyWord>) -> Result<Self> {
        let size = words.len();
        let mut seen_ids = HashSet::with_capacity(size);
        let mut index    = HashMap::with_capacity(size);

        for (pos, word) in words.iter().enumerate() {
            if word.id == 0 || word.id as usize > size {
                return Err(ClassifierError::InvalidArgument(format!(
                    "vocabulary word '{}' has id {} outside 1..={}",
                    word.text, word.id, size
                )));
            }
            if !seen_ids.insert(word.id) {
                return Err(ClassifierError::InvalidArgument(format!(
                    "duplicate vocabulary id {}", word.id
                )));
            }
            if index.insert(word.text.clone(), pos).is_some() {
                return Err(ClassifierError::InvalidArgument(format!(
                    "duplicate vocabulary word '{}'", word.text
                )));
            }
        }

        Ok(Self { words, index })
    }

    /// Assign ids 1..N in iteration order.
    pub fn from_texts<I, S>(texts: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| VocabularyWord::new(i as u32 + 1, text))
            .collect();
        Self::new(words)
    }

    pub fn get(&self, text: &str) -> Option<&VocabularyWord> {
        self.index.get(text).map(|&pos| &self.words[pos])
    }

    pub fn contains(&self, text: &str) -> bool {
        self.index.contains_key(text)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[VocabularyWord] {
        &self.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_by_text() {
        let v = Vocabulary::new(vec![
            VocabularyWord::new(2, "cancel"),
            VocabularyWord::new(1, "buy"),
        ])
        .unwrap();
        assert_eq!(v.get("buy").map(|w| w.id), Some(1));
        assert_eq!(v.get("cancel").map(|w| w.id), Some(2));
        assert!(v.get("refund").is_none());
    }

    #[test]
    fn test_words_equal_by_text_only() {
        assert_eq!(VocabularyWord::new(1, "buy"), VocabularyWord::new(7, "buy"));
        assert_ne!(VocabularyWord::new(1, "buy"), VocabularyWord::new(1, "sell"));
    }

    #[test]
    fn test_rejects_out_of_range_id() {
        let err = Vocabulary::new(vec![VocabularyWord::new(3, "buy")]).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidArgument(_)));
    }

    #[test]
    fn test_rejects_duplicate_text() {
        let err = Vocabulary::from_texts(["buy", "buy"]).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidArgument(_)));
    }

    #[test]
    fn test_from_texts_assigns_sequential_ids() {
        let v = Vocabulary::from_texts(["a", "b", "c"]).unwrap();
        let ids: Vec<u32> = v.words().iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(v.len(), 3);
    }
}
