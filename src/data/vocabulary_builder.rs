// ============================================================
// Layer 4 — Vocabulary Builder
// ============================================================
// Builds a vocabulary from labeled call texts when the catalog
// does not ship one.
//
//   Step 1: Extract the token set of every text (n-gram strategy)
//   Step 2: Count in how many texts each token appears
//   Step 3: Keep tokens seen in at least `min_frequency` texts
//   Step 4: Order by frequency (desc), then text, and cap the size
//   Step 5: Assign ids 1..N in that order

use std::collections::HashMap;

use crate::data::ngram::NGramStrategy;
use crate::domain::error::Result;
use crate::domain::vocabulary::Vocabulary;

pub struct VocabularyBuilder<'a> {
    ngram:         &'a dyn NGramStrategy,
    min_frequency: usize,
    max_size:      Option<usize>,
}

impl<'a> VocabularyBuilder<'a> {
    pub fn new(ngram: &'a dyn NGramStrategy) -> Self {
        Self { ngram, min_frequency: 1, max_size: None }
    }

    pub fn min_frequency(mut self, min_frequency: usize) -> Self {
        self.min_frequency = min_frequency.max(1);
        self
    }

    pub fn max_size(mut self, max_size: Option<usize>) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn build<'t, I>(&self, texts: I) -> Result<Vocabulary>
    where
        I: IntoIterator<Item = &'t str>,
    {
        // ── Step 1 + 2: Document frequency per token ─────────────────────────
        let mut freq: HashMap<String, usize> = HashMap::new();
        let mut documents = 0usize;

        for text in texts {
            documents += 1;
            for token in self.ngram.extract(text) {
                *freq.entry(token).or_insert(0) += 1;
            }
        }

        // ── Step 3 + 4: Filter, sort, cap ─────────────────────────────────────
        let mut words: Vec<(String, usize)> = freq
            .into_iter()
            .filter(|(_, count)| *count >= self.min_frequency)
            .collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if let Some(max) = self.max_size {
            words.truncate(max);
        }

        tracing::info!(
            "Vocabulary built from {} texts: {} tokens (min frequency {})",
            documents,
            words.len(),
            self.min_frequency
        );

        // ── Step 5: Assign ids ────────────────────────────────────────────────
        Vocabulary::from_texts(words.into_iter().map(|(word, _)| word))
    }
}
