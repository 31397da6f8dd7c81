// ============================================================
// Layer 4 — Text Vectorizer
// ============================================================
// Maps a text to a fixed-length binary presence vector:
//
//   vocabulary = {buy:1, cancel:2, refund:3}
//   "cancel my refund"  →  tokens {cancel, refund}  →  [0, 1, 1]
//
// Tokens missing from the vocabulary are ignored. Because the
// n-gram strategy yields a set, each coordinate is written at most
// once and the order of extraction never matters.

use std::sync::Arc;

use crate::data::ngram::NGramStrategy;
use crate::domain::vocabulary::Vocabulary;

#[derive(Debug, Clone)]
pub struct TextVectorizer {
    vocabulary: Arc<Vocabulary>,
    ngram:      Arc<dyn NGramStrategy>,
}

impl TextVectorizer {
    pub fn new(vocabulary: Arc<Vocabulary>, ngram: Arc<dyn NGramStrategy>) -> Self {
        Self { vocabulary, ngram }
    }

    /// Length of every vector this vectorizer produces.
    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vectorize(&self, text: &str) -> Vec<f32> {
        self.vectorize_tokens(self.ngram.extract(text))
    }

    /// Vectorize an already extracted token stream.
    pub fn vectorize_tokens<I, S>(&self, tokens: I) -> Vec<f32>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vector = vec![0.0f32; self.dimension()];

        for token in tokens {
            if let Some(word) = self.vocabulary.get(token.as_ref()) {
                vector[word.id as usize - 1] = 1.0;
            }
        }

        vector
    }

    pub fn vocabulary(&self) -> &Arc<Vocabulary> {
        &self.vocabulary
    }

    pub fn ngram(&self) -> &Arc<dyn NGramStrategy> {
        &self.ngram
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ngram::{FilteredBigram, Unigram};
    use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

    fn vectorizer() -> TextVectorizer {
        let vocabulary = Vocabulary::from_texts(["buy", "cancel", "refund"]).unwrap();
        TextVectorizer::new(Arc::new(vocabulary), Arc::new(Unigram))
    }

    #[test]
    fn test_marks_known_words() {
        assert_eq!(vectorizer().vectorize("Cancel my refund"), vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_unknown_words_are_ignored() {
        assert_eq!(vectorizer().vectorize("hello there"), vec![0.0, 0.0, 0.0]);
        assert_eq!(vectorizer().vectorize(""), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_vector_is_binary_and_sized_to_vocabulary() {
        let v = vectorizer();
        for text in ["buy buy buy", "refund, cancel, buy!", "x", "BUY now or cancel"] {
            let vector = v.vectorize(text);
            assert_eq!(vector.len(), 3);
            assert!(vector.iter().all(|&x| x == 0.0 || x == 1.0));
        }
    }

    #[test]
    fn test_token_order_does_not_matter() {
        let v = vectorizer();
        let mut tokens = vec!["refund", "zzz", "buy", "cancel", "buy"];
        let expected   = v.vectorize_tokens(&tokens);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            tokens.shuffle(&mut rng);
            assert_eq!(v.vectorize_tokens(&tokens), expected);
        }
    }

    #[test]
    fn test_bigram_tokens_hit_phrase_entries() {
        let vocabulary = Vocabulary::from_texts(["cancel", "cancel refund"]).unwrap();
        let v = TextVectorizer::new(Arc::new(vocabulary), Arc::new(FilteredBigram::default()));
        assert_eq!(v.vectorize("cancel my refund"), vec![1.0, 1.0]);
    }
}
