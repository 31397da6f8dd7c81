// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between raw call text and the numeric rows the
// network trains on.
//
//   catalog.json
//       │
//       ▼
//   JsonCatalog        → characteristics, vocabulary, labeled calls
//       │
//       ▼
//   Preprocessor       → lowercase, strip punctuation and digits
//       │
//       ▼
//   NGramStrategy      → text → set of tokens
//       │
//       ├──► VocabularyBuilder → vocabulary (when the catalog has none)
//       ▼
//   TextVectorizer     → tokens → binary presence vector   (input row)
//   CategoryCodec      → label  → one-hot vector           (ideal row)
//
// The splitter shuffles calls into training and hold-out sets.

/// Loads the JSON catalog
pub mod loader;

/// Text normalisation before tokenisation
pub mod preprocessor;

/// Pluggable n-gram extraction strategies
pub mod ngram;

/// Text → binary presence vector
pub mod vectorizer;

/// Characteristic value ↔ one-hot vector
pub mod codec;

/// Builds a vocabulary from training texts
pub mod vocabulary_builder;

/// Shuffles and splits data into training and hold-out sets
pub mod splitter;
