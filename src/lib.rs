// ============================================================
// nn-text-classifier
// ============================================================
// Layered the same way top to bottom:
//
//   Layer 1  cli          — argument parsing, printing
//   Layer 2  application  — train / classify workflows
//   Layer 3  domain       — vocabulary, characteristics, calls, traits
//   Layer 4  data         — normalization, n-grams, vectors, codecs
//   Layer 5  ml           — runtime, network, trainer, recognizer
//   Layer 6  infra        — model store, metrics, progress

#![recursion_limit = "256"]

pub mod cli;
pub mod application;
pub mod domain;
pub mod data;
pub mod ml;
pub mod infra;

pub use domain::characteristic::{Characteristic, CharacteristicValue};
pub use domain::error::{ClassifierError, Result};
pub use domain::incoming_call::IncomingCall;
pub use domain::traits::{Observable, Observer, TextClassifier};
pub use domain::vocabulary::{Vocabulary, VocabularyWord};
pub use data::ngram::{NGramKind, NGramStrategy};
pub use ml::recognizer::Recognizer;
pub use ml::runtime::Runtime;
pub use ml::trainer::{CancelToken, TrainOptions, TrainingReport};
