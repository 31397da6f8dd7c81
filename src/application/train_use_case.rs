// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the catalog              (Layer 4 - data)
//   Step 2: Split train / hold-out        (Layer 4 - data)
//   Step 3: Take or build the vocabulary
//           from the training split only  (Layer 4 - data)
//   Step 4: Save config and side files    (Layer 6 - infra)
//   Step 5: Train one recognizer per
//           characteristic, evaluate,
//           save snapshot, log metrics    (Layer 5 - ml)

use std::sync::Arc;

use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::{
    loader::JsonCatalog,
    ngram::{NGramKind, NGramStrategy},
    splitter::split_train_holdout,
    vocabulary_builder::VocabularyBuilder,
};
use crate::domain::error::ClassifierError;
use crate::domain::incoming_call::IncomingCall;
use crate::domain::traits::{CatalogSource, Observable};
use crate::infra::{
    metrics::{MetricsLogger, RecognizerMetrics},
    model_store::ModelStore,
    progress::TracingObserver,
};
use crate::ml::recognizer::Recognizer;
use crate::ml::runtime::{self, Runtime, DEFAULT_WORKERS};
use crate::ml::trainer::{TrainOptions, CONVERGENCE_THRESHOLD};

// ─── Training Configuration ──────────────────────────────────────────────────
// Saved next to the models so `classify` rebuilds the same n-gram
// strategy the networks were trained with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub catalog_path:     String,
    pub models_dir:       String,
    pub ngram:            NGramKind,
    pub workers:          usize,
    pub threshold:        f64,
    pub max_iterations:   Option<usize>,
    pub holdout_fraction: f64,
    pub seed:             Option<u64>,
    pub min_frequency:    usize,
    pub max_vocabulary:   Option<usize>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            catalog_path:     "data/catalog.json".to_string(),
            models_dir:       "models".to_string(),
            ngram:            NGramKind::default(),
            workers:          DEFAULT_WORKERS,
            threshold:        CONVERGENCE_THRESHOLD,
            max_iterations:   None,
            holdout_fraction: 0.0,
            seed:             None,
            min_frequency:    1,
            max_vocabulary:   None,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline on the process-wide runtime.
    pub fn execute(&self) -> Result<Vec<RecognizerMetrics>> {
        let runtime = runtime::init(self.config.workers)?;
        self.execute_with(runtime)
    }

    /// Run the pipeline on an explicit runtime.
    pub fn execute_with(&self, runtime: Arc<Runtime>) -> Result<Vec<RecognizerMetrics>> {
        let cfg = &self.config;

        // ── Step 1: Load the catalog ──────────────────────────────────────────
        tracing::info!("Loading catalog from '{}'", cfg.catalog_path);
        let catalog         = JsonCatalog::open(&cfg.catalog_path)?;
        let characteristics = catalog.characteristics()?;
        let calls           = catalog.incoming_calls()?;
        tracing::info!(
            "Loaded {} characteristics and {} labeled calls",
            characteristics.len(),
            calls.len()
        );

        // Two characteristics must never share a model file.
        let store = ModelStore::new(&cfg.models_dir)?;
        store.ensure_distinct_model_paths(&characteristics)?;

        // ── Step 2: Train / hold-out split ────────────────────────────────────
        // Hold-out texts must not add vocabulary words or frequencies.
        let mut rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        };
        let (train_calls, holdout_calls) =
            split_train_holdout(calls, 1.0 - cfg.holdout_fraction, &mut rng);
        tracing::info!(
            "Split: {} train, {} hold-out",
            train_calls.len(),
            holdout_calls.len()
        );

        // ── Step 3: Vocabulary ────────────────────────────────────────────────
        let ngram: Arc<dyn NGramStrategy> = Arc::from(cfg.ngram.strategy());
        let vocabulary = match catalog.vocabulary()? {
            Some(vocabulary) => {
                tracing::info!("Using catalog vocabulary ({} words)", vocabulary.len());
                vocabulary
            }
            None => VocabularyBuilder::new(ngram.as_ref())
                .min_frequency(cfg.min_frequency)
                .max_size(cfg.max_vocabulary)
                .build(train_calls.iter().map(|c| c.text.as_str()))?,
        };
        let vocabulary = Arc::new(vocabulary);

        // ── Step 4: Side files ────────────────────────────────────────────────
        store.save_config(cfg)?;
        store.save_vocabulary(&vocabulary)?;
        store.save_characteristics(&characteristics)?;
        let metrics = MetricsLogger::create(store.dir())?;

        // ── Step 5: One recognizer per characteristic ─────────────────────────
        let options = TrainOptions {
            threshold:      cfg.threshold,
            max_iterations: cfg.max_iterations,
            ..TrainOptions::default()
        };

        let mut results = Vec::with_capacity(characteristics.len());
        for (index, characteristic) in characteristics.into_iter().enumerate() {
            let labeled: Vec<IncomingCall> = train_calls
                .iter()
                .filter(|c| c.value_for(&characteristic).is_some())
                .cloned()
                .collect();
            if labeled.is_empty() {
                tracing::warn!("No labeled calls for '{}', skipping", characteristic.name);
                continue;
            }

            let mut recognizer = match cfg.seed {
                Some(seed) => Recognizer::with_seed(
                    characteristic,
                    Arc::clone(&vocabulary),
                    Arc::clone(&ngram),
                    Arc::clone(&runtime),
                    seed.wrapping_add(index as u64),
                )?,
                None => Recognizer::new(
                    characteristic,
                    Arc::clone(&vocabulary),
                    Arc::clone(&ngram),
                    Arc::clone(&runtime),
                )?,
            };
            recognizer.add_observer(Arc::new(TracingObserver));

            let (iterations, error) = match recognizer.train_with(&labeled, &options) {
                Ok(report) => (report.iterations, report.error),
                Err(ClassifierError::DidNotConverge { iterations, error }) => {
                    tracing::warn!(
                        "'{}' stopped at {} iterations with error {:.4}, saving anyway",
                        recognizer.characteristic_name(),
                        iterations,
                        error
                    );
                    (iterations, error)
                }
                Err(e) => return Err(e.into()),
            };

            let holdout_accuracy = if holdout_calls.is_empty() {
                None
            } else {
                let accuracy = recognizer.accuracy(&holdout_calls)?;
                tracing::info!(
                    "'{}' hold-out accuracy: {:.2}%",
                    recognizer.characteristic_name(),
                    accuracy * 100.0
                );
                Some(accuracy)
            };

            store.save_recognizer(&recognizer)?;

            let row = RecognizerMetrics::new(recognizer.characteristic_name(), iterations, error, holdout_accuracy);
            metrics.log(&row)?;
            results.push(row);
        }

        Ok(results)
    }
}
