// ============================================================
// Layer 2 — Classify Use Case
// ============================================================
// Rebuilds every recognizer saved by `train` and runs a text
// through all of them:
//
//   1. Read classifier_config.json, vocabulary.json and
//      characteristics.json from the model directory
//   2. Restore one recognizer per characteristic snapshot
//   3. classify(text) → one predicted value per characteristic

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::data::ngram::NGramStrategy;
use crate::domain::characteristic::CharacteristicValue;
use crate::domain::traits::TextClassifier;
use crate::infra::model_store::ModelStore;
use crate::ml::recognizer::Recognizer;
use crate::ml::runtime::{self, Runtime};

pub struct ClassifyUseCase {
    recognizers: Vec<Recognizer>,
}

impl ClassifyUseCase {
    /// Restore recognizers on the process-wide runtime, sized by the
    /// worker count recorded at training time.
    pub fn open(models_dir: &str) -> Result<Self> {
        let store   = ModelStore::new(models_dir)?;
        let runtime = runtime::init(store.load_config()?.workers)?;
        Self::open_with(models_dir, runtime)
    }

    pub fn open_with(models_dir: &str, runtime: Arc<Runtime>) -> Result<Self> {
        let store           = ModelStore::new(models_dir)?;
        let config          = store.load_config()?;
        let vocabulary      = Arc::new(store.load_vocabulary()?);
        let characteristics = store.load_characteristics()?;
        let ngram: Arc<dyn NGramStrategy> = Arc::from(config.ngram.strategy());

        let mut recognizers = Vec::with_capacity(characteristics.len());
        for characteristic in characteristics {
            if !store.model_path(&characteristic.name).exists() {
                tracing::warn!("No trained model for '{}', skipping", characteristic.name);
                continue;
            }
            recognizers.push(store.load_recognizer(
                characteristic,
                Arc::clone(&vocabulary),
                Arc::clone(&ngram),
                Arc::clone(&runtime),
            )?);
        }

        if recognizers.is_empty() {
            anyhow::bail!("No trained recognizers found in '{}'", models_dir);
        }
        tracing::info!(
            "Restored {} recognizers ({} n-grams, {} vocabulary words)",
            recognizers.len(),
            config.ngram,
            vocabulary.len()
        );

        Ok(Self { recognizers })
    }

    pub fn recognizers(&self) -> &[Recognizer] {
        &self.recognizers
    }
}

impl TextClassifier for ClassifyUseCase {
    fn classify(&self, text: &str) -> Result<Vec<(String, CharacteristicValue)>> {
        self.recognizers
            .iter()
            .map(|r| {
                let value = r
                    .recognize(text)
                    .with_context(|| format!("Recognizer '{}' failed", r.characteristic_name()))?;
                Ok((r.characteristic_name().to_string(), value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::{tests::config_for, TrainUseCase};

    #[test]
    fn test_classifies_with_restored_models() {
        let tmp     = tempfile::tempdir().unwrap();
        let cfg     = config_for(tmp.path());
        let runtime = Arc::new(Runtime::new(2).unwrap());
        TrainUseCase::new(cfg.clone()).execute_with(Arc::clone(&runtime)).unwrap();

        let classifier = ClassifyUseCase::open_with(&cfg.models_dir, runtime).unwrap();
        assert_eq!(classifier.recognizers().len(), 1);

        let labels = classifier.classify("I want to buy the product").unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].0, "intent");
        assert_eq!(labels[0].1.value, "purchase");

        let labels = classifier.classify("cancel and refund my order").unwrap();
        assert_eq!(labels[0].1.value, "support");
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let tmp     = tempfile::tempdir().unwrap();
        let runtime = Arc::new(Runtime::new(1).unwrap());
        let dir     = tmp.path().to_string_lossy().into_owned();
        assert!(ClassifyUseCase::open_with(&dir, runtime).is_err());
    }

    #[test]
    fn test_classify_after_shutdown_fails() {
        let tmp     = tempfile::tempdir().unwrap();
        let cfg     = config_for(tmp.path());
        let runtime = Arc::new(Runtime::new(2).unwrap());
        TrainUseCase::new(cfg.clone()).execute_with(Arc::clone(&runtime)).unwrap();

        let classifier = ClassifyUseCase::open_with(&cfg.models_dir, Arc::clone(&runtime)).unwrap();
        runtime.shutdown().unwrap();
        assert!(classifier.classify("buy").is_err());
    }
}
