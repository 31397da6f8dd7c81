// ============================================================
// Layer 6 — Model Store
// ============================================================
// Everything a later `classify` run needs to rebuild the trained
// recognizers, kept in one directory:
//
//   models/
//     classifier_config.json   ← TrainConfig used for training
//     vocabulary.json          ← ordered vocabulary words
//     characteristics.json     ← characteristics and their values
//     intent.model.json        ← one network snapshot per characteristic
//     ...
//     metrics.csv              ← written by MetricsLogger

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::{de::DeserializeOwned, Serialize};

use crate::application::train_use_case::TrainConfig;
use crate::data::ngram::NGramStrategy;
use crate::domain::characteristic::Characteristic;
use crate::domain::vocabulary::{Vocabulary, VocabularyWord};
use crate::ml::recognizer::Recognizer;
use crate::ml::runtime::Runtime;

const CONFIG_FILE:          &str = "classifier_config.json";
const VOCABULARY_FILE:      &str = "vocabulary.json";
const CHARACTERISTICS_FILE: &str = "characteristics.json";

pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    /// Open (and create if needed) a model directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create model directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<name>.model.json`, with characters unsafe in file names
    /// replaced by '_'.
    pub fn model_path(&self, characteristic: &str) -> PathBuf {
        let file: String = characteristic
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.model.json"))
    }

    /// Fails when two characteristics would be saved to the same file,
    /// e.g. "call intent" and "call_intent".
    pub fn ensure_distinct_model_paths(&self, characteristics: &[Characteristic]) -> Result<()> {
        let mut seen: HashMap<PathBuf, &str> = HashMap::new();
        for characteristic in characteristics {
            let path = self.model_path(&characteristic.name);
            if let Some(previous) = seen.insert(path.clone(), &characteristic.name) {
                bail!(
                    "Characteristics '{}' and '{}' would both be saved to '{}'; rename one of them",
                    previous,
                    characteristic.name,
                    path.display()
                );
            }
        }
        Ok(())
    }

    // ── Recognizers ──────────────────────────────────────────────────────────

    pub fn save_recognizer(&self, recognizer: &Recognizer) -> Result<PathBuf> {
        let path = self.model_path(recognizer.characteristic_name());
        let file = File::create(&path)
            .with_context(|| format!("Cannot create model file '{}'", path.display()))?;

        let mut writer = BufWriter::new(file);
        recognizer
            .save(&mut writer)
            .with_context(|| format!("Failed to save recognizer to '{}'", path.display()))?;
        writer.flush()?;

        tracing::debug!("Saved recognizer '{}' to '{}'", recognizer.characteristic_name(), path.display());
        Ok(path)
    }

    pub fn load_recognizer(
        &self,
        characteristic: Characteristic,
        vocabulary:     Arc<Vocabulary>,
        ngram:          Arc<dyn NGramStrategy>,
        runtime:        Arc<Runtime>,
    ) -> Result<Recognizer> {
        let path = self.model_path(&characteristic.name);
        let file = File::open(&path).with_context(|| {
            format!(
                "Cannot open model '{}'. Have you run 'train' first?",
                path.display()
            )
        })?;

        Recognizer::restore(BufReader::new(file), characteristic, vocabulary, ngram, runtime)
            .with_context(|| format!("Cannot restore recognizer from '{}'", path.display()))
    }

    // ── Side files ───────────────────────────────────────────────────────────

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.write_json(CONFIG_FILE, cfg)
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        self.read_json(CONFIG_FILE)
    }

    pub fn save_vocabulary(&self, vocabulary: &Vocabulary) -> Result<()> {
        self.write_json(VOCABULARY_FILE, vocabulary.words())
    }

    pub fn load_vocabulary(&self) -> Result<Vocabulary> {
        let words: Vec<VocabularyWord> = self.read_json(VOCABULARY_FILE)?;
        Ok(Vocabulary::new(words)?)
    }

    pub fn save_characteristics(&self, characteristics: &[Characteristic]) -> Result<()> {
        self.write_json(CHARACTERISTICS_FILE, characteristics)
    }

    pub fn load_characteristics(&self) -> Result<Vec<Characteristic>> {
        self.read_json(CHARACTERISTICS_FILE)
    }

    fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Wrote '{}'", path.display());
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read '{}'. Make sure you have run 'train' before 'classify'.",
                path.display()
            )
        })?;
        serde_json::from_str(&json).with_context(|| format!("Invalid JSON in '{}'", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ngram::Unigram;
    use crate::domain::characteristic::CharacteristicValue;

    fn intent() -> Characteristic {
        Characteristic::new(
            "call intent",
            vec![CharacteristicValue::new(1, "purchase"), CharacteristicValue::new(2, "support")],
        )
    }

    #[test]
    fn test_model_path_is_file_safe() {
        let tmp   = tempfile::tempdir().unwrap();
        let store = ModelStore::new(tmp.path()).unwrap();
        assert_eq!(store.model_path("call intent/v2"), tmp.path().join("call_intent_v2.model.json"));
    }

    #[test]
    fn test_colliding_model_paths_are_rejected() {
        let tmp   = tempfile::tempdir().unwrap();
        let store = ModelStore::new(tmp.path()).unwrap();

        let mut underscored = intent();
        underscored.name = "call_intent".to_string();
        let err = store.ensure_distinct_model_paths(&[intent(), underscored]).unwrap_err();
        assert!(err.to_string().contains("call_intent.model.json"));

        let mut other = intent();
        other.name = "urgency".to_string();
        assert!(store.ensure_distinct_model_paths(&[intent(), other]).is_ok());
    }

    #[test]
    fn test_side_files_round_trip() {
        let tmp   = tempfile::tempdir().unwrap();
        let store = ModelStore::new(tmp.path().join("models")).unwrap();

        let vocabulary = Vocabulary::from_texts(["buy", "cancel"]).unwrap();
        store.save_vocabulary(&vocabulary).unwrap();
        store.save_characteristics(&[intent()]).unwrap();
        store.save_config(&TrainConfig::default()).unwrap();

        assert_eq!(store.load_vocabulary().unwrap().words(), vocabulary.words());
        assert_eq!(store.load_characteristics().unwrap(), vec![intent()]);
        assert_eq!(store.load_config().unwrap().workers, TrainConfig::default().workers);
    }

    #[test]
    fn test_recognizer_round_trip_through_directory() {
        let tmp     = tempfile::tempdir().unwrap();
        let store   = ModelStore::new(tmp.path()).unwrap();
        let runtime = Arc::new(Runtime::new(1).unwrap());
        let vocab   = Arc::new(Vocabulary::from_texts(["buy", "cancel"]).unwrap());

        let recognizer = Recognizer::with_seed(intent(), Arc::clone(&vocab), Arc::new(Unigram), Arc::clone(&runtime), 4)
            .unwrap();
        let path = store.save_recognizer(&recognizer).unwrap();
        assert!(path.exists());

        let restored = store
            .load_recognizer(intent(), vocab, Arc::new(Unigram), runtime)
            .unwrap();
        assert_eq!(restored.recognize("buy").unwrap(), recognizer.recognize("buy").unwrap());
    }

    #[test]
    fn test_missing_model_is_an_error() {
        let tmp   = tempfile::tempdir().unwrap();
        let store = ModelStore::new(tmp.path()).unwrap();
        let vocab = Arc::new(Vocabulary::from_texts(["buy"]).unwrap());
        let rt    = Arc::new(Runtime::new(1).unwrap());
        assert!(store.load_recognizer(intent(), vocab, Arc::new(Unigram), rt).is_err());
    }
}
