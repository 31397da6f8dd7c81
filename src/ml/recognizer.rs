// ============================================================
// Layer 5 — Recognizer
// ============================================================
// One trainable classifier for one characteristic:
//
//   train:     calls → (vectorize, encode) → Trainer → network
//   recognize: text  → vectorize → forward pass → decode → value
//   save:      network → NetworkSnapshot → sink
//
// The input layer is sized to the vocabulary and the output layer
// to the characteristic's values; neither changes afterwards.
//
// Concurrency:
//   The weights are held as plain tensors (NetworkParams), not as
//   burn modules, so a Recognizer is Sync and any number of threads
//   may call `recognize` on one instance at once. Training takes
//   `&mut self`, so the borrow checker keeps it from overlapping
//   inference.

use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;

use crate::data::codec::CategoryCodec;
use crate::data::ngram::NGramStrategy;
use crate::data::vectorizer::TextVectorizer;
use crate::domain::characteristic::{Characteristic, CharacteristicValue};
use crate::domain::error::{ClassifierError, Result};
use crate::domain::incoming_call::IncomingCall;
use crate::domain::traits::{Observable, Observer, ObserverList};
use crate::domain::vocabulary::Vocabulary;
use crate::ml::network::{NetBackend, NetDevice, NetworkParams, TextNetwork, Topology};
use crate::ml::runtime::Runtime;
use crate::ml::snapshot::NetworkSnapshot;
use crate::ml::trainer::{TrainOptions, Trainer, TrainingReport};

pub struct Recognizer {
    characteristic: Characteristic,
    vectorizer:     TextVectorizer,
    /// Inference-time weights; rebuilt into a TextNetwork for
    /// training and snapshots.
    params:         NetworkParams<NetBackend>,
    runtime:        Arc<Runtime>,
    observers:      ObserverList,
}

impl Recognizer {
    /// Fresh recognizer with randomly seeded weights.
    pub fn new(
        characteristic: Characteristic,
        vocabulary:     Arc<Vocabulary>,
        ngram:          Arc<dyn NGramStrategy>,
        runtime:        Arc<Runtime>,
    ) -> Result<Self> {
        Self::with_seed(characteristic, vocabulary, ngram, runtime, rand::random())
    }

    /// Fresh recognizer whose initial weights are derived from `seed`.
    pub fn with_seed(
        characteristic: Characteristic,
        vocabulary:     Arc<Vocabulary>,
        ngram:          Arc<dyn NGramStrategy>,
        runtime:        Arc<Runtime>,
        seed:           u64,
    ) -> Result<Self> {
        let topology = validate(&characteristic, &vocabulary)?;
        let params   = TextNetwork::random(topology, seed, &NetDevice::default()).params();

        tracing::debug!(
            characteristic = %characteristic.name,
            "Created {}x{}x{} network",
            topology.input, topology.hidden, topology.output
        );

        Ok(Self {
            characteristic,
            vectorizer: TextVectorizer::new(vocabulary, ngram),
            params,
            runtime,
            observers: ObserverList::new(),
        })
    }

    /// Recognizer whose network is read from a saved snapshot.
    pub fn restore<R: Read>(
        source:         R,
        characteristic: Characteristic,
        vocabulary:     Arc<Vocabulary>,
        ngram:          Arc<dyn NGramStrategy>,
        runtime:        Arc<Runtime>,
    ) -> Result<Self> {
        let expected = validate(&characteristic, &vocabulary)?;
        let snapshot = NetworkSnapshot::read_from(source)?;
        let found    = snapshot.topology();

        if found != expected {
            return Err(ClassifierError::CorruptModel(format!(
                "snapshot is {}x{}x{} but '{}' needs {}x{}x{}",
                found.input, found.hidden, found.output,
                characteristic.name, expected.input, expected.hidden, expected.output
            )));
        }
        if snapshot.characteristic != characteristic.name {
            tracing::warn!(
                "Snapshot was saved for '{}', restoring it for '{}'",
                snapshot.characteristic,
                characteristic.name
            );
        }

        let params = snapshot.into_network::<NetBackend>(&NetDevice::default())?.params();
        tracing::debug!(characteristic = %characteristic.name, "Network restored from snapshot");

        Ok(Self {
            characteristic,
            vectorizer: TextVectorizer::new(vocabulary, ngram),
            params,
            runtime,
            observers: ObserverList::new(),
        })
    }

    pub fn characteristic(&self) -> &Characteristic {
        &self.characteristic
    }

    pub fn characteristic_name(&self) -> &str {
        &self.characteristic.name
    }

    pub fn topology(&self) -> Topology {
        self.params.topology()
    }

    pub fn vectorize(&self, text: &str) -> Vec<f32> {
        self.vectorizer.vectorize(text)
    }

    /// Train until convergence with the default options (no iteration cap).
    pub fn train(&mut self, calls: &[IncomingCall]) -> Result<TrainingReport> {
        self.train_with(calls, &TrainOptions::default())
    }

    /// Train with explicit options. On `DidNotConverge` or `Cancelled`
    /// the network keeps the weights reached so far.
    pub fn train_with(&mut self, calls: &[IncomingCall], options: &TrainOptions) -> Result<TrainingReport> {
        self.runtime.ensure_running()?;

        // ── Build input and ideal matrices ───────────────────────────────────
        let codec  = CategoryCodec::new(&self.characteristic);
        let inputs: Vec<Vec<f32>> = calls.iter().map(|c| self.vectorizer.vectorize(&c.text)).collect();
        let ideals: Vec<Vec<f32>> = calls
            .iter()
            .map(|c| codec.encode_call(c))
            .collect::<Result<_>>()?;

        tracing::info!(
            characteristic = %self.characteristic.name,
            examples = calls.len(),
            "Training recognizer"
        );

        // ── Iterate until converged ───────────────────────────────────────────
        let mut trainer = Trainer::new(
            &TextNetwork::from_params(self.params.clone()),
            &inputs,
            &ideals,
            Arc::clone(&self.runtime),
            options.rprop,
        )?;

        let name      = &self.characteristic.name;
        let observers = &self.observers;
        let outcome   = trainer.run(options, |_, error| {
            observers.notify_observers(&format!(
                "Training Recognizer for Characteristics '{}'. Errors: {:.2}%. Wait...",
                name,
                error * 100.0
            ));
        });

        self.params = trainer.into_network().params();
        let report = outcome?;

        tracing::info!(
            characteristic = %self.characteristic.name,
            iterations = report.iterations,
            error = report.error,
            "Recognizer trained"
        );
        self.observers.notify_observers(&format!(
            "Recognizer for Characteristics '{}' trained. Wait...",
            self.characteristic.name
        ));

        Ok(report)
    }

    pub fn recognize(&self, text: &str) -> Result<CharacteristicValue> {
        self.runtime.ensure_running()?;

        let input  = self.vectorizer.vectorize(text);
        let output = self.params.compute(&input);
        CategoryCodec::new(&self.characteristic).decode(&output).cloned()
    }

    pub fn recognize_call(&self, call: &IncomingCall) -> Result<CharacteristicValue> {
        self.recognize(&call.text)
    }

    /// Share of labeled calls whose label is predicted exactly.
    /// Calls without a label for this characteristic are skipped.
    pub fn accuracy(&self, calls: &[IncomingCall]) -> Result<f64> {
        let mut total   = 0usize;
        let mut correct = 0usize;

        for call in calls {
            let Some(expected) = call.value_for(&self.characteristic) else {
                continue;
            };
            total += 1;
            if &self.recognize(&call.text)? == expected {
                correct += 1;
            }
        }

        Ok(if total == 0 { 0.0 } else { correct as f64 / total as f64 })
    }

    /// Serialise the current network into `destination`.
    pub fn save<W: Write>(&self, destination: W) -> Result<()> {
        let network = TextNetwork::from_params(self.params.clone());
        NetworkSnapshot::capture(&network, &self.characteristic.name).write_to(destination)?;
        self.observers.notify_observers(&format!(
            "Trained Recognizer for Characteristics '{}' saved. Wait...",
            self.characteristic.name
        ));
        Ok(())
    }
}

/// Construction-time checks shared by the fresh and restored paths.
fn validate(characteristic: &Characteristic, vocabulary: &Vocabulary) -> Result<Topology> {
    if characteristic.name.trim().is_empty() {
        return Err(ClassifierError::InvalidArgument(
            "characteristic name is empty".to_string(),
        ));
    }
    if characteristic.possible_values.is_empty() {
        return Err(ClassifierError::InvalidArgument(format!(
            "characteristic '{}' has no possible values",
            characteristic.name
        )));
    }
    if vocabulary.is_empty() {
        return Err(ClassifierError::InvalidArgument("vocabulary is empty".to_string()));
    }
    Ok(Topology::for_sizes(vocabulary.len(), characteristic.arity()))
}

impl Observable for Recognizer {
    fn add_observer(&mut self, observer: Arc<dyn Observer>) {
        self.observers.add_observer(observer);
    }

    fn remove_observer(&mut self, observer: &Arc<dyn Observer>) {
        self.observers.remove_observer(observer);
    }

    fn notify_observers(&self, message: &str) {
        self.observers.notify_observers(message);
    }
}

impl fmt::Display for Recognizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}RecognizerNeuralNetwork", self.characteristic.name)
    }
}

impl fmt::Debug for Recognizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recognizer")
            .field("characteristic", &self.characteristic.name)
            .field("topology", &self.topology())
            .field("observers", &self.observers)
            .finish()
    }
}
