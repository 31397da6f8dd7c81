// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams other layers implement:
//
//   Observer / Observable — progress fan-out from a recognizer
//   CatalogSource         — where vocabulary, characteristics and
//                           labeled calls come from
//   TextClassifier        — anything that maps text to values
//
// NGramStrategy lives with the data pipeline (data::ngram).

use std::sync::Arc;

use anyhow::Result;

use crate::domain::characteristic::{Characteristic, CharacteristicValue};
use crate::domain::incoming_call::IncomingCall;
use crate::domain::vocabulary::Vocabulary;

// ─── Observer ─────────────────────────────────────────────────────────────────
/// Receives human-readable progress messages.
///
/// Called synchronously on the training thread, so an implementation
/// that blocks stalls training.
pub trait Observer: Send + Sync {
    fn update(&self, message: &str);
}

// ─── Observable ───────────────────────────────────────────────────────────────
/// Something that fans messages out to registered observers.
pub trait Observable {
    fn add_observer(&mut self, observer: Arc<dyn Observer>);

    /// Removes the given handle (compared by pointer identity).
    fn remove_observer(&mut self, observer: &Arc<dyn Observer>);

    fn notify_observers(&self, message: &str);
}

// ─── CatalogSource ────────────────────────────────────────────────────────────
/// Read access to the catalog the core is trained from.
///
/// Implementations:
///   - JsonCatalog → a single JSON file on disk
pub trait CatalogSource {
    fn characteristics(&self) -> Result<Vec<Characteristic>>;

    /// `None` when the catalog has no fixed vocabulary and one must be
    /// built from the labeled calls.
    fn vocabulary(&self) -> Result<Option<Vocabulary>>;

    fn incoming_calls(&self) -> Result<Vec<IncomingCall>>;
}

// ─── TextClassifier ───────────────────────────────────────────────────────────
/// Maps a text to one value per known characteristic.
///
/// Implementations:
///   - ClassifyUseCase → one restored recognizer per characteristic
pub trait TextClassifier {
    fn classify(&self, text: &str) -> Result<Vec<(String, CharacteristicValue)>>;
}

// ─── ObserverList ─────────────────────────────────────────────────────────────
/// Registration-ordered observer handles with synchronous fan-out.
#[derive(Default, Clone)]
pub struct ObserverList {
    observers: Vec<Arc<dyn Observer>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl Observable for ObserverList {
    fn add_observer(&mut self, observer: Arc<dyn Observer>) {
        self.observers.push(observer);
    }

    fn remove_observer(&mut self, observer: &Arc<dyn Observer>) {
        if let Some(pos) = self.observers.iter().position(|o| std::ptr::addr_eq(Arc::as_ptr(o), Arc::as_ptr(observer))) {
            self.observers.remove(pos);
        }
    }

    fn notify_observers(&self, message: &str) {
        for observer in &self.observers {
            observer.update(message);
        }
    }
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct Recorder {
        tag: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Observer for Recorder {
        fn update(&self, message: &str) {
            self.log.lock().push(format!("{}:{}", self.tag, message));
        }
    }

    #[test]
    fn test_fan_out_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut list = ObserverList::new();
        list.add_observer(Arc::new(Recorder { tag: "a", log: Arc::clone(&log) }));
        list.add_observer(Arc::new(Recorder { tag: "b", log: Arc::clone(&log) }));

        list.notify_observers("hi");
        assert_eq!(*log.lock(), vec!["a:hi", "b:hi"]);
    }

    #[test]
    fn test_remove_by_identity() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let first: Arc<dyn Observer>  = Arc::new(Recorder { tag: "a", log: Arc::clone(&log) });
        let second: Arc<dyn Observer> = Arc::new(Recorder { tag: "a", log: Arc::clone(&log) });

        let mut list = ObserverList::new();
        list.add_observer(Arc::clone(&first));
        list.add_observer(Arc::clone(&second));
        list.remove_observer(&first);

        assert_eq!(list.len(), 1);
        list.notify_observers("x");
        assert_eq!(log.lock().len(), 1);
    }
}
