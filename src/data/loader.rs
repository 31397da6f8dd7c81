// ============================================================
// Layer 4 — Catalog Loader
// ============================================================
// Loads characteristics, an optional vocabulary and labeled calls
// from one JSON file:
//
//   {
//     "characteristics": [
//       { "name": "intent",
//         "possible_values": [ { "id": 1, "value": "purchase" },
//                              { "id": 2, "value": "support" } ] }
//     ],
//     "vocabulary": [ { "id": 1, "text": "buy" } ],        (optional)
//     "calls": [
//       { "text": "please buy now", "labels": { "intent": "purchase" } }
//     ]
//   }
//
// Labels name a value by its text; they are resolved against the
// declared characteristics here so the core only ever sees typed
// CharacteristicValues.

use std::collections::BTreeMap;
use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::domain::characteristic::Characteristic;
use crate::domain::incoming_call::IncomingCall;
use crate::domain::traits::CatalogSource;
use crate::domain::vocabulary::{Vocabulary, VocabularyWord};

#[derive(Debug, Deserialize)]
struct RawCatalog {
    characteristics: Vec<Characteristic>,
    #[serde(default)]
    vocabulary:      Option<Vec<VocabularyWord>>,
    #[serde(default)]
    calls:           Vec<RawCall>,
}

#[derive(Debug, Deserialize)]
struct RawCall {
    text:   String,
    #[serde(default)]
    labels: BTreeMap<String, String>,
}

/// A catalog read from a single JSON file.
pub struct JsonCatalog {
    raw: RawCatalog,
}

impl JsonCatalog {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read catalog '{}'", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("Invalid catalog '{}'", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawCatalog = serde_json::from_str(json)?;
        if raw.characteristics.is_empty() {
            bail!("catalog declares no characteristics");
        }
        tracing::debug!(
            "Catalog parsed: {} characteristics, {} calls",
            raw.characteristics.len(),
            raw.calls.len()
        );
        Ok(Self { raw })
    }
}

impl CatalogSource for JsonCatalog {
    fn characteristics(&self) -> Result<Vec<Characteristic>> {
        Ok(self.raw.characteristics.clone())
    }

    fn vocabulary(&self) -> Result<Option<Vocabulary>> {
        match &self.raw.vocabulary {
            Some(words) => Ok(Some(Vocabulary::new(words.clone())?)),
            None        => Ok(None),
        }
    }

    fn incoming_calls(&self) -> Result<Vec<IncomingCall>> {
        let characteristics = &self.raw.characteristics;

        self.raw
            .calls
            .iter()
            .map(|raw| {
                let mut call = IncomingCall::new(raw.text.clone());
                for (name, label) in &raw.labels {
                    let Some(characteristic) = characteristics.iter().find(|c| &c.name == name) else {
                        bail!("call '{}' is labeled for unknown characteristic '{}'", raw.text, name);
                    };
                    let Some(value) = characteristic.value_by_name(label) else {
                        bail!(
                            "call '{}' uses unknown value '{}' for characteristic '{}'",
                            raw.text, label, name
                        );
                    };
                    call = call.with_label(characteristic, value.clone());
                }
                Ok(call)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "characteristics": [
            { "name": "intent",
              "possible_values": [ { "id": 1, "value": "purchase" },
                                   { "id": 2, "value": "support" } ] }
        ],
        "vocabulary": [ { "id": 1, "text": "buy" }, { "id": 2, "text": "cancel" } ],
        "calls": [
            { "text": "please buy now",   "labels": { "intent": "purchase" } },
            { "text": "cancel my refund", "labels": { "intent": "support" } }
        ]
    }"#;

    #[test]
    fn test_parses_catalog() {
        let catalog = JsonCatalog::from_json(CATALOG).unwrap();
        let characteristics = catalog.characteristics().unwrap();
        assert_eq!(characteristics[0].name, "intent");

        let vocabulary = catalog.vocabulary().unwrap().unwrap();
        assert_eq!(vocabulary.len(), 2);

        let calls = catalog.incoming_calls().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].value_for(&characteristics[0]).unwrap().id, 2);
    }

    #[test]
    fn test_vocabulary_is_optional() {
        let json = r#"{ "characteristics": [ { "name": "c", "possible_values": [] } ] }"#;
        let catalog = JsonCatalog::from_json(json).unwrap();
        assert!(catalog.vocabulary().unwrap().is_none());
        assert!(catalog.incoming_calls().unwrap().is_empty());
    }

    #[test]
    fn test_rejects_unknown_label_value() {
        let json = CATALOG.replace("\"support\" } }", "\"refunds\" } }");
        let catalog = JsonCatalog::from_json(&json).unwrap();
        assert!(catalog.incoming_calls().is_err());
    }

    #[test]
    fn test_rejects_empty_characteristics() {
        assert!(JsonCatalog::from_json(r#"{ "characteristics": [] }"#).is_err());
    }
}
