// ============================================================
// Layer 3 — Characteristic Domain Types
// ============================================================
// A Characteristic is one classification axis ("call topic",
// "intent", ...) and its possible values are the discrete
// outcomes a recognizer chooses between.
//
// Value ids double as 1-based coordinates of the one-hot output
// vector, so a characteristic with N values is expected to carry
// ids 1..=N.

use serde::{Deserialize, Serialize};

/// One discrete outcome of a characteristic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacteristicValue {
    pub id:    u32,
    pub value: String,
}

impl CharacteristicValue {
    pub fn new(id: u32, value: impl Into<String>) -> Self {
        Self { id, value: value.into() }
    }
}

/// A classification target together with its ordered outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristic {
    pub name:            String,
    pub possible_values: Vec<CharacteristicValue>,
}

impl Characteristic {
    pub fn new(name: impl Into<String>, possible_values: Vec<CharacteristicValue>) -> Self {
        Self { name: name.into(), possible_values }
    }

    pub fn value_by_id(&self, id: u32) -> Option<&CharacteristicValue> {
        self.possible_values.iter().find(|v| v.id == id)
    }

    pub fn value_by_name(&self, value: &str) -> Option<&CharacteristicValue> {
        self.possible_values.iter().find(|v| v.value == value)
    }

    /// Number of output neurons a recognizer for this characteristic needs.
    pub fn arity(&self) -> usize {
        self.possible_values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent() -> Characteristic {
        Characteristic::new(
            "intent",
            vec![
                CharacteristicValue::new(1, "purchase"),
                CharacteristicValue::new(2, "support"),
            ],
        )
    }

    #[test]
    fn test_value_lookup() {
        let c = intent();
        assert_eq!(c.value_by_id(2).map(|v| v.value.as_str()), Some("support"));
        assert_eq!(c.value_by_name("purchase").map(|v| v.id), Some(1));
        assert!(c.value_by_id(3).is_none());
        assert_eq!(c.arity(), 2);
    }
}
