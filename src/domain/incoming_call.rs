// ============================================================
// Layer 3 — IncomingCall
// ============================================================
// A labeled free-text record. The same call can be labeled for
// several characteristics at once, so labels are keyed by the
// characteristic's name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::characteristic::{Characteristic, CharacteristicValue};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomingCall {
    pub text:   String,
    #[serde(default)]
    pub labels: BTreeMap<String, CharacteristicValue>,
}

impl IncomingCall {
    /// An unlabeled call, as seen at recognition time.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), labels: BTreeMap::new() }
    }

    /// Builder-style labeling: `IncomingCall::new("...").with_label(&c, v)`.
    pub fn with_label(mut self, characteristic: &Characteristic, value: CharacteristicValue) -> Self {
        self.labels.insert(characteristic.name.clone(), value);
        self
    }

    pub fn value_for(&self, characteristic: &Characteristic) -> Option<&CharacteristicValue> {
        self.labels.get(&characteristic.name)
    }
}
