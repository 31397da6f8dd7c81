// ============================================================
// Layer 5 — Network Snapshot Format
// ============================================================
// A trained network is persisted as one JSON document:
//
//   {
//     "format":         "nn-text-classifier/network",
//     "version":        1,
//     "characteristic": "intent",
//     "topology":       { "input": 3, "hidden": 1, "output": 2 },
//     "hidden_weight":  [...],   row-major [input, hidden]
//     "hidden_bias":    [...],
//     "output_weight":  [...],   row-major [hidden, output]
//     "output_bias":    [...]
//   }
//
// Anything unreadable, of another format or version, or with
// lengths that disagree with the topology is a CorruptModel.

use std::io::{Read, Write};

use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::error::{ClassifierError, Result};
use crate::ml::network::{FlatWeights, TextNetwork, Topology};

pub const SNAPSHOT_FORMAT: &str = "nn-text-classifier/network";
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub format:         String,
    pub version:        u32,
    pub characteristic: String,
    #[serde(flatten)]
    pub weights:        FlatWeights,
}

impl NetworkSnapshot {
    pub fn capture<B: Backend>(network: &TextNetwork<B>, characteristic: &str) -> Self {
        Self {
            format:         SNAPSHOT_FORMAT.to_string(),
            version:        SNAPSHOT_VERSION,
            characteristic: characteristic.to_string(),
            weights:        network.to_flat(),
        }
    }

    pub fn topology(&self) -> Topology {
        self.weights.topology
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, self).map_err(std::io::Error::from)?;
        Ok(())
    }

    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        let snapshot: Self = serde_json::from_reader(reader)
            .map_err(|e| ClassifierError::CorruptModel(format!("unreadable snapshot: {e}")))?;

        if snapshot.format != SNAPSHOT_FORMAT {
            return Err(ClassifierError::CorruptModel(format!(
                "unknown snapshot format '{}'", snapshot.format
            )));
        }
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(ClassifierError::CorruptModel(format!(
                "unsupported snapshot version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }

        Ok(snapshot)
    }

    pub fn into_network<B: Backend>(self, device: &B::Device) -> Result<TextNetwork<B>> {
        TextNetwork::from_flat(self.weights, device)
    }
}
