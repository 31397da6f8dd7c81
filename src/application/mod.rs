// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Coordinates the other layers to accomplish one goal each
// (training from a catalog, or classifying a text).
//
// Rules for this layer:
//   - No network math here (that's Layer 5)
//   - No printing here (that's Layer 1)
//   - File formats belong to Layers 4 and 6
//   - Only workflow coordination

// The training workflow
pub mod train_use_case;

// Restoring trained recognizers and classifying text
pub mod classify_use_case;
