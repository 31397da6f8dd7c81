// ============================================================
// Layer 5 — ML Layer (Burn)
// ============================================================
// All burn-specific code lives here. Other layers only see plain
// vectors and the Recognizer API.
//
//   runtime.rs    — process-wide worker pool with init / shutdown
//   network.rs    — the [input, input/2, output] sigmoid network
//   snapshot.rs   — versioned JSON form of a trained network
//   trainer.rs    — full-batch resilient propagation loop
//   recognizer.rs — one network per characteristic: train,
//                   recognize, save, restore

/// Worker pool lifecycle
pub mod runtime;

/// Network architecture
pub mod network;

/// Network persistence format
pub mod snapshot;

/// Resilient propagation training loop
pub mod trainer;

/// Per-characteristic classifier
pub mod recognizer;
