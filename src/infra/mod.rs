// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by the application layer:
//
//   model_store.rs — Model directory persistence
//                    Network snapshots per characteristic plus
//                    the vocabulary, characteristics and the
//                    TrainConfig used to produce them.
//
//   metrics.rs     — Training metrics logging
//                    One CSV row per trained characteristic.
//
//   progress.rs    — Progress reporting
//                    Observer that turns recognizer messages
//                    into tracing events.

/// Model directory saving and loading
pub mod model_store;

/// Training metrics CSV logger
pub mod metrics;

/// Observer bridge to tracing
pub mod progress;
