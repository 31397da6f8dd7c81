// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, traits and the error taxonomy that define
// what the classifier talks about. No burn types, no file I/O.
//
// Think of this layer as the "dictionary" of the system —
// it defines what things ARE, not how they work.

// Error taxonomy shared by every layer of the core
pub mod error;

// Known words and their vector coordinates
pub mod vocabulary;

// Classification targets and their outcomes
pub mod characteristic;

// Labeled free-text records
pub mod incoming_call;

// Core abstractions (traits) that other layers implement
pub mod traits;
