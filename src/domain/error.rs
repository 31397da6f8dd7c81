// ============================================================
// Layer 3 — Classifier Error Taxonomy
// ============================================================
// Every failure the classifier core can report. The application
// and CLI layers wrap these in anyhow; the library never does.
//
// Recovery policy:
//   InvalidArgument / CorruptModel → rebuild the Recognizer
//   DecodeMismatch                 → internal invariant broken, propagate
//   RuntimeShutdown                → process is tearing down, stop

use thiserror::Error;

/// Root error type for the classifier core.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Malformed or missing construction inputs.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A persisted network is unreadable or does not fit the
    /// vocabulary / characteristic it is being restored for.
    #[error("corrupt model: {0}")]
    CorruptModel(String),

    /// The arg-max coordinate of a network output has no matching value.
    #[error("output coordinate {id} has no value in characteristic '{characteristic}'")]
    DecodeMismatch { characteristic: String, id: u32 },

    /// The numeric runtime was torn down.
    #[error("numeric runtime has been shut down")]
    RuntimeShutdown,

    /// The numeric runtime was used before `runtime::init`.
    #[error("numeric runtime has not been initialised")]
    RuntimeNotInitialized,

    /// Iteration ceiling reached while the error was still above threshold.
    #[error("training did not converge after {iterations} iterations (error {error:.4})")]
    DidNotConverge { iterations: usize, error: f64 },

    /// A cancellation token stopped the training loop.
    #[error("training cancelled after {iterations} iterations")]
    Cancelled { iterations: usize },

    #[error("worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
