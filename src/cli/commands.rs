// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `classify`
// and all their configurable flags.

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;
use crate::data::ngram::NGramKind;
use crate::ml::runtime::DEFAULT_WORKERS;
use crate::ml::trainer::CONVERGENCE_THRESHOLD;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train one recognizer per characteristic from a JSON catalog
    Train(TrainArgs),

    /// Classify a text with previously trained recognizers
    Classify(ClassifyArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// JSON catalog with characteristics and labeled calls
    #[arg(long, default_value = "data/catalog.json")]
    pub catalog: String,

    /// Directory the trained models are written to
    #[arg(long, default_value = "models")]
    pub models_dir: String,

    /// Token extraction: unigram, filtered-unigram, filtered-bigram, char-trigram
    #[arg(long, default_value_t = NGramKind::FilteredUnigram)]
    pub ngram: NGramKind,

    /// Worker threads used for gradient computation
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Training stops once the mean squared error is at or below this
    #[arg(long, default_value_t = CONVERGENCE_THRESHOLD)]
    pub threshold: f64,

    /// Give up after this many iterations (no limit when omitted)
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Share of labeled calls kept aside for evaluation
    #[arg(long, default_value_t = 0.0)]
    pub holdout: f64,

    /// Seed for the split and the initial weights
    #[arg(long)]
    pub seed: Option<u64>,

    /// Drop tokens seen in fewer calls than this when building the vocabulary
    #[arg(long, default_value_t = 1)]
    pub min_frequency: usize,

    /// Keep at most this many of the most frequent tokens
    /// (ignored when the catalog ships its own vocabulary)
    #[arg(long)]
    pub max_vocabulary: Option<usize>,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            catalog_path:     a.catalog,
            models_dir:       a.models_dir,
            ngram:            a.ngram,
            workers:          a.workers,
            threshold:        a.threshold,
            max_iterations:   a.max_iterations,
            holdout_fraction: a.holdout,
            seed:             a.seed,
            min_frequency:    a.min_frequency,
            max_vocabulary:   a.max_vocabulary,
        }
    }
}

/// All arguments for the `classify` command
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// The text of the incoming call
    #[arg(long)]
    pub text: String,

    /// Directory where `train` saved the models
    #[arg(long, default_value = "models")]
    pub models_dir: String,
}
