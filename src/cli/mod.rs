// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// `clap` and delegates the work to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`    — trains recognizers from a JSON catalog
//   2. `classify` — restores them and labels a text

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{ClassifyArgs, Commands, TrainArgs};

use crate::ml::runtime;

#[derive(Parser, Debug)]
#[command(
    name = "nn-text-classifier",
    version,
    about = "Train neural recognizers for call characteristics, then classify texts."
)]
pub struct Cli {
    /// The subcommand to run (train or classify)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the use case, then release the runtime's workers.
    pub fn run(self) -> Result<()> {
        let outcome = match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Classify(args) => run_classify(args),
        };

        if let Err(e) = runtime::shutdown() {
            tracing::debug!("Runtime shutdown skipped: {e}");
        }
        outcome
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training from catalog: {}", args.catalog);

    let models_dir = args.models_dir.clone();
    let results    = TrainUseCase::new(args.into()).execute()?;

    for m in &results {
        let accuracy = m
            .holdout_accuracy
            .map(|a| format!(", hold-out accuracy {:.1}%", a * 100.0))
            .unwrap_or_default();
        println!(
            "{}RecognizerNeuralNetwork: {} iterations, error {:.4}{}",
            m.characteristic, m.iterations, m.final_error, accuracy
        );
    }
    println!("Training complete. Models saved to '{models_dir}'.");
    Ok(())
}

fn run_classify(args: ClassifyArgs) -> Result<()> {
    use crate::application::classify_use_case::ClassifyUseCase;
    use crate::domain::traits::TextClassifier;

    let classifier = ClassifyUseCase::open(&args.models_dir)?;
    for (characteristic, value) in classifier.classify(&args.text)? {
        println!("{characteristic}: {} (id {})", value.value, value.id);
    }
    Ok(())
}
