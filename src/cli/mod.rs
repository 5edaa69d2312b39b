// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train` — fits a model from config/config.json and
//                saves it to model_train.bin
//   2. `infer` — loads the saved model and prints a
//                classification report over the digits corpus
//
// Library errors arrive as PipelineError and are wrapped in
// anyhow with a line of context here.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, InferArgs, TrainArgs};

use crate::application::infer_use_case::{InferOutcome, InferUseCase};
use crate::application::train_use_case::TrainUseCase;
use crate::infra::metrics::MetricsLogger;

#[derive(Parser, Debug)]
#[command(
    name = "digits-classifier",
    version,
    about = "Train a logistic regression on the handwritten digits corpus, then evaluate it."
)]
pub struct Cli {
    /// The subcommand to run (train or infer)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args) => run_train(args),
            Commands::Infer(args) => run_infer(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    println!("--- Training Started ---");

    let report = TrainUseCase::new((&args).into())
        .execute()
        .context("Training failed")?;

    if let Some(csv) = &args.metrics_csv {
        let logger = MetricsLogger::create(csv)?;
        logger.log_all(&report.summary.history)?;
        tracing::info!(
            "Wrote {} metric rows to '{}'",
            report.summary.history.len(),
            logger.csv_path().display()
        );
    }

    println!(
        "Trained on {} samples: training accuracy {:.4}",
        report.train_samples, report.train_accuracy
    );
    if let Some(accuracy) = report.holdout_accuracy {
        println!("Hold-out accuracy {accuracy:.4}");
    }

    if !report.summary.converged {
        println!(
            "Warning: solver stopped at max_iter ({}) before converging.",
            report.summary.n_iter
        );
    }
    println!("--- Training Finished Successfully ---");
    Ok(())
}

fn run_infer(args: InferArgs) -> Result<()> {
    println!("--- Inference Started ---");

    let outcome = InferUseCase::new(&args.model)
        .execute()
        .with_context(|| format!("Inference with '{}' failed", args.model.display()))?;

    match outcome {
        InferOutcome::ModelMissing(path) => {
            println!("Error: Model file not found at {}", path.display());
        }
        InferOutcome::Evaluated(evaluation) => {
            println!("\n--- Model Performance Report ---");
            println!("{}", evaluation.report);
            println!("--------------------------------\n");
            println!("--- Inference Finished Successfully ---");
        }
    }
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn cli(args: &[&str]) -> Cli {
        let argv = std::iter::once("digits-classifier").chain(args.iter().copied());
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_infer_without_model_exits_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("model_train.bin");
        let result = cli(&["infer", "--model", missing.to_str().unwrap()]).run();
        assert!(result.is_ok());
        assert!(!missing.exists());
    }

    #[test]
    fn test_infer_with_corrupt_model_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model_train.bin");
        fs::write(&path, b"not a model").unwrap();
        let err = cli(&["infer", "--model", path.to_str().unwrap()]).run().unwrap_err();
        assert!(format!("{err:#}").contains("corrupt"));
    }

    #[test]
    fn test_train_with_missing_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("absent.json");
        let model = dir.path().join("model.bin");
        let err = cli(&[
            "train",
            "--config", config.to_str().unwrap(),
            "--model", model.to_str().unwrap(),
        ])
        .run()
        .unwrap_err();
        assert!(format!("{err:#}").contains("Config file not found"));
        assert!(!model.exists());
    }
}
