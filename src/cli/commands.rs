// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `infer`
// and their flags. Every flag is optional; the defaults are
// the fixed paths relative to the working directory.
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::application::train_use_case::{TrainSettings, DEFAULT_MODEL_PATH, DEFAULT_SPLIT_SEED};
use crate::infra::config::DEFAULT_CONFIG_PATH;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fit a model from the config file and save it
    Train(TrainArgs),

    /// Evaluate a saved model on the digits corpus
    Infer(InferArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// JSON file with the hyperparameters
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Where to write the trained model
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,

    /// Write per-iteration loss and gradient norm to this CSV
    #[arg(long)]
    pub metrics_csv: Option<PathBuf>,

    /// Fraction of samples held out to report unseen accuracy
    #[arg(long, default_value_t = 0.0, value_parser = parse_holdout)]
    pub holdout: f64,

    /// Shuffle seed for the hold-out split
    #[arg(long, default_value_t = DEFAULT_SPLIT_SEED)]
    pub split_seed: u64,
}

/// Convert CLI TrainArgs into the application-layer TrainSettings.
impl From<&TrainArgs> for TrainSettings {
    fn from(a: &TrainArgs) -> Self {
        TrainSettings {
            config_path: a.config.clone(),
            model_path:  a.model.clone(),
            holdout:     a.holdout,
            split_seed:  a.split_seed,
        }
    }
}

/// All arguments for the `infer` command
#[derive(Args, Debug)]
pub struct InferArgs {
    /// Model file written by `train`
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,
}

fn parse_holdout(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if (0.0..1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("must be in [0, 1), got {value}"))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_defaults() {
        let cli = Cli::try_parse_from(["digits-classifier", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        assert_eq!(args.config, PathBuf::from("config/config.json"));
        assert_eq!(args.model, PathBuf::from("model_train.bin"));
        assert_eq!(args.holdout, 0.0);
        assert!(args.metrics_csv.is_none());
    }

    #[test]
    fn test_infer_override() {
        let cli = Cli::try_parse_from(["digits-classifier", "infer", "--model", "out/m.bin"]).unwrap();
        let Commands::Infer(args) = cli.command else { panic!("expected infer") };
        assert_eq!(args.model, PathBuf::from("out/m.bin"));
    }

    #[test]
    fn test_holdout_range() {
        assert_eq!(parse_holdout("0.25"), Ok(0.25));
        assert!(parse_holdout("1.0").is_err());
        assert!(parse_holdout("-0.1").is_err());
        assert!(parse_holdout("half").is_err());
        assert!(Cli::try_parse_from(["digits-classifier", "train", "--holdout", "2"]).is_err());
    }
}
