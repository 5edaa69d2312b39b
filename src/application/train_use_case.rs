// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the hyperparameter file   (Layer 6 - infra)
//   Step 2: Load the digits corpus         (Layer 4 - data)
//   Step 3: Optional hold-out split        (Layer 4 - data)
//   Step 4: Fit the classifier             (Layer 5 - ml)
//   Step 5: Score on train / hold-out      (Layer 5 - ml)
//   Step 6: Save the model artifact        (Layer 6 - infra)
//
// Each completed step advances the StageTracker:
//   Idle → ConfigLoaded → DataLoaded → Trained → Persisted
//
// A failure at any step aborts the run; nothing after it runs
// and no partial artifact is written.
//
// Reference: Rust Book §13 (Iterators and Closures)

use std::path::{Path, PathBuf};

use crate::data::digits::DigitsSource;
use crate::domain::error::PipelineError;
use crate::domain::stage::{PipelineStage, StageTracker};
use crate::domain::traits::{DatasetSource, Persistable};
use crate::infra::checkpoint::ModelStore;
use crate::infra::config::{load_config, DEFAULT_CONFIG_PATH};
use crate::ml::inferencer::evaluate;
use crate::ml::model::LogisticRegression;
use crate::ml::objective::FitSummary;
use crate::ml::trainer::train;

pub const DEFAULT_MODEL_PATH: &str = "model_train.bin";
pub const DEFAULT_SPLIT_SEED: u64  = 42;

// ─── Training Settings ───────────────────────────────────────────────────────
// Where to read from and write to. The hyperparameters
// themselves live in the config file, not here.
#[derive(Debug, Clone)]
pub struct TrainSettings {
    pub config_path: PathBuf,
    pub model_path:  PathBuf,
    /// Fraction of rows held out for evaluation, in [0, 1)
    pub holdout:     f64,
    pub split_seed:  u64,
}

impl Default for TrainSettings {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            model_path:  PathBuf::from(DEFAULT_MODEL_PATH),
            holdout:     0.0,
            split_seed:  DEFAULT_SPLIT_SEED,
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub model:            LogisticRegression,
    pub summary:          FitSummary,
    pub train_samples:    usize,
    pub train_accuracy:   f64,
    /// None when no hold-out split was requested
    pub holdout_accuracy: Option<f64>,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    settings: TrainSettings,
    source:   Box<dyn DatasetSource>,
    store:    ModelStore,
}

impl TrainUseCase {
    /// Train on the bundled digits corpus.
    pub fn new(settings: TrainSettings) -> Self {
        Self::with_source(settings, Box::new(DigitsSource))
    }

    pub fn with_source(settings: TrainSettings, source: Box<dyn DatasetSource>) -> Self {
        Self { settings, source, store: ModelStore::new() }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainReport, PipelineError> {
        let cfg = &self.settings;
        let mut stage = StageTracker::train();

        // ── Step 1: Load the hyperparameter file ──────────────────────────────
        tracing::info!("Loading configuration from: {}", cfg.config_path.display());
        let config = load_config(&cfg.config_path)?;
        tracing::info!("Configuration loaded.");
        tracing::info!("Model Parameters: {}", config);
        stage.advance(PipelineStage::ConfigLoaded);

        // ── Step 2: Load the dataset ──────────────────────────────────────────
        tracing::info!("Loading digits dataset...");
        let dataset = self.source.load()?;
        tracing::info!("Dataset loaded with {} samples.", dataset.n_samples());
        stage.advance(PipelineStage::DataLoaded);

        // ── Step 3: Hold-out split ────────────────────────────────────────────
        let (train_set, holdout_set) = if cfg.holdout > 0.0 {
            let (train_set, holdout_set) = dataset.split(cfg.holdout, cfg.split_seed);
            tracing::info!(
                "Split: {} train, {} hold-out (seed {})",
                train_set.n_samples(),
                holdout_set.n_samples(),
                cfg.split_seed
            );
            (train_set, Some(holdout_set).filter(|h| !h.is_empty()))
        } else {
            (dataset, None)
        };

        // ── Step 4: Fit ───────────────────────────────────────────────────────
        tracing::info!("Training Logistic Regression model...");
        let trained = train(train_set.features(), train_set.targets(), &config)?;
        tracing::info!(
            "Model training complete ({} iterations, final loss {:.6}).",
            trained.summary.n_iter,
            trained.summary.final_loss
        );
        stage.advance(PipelineStage::Trained);

        // ── Step 5: Score ─────────────────────────────────────────────────────
        let train_accuracy = trained.model.score(train_set.features(), train_set.targets())?;
        tracing::info!("Training accuracy: {:.4}", train_accuracy);

        let holdout_accuracy = match &holdout_set {
            Some(h) => {
                let eval = evaluate(&trained.model, h.features(), h.targets())?;
                tracing::info!("Hold-out accuracy: {:.4} on {} samples", eval.accuracy(), h.n_samples());
                Some(eval.accuracy())
            }
            None => None,
        };

        // ── Step 6: Save ──────────────────────────────────────────────────────
        tracing::info!("Saving trained model to: {}", cfg.model_path.display());
        self.store.save(&trained.model, &cfg.model_path)?;
        tracing::info!("Model saved.");
        stage.advance(PipelineStage::Persisted);

        Ok(TrainReport {
            model:         trained.model,
            summary:       trained.summary,
            train_samples: train_set.n_samples(),
            train_accuracy,
            holdout_accuracy,
        })
    }
}

/// Load the config at `config_path`, fit on the digits corpus,
/// and save the model to `model_path`.
pub fn train_and_save_model(
    config_path: &Path,
    model_path:  &Path,
) -> Result<LogisticRegression, PipelineError> {
    let settings = TrainSettings {
        config_path: config_path.to_path_buf(),
        model_path:  model_path.to_path_buf(),
        ..TrainSettings::default()
    };
    TrainUseCase::new(settings).execute().map(|report| report.model)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::Dataset;
    use crate::data::digits::load_digits;
    use ndarray::{Array1, Array2};
    use std::fs;

    /// Two tight clusters per label, labels 0..3.
    struct BlobSource;

    impl DatasetSource for BlobSource {
        fn load(&self) -> Result<Dataset, PipelineError> {
            let centres = [[0.0, 0.0], [5.0, 0.0], [0.0, 5.0]];
            let mut rows = Vec::new();
            let mut labels = Vec::new();
            for (label, c) in centres.iter().enumerate() {
                for k in 0..10 {
                    let jitter = k as f64 * 0.05;
                    rows.extend_from_slice(&[c[0] + jitter, c[1] - jitter]);
                    labels.push(label);
                }
            }
            let x = Array2::from_shape_vec((labels.len(), 2), rows)
                .map_err(|e| PipelineError::InvalidTrainingData(e.to_string()))?;
            Dataset::new(x, Array1::from(labels))
        }
    }

    fn settings(dir: &tempfile::TempDir, config: &str) -> TrainSettings {
        let config_path = dir.path().join("config.json");
        fs::write(&config_path, config).unwrap();
        TrainSettings {
            config_path,
            model_path: dir.path().join("out").join("model.bin"),
            ..TrainSettings::default()
        }
    }

    #[test]
    fn test_train_and_save_digits() {
        let dir = tempfile::tempdir().unwrap();
        let s = settings(&dir, r#"{"C": 1.0, "solver": "lbfgs", "max_iter": 100}"#);

        let model = train_and_save_model(&s.config_path, &s.model_path).unwrap();
        let restored = ModelStore::new().load(&s.model_path).unwrap();
        assert_eq!(restored, model);

        let digits = load_digits().unwrap();
        assert!(restored.score(digits.features(), digits.targets()).unwrap() > 0.95);
    }

    #[test]
    fn test_report_without_holdout() {
        let dir = tempfile::tempdir().unwrap();
        let s = settings(&dir, r#"{"C": 10.0}"#);
        let report = TrainUseCase::with_source(s, Box::new(BlobSource)).execute().unwrap();
        assert_eq!(report.train_samples, 30);
        assert_eq!(report.train_accuracy, 1.0);
        assert!(report.holdout_accuracy.is_none());
    }

    #[test]
    fn test_report_with_holdout() {
        let dir = tempfile::tempdir().unwrap();
        let s = TrainSettings { holdout: 0.2, ..settings(&dir, r#"{"C": 10.0, "solver": "sag"}"#) };
        let report = TrainUseCase::with_source(s, Box::new(BlobSource)).execute().unwrap();
        assert_eq!(report.train_samples, 24);
        assert_eq!(report.holdout_accuracy, Some(1.0));
    }

    #[test]
    fn test_missing_config_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.bin");
        let err = train_and_save_model(&dir.path().join("absent.json"), &model_path).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigNotFound { .. }));
        assert!(!model_path.exists());
    }

    #[test]
    fn test_bad_hyperparameter_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let s = settings(&dir, r#"{"solver": "newton-cg"}"#);
        let err = TrainUseCase::with_source(s.clone(), Box::new(BlobSource)).execute().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidHyperparameter { ref name, .. } if name == "solver"));
        assert!(!s.model_path.exists());
    }
}
