// ============================================================
// Layer 2 — Infer Use Case
// ============================================================
// Loads a saved model, predicts every row of the dataset and
// scores the predictions:
//
//   Step 1: Load the model artifact   (Layer 6 - infra)
//   Step 2: Load the dataset          (Layer 4 - data)
//   Step 3: Predict + report          (Layer 5 - ml)
//
//   Idle → ModelLoaded → DataLoaded → Evaluated
//
// A missing artifact is an expected outcome (train has not
// been run yet), so it comes back as InferOutcome::ModelMissing
// rather than an error. A file that exists but cannot be read
// or decoded is still an error.

use std::path::PathBuf;

use crate::data::digits::DigitsSource;
use crate::domain::error::PipelineError;
use crate::domain::stage::{PipelineStage, StageTracker};
use crate::domain::traits::DatasetSource;
use crate::infra::checkpoint::ModelStore;
use crate::ml::inferencer::{Evaluation, Inferencer};

#[derive(Debug)]
pub enum InferOutcome {
    Evaluated(Evaluation),
    ModelMissing(PathBuf),
}

pub struct InferUseCase {
    model_path: PathBuf,
    source:     Box<dyn DatasetSource>,
    store:      ModelStore,
}

impl InferUseCase {
    /// Evaluate on the bundled digits corpus.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self::with_source(model_path, Box::new(DigitsSource))
    }

    pub fn with_source(model_path: impl Into<PathBuf>, source: Box<dyn DatasetSource>) -> Self {
        Self { model_path: model_path.into(), source, store: ModelStore::new() }
    }

    pub fn execute(&self) -> Result<InferOutcome, PipelineError> {
        let mut stage = StageTracker::infer();
        tracing::info!("Looking for model at: {}", self.model_path.display());

        tracing::info!("Loading trained model...");
        let inferencer = match Inferencer::from_checkpoint(&self.store, &self.model_path) {
            Ok(inferencer) => inferencer,
            Err(PipelineError::ModelNotFound { path }) => {
                return Ok(InferOutcome::ModelMissing(path));
            }
            Err(e) => return Err(e),
        };
        tracing::info!("Model loaded successfully.");
        stage.advance(PipelineStage::ModelLoaded);

        tracing::info!("Loading dataset for inference...");
        let dataset = self.source.load()?;
        tracing::info!("Dataset loaded with {} samples.", dataset.n_samples());
        stage.advance(PipelineStage::DataLoaded);

        tracing::info!("Generating predictions...");
        let evaluation = inferencer.evaluate(dataset.features(), dataset.targets())?;
        tracing::info!("Predictions generated.");
        stage.advance(PipelineStage::Evaluated);

        Ok(InferOutcome::Evaluated(evaluation))
    }
}
