// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Runs a fitted classifier over a labelled feature matrix and
// scores the predictions:
//
//   x ──predict──▶ ŷ ──compare with y──▶ ClassificationReport
//
// Checks happen before any prediction work:
//   1. x has the column count the model was trained on
//   2. x has one row per label in y
//
// The Inferencer wraps a model restored from disk; `evaluate`
// works on anything implementing Classifier.

use std::path::Path;

use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::domain::error::PipelineError;
use crate::domain::traits::{Classifier, Persistable};
use crate::ml::model::LogisticRegression;
use crate::ml::report::ClassificationReport;

/// Predictions for one batch plus how good they were.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub predictions: Array1<usize>,
    pub report:      ClassificationReport,
}

impl Evaluation {
    pub fn accuracy(&self) -> f64 {
        self.report.accuracy
    }
}

/// Predict every row of `x` and compare against `y_true`.
pub fn evaluate<C: Classifier>(
    model:  &C,
    x:      ArrayView2<'_, f64>,
    y_true: ArrayView1<'_, usize>,
) -> Result<Evaluation, PipelineError> {
    if x.ncols() != model.n_features() {
        return Err(PipelineError::ShapeMismatch {
            expected: model.n_features(),
            found:    x.ncols(),
        });
    }
    if x.nrows() != y_true.len() {
        return Err(PipelineError::LengthMismatch { rows: x.nrows(), labels: y_true.len() });
    }

    let predictions = model.predict(x)?;
    let report = ClassificationReport::from_predictions(y_true, predictions.view());
    tracing::debug!(
        "Evaluated {} samples, accuracy {:.4}",
        report.total,
        report.accuracy
    );
    Ok(Evaluation { predictions, report })
}

/// A model restored from an artifact file, ready to evaluate.
pub struct Inferencer {
    model: LogisticRegression,
}

impl Inferencer {
    pub fn new(model: LogisticRegression) -> Self {
        Self { model }
    }

    /// Load the artifact at `path` through `store`.
    pub fn from_checkpoint<S>(store: &S, path: &Path) -> Result<Self, PipelineError>
    where
        S: Persistable<LogisticRegression>,
    {
        let model = store.load(path)?;
        tracing::info!(
            "Model loaded from '{}' ({} classes, {} features)",
            path.display(),
            model.classes().len(),
            model.n_features()
        );
        Ok(Self { model })
    }

    pub fn model(&self) -> &LogisticRegression {
        &self.model
    }

    pub fn evaluate(
        &self,
        x:      ArrayView2<'_, f64>,
        y_true: ArrayView1<'_, usize>,
    ) -> Result<Evaluation, PipelineError> {
        evaluate(&self.model, x, y_true)
    }
}
