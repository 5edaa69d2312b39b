// ============================================================
// Layer 5 — Logistic Regression Model
// ============================================================
// The fitted multinomial classifier:
//
//   scores = X · coefᵀ + intercept        [n, classes]
//   proba  = row-wise softmax(scores)
//   label  = classes[argmax(scores)]
//
// `classes` holds the sorted distinct labels seen in training,
// so column c of the scores belongs to label classes[c].
// Prediction is a pure function of these arrays: no caches,
// no hidden state, identical output after a save/load cycle.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::domain::error::PipelineError;
use crate::domain::hyperparams::Hyperparameters;
use crate::domain::traits::Classifier;

#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegression {
    coef:            Array2<f64>,
    intercept:       Array1<f64>,
    classes:         Vec<usize>,
    hyperparameters: Hyperparameters,
    n_iter:          usize,
    converged:       bool,
}

impl LogisticRegression {
    /// Assemble a model, checking that the arrays agree in shape.
    pub fn from_parts(
        coef:            Array2<f64>,
        intercept:       Array1<f64>,
        classes:         Vec<usize>,
        hyperparameters: Hyperparameters,
        n_iter:          usize,
        converged:       bool,
    ) -> Result<Self, String> {
        if classes.len() < 2 {
            return Err(format!("need at least 2 classes, got {}", classes.len()));
        }
        if coef.nrows() != classes.len() {
            return Err(format!(
                "coefficient rows ({}) do not match class count ({})",
                coef.nrows(),
                classes.len()
            ));
        }
        if intercept.len() != classes.len() {
            return Err(format!(
                "intercept length ({}) does not match class count ({})",
                intercept.len(),
                classes.len()
            ));
        }
        if classes.windows(2).any(|w| w[0] >= w[1]) {
            return Err("class labels are not strictly increasing".to_string());
        }
        Ok(Self { coef, intercept, classes, hyperparameters, n_iter, converged })
    }

    pub fn coef(&self) -> ArrayView2<'_, f64> {
        self.coef.view()
    }

    pub fn intercept(&self) -> ArrayView1<'_, f64> {
        self.intercept.view()
    }

    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyperparameters
    }

    /// Solver iterations used during fitting.
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    /// Whether the solver met its tolerance within max_iter.
    pub fn converged(&self) -> bool {
        self.converged
    }

    fn check_shape(&self, x: &ArrayView2<'_, f64>) -> Result<(), PipelineError> {
        if x.ncols() != self.n_features() {
            return Err(PipelineError::ShapeMismatch {
                expected: self.n_features(),
                found:    x.ncols(),
            });
        }
        Ok(())
    }

    /// Raw class scores, one column per entry of `classes()`.
    pub fn decision_function(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, PipelineError> {
        self.check_shape(&x)?;
        Ok(x.dot(&self.coef.t()) + &self.intercept)
    }

    /// Class probabilities, each row sums to 1.
    pub fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, PipelineError> {
        let mut scores = self.decision_function(x)?;
        for mut row in scores.axis_iter_mut(Axis(0)) {
            let max = row.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
            row.mapv_inplace(|v| (v - max).exp());
            let sum = row.sum();
            row /= sum;
        }
        Ok(scores)
    }

    /// Mean accuracy of `predict(x)` against `y`.
    pub fn score(&self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, usize>) -> Result<f64, PipelineError> {
        let predictions = self.predict(x)?;
        if predictions.len() != y.len() {
            return Err(PipelineError::LengthMismatch {
                rows:   predictions.len(),
                labels: y.len(),
            });
        }
        if y.is_empty() {
            return Ok(0.0);
        }
        let correct = predictions.iter().zip(y.iter()).filter(|(p, t)| p == t).count();
        Ok(correct as f64 / y.len() as f64)
    }
}

impl Classifier for LogisticRegression {
    fn n_features(&self) -> usize {
        self.coef.ncols()
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<usize>, PipelineError> {
        let scores = self.decision_function(x)?;
        Ok(scores
            .outer_iter()
            .map(|row| self.classes[argmax(row)])
            .collect())
    }
}

/// Index of the largest value; the first one wins on ties.
fn argmax(row: ArrayView1<'_, f64>) -> usize {
    let mut best = 0;
    for (i, &v) in row.iter().enumerate() {
        if v > row[best] {
            best = i;
        }
    }
    best
}
