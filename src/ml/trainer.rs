// ============================================================
// Layer 5 — Trainer
// ============================================================
// Turns (X, y, configuration) into a fitted LogisticRegression.
//
//   1. Configuration → Hyperparameters (allow-listed, validated)
//   2. Check the data: rows == labels, non-empty, ≥ 2 classes
//   3. Map raw labels to class indices 0..k
//   4. Minimise the softmax objective with the chosen solver
//   5. Unpack θ into coef / intercept
//
// Hitting max_iter is NOT an error: the best-effort model is
// returned with converged = false and a warning is logged.
// No disk or network I/O happens here.

use ndarray::{ArrayView1, ArrayView2};

use crate::domain::error::PipelineError;
use crate::domain::hyperparams::{Configuration, Hyperparameters, Solver};
use crate::ml::lbfgs::{self, LbfgsOptions};
use crate::ml::model::LogisticRegression;
use crate::ml::objective::{FitSummary, SoftmaxObjective};
use crate::ml::sag::{self, SagOptions};

const LBFGS_HISTORY:    usize = 10;
const DEFAULT_SAG_SEED: u64   = 0;

/// A fitted model plus how the fit went.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub model:   LogisticRegression,
    pub summary: FitSummary,
}

/// Build hyperparameters from `config` and fit on (x, y).
pub fn train(
    x:      ArrayView2<'_, f64>,
    y:      ArrayView1<'_, usize>,
    config: &Configuration,
) -> Result<TrainedModel, PipelineError> {
    let params = Hyperparameters::from_config(config)?;
    fit(x, y, &params)
}

/// Fit with already-validated hyperparameters.
pub fn fit(
    x:      ArrayView2<'_, f64>,
    y:      ArrayView1<'_, usize>,
    params: &Hyperparameters,
) -> Result<TrainedModel, PipelineError> {
    if x.nrows() != y.len() {
        return Err(PipelineError::LengthMismatch { rows: x.nrows(), labels: y.len() });
    }
    if x.nrows() == 0 {
        return Err(PipelineError::InvalidTrainingData("no samples".to_string()));
    }

    let mut classes: Vec<usize> = y.to_vec();
    classes.sort_unstable();
    classes.dedup();
    if classes.len() < 2 {
        return Err(PipelineError::InvalidTrainingData(format!(
            "need samples from at least 2 classes, got {}",
            classes.len()
        )));
    }

    // Labels are in `classes` by construction, so the search always hits
    let class_index: Vec<usize> = y
        .iter()
        .map(|label| classes.binary_search(label).unwrap_or_default())
        .collect();

    let alpha = params.l2_strength(x.nrows());
    // Reborrow: the objective ties x and class_index to one lifetime,
    // and ndarray views are invariant in theirs
    let objective = SoftmaxObjective::new(x.view(), &class_index, classes.len(), params.fit_intercept, alpha);

    tracing::debug!(
        "Fitting {} classes × {} features with {} (C={}, max_iter={}, tol={:e})",
        classes.len(),
        x.ncols(),
        params.solver,
        params.c,
        params.max_iter,
        params.tol,
    );

    let output = match params.solver {
        Solver::Lbfgs => {
            let opts = LbfgsOptions {
                max_iter: params.max_iter,
                tol:      params.tol,
                history:  LBFGS_HISTORY,
            };
            let theta0 = ndarray::Array1::zeros(objective.n_params());
            lbfgs::minimize(|theta| objective.value_and_gradient(theta), theta0, &opts)
        }
        Solver::Sag => {
            let opts = SagOptions {
                max_iter: params.max_iter,
                tol:      params.tol,
                seed:     params.random_state.unwrap_or(DEFAULT_SAG_SEED),
            };
            sag::minimize(&objective, &opts)
        }
    };

    let summary = output.summary;
    if summary.converged {
        tracing::debug!("{} converged after {} iterations", params.solver, summary.n_iter);
    } else {
        tracing::warn!(
            "ConvergenceWarning: {} failed to converge after {} iterations (max_iter={}). \
             Increase max_iter or scale the features.",
            params.solver,
            summary.n_iter,
            params.max_iter,
        );
    }

    let (coef, intercept) = objective.unpack(output.theta.view());
    let model = LogisticRegression::from_parts(
        coef,
        intercept,
        classes,
        params.clone(),
        summary.n_iter,
        summary.converged,
    )
    .map_err(PipelineError::InvalidTrainingData)?;

    Ok(TrainedModel { model, summary })
}
