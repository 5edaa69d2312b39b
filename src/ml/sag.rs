// ============================================================
// Layer 5 — Stochastic Average Gradient Solver
// ============================================================
// SAG keeps the last gradient seen for every sample and steps
// along their running average, so each update costs one sample
// but uses information from all of them.
//
// For softmax regression the per-sample gradient is the outer
// product r_i ⊗ x_i with r_i = softmax(W·x_i + b) − onehot(y_i),
// so only the residual r_i (one value per class) is stored.
//
//   step = 1 / L,  L = 0.5 · (max_i ||x_i||² + fit_intercept) + α
//
// One epoch = n random draws (with replacement) from a StdRng
// seeded by random_state. After each epoch:
//   converged when max |Δθ| / max |θ| ≤ tol
//
// Reference: Schmidt, Le Roux & Bach (2017) Minimizing finite
//            sums with the stochastic average gradient

use ndarray::{Array1, Array2, ArrayView1, Axis, Zip};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::infra::metrics::IterationMetrics;
use crate::ml::objective::{max_abs, FitSummary, SoftmaxObjective, SolverOutput};

#[derive(Debug, Clone)]
pub struct SagOptions {
    /// Maximum number of epochs
    pub max_iter: usize,
    pub tol:      f64,
    pub seed:     u64,
}

/// Fit the objective's parameters with SAG, starting from zeros.
pub fn minimize(objective: &SoftmaxObjective<'_>, opts: &SagOptions) -> SolverOutput {
    let x = objective.x();
    let y = objective.y();
    let (n, k) = (x.nrows(), objective.n_classes());
    let alpha = objective.alpha();
    let fit_intercept = objective.fit_intercept();

    let mut coef      = Array2::<f64>::zeros((k, objective.n_features()));
    let mut intercept = Array1::<f64>::zeros(k);

    let max_sq = x
        .outer_iter()
        .map(|row| row.dot(&row))
        .fold(0.0_f64, f64::max);
    let lipschitz = 0.5 * (max_sq + if fit_intercept { 1.0 } else { 0.0 }) + alpha;
    let step = 1.0 / lipschitz;
    tracing::debug!("sag step size {:.3e} (max ||x||² = {:.1})", step, max_sq);

    // Stored residual per sample, and their running sums
    let mut memory        = Array2::<f64>::zeros((n, k));
    let mut seen          = vec![false; n];
    let mut n_seen        = 0usize;
    let mut sum_coef      = Array2::<f64>::zeros(coef.dim());
    let mut sum_intercept = Array1::<f64>::zeros(k);

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut history = Vec::new();
    let mut converged = false;
    let mut n_iter = 0;

    while !converged && n_iter < opts.max_iter && n > 0 {
        n_iter += 1;
        let previous = objective.pack(&coef, &intercept);

        for _ in 0..n {
            let i = rng.gen_range(0..n);
            let xi = x.row(i);

            let residual = sample_residual(&coef, &intercept, xi, y[i], fit_intercept);
            // Swap sample i's old gradient for the new one in the
            // running sums without touching the other n − 1
            let delta = &residual - &memory.row(i);

            for (c, mut sum_row) in sum_coef.axis_iter_mut(Axis(0)).enumerate() {
                sum_row.scaled_add(delta[c], &xi);
            }
            sum_intercept += &delta;
            memory.row_mut(i).assign(&residual);

            if !seen[i] {
                seen[i] = true;
                n_seen += 1;
            }

            // Average over samples seen so far, not n: early in the
            // first epoch most memory rows are still zero
            let scale = step / n_seen as f64;
            // L2 shrink on the weights only, the intercept is free
            if alpha > 0.0 {
                coef *= 1.0 - step * alpha;
            }
            coef.scaled_add(-scale, &sum_coef);
            if fit_intercept {
                intercept.scaled_add(-scale, &sum_intercept);
            }
        }

        let current = objective.pack(&coef, &intercept);
        let (loss, grad) = objective.value_and_gradient(current.view());
        let grad_max = max_abs(grad.view());
        history.push(IterationMetrics::new(n_iter, loss, grad_max));

        let max_change = Zip::from(&current)
            .and(&previous)
            .fold(0.0_f64, |m, &a, &b| m.max((a - b).abs()));
        let max_weight = max_abs(current.view());
        tracing::trace!("sag epoch {:>4} loss={:.6} Δ={:.3e}", n_iter, loss, max_change);

        // All-zero weights after a zero move means nothing to learn
        converged = if max_weight > 0.0 {
            max_change / max_weight <= opts.tol
        } else {
            max_change == 0.0
        };
    }

    let theta = objective.pack(&coef, &intercept);
    let final_loss = history
        .last()
        .map(|m: &IterationMetrics| m.loss)
        .unwrap_or_else(|| objective.value(theta.view()));

    SolverOutput {
        theta,
        summary: FitSummary { n_iter, converged, final_loss, history },
    }
}

/// softmax(W·x + b) − onehot(target) for a single sample.
fn sample_residual(
    coef:          &Array2<f64>,
    intercept:     &Array1<f64>,
    xi:            ArrayView1<'_, f64>,
    target:        usize,
    fit_intercept: bool,
) -> Array1<f64> {
    let mut z = coef.dot(&xi);
    if fit_intercept {
        z += intercept;
    }
    let max = z.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
    z.mapv_inplace(|v| (v - max).exp());
    let sum = z.sum();
    z /= sum;
    z[target] -= 1.0;
    z
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable() -> (Array2<f64>, Vec<usize>) {
        let x = array![
            [0.0, 0.1], [0.2, 0.0], [0.1, 0.3],
            [1.0, 0.9], [0.9, 1.1], [1.2, 1.0],
        ];
        (x, vec![0, 0, 0, 1, 1, 1])
    }

    #[test]
    fn test_sample_residual_sums_to_zero() {
        let coef = array![[0.5, -0.2], [0.1, 0.3], [-0.4, 0.0]];
        let intercept = array![0.1, 0.0, -0.1];
        let r = sample_residual(&coef, &intercept, array![1.0, 2.0].view(), 1, true);
        assert!(r.sum().abs() < 1e-12);
        assert!(r[1] < 0.0);
    }

    #[test]
    fn test_reduces_loss_on_separable_data() {
        let (x, y) = separable();
        let obj = SoftmaxObjective::new(x.view(), &y, 2, true, 1.0 / 6.0);
        let start = obj.value(Array1::zeros(obj.n_params()).view());
        let out = minimize(&obj, &SagOptions { max_iter: 200, tol: 1e-6, seed: 0 });
        assert!(out.summary.final_loss < start);

        let (coef, intercept) = obj.unpack(out.theta.view());
        let scores = x.dot(&coef.t()) + &intercept;
        for (row, &label) in scores.outer_iter().zip(y.iter()) {
            let predicted = if row[1] > row[0] { 1 } else { 0 };
            assert_eq!(predicted, label);
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let (x, y) = separable();
        let obj = SoftmaxObjective::new(x.view(), &y, 2, true, 0.1);
        let opts = SagOptions { max_iter: 5, tol: 0.0, seed: 9 };
        let a = minimize(&obj, &opts);
        let b = minimize(&obj, &opts);
        assert_eq!(a.theta, b.theta);
        assert_eq!(a.summary.n_iter, 5);
        assert!(!a.summary.converged);
    }
}
