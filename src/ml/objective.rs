// ============================================================
// Layer 5 — Softmax Cross-Entropy Objective
// ============================================================
// The function every solver minimises:
//
//   f(W, b) = 1/n Σ_i −log softmax(W·x_i + b)[y_i]
//           + α/2 · ||W||²
//
//   α = 1 / (C · n)   (0 when no penalty is configured)
//
// The intercept b is never penalised.
//
// Gradient, with P the row-wise softmax and Y the one-hot
// labels:
//   ∂f/∂W = (P − Y)ᵀ X / n + α W
//   ∂f/∂b = Σ_i (P − Y)_i / n
//
// Parameters are passed to solvers as one flat vector θ:
//   θ = [ W row-major (classes × features) | b (classes) ]
// where the b block is absent when fit_intercept is false.
//
// Reference: Bishop (2006) §4.3.4 Multiclass logistic regression

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::infra::metrics::IterationMetrics;

// ─── FitSummary ───────────────────────────────────────────────────────────────
/// What a solver reports alongside the fitted parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FitSummary {
    /// Iterations (lbfgs) or epochs (sag) actually run
    pub n_iter:     usize,
    pub converged:  bool,
    pub final_loss: f64,
    /// One entry per iteration, in order
    pub history:    Vec<IterationMetrics>,
}

/// Fitted parameters plus the run summary.
#[derive(Debug, Clone)]
pub struct SolverOutput {
    pub theta:   Array1<f64>,
    pub summary: FitSummary,
}

// ─── SoftmaxObjective ─────────────────────────────────────────────────────────
pub struct SoftmaxObjective<'a> {
    x:             ArrayView2<'a, f64>,
    /// Class index (0..n_classes) for each row, not the raw label
    y:             &'a [usize],
    n_classes:     usize,
    fit_intercept: bool,
    alpha:         f64,
}

impl<'a> SoftmaxObjective<'a> {
    pub fn new(
        x:             ArrayView2<'a, f64>,
        y:             &'a [usize],
        n_classes:     usize,
        fit_intercept: bool,
        alpha:         f64,
    ) -> Self {
        Self { x, y, n_classes, fit_intercept, alpha }
    }

    pub fn x(&self) -> ArrayView2<'a, f64> {
        self.x
    }

    pub fn y(&self) -> &'a [usize] {
        self.y
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn fit_intercept(&self) -> bool {
        self.fit_intercept
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Length of the flat parameter vector θ.
    pub fn n_params(&self) -> usize {
        let coef = self.n_classes * self.n_features();
        if self.fit_intercept { coef + self.n_classes } else { coef }
    }

    /// Split θ into (coef [classes × features], intercept [classes]).
    /// The intercept is all zeros when fit_intercept is false.
    pub fn unpack(&self, theta: ArrayView1<'_, f64>) -> (Array2<f64>, Array1<f64>) {
        let (k, f) = (self.n_classes, self.n_features());
        let coef = Array2::from_shape_fn((k, f), |(c, j)| theta[c * f + j]);
        let intercept = if self.fit_intercept {
            Array1::from_shape_fn(k, |c| theta[k * f + c])
        } else {
            Array1::zeros(k)
        };
        (coef, intercept)
    }

    /// Inverse of `unpack`.
    pub fn pack(&self, coef: &Array2<f64>, intercept: &Array1<f64>) -> Array1<f64> {
        let mut theta: Vec<f64> = coef.iter().copied().collect();
        if self.fit_intercept {
            theta.extend(intercept.iter().copied());
        }
        Array1::from(theta)
    }

    /// Objective value at θ.
    pub fn value(&self, theta: ArrayView1<'_, f64>) -> f64 {
        self.value_and_gradient(theta).0
    }

    /// Objective value and gradient at θ, in one pass over the data.
    pub fn value_and_gradient(&self, theta: ArrayView1<'_, f64>) -> (f64, Array1<f64>) {
        let (coef, intercept) = self.unpack(theta);
        let n = self.x.nrows().max(1) as f64;

        // logits: [n, classes]
        let mut residual = self.x.dot(&coef.t());
        if self.fit_intercept {
            residual += &intercept;
        }

        // Turn each logit row into softmax − onehot, summing the
        // log-loss with the log-sum-exp trick on the way.
        let mut loss = 0.0;
        for (mut row, &target) in residual.outer_iter_mut().zip(self.y.iter()) {
            let target_logit = row[target];
            let max = row.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
            row.mapv_inplace(|v| (v - max).exp());
            let sum = row.sum();
            loss += max + sum.ln() - target_logit;
            row /= sum;
            row[target] -= 1.0;
        }

        let sq_norm: f64 = coef.iter().map(|w| w * w).sum();
        let value = loss / n + 0.5 * self.alpha * sq_norm;

        let mut grad_coef = residual.t().dot(&self.x) / n;
        if self.alpha > 0.0 {
            grad_coef.scaled_add(self.alpha, &coef);
        }
        let grad_intercept = residual.sum_axis(Axis(0)) / n;

        (value, self.pack(&grad_coef, &grad_intercept))
    }
}

/// Largest absolute entry, the stopping measure for gradients.
pub fn max_abs(v: ArrayView1<'_, f64>) -> f64 {
    v.fold(0.0_f64, |m, &x| m.max(x.abs()))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn toy_x() -> Array2<f64> {
        array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [2.0, 0.5]]
    }

    #[test]
    fn test_zero_parameters_give_log_k_loss() {
        let x = toy_x();
        let y = [0, 1, 2, 0];
        let obj = SoftmaxObjective::new(x.view(), &y, 3, true, 0.1);
        let theta = Array1::zeros(obj.n_params());
        assert_abs_diff_eq!(obj.value(theta.view()), 3.0_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_pack_unpack_inverse() {
        let x = toy_x();
        let y = [0, 1, 2, 0];
        let obj = SoftmaxObjective::new(x.view(), &y, 3, true, 0.0);
        let theta = Array1::from_shape_fn(obj.n_params(), |i| i as f64 * 0.5);
        let (coef, intercept) = obj.unpack(theta.view());
        assert_eq!(coef.dim(), (3, 2));
        assert_eq!(intercept.len(), 3);
        assert_eq!(obj.pack(&coef, &intercept), theta);
    }

    #[test]
    fn test_no_intercept_block_when_disabled() {
        let x = toy_x();
        let y = [0, 1, 1, 0];
        let obj = SoftmaxObjective::new(x.view(), &y, 2, false, 0.0);
        assert_eq!(obj.n_params(), 4);
        let (_, intercept) = obj.unpack(Array1::ones(4).view());
        assert_eq!(intercept, Array1::<f64>::zeros(2));
    }

    #[test]
    fn test_gradient_matches_finite_differences() {
        let x = toy_x();
        let y = [0, 1, 2, 0];
        let obj = SoftmaxObjective::new(x.view(), &y, 3, true, 0.25);
        let theta = Array1::from_shape_fn(obj.n_params(), |i| ((i * 7 % 5) as f64 - 2.0) * 0.3);
        let (_, grad) = obj.value_and_gradient(theta.view());

        let h = 1e-6;
        for i in 0..obj.n_params() {
            let mut plus = theta.clone();
            let mut minus = theta.clone();
            plus[i] += h;
            minus[i] -= h;
            let numeric = (obj.value(plus.view()) - obj.value(minus.view())) / (2.0 * h);
            assert_abs_diff_eq!(grad[i], numeric, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_max_abs() {
        assert_eq!(max_abs(array![0.5, -3.0, 2.0].view()), 3.0);
        assert_eq!(max_abs(Array1::<f64>::zeros(0).view()), 0.0);
    }
}
