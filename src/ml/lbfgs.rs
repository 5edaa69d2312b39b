// ============================================================
// Layer 5 — L-BFGS Solver
// ============================================================
// Limited-memory BFGS over the full batch.
//
// Each iteration:
//   1. Two-loop recursion turns the gradient into a search
//      direction using the last `history` (s, y) pairs
//        s_k = θ_{k+1} − θ_k
//        y_k = g_{k+1} − g_k
//   2. Backtracking line search until the Armijo condition
//        f(θ + t·d) ≤ f(θ) + c1 · t · ∇f·d
//      holds (t halves each time, starting at 1)
//   3. Store (s, y) only when sᵀy > 0 so the implicit Hessian
//      approximation stays positive definite
//
// Stopping:
//   converged  — max |g_i| ≤ tol, or the relative decrease in
//                f falls below 64·ε
//   not converged — max_iter reached or the line search failed;
//                the last accepted θ is returned either way
//
// Reference: Nocedal & Wright (2006) Numerical Optimization,
//            Algorithm 7.4 (L-BFGS two-loop recursion),
//            Algorithm 3.1 (backtracking line search)

use std::collections::VecDeque;

use ndarray::{Array1, ArrayView1};

use crate::infra::metrics::IterationMetrics;
use crate::ml::objective::{max_abs, FitSummary, SolverOutput};

const ARMIJO_C1:        f64   = 1e-4;
const MAX_LINE_SEARCH:  usize = 50;
const FTOL:             f64   = 64.0 * f64::EPSILON;

#[derive(Debug, Clone)]
pub struct LbfgsOptions {
    pub max_iter: usize,
    pub tol:      f64,
    /// Number of correction pairs kept
    pub history:  usize,
}

impl Default for LbfgsOptions {
    fn default() -> Self {
        Self { max_iter: 100, tol: 1e-4, history: 10 }
    }
}

struct Correction {
    s:   Array1<f64>,
    y:   Array1<f64>,
    rho: f64,
}

/// Minimise `fg` (returning value and gradient) starting from `theta`.
pub fn minimize<F>(fg: F, mut theta: Array1<f64>, opts: &LbfgsOptions) -> SolverOutput
where
    F: Fn(ArrayView1<'_, f64>) -> (f64, Array1<f64>),
{
    let (mut f, mut g) = fg(theta.view());
    // Oldest correction at the front, newest at the back
    let mut pairs: VecDeque<Correction> = VecDeque::with_capacity(opts.history);
    let mut history = Vec::new();
    let mut converged = max_abs(g.view()) <= opts.tol;
    let mut n_iter = 0;

    while !converged && n_iter < opts.max_iter {
        let mut direction = two_loop(&g, &pairs).mapv(|v| -v);
        let mut slope = direction.dot(&g);
        if slope.is_nan() || slope >= 0.0 {
            // Not a descent direction: drop the curvature memory
            tracing::debug!("lbfgs iter {}: resetting history", n_iter + 1);
            pairs.clear();
            direction = steepest(&g);
            slope = direction.dot(&g);
        }

        let Some((step, f_new, g_new)) = line_search(&fg, &theta, f, &direction, slope) else {
            tracing::debug!("lbfgs iter {}: line search failed", n_iter + 1);
            break;
        };
        n_iter += 1;

        let mut s = direction;
        s *= step;
        let y = &g_new - &g;
        let sy = s.dot(&y);
        // Skip pairs with (near) zero curvature; 1/sy would blow up
        if opts.history > 0 && sy > f64::EPSILON * y.dot(&y) {
            if pairs.len() == opts.history {
                pairs.pop_front();
            }
            pairs.push_back(Correction { rho: 1.0 / sy, s: s.clone(), y });
        }

        theta += &s;
        let f_prev = f;
        f = f_new;
        g = g_new;

        let grad_max = max_abs(g.view());
        history.push(IterationMetrics::new(n_iter, f, grad_max));
        tracing::trace!("lbfgs iter {:>4} loss={:.6} |g|∞={:.3e} step={:.3e}", n_iter, f, grad_max, step);

        // Relative decrease, floored at 1 so losses near zero
        // don't make the test arbitrarily strict
        let scale = f_prev.abs().max(f.abs()).max(1.0);
        converged = grad_max <= opts.tol || (f_prev - f) / scale <= FTOL;
    }

    SolverOutput {
        theta,
        summary: FitSummary { n_iter, converged, final_loss: f, history },
    }
}

/// H·g via the two-loop recursion; scaled steepest descent when
/// there is no curvature information yet.
fn two_loop(g: &Array1<f64>, pairs: &VecDeque<Correction>) -> Array1<f64> {
    let Some(last) = pairs.back() else {
        return steepest(g).mapv(|v| -v);
    };

    let mut q = g.clone();
    let mut alphas = Vec::with_capacity(pairs.len());
    for pair in pairs.iter().rev() {
        let a = pair.rho * pair.s.dot(&q);
        q.scaled_add(-a, &pair.y);
        alphas.push(a);
    }

    // Initial Hessian guess H0 = γI, γ = sᵀy / yᵀy of the newest pair
    let gamma = last.s.dot(&last.y) / last.y.dot(&last.y);
    q *= gamma;

    for (pair, a) in pairs.iter().zip(alphas.into_iter().rev()) {
        let b = pair.rho * pair.y.dot(&q);
        q.scaled_add(a - b, &pair.s);
    }
    q
}

/// Unit-length steepest descent direction.
fn steepest(g: &Array1<f64>) -> Array1<f64> {
    let norm = g.dot(g).sqrt();
    if norm > 0.0 { g.mapv(|v| -v / norm) } else { g.mapv(|v| -v) }
}

/// Backtracking Armijo search along `direction`.
/// Returns (step, f, g) at the accepted point.
fn line_search<F>(
    fg:        &F,
    theta:     &Array1<f64>,
    f0:        f64,
    direction: &Array1<f64>,
    slope:     f64,
) -> Option<(f64, f64, Array1<f64>)>
where
    F: Fn(ArrayView1<'_, f64>) -> (f64, Array1<f64>),
{
    let mut step = 1.0;
    for _ in 0..MAX_LINE_SEARCH {
        let mut candidate = theta.clone();
        candidate.scaled_add(step, direction);
        let (f, g) = fg(candidate.view());
        // A full step can overflow exp() in the softmax; treat that
        // as a rejected step and keep halving
        if f.is_finite() && f <= f0 + ARMIJO_C1 * step * slope {
            return Some((step, f, g));
        }
        step *= 0.5;
    }
    None
}
