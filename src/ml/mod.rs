// ============================================================
// Layer 5 — ML / Model Layer
// ============================================================
// All of the numerical work lives here. Nothing in this layer
// touches the filesystem; arrays come in, arrays go out.
//
//   objective.rs  — softmax cross-entropy + L2, value and
//                   gradient over a packed parameter vector
//
//   lbfgs.rs      — full-batch L-BFGS with Armijo backtracking
//   sag.rs        — stochastic average gradient, seeded
//
//   model.rs      — the fitted LogisticRegression: coef,
//                   intercept, class labels, predict / proba
//
//   trainer.rs    — Configuration → Hyperparameters → solver
//                   → LogisticRegression, with a convergence
//                   warning when max_iter runs out
//
//   inferencer.rs — batched prediction + evaluation
//   report.rs     — per-class precision / recall / F1 table
//
// Reference: Bishop (2006) Pattern Recognition and Machine
//            Learning §4.3.4 (Multiclass logistic regression)

/// Softmax regression loss and gradient
pub mod objective;

/// Limited-memory BFGS optimiser
pub mod lbfgs;

/// Stochastic average gradient optimiser
pub mod sag;

/// Fitted multinomial logistic regression
pub mod model;

/// Training entry point
pub mod trainer;

/// Evaluation of a fitted model
pub mod inferencer;

/// Classification report
pub mod report;
