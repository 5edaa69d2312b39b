// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The use cases are written against these traits, not the
// concrete types, so a different corpus or model store can be
// plugged in without touching the workflow code:
//
//   DatasetSource → DigitsSource provides the bundled corpus
//   Classifier    → LogisticRegression predicts labels
//   Persistable   → ModelStore saves and restores artifacts
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use std::path::Path;

use ndarray::{Array1, ArrayView2};

use crate::data::dataset::Dataset;
use crate::domain::error::PipelineError;

// ─── DatasetSource ────────────────────────────────────────────────────────────
/// Anything that can hand over a labelled feature matrix.
pub trait DatasetSource {
    fn load(&self) -> Result<Dataset, PipelineError>;
}

// ─── Classifier ───────────────────────────────────────────────────────────────
/// A fitted model that maps feature rows to class labels.
pub trait Classifier {
    /// Number of feature columns the model was trained on.
    fn n_features(&self) -> usize;

    /// One predicted label per row of `x`.
    /// Fails with ShapeMismatch if the column count is wrong.
    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<usize>, PipelineError>;
}

// ─── Persistable ──────────────────────────────────────────────────────────────
/// Storage for a model artifact at a filesystem path.
pub trait Persistable<M> {
    /// Write `model` to `path`, overwriting any existing file.
    fn save(&self, model: &M, path: &Path) -> Result<(), PipelineError>;

    /// Read a model back from `path`.
    fn load(&self, path: &Path) -> Result<M, PipelineError>;
}
