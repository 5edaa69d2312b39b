// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records the solver's progress to a CSV file, one row per
// iteration (L-BFGS step or SAG epoch).
//
// Columns:
//   - iteration: 1, 2, 3, ...
//   - loss:      regularised mean cross-entropy after the step
//   - grad_norm: largest absolute gradient entry after the step
//
// Example CSV output:
//   iteration,loss,grad_norm
//   1,1.843210,0.412300
//   2,1.201877,0.290114
//   ...
//
// How to read the metrics:
//   - loss should fall every row for lbfgs
//   - grad_norm reaching tol is what ends an lbfgs run
//   - a flat loss with a large grad_norm → raise max_iter
//
// The file is recreated on every training run.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

pub const CSV_HEADER: &str = "iteration,loss,grad_norm";

/// Solver state after one iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationMetrics {
    /// Iteration number (starts at 1)
    pub iteration: usize,

    /// Objective value, including the L2 term
    pub loss: f64,

    /// max |g_i| of the gradient
    pub grad_norm: f64,
}

impl IterationMetrics {
    pub fn new(iteration: usize, loss: f64, grad_norm: f64) -> Self {
        Self { iteration, loss, grad_norm }
    }
}

/// Writes iteration metrics to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create (or truncate) the CSV at `path` and write the header.
    /// Parent directories are created as needed.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let csv_path = path.as_ref().to_path_buf();

        if let Some(parent) = csv_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;
        }

        let mut f = fs::File::create(&csv_path)
            .with_context(|| format!("Cannot create metrics CSV '{}'", csv_path.display()))?;
        writeln!(f, "{CSV_HEADER}")?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    /// Append every row of a finished run with a single open.
    pub fn log_all(&self, history: &[IterationMetrics]) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open metrics CSV '{}'", self.csv_path.display()))?;
        for m in history {
            write_row(&mut f, m)?;
        }
        tracing::debug!(
            "Logged {} iterations to '{}'",
            history.len(),
            self.csv_path.display()
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

fn write_row(f: &mut impl Write, m: &IterationMetrics) -> std::io::Result<()> {
    writeln!(f, "{},{:.6},{:.6}", m.iteration, m.loss, m.grad_norm)
}
