// ============================================================
// Layer 6 — Model Store
// ============================================================
// Saves and restores a fitted LogisticRegression as one file.
//
// File layout:
//
//   offset  size  content
//   0       4     magic  b"DGLR"
//   4       4     format version (u32, little-endian)
//   8       ..    bincode payload (ModelRecord)
//
// The payload uses fixed-width little-endian integers so the
// bytes do not depend on the platform that wrote them. Trailing
// bytes after the record are rejected.
//
// Error mapping:
//   file absent                     → ModelNotFound
//   any other read / write failure  → PersistenceIo
//   bad magic, unknown version,
//   undecodable, inconsistent shapes,
//   out-of-domain hyperparameters   → PersistenceCorrupt
//
// Reference: Rust Book §9 (Error Handling)
//            bincode documentation (Options)

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use bincode::Options;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::domain::error::PipelineError;
use crate::domain::hyperparams::Hyperparameters;
use crate::domain::traits::{Classifier, Persistable};
use crate::ml::model::LogisticRegression;

pub const MAGIC:          [u8; 4] = *b"DGLR";
pub const FORMAT_VERSION: u32     = 1;
const HEADER_LEN:         usize   = 8;
// A digits model is a few KB; anything near this is not ours
const PAYLOAD_LIMIT:      u64     = 64 * 1024 * 1024;

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(PAYLOAD_LIMIT)
}

/// Flat, serialisable form of a LogisticRegression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ModelRecord {
    classes:         Vec<usize>,
    n_features:      usize,
    /// Row-major, classes × n_features
    coef:            Vec<f64>,
    intercept:       Vec<f64>,
    hyperparameters: Hyperparameters,
    n_iter:          usize,
    converged:       bool,
}

impl From<&LogisticRegression> for ModelRecord {
    fn from(model: &LogisticRegression) -> Self {
        Self {
            classes:         model.classes().to_vec(),
            n_features:      model.n_features(),
            coef:            model.coef().iter().copied().collect(),
            intercept:       model.intercept().to_vec(),
            hyperparameters: model.hyperparameters().clone(),
            n_iter:          model.n_iter(),
            converged:       model.converged(),
        }
    }
}

impl ModelRecord {
    fn into_model(self) -> Result<LogisticRegression, String> {
        self.hyperparameters.validate().map_err(|e| e.to_string())?;
        let coef = Array2::from_shape_vec((self.classes.len(), self.n_features), self.coef)
            .map_err(|e| format!("coefficient block: {e}"))?;
        LogisticRegression::from_parts(
            coef,
            Array1::from(self.intercept),
            self.classes,
            self.hyperparameters,
            self.n_iter,
            self.converged,
        )
    }
}

/// File-backed persistence for LogisticRegression artifacts.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModelStore;

impl ModelStore {
    pub fn new() -> Self {
        Self
    }

    /// Header + payload bytes for `model`.
    pub fn encode(&self, model: &LogisticRegression) -> Result<Vec<u8>, bincode::Error> {
        let payload = codec().serialize(&ModelRecord::from(model))?;
        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Inverse of `encode`. Errors are plain messages; `load`
    /// attaches the path.
    pub fn decode(&self, bytes: &[u8]) -> Result<LogisticRegression, String> {
        if bytes.len() < HEADER_LEN {
            return Err(format!("file is {} bytes, shorter than the header", bytes.len()));
        }
        let (header, payload) = bytes.split_at(HEADER_LEN);
        if header[..4] != MAGIC {
            return Err("not a model file (bad magic)".to_string());
        }
        let version = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        if version != FORMAT_VERSION {
            return Err(format!(
                "unsupported format version {version} (expected {FORMAT_VERSION})"
            ));
        }
        let record: ModelRecord = codec()
            .deserialize(payload)
            .map_err(|e| format!("payload: {e}"))?;
        record.into_model()
    }
}

fn io_error(path: &Path, source: std::io::Error) -> PipelineError {
    PipelineError::PersistenceIo { path: path.to_path_buf(), source }
}

fn corrupt(path: &Path, message: impl Into<String>) -> PipelineError {
    PipelineError::PersistenceCorrupt { path: path.to_path_buf(), message: message.into() }
}

impl Persistable<LogisticRegression> for ModelStore {
    fn save(&self, model: &LogisticRegression, path: &Path) -> Result<(), PipelineError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_error(path, e))?;
        }

        let bytes = self
            .encode(model)
            .map_err(|e| io_error(path, std::io::Error::new(ErrorKind::InvalidData, e)))?;
        fs::write(path, &bytes).map_err(|e| io_error(path, e))?;

        tracing::debug!("Saved model ({} bytes) to '{}'", bytes.len(), path.display());
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<LogisticRegression, PipelineError> {
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PipelineError::ModelNotFound { path: PathBuf::from(path) },
            _ => io_error(path, e),
        })?;

        let model = self.decode(&bytes).map_err(|message| corrupt(path, message))?;
        tracing::debug!(
            "Loaded model from '{}' ({} classes, fit in {} iterations)",
            path.display(),
            model.classes().len(),
            model.n_iter()
        );
        Ok(model)
    }
}
