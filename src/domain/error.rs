// ============================================================
// Layer 3 — Pipeline Error Taxonomy
// ============================================================
// Every failure the library layers can produce, as one enum.
//
// The CLI layer wraps these in anyhow::Error with extra
// context; below the CLI every function returns
// Result<_, PipelineError> so callers (and tests) can match
// on the exact condition instead of parsing strings.
//
//   Config stage      → ConfigNotFound, ConfigIo, ConfigParseError
//   Construction      → InvalidHyperparameter, InvalidTrainingData
//   Shapes            → LengthMismatch, ShapeMismatch
//   Persistence stage → PersistenceIo, ModelNotFound, PersistenceCorrupt
//
// Reference: Rust Book §9 (Recoverable Errors with Result)
//            thiserror crate documentation

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The hyperparameter file does not exist.
    #[error("Config file not found at '{}'", path.display())]
    ConfigNotFound { path: PathBuf },

    /// The hyperparameter file exists but could not be read.
    #[error("Cannot read config file '{}': {source}", path.display())]
    ConfigIo {
        path:   PathBuf,
        source: std::io::Error,
    },

    /// The file is not valid JSON, or not a JSON object.
    #[error("Cannot parse config file '{}': {message}", path.display())]
    ConfigParseError { path: PathBuf, message: String },

    /// A configuration key is unknown, mistyped, or out of range.
    #[error("Invalid hyperparameter '{name}': {reason}")]
    InvalidHyperparameter { name: String, reason: String },

    /// The training data cannot produce a classifier (empty, one class).
    #[error("Invalid training data: {0}")]
    InvalidTrainingData(String),

    /// Feature rows and labels disagree in count.
    #[error("Length mismatch: {rows} feature rows but {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },

    /// Feature column count differs from what the model was trained on.
    #[error("Shape mismatch: model expects {expected} features, input has {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// Reading or writing the model file failed for a reason other
    /// than it being absent.
    #[error("I/O error on model file '{}': {source}", path.display())]
    PersistenceIo {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("Model file not found at '{}'", path.display())]
    ModelNotFound { path: PathBuf },

    #[error("Model file '{}' is corrupt: {message}", path.display())]
    PersistenceCorrupt { path: PathBuf, message: String },
}

impl PipelineError {
    /// Shorthand used by the hyperparameter allow-list.
    pub fn invalid_param(name: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::InvalidHyperparameter {
            name:   name.into(),
            reason: reason.into(),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_item() {
        let err = PipelineError::invalid_param("solver", "unsupported value 'adam'");
        assert_eq!(
            err.to_string(),
            "Invalid hyperparameter 'solver': unsupported value 'adam'"
        );

        let err = PipelineError::ShapeMismatch { expected: 64, found: 63 };
        assert!(err.to_string().contains("64"));
        assert!(err.to_string().contains("63"));
    }
}
