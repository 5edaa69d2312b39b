// ============================================================
// Layer 6 — Config Loader
// ============================================================
// Reads the hyperparameter file: one JSON object, e.g.
//
//   {"C": 1.0, "solver": "lbfgs", "max_iter": 100}
//
// Only the shape is checked here (valid JSON, top-level
// object). Whether the keys and values make sense is decided
// by Hyperparameters::from_config in the trainer.

use std::{fs, io::ErrorKind, path::Path};

use serde_json::Value;

use crate::domain::error::PipelineError;
use crate::domain::hyperparams::Configuration;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";

pub fn load_config(path: &Path) -> Result<Configuration, PipelineError> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PipelineError::ConfigNotFound { path: path.to_path_buf() },
        _ => PipelineError::ConfigIo { path: path.to_path_buf(), source: e },
    })?;

    let value: Value = serde_json::from_str(&text).map_err(|e| PipelineError::ConfigParseError {
        path:    path.to_path_buf(),
        message: e.to_string(),
    })?;

    match value {
        Value::Object(entries) => {
            tracing::debug!("Read {} parameters from '{}'", entries.len(), path.display());
            Ok(Configuration::new(entries))
        }
        other => Err(PipelineError::ConfigParseError {
            path:    path.to_path_buf(),
            message: format!("expected a JSON object at the top level, found {}", kind(&other)),
        }),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null      => "null",
        Value::Bool(_)   => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_)  => "an array",
        Value::Object(_) => "an object",
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_reads_object_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "config.json", r#"{"max_iter": 100, "C": 1.0, "solver": "lbfgs"}"#);
        let config = load_config(&path).unwrap();

        let keys: Vec<&str> = config.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["max_iter", "C", "solver"]);
        assert_eq!(config.get("solver"), Some(&json!("lbfgs")));
    }

    #[test]
    fn test_empty_object_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "empty.json", "{}");
        assert!(load_config(&path).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigNotFound { path: p } if p == path));
    }

    #[test]
    fn test_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "bad.json", r#"{"C": 1.0,"#);
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigParseError { .. }));
    }

    #[test]
    fn test_non_object_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "list.json", "[1, 2, 3]");
        match load_config(&path).unwrap_err() {
            PipelineError::ConfigParseError { message, .. } => assert!(message.contains("an array")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_shipped_config() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_PATH);
        let config = load_config(&path).unwrap();
        assert!(config.get("C").is_some_and(|v| v.is_f64()));
        assert!(config.get("solver").is_some_and(|v| v.is_string()));
        assert!(config.get("max_iter").is_some_and(|v| v.is_u64()));
    }

    #[test]
    fn test_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigIo { .. }));
    }
}
