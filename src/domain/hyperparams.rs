// ============================================================
// Layer 3 — Configuration and Hyperparameters
// ============================================================
// Two representations of the same settings:
//
//   Configuration   — the raw JSON object exactly as read from
//                     disk (ordered name → value map). Nothing is
//                     checked here beyond "it is an object".
//
//   Hyperparameters — the typed, validated form the trainer
//                     consumes. Built field-by-field from an
//                     explicit allow-list; any unknown key, wrong
//                     type, or out-of-range value is rejected
//                     with PipelineError::InvalidHyperparameter.
//
// Recognised keys (JSON type → accepted domain, default):
//   C              number          > 0, finite          1.0
//   solver         string          "lbfgs" | "sag"      "lbfgs"
//   max_iter       integer         > 0                  100
//   tol            number          >= 0, finite         1e-4
//   fit_intercept  bool                                 true
//   penalty        string | null   "l2" | "none"        "l2"
//   random_state   integer | null  >= 0                 null
//
// Reference: Rust Book §6 (Enums and Pattern Matching)
//            serde_json documentation (Value, Map)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::error::PipelineError;

// ─── Configuration ────────────────────────────────────────────────────────────
/// Raw hyperparameter mapping, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    entries: Map<String, Value>,
}

impl Configuration {
    pub fn new(entries: Map<String, Value>) -> Self {
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in the order they appeared in the file.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }
}

impl From<Map<String, Value>> for Configuration {
    fn from(entries: Map<String, Value>) -> Self {
        Self::new(entries)
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Compact JSON keeps the progress line on one row
        write!(f, "{}", Value::Object(self.entries.clone()))
    }
}

// ─── Solver ───────────────────────────────────────────────────────────────────
/// Optimisation algorithm used to fit the coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Solver {
    /// Limited-memory BFGS over the full batch
    #[default]
    Lbfgs,
    /// Stochastic average gradient, one sample per step
    Sag,
}

impl Solver {
    pub const SUPPORTED: [&'static str; 2] = ["lbfgs", "sag"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Solver::Lbfgs => "lbfgs",
            Solver::Sag   => "sag",
        }
    }
}

impl FromStr for Solver {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lbfgs" => Ok(Solver::Lbfgs),
            "sag"   => Ok(Solver::Sag),
            other   => Err(PipelineError::invalid_param(
                "solver",
                format!(
                    "unsupported value '{other}', expected one of {}",
                    Solver::SUPPORTED.join(", ")
                ),
            )),
        }
    }
}

impl fmt::Display for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Penalty ──────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Penalty {
    #[default]
    L2,
    None,
}

// ─── Hyperparameters ──────────────────────────────────────────────────────────
/// Validated construction parameters for the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Inverse regularisation strength — smaller means stronger L2
    pub c:             f64,
    pub solver:        Solver,
    /// Upper bound on solver iterations (epochs for sag)
    pub max_iter:      usize,
    /// Stopping tolerance
    pub tol:           f64,
    pub fit_intercept: bool,
    pub penalty:       Penalty,
    /// Seed for the sag sampling order
    pub random_state:  Option<u64>,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            c:             1.0,
            solver:        Solver::Lbfgs,
            max_iter:      100,
            tol:           1e-4,
            fit_intercept: true,
            penalty:       Penalty::L2,
            random_state:  None,
        }
    }
}

impl Hyperparameters {
    pub const RECOGNISED_KEYS: [&'static str; 7] = [
        "C", "solver", "max_iter", "tol", "fit_intercept", "penalty", "random_state",
    ];

    /// Build hyperparameters from a raw configuration.
    ///
    /// Starts from the defaults and overrides one field per key.
    /// Fails on the first key that is unknown or invalid.
    pub fn from_config(config: &Configuration) -> Result<Self, PipelineError> {
        let mut params = Self::default();

        for (key, value) in config.iter() {
            match key.as_str() {
                "C"             => params.c             = parse_c(value)?,
                "solver"        => params.solver        = parse_solver(value)?,
                "max_iter"      => params.max_iter      = parse_max_iter(value)?,
                "tol"           => params.tol           = parse_tol(value)?,
                "fit_intercept" => params.fit_intercept = parse_bool(key, value)?,
                "penalty"       => params.penalty       = parse_penalty(value)?,
                "random_state"  => params.random_state  = parse_random_state(value)?,
                unknown => {
                    return Err(PipelineError::invalid_param(
                        unknown,
                        format!(
                            "unrecognised parameter, expected one of {}",
                            Self::RECOGNISED_KEYS.join(", ")
                        ),
                    ));
                }
            }
        }

        if params.penalty == Penalty::None && config.contains_key("C") {
            tracing::debug!("penalty is none, 'C' has no effect");
        }

        Ok(params)
    }

    /// Re-check the value domains, for parameters that did not come
    /// through `from_config` (e.g. read back from a model file).
    pub fn validate(&self) -> Result<(), PipelineError> {
        check_c(self.c)?;
        check_tol(self.tol)?;
        if self.max_iter == 0 {
            return Err(PipelineError::invalid_param("max_iter", "must be > 0, got 0"));
        }
        Ok(())
    }

    /// L2 weight applied to the mean loss: 1 / (C · n).
    /// Zero when no penalty is configured.
    pub fn l2_strength(&self, n_samples: usize) -> f64 {
        match self.penalty {
            Penalty::L2   => 1.0 / (self.c * n_samples.max(1) as f64),
            Penalty::None => 0.0,
        }
    }
}

// ─── Field parsers ────────────────────────────────────────────────────────────

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null      => "null",
        Value::Bool(_)   => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_)  => "an array",
        Value::Object(_) => "an object",
    }
}

fn parse_c(value: &Value) -> Result<f64, PipelineError> {
    let c = value.as_f64().ok_or_else(|| {
        PipelineError::invalid_param("C", format!("expected a number, got {}", describe(value)))
    })?;
    check_c(c)
}

fn check_c(c: f64) -> Result<f64, PipelineError> {
    // NaN fails both comparisons, so test finiteness first
    if !c.is_finite() || c <= 0.0 {
        return Err(PipelineError::invalid_param("C", format!("must be > 0, got {c}")));
    }
    Ok(c)
}

fn parse_solver(value: &Value) -> Result<Solver, PipelineError> {
    match value {
        Value::String(s) => s.parse(),
        other => Err(PipelineError::invalid_param(
            "solver",
            format!("expected a string, got {}", describe(other)),
        )),
    }
}

fn parse_max_iter(value: &Value) -> Result<usize, PipelineError> {
    match value.as_u64() {
        Some(0) => Err(PipelineError::invalid_param("max_iter", "must be > 0, got 0")),
        Some(n) => usize::try_from(n)
            .map_err(|_| PipelineError::invalid_param("max_iter", format!("{n} is too large"))),
        None => Err(PipelineError::invalid_param(
            "max_iter",
            format!("expected a positive integer, got {value}"),
        )),
    }
}

fn parse_tol(value: &Value) -> Result<f64, PipelineError> {
    let tol = value.as_f64().ok_or_else(|| {
        PipelineError::invalid_param("tol", format!("expected a number, got {}", describe(value)))
    })?;
    check_tol(tol)
}

fn check_tol(tol: f64) -> Result<f64, PipelineError> {
    if !tol.is_finite() || tol < 0.0 {
        return Err(PipelineError::invalid_param("tol", format!("must be >= 0, got {tol}")));
    }
    Ok(tol)
}

fn parse_bool(key: &str, value: &Value) -> Result<bool, PipelineError> {
    value.as_bool().ok_or_else(|| {
        PipelineError::invalid_param(key, format!("expected a boolean, got {}", describe(value)))
    })
}

fn parse_penalty(value: &Value) -> Result<Penalty, PipelineError> {
    match value {
        Value::Null => Ok(Penalty::None),
        Value::String(s) if s == "l2" => Ok(Penalty::L2),
        Value::String(s) if s == "none" => Ok(Penalty::None),
        Value::String(s) => Err(PipelineError::invalid_param(
            "penalty",
            format!("unsupported value '{s}', expected l2, none or null"),
        )),
        other => Err(PipelineError::invalid_param(
            "penalty",
            format!("expected a string or null, got {}", describe(other)),
        )),
    }
}

fn parse_random_state(value: &Value) -> Result<Option<u64>, PipelineError> {
    match value {
        Value::Null => Ok(None),
        other => other.as_u64().map(Some).ok_or_else(|| {
            PipelineError::invalid_param(
                "random_state",
                format!("expected a non-negative integer or null, got {other}"),
            )
        }),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> Configuration {
        match value {
            Value::Object(map) => Configuration::new(map),
            _ => panic!("test config must be an object"),
        }
    }

    fn rejected_key(value: Value) -> String {
        match Hyperparameters::from_config(&config(value)) {
            Err(PipelineError::InvalidHyperparameter { name, .. }) => name,
            other => panic!("expected InvalidHyperparameter, got {other:?}"),
        }
    }

    #[test]
    fn test_default_config_file_values() {
        let params = Hyperparameters::from_config(&config(json!({
            "C": 1.0, "solver": "lbfgs", "max_iter": 100
        })))
        .unwrap();
        assert_eq!(params.c, 1.0);
        assert_eq!(params.solver, Solver::Lbfgs);
        assert_eq!(params.max_iter, 100);
        assert!(params.fit_intercept);
    }

    #[test]
    fn test_empty_config_gives_defaults() {
        let params = Hyperparameters::from_config(&Configuration::default()).unwrap();
        assert_eq!(params, Hyperparameters::default());
    }

    #[test]
    fn test_all_keys_parsed() {
        let params = Hyperparameters::from_config(&config(json!({
            "C": 2,
            "solver": "sag",
            "max_iter": 7,
            "tol": 0.0,
            "fit_intercept": false,
            "penalty": null,
            "random_state": 42
        })))
        .unwrap();
        // Integer C is accepted as a float
        assert_eq!(params.c, 2.0);
        assert_eq!(params.solver, Solver::Sag);
        assert_eq!(params.max_iter, 7);
        assert_eq!(params.tol, 0.0);
        assert!(!params.fit_intercept);
        assert_eq!(params.penalty, Penalty::None);
        assert_eq!(params.random_state, Some(42));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert_eq!(rejected_key(json!({"learning_rate": 0.1})), "learning_rate");
    }

    #[test]
    fn test_out_of_domain_values_rejected() {
        assert_eq!(rejected_key(json!({"C": 0.0})), "C");
        assert_eq!(rejected_key(json!({"C": -1.0})), "C");
        assert_eq!(rejected_key(json!({"C": "1.0"})), "C");
        assert_eq!(rejected_key(json!({"solver": "adam"})), "solver");
        assert_eq!(rejected_key(json!({"solver": 3})), "solver");
        assert_eq!(rejected_key(json!({"max_iter": 0})), "max_iter");
        assert_eq!(rejected_key(json!({"max_iter": -5})), "max_iter");
        assert_eq!(rejected_key(json!({"max_iter": 10.5})), "max_iter");
        assert_eq!(rejected_key(json!({"tol": -1e-3})), "tol");
        assert_eq!(rejected_key(json!({"fit_intercept": "yes"})), "fit_intercept");
        assert_eq!(rejected_key(json!({"penalty": "l1"})), "penalty");
        assert_eq!(rejected_key(json!({"random_state": -1})), "random_state");
        assert_eq!(rejected_key(json!({"C": {"nested": 1}})), "C");
    }

    #[test]
    fn test_validate_catches_hand_built_values() {
        assert!(Hyperparameters::default().validate().is_ok());
        let bad_c = Hyperparameters { c: -1.0, ..Default::default() };
        assert!(matches!(bad_c.validate(), Err(PipelineError::InvalidHyperparameter { ref name, .. }) if name == "C"));
        let nan_tol = Hyperparameters { tol: f64::NAN, ..Default::default() };
        assert!(nan_tol.validate().is_err());
        let no_iter = Hyperparameters { max_iter: 0, ..Default::default() };
        assert!(no_iter.validate().is_err());
    }

    #[test]
    fn test_l2_strength() {
        let mut params = Hyperparameters { c: 0.5, ..Default::default() };
        assert!((params.l2_strength(100) - 0.02).abs() < 1e-12);
        params.penalty = Penalty::None;
        assert_eq!(params.l2_strength(100), 0.0);
    }

    #[test]
    fn test_display_preserves_file_order() {
        let cfg: Configuration = serde_json::from_str::<Map<String, Value>>(
            r#"{"solver": "lbfgs", "C": 1.0, "max_iter": 100}"#,
        )
        .unwrap()
        .into();
        assert_eq!(cfg.to_string(), r#"{"solver":"lbfgs","C":1.0,"max_iter":100}"#);
    }
}
