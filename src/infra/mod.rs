// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the filesystem:
//
//   config.rs      — Hyperparameter file loading
//                    Reads config/config.json into an ordered
//                    Configuration, mapping I/O and JSON
//                    failures onto PipelineError.
//
//   checkpoint.rs  — Model artifact persistence
//                    ModelStore writes a versioned header and
//                    a bincode payload, and restores it with
//                    identical predictions.
//
//   metrics.rs     — Training metrics logging
//                    Per-iteration loss and gradient norm,
//                    optionally written to a CSV file.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling)

/// Hyperparameter file loading
pub mod config;

/// Model artifact saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
