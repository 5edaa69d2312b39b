// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits that define what the pipeline
// works with:
//
//   error.rs       — the PipelineError taxonomy
//   hyperparams.rs — raw Configuration and validated
//                    Hyperparameters (the allow-list mapping)
//   stage.rs       — the linear train / infer stage machine
//   traits.rs      — DatasetSource, Classifier, Persistable
//
// Rules for this layer:
//   - NO file I/O
//   - NO optimisation or scoring code
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

pub mod error;

pub mod hyperparams;

pub mod stage;

pub mod traits;
