// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the bundled corpus and the trainer:
//
//   smartcore digits corpus
//       │
//       ▼
//   DigitsSource   → converts to f64 features / usize labels
//       │
//       ▼
//   Dataset        → checks rows == labels, owns the arrays
//       │
//       ▼
//   splitter       → optional seeded train / hold-out split
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Labelled feature matrix with the row-count invariant
pub mod dataset;

/// The bundled 8x8 handwritten-digit corpus
pub mod digits;

/// Seeded shuffle and train/hold-out split
pub mod splitter;
