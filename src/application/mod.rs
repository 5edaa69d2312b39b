// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// a specific goal (training a model or evaluating one).
//
// Rules for this layer:
//   - No ML math here (that's Layer 5)
//   - No printing here, only tracing (printing is Layer 1)
//   - File access goes through Layer 6
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The training workflow
pub mod train_use_case;

// The evaluation workflow
pub mod infer_use_case;
