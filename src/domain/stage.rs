// ============================================================
// Layer 3 — Pipeline Stages
// ============================================================
// A run is strictly linear, no branching and no retries:
//
//   train: Idle → ConfigLoaded → DataLoaded → Trained → Persisted
//   infer: Idle → ModelLoaded  → DataLoaded → Evaluated
//
// The use cases log each transition at debug level so a
// failed run shows exactly how far it got.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    ConfigLoaded,
    DataLoaded,
    Trained,
    Persisted,
    ModelLoaded,
    Evaluated,
}

impl PipelineStage {
    /// The stages a training run passes through, in order.
    pub const TRAIN: [PipelineStage; 5] = [
        PipelineStage::Idle,
        PipelineStage::ConfigLoaded,
        PipelineStage::DataLoaded,
        PipelineStage::Trained,
        PipelineStage::Persisted,
    ];

    /// The stages an inference run passes through, in order.
    pub const INFER: [PipelineStage; 4] = [
        PipelineStage::Idle,
        PipelineStage::ModelLoaded,
        PipelineStage::DataLoaded,
        PipelineStage::Evaluated,
    ];
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Idle         => "idle",
            PipelineStage::ConfigLoaded => "config-loaded",
            PipelineStage::DataLoaded   => "data-loaded",
            PipelineStage::Trained      => "trained",
            PipelineStage::Persisted    => "persisted",
            PipelineStage::ModelLoaded  => "model-loaded",
            PipelineStage::Evaluated    => "evaluated",
        };
        f.write_str(name)
    }
}

/// Tracks the current stage of one run and logs every transition.
#[derive(Debug)]
pub struct StageTracker {
    path:  &'static [PipelineStage],
    index: usize,
}

impl StageTracker {
    pub fn train() -> Self {
        Self { path: &PipelineStage::TRAIN, index: 0 }
    }

    pub fn infer() -> Self {
        Self { path: &PipelineStage::INFER, index: 0 }
    }

    pub fn current(&self) -> PipelineStage {
        self.path[self.index]
    }

    /// Move to `next`. Only the immediate successor is accepted;
    /// anything else is a programming error in the use case.
    pub fn advance(&mut self, next: PipelineStage) {
        let expected = self.path.get(self.index + 1).copied();
        debug_assert_eq!(expected, Some(next), "out-of-order stage transition");
        if expected == Some(next) {
            tracing::debug!("stage {} → {}", self.current(), next);
            self.index += 1;
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_train_path_runs_to_persisted() {
        let mut tracker = StageTracker::train();
        assert_eq!(tracker.current(), PipelineStage::Idle);
        for stage in &PipelineStage::TRAIN[1..] {
            tracker.advance(*stage);
            assert_eq!(tracker.current(), *stage);
        }
        assert_eq!(tracker.current(), PipelineStage::Persisted);
    }

    #[test]
    fn test_infer_path_runs_to_evaluated() {
        let mut tracker = StageTracker::infer();
        tracker.advance(PipelineStage::ModelLoaded);
        tracker.advance(PipelineStage::DataLoaded);
        tracker.advance(PipelineStage::Evaluated);
        assert_eq!(tracker.current().to_string(), "evaluated");
    }
}
