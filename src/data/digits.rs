// ============================================================
// Layer 4 — Bundled Digits Corpus
// ============================================================
// The 8x8 optical handwritten-digit dataset:
//   1797 samples × 64 pixel features, labels 0..9,
//   pixel intensities are integers in 0..=16.
//
// The corpus ships inside the smartcore crate (compiled into
// the binary), so loading involves no network or filesystem
// access and every call returns identical data.

use ndarray::{Array1, Array2};

use crate::data::dataset::Dataset;
use crate::domain::error::PipelineError;
use crate::domain::traits::DatasetSource;

pub const DIGITS_SAMPLES:  usize = 1797;
pub const DIGITS_FEATURES: usize = 64;
pub const DIGITS_CLASSES:  usize = 10;

/// DatasetSource for the bundled digits corpus.
#[derive(Debug, Default, Clone, Copy)]
pub struct DigitsSource;

impl DatasetSource for DigitsSource {
    fn load(&self) -> Result<Dataset, PipelineError> {
        load_digits()
    }
}

/// Load the digits corpus as f64 features and usize labels.
pub fn load_digits() -> Result<Dataset, PipelineError> {
    let raw = smartcore::dataset::digits::load_dataset();

    // Stored row-major: sample 0's 64 pixels, then sample 1's, ...
    let features = Array2::from_shape_vec(
        (raw.num_samples, raw.num_features),
        raw.data.iter().map(|&v| f64::from(v)).collect(),
    )
    .map_err(|e| PipelineError::InvalidTrainingData(format!("digits corpus shape: {e}")))?;

    let targets: Array1<usize> = raw.target.iter().map(|&label| label as usize).collect();

    tracing::debug!(
        "Digits corpus: {} samples, {} features",
        raw.num_samples,
        raw.num_features
    );
    Dataset::new(features, targets)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_dimensions() {
        let ds = load_digits().unwrap();
        assert_eq!(ds.n_samples(), DIGITS_SAMPLES);
        assert_eq!(ds.n_features(), DIGITS_FEATURES);
        assert_eq!(ds.class_labels(), (0..DIGITS_CLASSES).collect::<Vec<_>>());
    }

    #[test]
    fn test_pixel_range() {
        let ds = load_digits().unwrap();
        assert!(ds.features().iter().all(|&v| (0.0..=16.0).contains(&v)));
    }

    #[test]
    fn test_repeated_loads_identical() {
        let a = DigitsSource.load().unwrap();
        let b = DigitsSource.load().unwrap();
        assert_eq!(a, b);
    }
}
