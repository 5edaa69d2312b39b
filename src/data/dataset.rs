// ============================================================
// Layer 4 — Labelled Dataset
// ============================================================
// An in-memory feature matrix paired with one class label per
// row. The row-count invariant is checked once, on
// construction, so everything downstream can rely on it.
//
//   features: [n_samples, n_features]  (f64 pixel intensities)
//   targets:  [n_samples]              (class labels)

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::data::splitter::split_train_val;
use crate::domain::error::PipelineError;

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Array2<f64>,
    targets:  Array1<usize>,
}

impl Dataset {
    pub fn new(features: Array2<f64>, targets: Array1<usize>) -> Result<Self, PipelineError> {
        if features.nrows() != targets.len() {
            return Err(PipelineError::LengthMismatch {
                rows:   features.nrows(),
                labels: targets.len(),
            });
        }
        Ok(Self { features, targets })
    }

    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    pub fn targets(&self) -> ArrayView1<'_, usize> {
        self.targets.view()
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.n_samples() == 0
    }

    /// Distinct labels present, sorted ascending.
    pub fn class_labels(&self) -> Vec<usize> {
        let mut labels: Vec<usize> = self.targets.to_vec();
        labels.sort_unstable();
        labels.dedup();
        labels
    }

    /// New dataset holding only the given rows, in the given order.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: self.features.select(Axis(0), indices),
            targets:  self.targets.select(Axis(0), indices),
        }
    }

    /// Shuffle rows with a fixed seed and split off a hold-out set.
    ///
    /// `holdout_fraction` of the rows (rounded) go to the second
    /// dataset; the same seed always gives the same split.
    pub fn split(&self, holdout_fraction: f64, seed: u64) -> (Dataset, Dataset) {
        let indices: Vec<usize> = (0..self.n_samples()).collect();
        let train_fraction = (1.0 - holdout_fraction).clamp(0.0, 1.0);
        let (train_idx, holdout_idx) = split_train_val(indices, train_fraction, seed);
        (self.select(&train_idx), self.select(&holdout_idx))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn toy() -> Dataset {
        Dataset::new(
            array![[0.0, 1.0], [2.0, 3.0], [4.0, 5.0], [6.0, 7.0], [8.0, 9.0]],
            array![1, 0, 1, 2, 0],
        )
        .unwrap()
    }

    #[test]
    fn test_row_count_mismatch_rejected() {
        let err = Dataset::new(array![[0.0], [1.0]], array![0]).unwrap_err();
        assert!(matches!(err, PipelineError::LengthMismatch { rows: 2, labels: 1 }));
    }

    #[test]
    fn test_class_labels_sorted_and_unique() {
        assert_eq!(toy().class_labels(), vec![0, 1, 2]);
    }

    #[test]
    fn test_select_keeps_rows_aligned() {
        let picked = toy().select(&[3, 0]);
        assert_eq!(picked.features(), array![[6.0, 7.0], [0.0, 1.0]]);
        assert_eq!(picked.targets(), array![2usize, 1]);
    }

    #[test]
    fn test_split_is_seeded_and_complete() {
        let data = toy();
        let (train_a, hold_a) = data.split(0.4, 7);
        let (train_b, hold_b) = data.split(0.4, 7);
        assert_eq!(train_a, train_b);
        assert_eq!(hold_a, hold_b);
        assert_eq!(train_a.n_samples(), 3);
        assert_eq!(hold_a.n_samples(), 2);
        // Each row's label still matches its features (x0 / 2 is the row index)
        for ds in [&train_a, &hold_a] {
            for (row, label) in ds.features().outer_iter().zip(ds.targets().iter()) {
                let original = (row[0] / 2.0) as usize;
                assert_eq!(data.targets()[original], *label);
            }
        }
    }

    #[test]
    fn test_zero_holdout_keeps_everything() {
        let (train, hold) = toy().split(0.0, 1);
        assert_eq!(train.n_samples(), 5);
        assert!(hold.is_empty());
    }
}
