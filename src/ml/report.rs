// ============================================================
// Layer 5 — Classification Report
// ============================================================
// Compares predicted labels with the ground truth:
//
//   precision = TP / (TP + FP)   — of the rows predicted as c,
//                                  how many really are c
//   recall    = TP / (TP + FN)   — of the rows that are c,
//                                  how many were found
//   f1        = 2·P·R / (P + R)
//   support   = number of true rows of class c
//
// Any 0/0 ratio is reported as 0.0.
//
// Labels are the sorted union of true and predicted labels.
// Printed layout:
//
//                 precision    recall  f1-score   support
//
//              0       1.00      1.00      1.00       178
//            ...
//
//       accuracy                           0.99      1797
//      macro avg       0.99      0.99      0.99      1797
//   weighted avg       0.99      0.99      0.99      1797

use std::fmt;

use ndarray::{Array2, ArrayView1};

const LABEL_WIDTH: usize = 12;

/// Scores for one class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub label:     usize,
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
    pub support:   usize,
}

/// Averaged precision / recall / F1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub classes:      Vec<ClassMetrics>,
    pub accuracy:     f64,
    /// Unweighted mean over classes
    pub macro_avg:    AverageMetrics,
    /// Mean weighted by support
    pub weighted_avg: AverageMetrics,
    pub total:        usize,
    /// confusion[[t, p]] = rows with true label t predicted as p,
    /// indexed in the order of `classes`
    pub confusion:    Array2<usize>,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

impl ClassificationReport {
    /// Build the report. `y_true` and `y_pred` must be equally long;
    /// callers check that before getting here.
    pub fn from_predictions(y_true: ArrayView1<'_, usize>, y_pred: ArrayView1<'_, usize>) -> Self {
        debug_assert_eq!(y_true.len(), y_pred.len());

        let mut labels: Vec<usize> = y_true.iter().chain(y_pred.iter()).copied().collect();
        labels.sort_unstable();
        labels.dedup();

        let index = |label: &usize| labels.binary_search(label).unwrap_or_default();
        let mut confusion = Array2::<usize>::zeros((labels.len(), labels.len()));
        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            confusion[[index(t), index(p)]] += 1;
        }

        let total = y_true.len();
        let classes: Vec<ClassMetrics> = labels
            .iter()
            .enumerate()
            .map(|(c, &label)| {
                let tp        = confusion[[c, c]];
                let support   = confusion.row(c).sum();
                let predicted = confusion.column(c).sum();
                let precision = ratio(tp, predicted);
                let recall    = ratio(tp, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics { label, precision, recall, f1, support }
            })
            .collect();

        let correct: usize = confusion.diag().sum();
        let accuracy = ratio(correct, total);

        let n = classes.len().max(1) as f64;
        let macro_avg = AverageMetrics {
            precision: classes.iter().map(|m| m.precision).sum::<f64>() / n,
            recall:    classes.iter().map(|m| m.recall).sum::<f64>() / n,
            f1:        classes.iter().map(|m| m.f1).sum::<f64>() / n,
        };

        let weight = |m: &ClassMetrics| m.support as f64 / total.max(1) as f64;
        let weighted_avg = AverageMetrics {
            precision: classes.iter().map(|m| m.precision * weight(m)).sum(),
            recall:    classes.iter().map(|m| m.recall * weight(m)).sum(),
            f1:        classes.iter().map(|m| m.f1 * weight(m)).sum(),
        };

        Self { classes, accuracy, macro_avg, weighted_avg, total, confusion }
    }

    pub fn class(&self, label: usize) -> Option<&ClassMetrics> {
        self.classes.iter().find(|m| m.label == label)
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = LABEL_WIDTH;
        writeln!(f, "{:>w$}  {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for m in &self.classes {
            writeln!(
                f,
                "{:>w$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.label, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "{:>w$}  {:>9} {:>9} {:>9.2} {:>9}", "accuracy", "", "", self.accuracy, self.total)?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>w$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1, self.total
            )?;
        }
        Ok(())
    }
}
