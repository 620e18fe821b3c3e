//! # Learned Selectivity Estimation
//!
//! One regression model per table maps the feature vector
//! `[numeric column index, threshold]` to the fraction of rows satisfying
//! `column < threshold`. The model is deliberately small: a ridge-regularized
//! least-squares linear fit, solved in closed form over at most
//! [`WINDOW_CAP`] samples.
//!
//! ## Initial Training
//!
//! At startup, every numeric column contributes exactly two synthetic samples
//! spanning its observed `[min, max]` range, with the true empirical fraction
//! computed from the loaded rows. A table with no numeric columns gets no
//! model and the estimator answers a constant 0.5 for it.
//!
//! ## Domain Restriction
//!
//! The model is trained only for `<` predicates on known numeric columns.
//! Any other shape (different operator, unknown column, missing model) falls
//! back to 0.5. That weak baseline is intentional: availability over
//! precision, the consumer always gets a usable fraction.
//!
//! ## Immutable Models
//!
//! A fitted model is a value. Retraining fits a fresh model from the current
//! training window and atomically replaces the old one in the context, so a
//! reader can never observe a regressor mid-refit.

use crate::catalog::Row;
use crate::plan::{CompareOp, Predicate};
use std::collections::VecDeque;

/// Fallback fraction whenever the model cannot be consulted.
pub const FALLBACK_FRACTION: f64 = 0.5;

/// Maximum number of samples a training window retains.
pub const WINDOW_CAP: usize = 50;

/// Ridge term keeping the normal equations solvable even when the sample set
/// is degenerate (for instance a single column contributing two points).
const RIDGE_LAMBDA: f64 = 1e-6;

/// A fitted linear regressor over `[column_index, threshold]` plus bias.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearModel {
    /// `[bias, column_index weight, threshold weight]`.
    weights: [f64; 3],
}

impl LinearModel {
    /// Construct a model directly from weights. Intended for diagnostics and
    /// tests that need a model with known (possibly wrong) behavior.
    pub fn from_weights(weights: [f64; 3]) -> Self {
        Self { weights }
    }

    /// Fit by ridge-regularized least squares on the normal equations
    /// `(AᵀA + λI) w = Aᵀy`. Returns `None` for an empty sample set.
    pub fn fit(samples: &[([f64; 2], f64)]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        // Accumulate the 3x3 Gram matrix and the right-hand side.
        let mut m = [[0.0f64; 3]; 3];
        let mut b = [0.0f64; 3];
        for ([x0, x1], y) in samples {
            let a = [1.0, *x0, *x1];
            for i in 0..3 {
                for j in 0..3 {
                    m[i][j] += a[i] * a[j];
                }
                b[i] += a[i] * y;
            }
        }
        for (i, row) in m.iter_mut().enumerate() {
            row[i] += RIDGE_LAMBDA;
        }

        Some(Self {
            weights: solve_3x3(m, b),
        })
    }

    pub fn predict(&self, features: [f64; 2]) -> f64 {
        self.weights[0] + self.weights[1] * features[0] + self.weights[2] * features[1]
    }
}

/// Solve `m w = b` by Gaussian elimination with partial pivoting. The ridge
/// term guarantees the matrix is positive definite, so no pivot is zero.
fn solve_3x3(mut m: [[f64; 3]; 3], mut b: [f64; 3]) -> [f64; 3] {
    for col in 0..3 {
        let pivot = (col..3)
            .max_by(|&i, &j| m[i][col].abs().total_cmp(&m[j][col].abs()))
            .unwrap_or(col);
        m.swap(col, pivot);
        b.swap(col, pivot);

        for target in col + 1..3 {
            let factor = m[target][col] / m[col][col];
            for k in col..3 {
                m[target][k] -= factor * m[col][k];
            }
            b[target] -= factor * b[col];
        }
    }

    let mut w = [0.0f64; 3];
    for col in (0..3).rev() {
        let mut sum = b[col];
        for k in col + 1..3 {
            sum -= m[col][k] * w[k];
        }
        w[col] = sum / m[col][col];
    }
    w
}

/// Per-table selectivity state: the fitted regressor (if any) and the
/// ordered numeric columns its feature encoding is defined over.
///
/// Retraining replaces `model`; the column list is fixed for the lifetime of
/// the table.
#[derive(Debug, Clone)]
pub struct SelectivityModel {
    pub model: Option<LinearModel>,
    numeric_columns: Vec<String>,
}

impl SelectivityModel {
    /// Fit the startup model from synthetic min/max threshold samples.
    pub fn fit_initial(rows: &[Row], numeric_columns: Vec<String>) -> Self {
        let samples = synthetic_samples(rows, &numeric_columns);
        Self {
            model: LinearModel::fit(&samples),
            numeric_columns,
        }
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    /// Index of a column within the model's feature encoding.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.numeric_columns.iter().position(|c| c == column)
    }

    /// Estimated fraction of rows satisfying the predicate.
    ///
    /// Returns the constant fallback for anything outside the trained domain:
    /// missing model, non-`<` operator, or a column the model does not know.
    pub fn estimate(&self, predicate: &Predicate) -> f64 {
        let Some(model) = &self.model else {
            return FALLBACK_FRACTION;
        };
        if predicate.op != CompareOp::Lt {
            return FALLBACK_FRACTION;
        }
        let Some(index) = self.column_index(&predicate.column) else {
            return FALLBACK_FRACTION;
        };
        model.predict([index as f64, predicate.value.0]).max(0.0)
    }
}

/// Generate the startup training set: for each numeric column, two thresholds
/// at the observed min and max, each labeled with the true fraction of rows
/// strictly below the threshold.
pub fn synthetic_samples(rows: &[Row], numeric_columns: &[String]) -> Vec<([f64; 2], f64)> {
    let mut samples = Vec::new();
    for (index, column) in numeric_columns.iter().enumerate() {
        let values: Vec<f64> = rows
            .iter()
            .filter_map(|r| r.get(column).and_then(|v| v.as_number()))
            .collect();
        let (Some(min), Some(max)) = (
            values.iter().copied().reduce(f64::min),
            values.iter().copied().reduce(f64::max),
        ) else {
            continue;
        };
        for threshold in [min, max] {
            let below = rows
                .iter()
                .filter(|r| {
                    r.get(column)
                        .and_then(|v| v.as_number())
                        .is_some_and(|v| v < threshold)
                })
                .count();
            let fraction = if rows.is_empty() {
                0.0
            } else {
                below as f64 / rows.len() as f64
            };
            samples.push(([index as f64, threshold], fraction));
        }
    }
    samples
}

/// Bounded FIFO window of `(features, observed fraction)` samples, oldest
/// first. Pushing beyond the cap evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct TrainingWindow {
    cap: usize,
    features: VecDeque<[f64; 2]>,
    fractions: VecDeque<f64>,
}

impl TrainingWindow {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            features: VecDeque::new(),
            fractions: VecDeque::new(),
        }
    }

    pub fn push(&mut self, features: [f64; 2], fraction: f64) {
        self.features.push_back(features);
        self.fractions.push_back(fraction);
        while self.features.len() > self.cap {
            self.features.pop_front();
            self.fractions.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Snapshot of the window contents for a refit.
    pub fn samples(&self) -> Vec<([f64; 2], f64)> {
        self.features
            .iter()
            .copied()
            .zip(self.fractions.iter().copied())
            .collect()
    }

    /// Oldest sample in the window, if any.
    pub fn oldest(&self) -> Option<([f64; 2], f64)> {
        Some((*self.features.front()?, *self.fractions.front()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{num, row, text};

    fn one_to_ten() -> Vec<Row> {
        (1..=10).map(|i| row(&[("a", num(i as f64))])).collect()
    }

    #[test]
    fn synthetic_endpoints() {
        let rows = one_to_ten();
        let samples = synthetic_samples(&rows, &["a".to_string()]);
        // min threshold: nothing strictly below the minimum
        assert_eq!(samples[0], ([0.0, 1.0], 0.0));
        // max threshold: empirical `< max` fraction
        assert_eq!(samples[1], ([0.0, 10.0], 0.9));
    }

    #[test]
    fn fit_interpolates_between_endpoints() {
        let rows = one_to_ten();
        let model = SelectivityModel::fit_initial(&rows, vec!["a".to_string()]);
        let estimate = model.estimate(&Predicate::new("a", CompareOp::Lt, 5.0));
        // Linear interpolation between (1, 0.0) and (10, 0.9)
        assert!((estimate - 0.4).abs() < 1e-3, "estimate was {estimate}");
    }

    #[test]
    fn no_numeric_columns_always_half() {
        let rows = vec![row(&[("name", text("x"))])];
        let model = SelectivityModel::fit_initial(&rows, vec![]);
        assert!(model.model.is_none());
        for op in [CompareOp::Lt, CompareOp::Gt, CompareOp::Eq] {
            let estimate = model.estimate(&Predicate::new("name", op, 3.0));
            assert_eq!(estimate, FALLBACK_FRACTION);
        }
    }

    #[test]
    fn untrained_shapes_fall_back() {
        let model = SelectivityModel::fit_initial(&one_to_ten(), vec!["a".to_string()]);
        // wrong operator
        assert_eq!(
            model.estimate(&Predicate::new("a", CompareOp::Gt, 5.0)),
            FALLBACK_FRACTION
        );
        // unknown column
        assert_eq!(
            model.estimate(&Predicate::new("zzz", CompareOp::Lt, 5.0)),
            FALLBACK_FRACTION
        );
    }

    #[test]
    fn estimates_clamp_at_zero() {
        let model = SelectivityModel {
            model: Some(LinearModel::from_weights([-10.0, 0.0, 0.0])),
            numeric_columns: vec!["a".to_string()],
        };
        assert_eq!(model.estimate(&Predicate::new("a", CompareOp::Lt, 5.0)), 0.0);
    }

    #[test]
    fn window_evicts_oldest_at_cap() {
        let mut window = TrainingWindow::new(WINDOW_CAP);
        for i in 0..51 {
            window.push([0.0, i as f64], 0.1);
        }
        assert_eq!(window.len(), WINDOW_CAP);
        assert_eq!(window.oldest().unwrap().0, [0.0, 1.0]);
    }
}
