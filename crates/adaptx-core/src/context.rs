//! # Optimizer Context
//!
//! `OptimizerContext` is the explicit owner of all per-table optimizer state:
//! static table statistics, fitted selectivity models, and training windows.
//! Every component receives it as an argument; there is no ambient global
//! state, so independent optimizer instances (one per test, for example)
//! never interfere.
//!
//! The context is built once from a loaded [`Catalog`] snapshot: statistics
//! are copied, one selectivity model is fitted per table, and each table's
//! training window is seeded with the synthetic startup samples.

use crate::catalog::{Catalog, TableStats};
use crate::plan::Predicate;
use crate::selectivity::{
    synthetic_samples, LinearModel, SelectivityModel, TrainingWindow, FALLBACK_FRACTION,
    WINDOW_CAP,
};
use std::collections::HashMap;
use tracing::debug;

/// Knobs governing when and how feedback retrains the estimator.
#[derive(Debug, Clone, Copy)]
pub struct FeedbackPolicy {
    /// Minimum absolute error between predicted and observed fraction before
    /// a retrain fires. Deliberately high: only gross mispredictions count.
    pub error_threshold: f64,
    /// Capacity of each table's training window.
    pub window_cap: usize,
}

impl Default for FeedbackPolicy {
    fn default() -> Self {
        Self {
            error_threshold: 0.9,
            window_cap: WINDOW_CAP,
        }
    }
}

/// Per-table optimizer state, passed explicitly to every component.
#[derive(Debug)]
pub struct OptimizerContext {
    stats: HashMap<String, TableStats>,
    models: HashMap<String, SelectivityModel>,
    windows: HashMap<String, TrainingWindow>,
    pub policy: FeedbackPolicy,
}

impl OptimizerContext {
    /// Bootstrap the context from a loaded catalog: snapshot statistics and
    /// fit the initial selectivity models.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self::with_policy(catalog, FeedbackPolicy::default())
    }

    pub fn with_policy(catalog: &Catalog, policy: FeedbackPolicy) -> Self {
        let mut stats = HashMap::new();
        let mut models = HashMap::new();
        let mut windows = HashMap::new();

        for (name, rows) in catalog.tables() {
            if let Some(table_stats) = catalog.stats(name) {
                stats.insert(name.to_string(), table_stats);
            }

            let numeric_columns = catalog.numeric_columns(name);
            let mut window = TrainingWindow::new(policy.window_cap);
            for (features, fraction) in synthetic_samples(rows, &numeric_columns) {
                window.push(features, fraction);
            }
            let model = SelectivityModel::fit_initial(rows, numeric_columns);
            debug!(
                table = name,
                columns = model.numeric_columns().len(),
                seed_samples = window.len(),
                trained = model.model.is_some(),
                "initial selectivity model"
            );
            models.insert(name.to_string(), model);
            windows.insert(name.to_string(), window);
        }

        Self {
            stats,
            models,
            windows,
            policy,
        }
    }

    pub fn table_stats(&self, table: &str) -> Option<TableStats> {
        self.stats.get(table).copied()
    }

    pub fn model(&self, table: &str) -> Option<&SelectivityModel> {
        self.models.get(table)
    }

    pub fn window(&self, table: &str) -> Option<&TrainingWindow> {
        self.windows.get(table)
    }

    pub fn window_mut(&mut self, table: &str) -> Option<&mut TrainingWindow> {
        self.windows.get_mut(table)
    }

    /// Estimated fraction of `table`'s rows satisfying `predicate`, with the
    /// constant fallback when the table has no model at all.
    pub fn estimate_fraction(&self, table: &str, predicate: &Predicate) -> f64 {
        self.models
            .get(table)
            .map(|m| m.estimate(predicate))
            .unwrap_or(FALLBACK_FRACTION)
    }

    /// Atomically replace a table's regressor with a freshly fitted one.
    /// The numeric-column list is untouched.
    pub fn install_model(&mut self, table: &str, model: LinearModel) {
        if let Some(state) = self.models.get_mut(table) {
            state.model = Some(model);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{num, row};
    use crate::plan::{CompareOp, Predicate};

    #[test]
    fn bootstrap_trains_and_seeds_windows() {
        let mut catalog = Catalog::new();
        catalog.add_table("r", (1..=10).map(|i| row(&[("a", num(i as f64))])).collect());

        let ctx = OptimizerContext::from_catalog(&catalog);
        assert_eq!(ctx.table_stats("r").unwrap().row_count, 10);
        // one column, two synthetic thresholds
        assert_eq!(ctx.window("r").unwrap().len(), 2);
        let estimate = ctx.estimate_fraction("r", &Predicate::new("a", CompareOp::Lt, 5.0));
        assert!((estimate - 0.4).abs() < 1e-3);
    }

    #[test]
    fn unknown_table_estimates_fall_back() {
        let ctx = OptimizerContext::from_catalog(&Catalog::new());
        let estimate = ctx.estimate_fraction("ghost", &Predicate::new("a", CompareOp::Lt, 1.0));
        assert_eq!(estimate, FALLBACK_FRACTION);
    }
}
