//! # Online Feedback Loop
//!
//! After a chosen plan executes, the observed row count is compared against
//! the estimator's prediction. Gross mispredictions append the observation to
//! the table's bounded training window and refit the regressor on the whole
//! window, so systematic estimation error corrects itself over time.
//!
//! Only `Select` directly over `Scan` is eligible: that is the one shape
//! where the observed count maps cleanly onto a single-table fraction. The
//! walk recurses through Joins and stacked Selects, propagating the same
//! observed count to every reachable eligible node; bare Scans produce no
//! feedback. Malformed or out-of-domain predicates are silently skipped --
//! feedback never fails a query.

use crate::context::OptimizerContext;
use crate::plan::{CompareOp, PlanNode, Predicate};
use crate::selectivity::LinearModel;
use tracing::{debug, trace};

/// Compare predicted against observed rows for every eligible filter in the
/// plan and retrain the affected estimators in place.
pub fn apply_feedback(ctx: &mut OptimizerContext, plan: &PlanNode, actual_rows: u64) {
    match plan {
        PlanNode::Select { child, predicate } => match child.as_ref() {
            PlanNode::Scan { table } => {
                observe_select_over_scan(ctx, table, predicate, actual_rows);
            }
            other => apply_feedback(ctx, other, actual_rows),
        },
        PlanNode::Join { left, right, .. } => {
            apply_feedback(ctx, left, actual_rows);
            apply_feedback(ctx, right, actual_rows);
        }
        PlanNode::Scan { .. } => {}
    }
}

fn observe_select_over_scan(
    ctx: &mut OptimizerContext,
    table: &str,
    predicate: &Predicate,
    actual_rows: u64,
) {
    let Some(stats) = ctx.table_stats(table) else {
        return;
    };
    let actual_fraction = if stats.row_count == 0 {
        0.0
    } else {
        actual_rows as f64 / stats.row_count as f64
    };

    // The model is trained only for `<` on a known numeric column; anything
    // else is out of domain and skipped.
    if predicate.op != CompareOp::Lt {
        return;
    }
    let Some(model) = ctx.model(table) else {
        return;
    };
    if model.model.is_none() {
        return;
    }
    let Some(column_index) = model.column_index(&predicate.column) else {
        return;
    };

    let predicted_fraction = ctx.estimate_fraction(table, predicate);
    let error = (predicted_fraction - actual_fraction).abs();
    trace!(
        table,
        predicate = %predicate,
        predicted = predicted_fraction,
        actual = actual_fraction,
        "feedback observation"
    );
    if error <= ctx.policy.error_threshold {
        return;
    }

    let features = [column_index as f64, predicate.value.0];
    let samples = {
        let Some(window) = ctx.window_mut(table) else {
            return;
        };
        window.push(features, actual_fraction);
        window.samples()
    };

    // Refit on the whole window; the new model replaces the old one only
    // after fitting succeeds.
    if let Some(refit) = LinearModel::fit(&samples) {
        ctx.install_model(table, refit);
        debug!(
            table,
            predicate = %predicate,
            error,
            window = samples.len(),
            "estimator retrained"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{num, row, Catalog};
    use crate::context::{FeedbackPolicy, OptimizerContext};
    use crate::plan::Predicate;
    use crate::selectivity::WINDOW_CAP;

    fn context() -> OptimizerContext {
        let mut catalog = Catalog::new();
        catalog.add_table("r", (1..=10).map(|i| row(&[("a", num(i as f64))])).collect());
        OptimizerContext::from_catalog(&catalog)
    }

    fn poisoned_context() -> OptimizerContext {
        let mut ctx = context();
        // A grossly wrong model: predicts a huge fraction everywhere.
        ctx.install_model("r", LinearModel::from_weights([5.0, 0.0, 0.0]));
        ctx
    }

    #[test]
    fn small_error_does_not_retrain() {
        let mut ctx = context();
        let before = ctx.window("r").unwrap().len();
        let plan = PlanNode::select(PlanNode::scan("r"), Predicate::new("a", CompareOp::Lt, 5.0));
        // actual 4 rows matches the ~0.4 prediction closely
        apply_feedback(&mut ctx, &plan, 4);
        assert_eq!(ctx.window("r").unwrap().len(), before);
    }

    #[test]
    fn gross_error_appends_and_retrains() {
        let mut ctx = poisoned_context();
        let plan = PlanNode::select(PlanNode::scan("r"), Predicate::new("a", CompareOp::Lt, 5.0));
        apply_feedback(&mut ctx, &plan, 4);

        let window = ctx.window("r").unwrap();
        assert_eq!(window.len(), 3);
        let appended = window.samples().last().copied().unwrap();
        assert_eq!(appended, ([0.0, 5.0], 0.4));

        // The refit pulls the estimate back toward the observation.
        let estimate = ctx.estimate_fraction("r", &Predicate::new("a", CompareOp::Lt, 5.0));
        assert!(estimate < 1.0, "estimate still poisoned: {estimate}");
    }

    #[test]
    fn out_of_domain_predicates_are_skipped() {
        let mut ctx = poisoned_context();
        for predicate in [
            Predicate::new("a", CompareOp::Gt, 5.0),
            Predicate::new("unknown", CompareOp::Lt, 5.0),
        ] {
            let plan = PlanNode::select(PlanNode::scan("r"), predicate);
            apply_feedback(&mut ctx, &plan, 0);
        }
        assert_eq!(ctx.window("r").unwrap().len(), 2);
    }

    #[test]
    fn select_over_join_propagates_to_both_sides() {
        let mut ctx = poisoned_context();
        let join = PlanNode::join(
            PlanNode::select(PlanNode::scan("r"), Predicate::new("a", CompareOp::Lt, 3.0)),
            PlanNode::scan("r"),
            None,
        );
        let plan = PlanNode::select(join, Predicate::new("a", CompareOp::Lt, 9.0));
        apply_feedback(&mut ctx, &plan, 0);
        // inner select-over-scan received the observation (0/10 vs ~5.0 predicted)
        assert_eq!(ctx.window("r").unwrap().len(), 3);
    }

    #[test]
    fn window_never_exceeds_cap() {
        let mut catalog = Catalog::new();
        catalog.add_table("r", (1..=10).map(|i| row(&[("a", num(i as f64))])).collect());
        let mut ctx = OptimizerContext::with_policy(
            &catalog,
            FeedbackPolicy {
                // accept every observation so the window fills quickly
                error_threshold: -1.0,
                ..FeedbackPolicy::default()
            },
        );

        for i in 0..60 {
            let plan = PlanNode::select(
                PlanNode::scan("r"),
                Predicate::new("a", CompareOp::Lt, i as f64),
            );
            apply_feedback(&mut ctx, &plan, 4);
        }
        assert_eq!(ctx.window("r").unwrap().len(), WINDOW_CAP);
    }

    #[test]
    fn zero_row_table_never_divides() {
        let mut catalog = Catalog::new();
        catalog.add_table("empty", vec![]);
        let mut ctx = OptimizerContext::from_catalog(&catalog);
        let plan = PlanNode::select(
            PlanNode::scan("empty"),
            Predicate::new("a", CompareOp::Lt, 1.0),
        );
        // must not panic; no model exists so no retrain either
        apply_feedback(&mut ctx, &plan, 0);
        assert_eq!(ctx.window("empty").unwrap().len(), 0);
    }
}
