//! # Cost Model
//!
//! Recursive cost and cardinality estimation over logical plan trees.
//!
//! ## Formulas
//!
//! - **Scan**: cardinality = stored row count; cost = rows × cost_per_row.
//! - **Select**: cardinality = selectivity-adjusted child cardinality. When
//!   the child is a `Scan`, the learned estimator provides the selectivity;
//!   for any other child shape a fixed 0.5 multiplier applies, modeling the
//!   estimator's inability to reason through non-leaf children.
//!   Cost = child cost + cardinality × 0.01.
//! - **Join**: cardinality = full cross product without a condition, else
//!   `0.5 × min(left, right)` -- a deliberately crude equi-join heuristic.
//!   Cost = left cost + right cost + cardinality × 0.02.
//!
//! All arithmetic is floating point. Cardinalities never go negative (model
//! predictions are clamped upstream and again here), and a zero row count is
//! never divided by. The `PlanNode` enum is closed and matched exhaustively,
//! so an unrecognized node kind is a compile error rather than a runtime
//! sentinel.

use crate::context::OptimizerContext;
use crate::plan::{JoinCondition, PlanNode};
use serde::{Deserialize, Serialize};

/// Per-row cost factor applied to rows surviving a Select.
pub const SELECT_COST_PER_ROW: f64 = 0.01;

/// Per-row cost factor applied to rows produced by a Join.
pub const JOIN_COST_PER_ROW: f64 = 0.02;

/// Selectivity multiplier for a Select whose child is not a base-table scan.
pub const OPAQUE_CHILD_SELECTIVITY: f64 = 0.5;

/// Cost is a single comparable value representing the estimated expense of a
/// plan. Lower is better; `infinite()` marks a plan that has not been costed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cost {
    pub total: f64,
}

impl Cost {
    pub fn zero() -> Self {
        Self { total: 0.0 }
    }

    pub fn new(total: f64) -> Self {
        Self { total }
    }

    pub fn infinite() -> Self {
        Self { total: f64::MAX }
    }

    pub fn is_infinite(&self) -> bool {
        self.total == f64::MAX
    }
}

/// Epsilon-based equality to handle floating-point imprecision in cost
/// comparisons.
impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        (self.total - other.total).abs() < f64::EPSILON
    }
}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.total.partial_cmp(&other.total)
    }
}

/// Estimated number of rows a plan produces.
pub fn estimate_cardinality(ctx: &OptimizerContext, plan: &PlanNode) -> f64 {
    match plan {
        PlanNode::Scan { table } => base_row_count(ctx, table),
        PlanNode::Select { child, predicate } => match child.as_ref() {
            PlanNode::Scan { table } => {
                let fraction = ctx.estimate_fraction(table, predicate);
                (fraction * base_row_count(ctx, table)).max(0.0)
            }
            other => estimate_cardinality(ctx, other) * OPAQUE_CHILD_SELECTIVITY,
        },
        PlanNode::Join {
            left,
            right,
            condition,
        } => join_cardinality(
            estimate_cardinality(ctx, left),
            estimate_cardinality(ctx, right),
            condition.as_ref(),
        ),
    }
}

/// Estimated execution expense of a plan.
pub fn estimate_cost(ctx: &OptimizerContext, plan: &PlanNode) -> Cost {
    let total = match plan {
        PlanNode::Scan { table } => {
            let cost_per_row = ctx
                .table_stats(table)
                .map(|s| s.cost_per_row)
                .unwrap_or(0.0);
            base_row_count(ctx, table) * cost_per_row
        }
        PlanNode::Select { child, .. } => {
            let child_cost = estimate_cost(ctx, child).total;
            child_cost + estimate_cardinality(ctx, plan) * SELECT_COST_PER_ROW
        }
        PlanNode::Join { left, right, .. } => {
            let left_cost = estimate_cost(ctx, left).total;
            let right_cost = estimate_cost(ctx, right).total;
            left_cost + right_cost + estimate_cardinality(ctx, plan) * JOIN_COST_PER_ROW
        }
    };
    Cost::new(total)
}

/// Join output cardinality: cross product without a condition, otherwise half
/// of the smaller input.
pub fn join_cardinality(left: f64, right: f64, condition: Option<&JoinCondition>) -> f64 {
    match condition {
        None => left * right,
        Some(_) => 0.5 * left.min(right),
    }
}

/// Row count from statistics; an unknown table contributes nothing rather
/// than failing the whole estimate.
fn base_row_count(ctx: &OptimizerContext, table: &str) -> f64 {
    ctx.table_stats(table).map(|s| s.row_count as f64).unwrap_or(0.0)
}
