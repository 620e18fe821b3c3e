//! # Toy Row-Level Executor
//!
//! Evaluates a logical plan directly against the in-memory catalog to obtain
//! actual row counts for the feedback loop. Not an execution engine: no
//! batching, no indexes, nested-loop everything.
//!
//! Semantics:
//!
//! - **Select** keeps rows whose cell is numeric and satisfies the predicate;
//!   rows missing the column (or carrying text) never match.
//! - **Join** with a condition keeps pairs where both keys are present and
//!   equal; without a condition it is the full cross product. Materialized
//!   pairs merge the two row maps, right side winning on column collisions.
//! - **Scan** of an unknown table produces no rows.

use adaptx_core::catalog::{Catalog, Row};
use adaptx_core::plan::{CompareOp, PlanNode, Predicate};

/// Execute a plan and return the actual number of rows it produces.
pub fn execute(catalog: &Catalog, plan: &PlanNode) -> u64 {
    materialize(catalog, plan).len() as u64
}

/// Materialize the full row set a plan produces.
pub fn materialize(catalog: &Catalog, plan: &PlanNode) -> Vec<Row> {
    match plan {
        PlanNode::Scan { table } => catalog.rows(table).map(<[Row]>::to_vec).unwrap_or_default(),
        PlanNode::Select { child, predicate } => materialize(catalog, child)
            .into_iter()
            .filter(|row| matches_predicate(row, predicate))
            .collect(),
        PlanNode::Join {
            left,
            right,
            condition,
        } => {
            let left_rows = materialize(catalog, left);
            let right_rows = materialize(catalog, right);
            let mut out = Vec::new();
            for lr in &left_rows {
                for rr in &right_rows {
                    let keep = match condition {
                        None => true,
                        Some(cond) => match (lr.get(&cond.left_column), rr.get(&cond.right_column))
                        {
                            (Some(lv), Some(rv)) => lv == rv,
                            _ => false,
                        },
                    };
                    if keep {
                        let mut merged = lr.clone();
                        merged.extend(rr.clone());
                        out.push(merged);
                    }
                }
            }
            out
        }
    }
}

fn matches_predicate(row: &Row, predicate: &Predicate) -> bool {
    let Some(value) = row.get(&predicate.column).and_then(|v| v.as_number()) else {
        return false;
    };
    match predicate.op {
        CompareOp::Lt => value < predicate.value.0,
        CompareOp::Gt => value > predicate.value.0,
        CompareOp::Eq => value == predicate.value.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adaptx_core::catalog::{num, row, text};
    use adaptx_core::plan::JoinCondition;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.add_table(
            "r",
            vec![
                row(&[("k", num(1.0)), ("v", num(10.0))]),
                row(&[("k", num(2.0)), ("v", num(20.0))]),
                row(&[("k", num(3.0)), ("name", text("three"))]),
            ],
        );
        catalog.add_table(
            "s",
            vec![
                row(&[("k2", num(2.0))]),
                row(&[("k2", num(3.0))]),
                row(&[("k2", num(4.0))]),
            ],
        );
        catalog
    }

    #[test]
    fn select_filters_numeric_cells_only() {
        let plan = PlanNode::select(
            PlanNode::scan("r"),
            Predicate::new("v", CompareOp::Lt, 15.0),
        );
        // third row has no `v` at all and must not match
        assert_eq!(execute(&catalog(), &plan), 1);
    }

    #[test]
    fn equi_join_matches_present_and_equal_keys() {
        let plan = PlanNode::join(
            PlanNode::scan("r"),
            PlanNode::scan("s"),
            Some(JoinCondition::new("k", "k2")),
        );
        assert_eq!(execute(&catalog(), &plan), 2);
    }

    #[test]
    fn missing_condition_is_cross_product() {
        let plan = PlanNode::join(PlanNode::scan("r"), PlanNode::scan("s"), None);
        assert_eq!(execute(&catalog(), &plan), 9);
    }

    #[test]
    fn merged_rows_prefer_right_side() {
        let mut catalog = Catalog::new();
        catalog.add_table("a", vec![row(&[("x", num(1.0)), ("shared", num(1.0))])]);
        catalog.add_table("b", vec![row(&[("y", num(2.0)), ("shared", num(2.0))])]);
        let plan = PlanNode::join(PlanNode::scan("a"), PlanNode::scan("b"), None);
        let rows = materialize(&catalog, &plan);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("shared").unwrap().as_number(), Some(2.0));
    }

    #[test]
    fn unknown_table_yields_no_rows() {
        assert_eq!(execute(&catalog(), &PlanNode::scan("ghost")), 0);
    }
}
