//! Indented multi-line rendering of plan trees for driver output.

use adaptx_core::plan::PlanNode;
use std::fmt::Write;

/// Render a plan as an indented tree, one operator per line.
pub fn render(plan: &PlanNode) -> String {
    let mut out = String::new();
    render_into(plan, 0, &mut out);
    out
}

fn render_into(plan: &PlanNode, indent: usize, out: &mut String) {
    let prefix = "  ".repeat(indent);
    match plan {
        PlanNode::Scan { table } => {
            let _ = writeln!(out, "{prefix}Scan({table})");
        }
        PlanNode::Select { child, predicate } => {
            let _ = writeln!(out, "{prefix}Select [pred={predicate}]");
            render_into(child, indent + 1, out);
        }
        PlanNode::Join {
            left,
            right,
            condition,
        } => {
            match condition {
                Some(cond) => {
                    let _ = writeln!(out, "{prefix}Join [cond={cond}]");
                }
                None => {
                    let _ = writeln!(out, "{prefix}Join [cross]");
                }
            }
            render_into(left, indent + 1, out);
            render_into(right, indent + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adaptx_core::plan::{CompareOp, JoinCondition, Predicate};

    #[test]
    fn renders_nested_plan() {
        let plan = PlanNode::select(
            PlanNode::join(
                PlanNode::scan("r"),
                PlanNode::scan("s"),
                Some(JoinCondition::new("a", "b")),
            ),
            Predicate::new("c", CompareOp::Lt, 5.0),
        );
        let rendered = render(&plan);
        assert_eq!(
            rendered,
            "Select [pred=c<5]\n  Join [cond=a=b]\n    Scan(r)\n    Scan(s)\n"
        );
    }
}
