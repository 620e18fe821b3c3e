//! # Join Commutativity Rule
//!
//! Implements the algebraic identity `A JOIN B = B JOIN A`.
//!
//! Swapping join inputs matters to the cost model because the join
//! cardinality heuristic and downstream cost composition are not symmetric in
//! how sub-plan costs accumulate; enumerating both orientations lets the
//! search pick the cheaper one.
//!
//! ## Condition Swapping
//!
//! When the sides swap, the equi-join condition's column roles swap with
//! them: `A.x = B.y` becomes `B.y = A.x`. Equality is symmetric, so the
//! logical meaning is preserved regardless of side order, and commuting twice
//! restores the original plan value exactly.

use adaptx_core::plan::PlanNode;
use adaptx_core::rule::Rule;

/// Join commutativity: `Join(l, r, c) -> Join(r, l, swap(c))`.
pub struct JoinCommutativityRule;

impl Rule for JoinCommutativityRule {
    fn name(&self) -> &str {
        "JoinCommutativity"
    }

    fn apply(&self, plan: &PlanNode) -> Vec<PlanNode> {
        let PlanNode::Join {
            left,
            right,
            condition,
        } = plan
        else {
            return vec![];
        };

        vec![PlanNode::join(
            right.as_ref().clone(),
            left.as_ref().clone(),
            condition.as_ref().map(|c| c.swapped()),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adaptx_core::plan::JoinCondition;

    #[test]
    fn commutation_is_involutive() {
        let rule = JoinCommutativityRule;
        let original = PlanNode::join(
            PlanNode::scan("r"),
            PlanNode::scan("s"),
            Some(JoinCondition::new("x", "y")),
        );

        let commuted = rule.apply(&original).pop().unwrap();
        assert_ne!(commuted, original);

        let twice = rule.apply(&commuted).pop().unwrap();
        assert_eq!(twice, original);
    }

    #[test]
    fn condition_sides_swap_with_children() {
        let rule = JoinCommutativityRule;
        let plan = PlanNode::join(
            PlanNode::scan("r"),
            PlanNode::scan("s"),
            Some(JoinCondition::new("x", "y")),
        );
        let commuted = rule.apply(&plan).pop().unwrap();
        let PlanNode::Join { condition, .. } = &commuted else {
            panic!("expected a join");
        };
        assert_eq!(condition.as_ref().unwrap(), &JoinCondition::new("y", "x"));
    }

    #[test]
    fn non_join_nodes_are_untouched() {
        let rule = JoinCommutativityRule;
        assert!(rule.apply(&PlanNode::scan("r")).is_empty());
    }
}
