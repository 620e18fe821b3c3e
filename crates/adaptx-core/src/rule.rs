//! # Rule System
//!
//! Transformation rules rewrite a plan node into zero or more logically
//! equivalent alternatives. The search engine applies every registered rule
//! at every node of every candidate plan, recursing through Select and Join
//! structure to rebuild rewritten subtrees in place.
//!
//! ## Termination
//!
//! The currently shipped rule set (join commutativity) is involutive, so the
//! reachable closure is finite and the search's structural de-duplication
//! bounds it. A richer rule set has no such guarantee; the search engine
//! therefore also enforces an explicit iteration budget
//! ([`crate::search::SearchConfig`]) as a required safeguard when rules are
//! extended.

use crate::plan::PlanNode;

/// A transformation rule: produce direct rewrites of the given node.
///
/// `apply` is called with the node as the rewrite root; rules must not
/// recurse into children themselves -- the search engine owns structural
/// propagation.
pub trait Rule: Send + Sync {
    /// Unique name of this rule, used in trace output.
    fn name(&self) -> &str;

    /// Equivalent alternatives for `plan`, or empty when the rule does not
    /// apply to this node shape.
    fn apply(&self, plan: &PlanNode) -> Vec<PlanNode>;
}

/// Registry of transformation rules consulted by the search engine.
#[derive(Default)]
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
