//! # Plan Search Engine
//!
//! Enumerates the closure of logically equivalent plans reachable from a seed
//! plan under the registered transformation rules, then picks the cheapest
//! candidate under the cost model.
//!
//! ## Exploration
//!
//! A worklist seeded with the input plan is drained candidate by candidate.
//! Each candidate not already in the result set (by structural equality) is
//! admitted, and its direct rewrites are pushed back onto the worklist:
//!
//! - `Select{child, p}`: every rewrite `c'` of `child` yields `Select{c', p}`.
//! - `Join{l, r, c}`: the registered rules applied at the join itself, plus
//!   `Join{l', r, c}` for every rewrite `l'` of `l` and `Join{l, r', c}` for
//!   every rewrite `r'` of `r`.
//! - `Scan`: no rewrites.
//!
//! The order of expansion is not semantically significant; the final winner
//! is order-independent (see below). With only the involutive commutativity
//! rule the closure is small and finite; the iteration budget in
//! [`SearchConfig`] is the safety valve for richer rule sets.
//!
//! ## Deterministic Selection
//!
//! Every candidate in the closure is scored with the cost model. The winner
//! is the candidate minimizing `(cost, canonical serialization)`: on a cost
//! tie (the `Cost` type's epsilon equality) the lexicographically smallest
//! rendering wins, so the result is reproducible across runs regardless of
//! worklist ordering.

use crate::context::OptimizerContext;
use crate::cost::{estimate_cost, Cost};
use crate::plan::PlanNode;
use crate::rule::RuleRegistry;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace};

/// Limits preventing runaway exploration.
///
/// `max_iterations` bounds the number of candidates admitted to the result
/// set. The shipped rule set cannot exhaust it; a non-involutive rule could.
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    pub max_iterations: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
        }
    }
}

/// Worklist-based plan enumerator with cost-based selection.
pub struct PlanSearch {
    registry: Arc<RuleRegistry>,
    config: SearchConfig,
}

impl PlanSearch {
    pub fn new(registry: Arc<RuleRegistry>) -> Self {
        Self {
            registry,
            config: SearchConfig::default(),
        }
    }

    pub fn with_config(registry: Arc<RuleRegistry>, config: SearchConfig) -> Self {
        Self { registry, config }
    }

    /// Pick the cheapest plan in the closure of `root`.
    ///
    /// The result set always contains the seed, so a plan is always returned:
    /// the optimizer favors availability over precision.
    pub fn optimize(&self, ctx: &OptimizerContext, root: &PlanNode) -> PlanNode {
        let candidates = self.explore(root);

        let mut best: Option<(Cost, String, &PlanNode)> = None;
        for candidate in &candidates {
            let cost = estimate_cost(ctx, candidate);
            let canonical = candidate.to_string();
            trace!(cost = cost.total, plan = %canonical, "scored candidate");
            let better = match &best {
                None => true,
                Some((best_cost, best_canonical, _)) => {
                    cost < *best_cost || (cost == *best_cost && canonical < *best_canonical)
                }
            };
            if better {
                best = Some((cost, canonical, candidate));
            }
        }

        // The seed is always admitted, so `best` is present for any sane
        // config; degrade to the seed itself rather than failing the query.
        match best {
            Some((cost, _, winner)) => {
                debug!(
                    candidates = candidates.len(),
                    cost = cost.total,
                    plan = %winner,
                    "optimization complete"
                );
                winner.clone()
            }
            None => root.clone(),
        }
    }

    /// The de-duplicated closure of `root` under the registered rules, in
    /// first-encountered order.
    pub fn explore(&self, root: &PlanNode) -> Vec<PlanNode> {
        let mut seen: HashSet<PlanNode> = HashSet::new();
        let mut result: Vec<PlanNode> = Vec::new();
        let mut worklist: Vec<PlanNode> = vec![root.clone()];

        while let Some(current) = worklist.pop() {
            if seen.contains(&current) {
                continue;
            }
            if result.len() >= self.config.max_iterations {
                debug!(limit = self.config.max_iterations, "hit exploration budget");
                break;
            }
            for rewrite in self.rewrites(&current) {
                if !seen.contains(&rewrite) {
                    worklist.push(rewrite);
                }
            }
            seen.insert(current.clone());
            result.push(current);
        }

        result
    }

    /// Direct rewrites of a node: rule applications at the node itself plus
    /// single-child rewrites propagated through Select/Join structure.
    fn rewrites(&self, plan: &PlanNode) -> Vec<PlanNode> {
        let mut out: Vec<PlanNode> = Vec::new();

        for rule in self.registry.rules() {
            for rewrite in rule.apply(plan) {
                trace!(rule = rule.name(), plan = %rewrite, "rule fired");
                out.push(rewrite);
            }
        }

        match plan {
            PlanNode::Scan { .. } => {}
            PlanNode::Select { child, predicate } => {
                for child_rewrite in self.rewrites(child) {
                    out.push(PlanNode::select(child_rewrite, predicate.clone()));
                }
            }
            PlanNode::Join {
                left,
                right,
                condition,
            } => {
                for left_rewrite in self.rewrites(left) {
                    out.push(PlanNode::join(
                        left_rewrite,
                        right.as_ref().clone(),
                        condition.clone(),
                    ));
                }
                for right_rewrite in self.rewrites(right) {
                    out.push(PlanNode::join(
                        left.as_ref().clone(),
                        right_rewrite,
                        condition.clone(),
                    ));
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_config_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.max_iterations, 10_000);
    }

    #[test]
    fn empty_registry_yields_only_the_seed() {
        let search = PlanSearch::new(Arc::new(RuleRegistry::new()));
        let seed = PlanNode::join(PlanNode::scan("r"), PlanNode::scan("s"), None);
        let closure = search.explore(&seed);
        assert_eq!(closure, vec![seed]);
    }
}
