//! # Built-in Transformation Rules
//!
//! The default rule set for the adaptx plan search engine. Today it consists
//! of a single rule:
//!
//! - **`JoinCommutativityRule`**: swaps the sides of a join
//!   (`A JOIN B -> B JOIN A`), letting the cost model compare both
//!   orientations.
//!
//! Rules registered here must be logically equivalence-preserving; the search
//! engine de-duplicates structurally and relies on the engine-level iteration
//! budget to stay bounded if a non-involutive rule is ever added.

pub mod join_commutativity;

use adaptx_core::rule::RuleRegistry;

/// Create a rule registry with all built-in rules.
pub fn default_rule_registry() -> RuleRegistry {
    let mut registry = RuleRegistry::new();
    registry.add_rule(Box::new(join_commutativity::JoinCommutativityRule));
    registry
}
