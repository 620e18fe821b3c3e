//! # Logical Plan Model
//!
//! The plan is a closed tree of three node kinds: `Scan`, `Select`, and `Join`.
//! It is the common vocabulary of every other component: the search engine
//! rewrites plans, the cost model scores them, the feedback loop walks them.
//!
//! ## Structural Equality
//!
//! Equality and hashing are deep and order-sensitive: `Join(A, B)` and
//! `Join(B, A)` are distinct values even though they are logically equivalent.
//! The search engine relies on this to keep commuted plans as separate
//! candidates in its de-duplicated result set. Numeric literals use
//! `OrderedFloat` so that predicates participate in `Eq`/`Hash`.
//!
//! ## Structured Predicates
//!
//! Predicates and join conditions are parsed once, at the parser boundary,
//! into typed values. The cost model and feedback loop never re-parse strings;
//! malformed input surfaces as a typed parse failure before a plan exists.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operators allowed in a filter predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    /// Less than (`<`). The only operator the selectivity model is trained on.
    Lt,
    /// Greater than (`>`).
    Gt,
    /// Equality (`=`).
    Eq,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Eq => write!(f, "="),
        }
    }
}

/// A normalized single-column range/equality predicate: `column <op> value`.
///
/// Column names are stored lowercase, without table qualifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Predicate {
    pub column: String,
    pub op: CompareOp,
    pub value: OrderedFloat<f64>,
}

impl Predicate {
    pub fn new(column: impl Into<String>, op: CompareOp, value: f64) -> Self {
        Self {
            column: column.into(),
            op,
            value: OrderedFloat(value),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.column, self.op, self.value)
    }
}

/// An equality join condition between a column of the left child's output and
/// a column of the right child's output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JoinCondition {
    pub left_column: String,
    pub right_column: String,
}

impl JoinCondition {
    pub fn new(left_column: impl Into<String>, right_column: impl Into<String>) -> Self {
        Self {
            left_column: left_column.into(),
            right_column: right_column.into(),
        }
    }

    /// The same logical condition seen from swapped join sides.
    pub fn swapped(&self) -> Self {
        Self {
            left_column: self.right_column.clone(),
            right_column: self.left_column.clone(),
        }
    }
}

impl fmt::Display for JoinCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.left_column, self.right_column)
    }
}

/// A logical plan node. The set of kinds is closed: cost estimation and the
/// search engine match exhaustively, so adding a kind is a compile-time
/// forcing function rather than a silent fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanNode {
    /// Leaf: read one table by name.
    Scan { table: String },
    /// Unary filter over any child plan.
    Select {
        child: Box<PlanNode>,
        predicate: Predicate,
    },
    /// Binary join; `condition` absent means cross product.
    Join {
        left: Box<PlanNode>,
        right: Box<PlanNode>,
        condition: Option<JoinCondition>,
    },
}

impl PlanNode {
    pub fn scan(table: impl Into<String>) -> Self {
        PlanNode::Scan {
            table: table.into(),
        }
    }

    pub fn select(child: PlanNode, predicate: Predicate) -> Self {
        PlanNode::Select {
            child: Box::new(child),
            predicate,
        }
    }

    pub fn join(left: PlanNode, right: PlanNode, condition: Option<JoinCondition>) -> Self {
        PlanNode::Join {
            left: Box::new(left),
            right: Box::new(right),
            condition,
        }
    }
}

/// Canonical single-line serialization.
///
/// Used as the deterministic tie-break key when two candidate plans have the
/// same estimated cost: the lexicographically smallest rendering wins, so the
/// chosen plan is reproducible across worklist orderings and runs.
impl fmt::Display for PlanNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanNode::Scan { table } => write!(f, "Scan({table})"),
            PlanNode::Select { child, predicate } => {
                write!(f, "Select[{predicate}]({child})")
            }
            PlanNode::Join {
                left,
                right,
                condition,
            } => match condition {
                Some(cond) => write!(f, "Join[{cond}]({left},{right})"),
                None => write!(f, "Join[cross]({left},{right})"),
            },
        }
    }
}
