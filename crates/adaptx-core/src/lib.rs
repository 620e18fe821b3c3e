//! # adaptx-core: Adaptive Cost-Based Logical Query Optimizer Core
//!
//! This crate implements the core data structures and algorithms for a small
//! cost-based logical query optimizer with a learned, per-table selectivity
//! estimator that is retrained online from execution feedback.
//!
//! ## Module Overview
//!
//! - **`plan`**: The logical plan model -- a closed tree of Scan, Select, and
//!   Join nodes with structured predicates, compared and hashed by shape.
//! - **`catalog`**: In-memory tables with derived per-table statistics
//!   (row count, cost-per-row constant).
//! - **`selectivity`**: The learned selectivity estimator -- one linear
//!   regression model per table mapping `(column index, threshold)` to the
//!   fraction of rows satisfying `column < threshold`, plus the bounded FIFO
//!   training window that keeps it retrainable.
//! - **`cost`**: Recursive cost and cardinality estimation over plan trees.
//! - **`rule`**: The transformation rule trait and rule registry.
//! - **`search`**: Worklist-based enumeration of logically equivalent plans
//!   with structural de-duplication and cost-based selection.
//! - **`feedback`**: The online feedback loop comparing predicted against
//!   observed row counts and retraining the estimator on gross mispredictions.
//! - **`context`**: `OptimizerContext`, the explicit owner of all per-table
//!   state (statistics, models, windows). No global registries: independent
//!   optimizer instances never interfere.

pub mod catalog;
pub mod context;
pub mod cost;
pub mod feedback;
pub mod plan;
pub mod rule;
pub mod search;
pub mod selectivity;
