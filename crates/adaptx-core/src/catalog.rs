//! # In-Memory Catalog and Table Statistics
//!
//! The catalog owns the loaded dataset (tables as ordered row maps) and the
//! per-table statistics derived from it at load time. Statistics are read by
//! the cost model and by initial estimator training; they are never mutated
//! during a query.
//!
//! Rows are maps from lowercase column name to a cell value. The value type
//! distinguishes numbers from text because the selectivity estimator only
//! reasons about numeric columns.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Cost scaling constant applied to every scanned row.
pub const DEFAULT_COST_PER_ROW: f64 = 0.01;

/// A single cell. Untagged so JSON numbers and strings deserialize directly.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }
}

/// A row keyed by lowercase column name. `BTreeMap` keeps column iteration
/// order deterministic, which fixes the numeric-column ordering the
/// estimator's feature encoding depends on.
pub type Row = BTreeMap<String, CellValue>;

/// Static per-table statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStats {
    pub row_count: u64,
    pub cost_per_row: f64,
}

/// In-memory table store populated by the dataset loader.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: HashMap<String, Vec<Row>>,
    stats: HashMap<String, TableStats>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table, deriving its statistics from the row set.
    /// Table names are stored lowercase.
    pub fn add_table(&mut self, name: impl Into<String>, rows: Vec<Row>) {
        let name = name.into().to_lowercase();
        self.stats.insert(
            name.clone(),
            TableStats {
                row_count: rows.len() as u64,
                cost_per_row: DEFAULT_COST_PER_ROW,
            },
        );
        self.tables.insert(name, rows);
    }

    pub fn rows(&self, table: &str) -> Option<&[Row]> {
        self.tables.get(table).map(|r| r.as_slice())
    }

    pub fn stats(&self, table: &str) -> Option<TableStats> {
        self.stats.get(table).copied()
    }

    /// Iterate over `(table name, rows)` pairs.
    pub fn tables(&self) -> impl Iterator<Item = (&str, &[Row])> {
        self.tables.iter().map(|(n, r)| (n.as_str(), r.as_slice()))
    }

    /// The table's numeric columns in deterministic (lexicographic) order.
    ///
    /// A column counts as numeric when it appears in at least one row and
    /// every cell that carries it is a number.
    pub fn numeric_columns(&self, table: &str) -> Vec<String> {
        let Some(rows) = self.tables.get(table) else {
            return Vec::new();
        };
        let mut numeric: BTreeMap<&str, bool> = BTreeMap::new();
        for row in rows {
            for (col, value) in row {
                let is_number = matches!(value, CellValue::Number(_));
                numeric
                    .entry(col.as_str())
                    .and_modify(|flag| *flag &= is_number)
                    .or_insert(is_number);
            }
        }
        numeric
            .into_iter()
            .filter(|(_, is_number)| *is_number)
            .map(|(col, _)| col.to_string())
            .collect()
    }
}

/// Helper for building rows in code (loader and tests).
pub fn row(cells: &[(&str, CellValue)]) -> Row {
    cells
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.clone()))
        .collect()
}

/// Shorthand for a numeric cell.
pub fn num(v: f64) -> CellValue {
    CellValue::Number(v)
}

/// Shorthand for a text cell.
pub fn text(v: &str) -> CellValue {
    CellValue::Text(v.to_string())
}
