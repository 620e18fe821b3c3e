//! JSON dataset loading: a mapping from table name to an ordered sequence of
//! row records, mirrored into the catalog with lowercase names.

use adaptx_core::catalog::{Catalog, CellValue};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read dataset file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse dataset file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct DatasetFile {
    tables: HashMap<String, Vec<HashMap<String, CellValue>>>,
}

/// Load the mock dataset into a fresh catalog.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog, LoadError> {
    let raw = std::fs::read_to_string(path)?;
    let dataset: DatasetFile = serde_json::from_str(&raw)?;

    let mut catalog = Catalog::new();
    for (name, rows) in dataset.tables {
        let rows: Vec<_> = rows
            .into_iter()
            .map(|r| r.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect())
            .collect();
        debug!(table = %name, rows = rows.len(), "table loaded");
        catalog.add_table(name, rows);
    }
    Ok(catalog)
}
