// src/sheet/mod.rs
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use tracing::debug;

/// A wide sheet exactly as converted to CSV: one header row plus data rows,
/// every cell kept as text. Row order is the source order; the realignment
/// stage depends on it.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Read one converted sheet from `path`.
///
/// The converter may emit ragged rows and trailing blank lines. Blank records
/// at the end are dropped; every other row keeps its source position.
pub fn read_sheet(path: impl AsRef<Path>) -> Result<SheetTable> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening converted sheet {:?}", path))?;

    let headers: Vec<String> = rdr
        .headers()
        .with_context(|| format!("reading header row of {:?}", path))?
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = record
            .with_context(|| format!("CSV parse error in {:?} at record {}", path, idx))?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }
    while rows
        .last()
        .is_some_and(|row| row.iter().all(|cell| cell.trim().is_empty()))
    {
        rows.pop();
    }

    debug!(path = %path.display(), rows = rows.len(), cols = headers.len(), "read sheet");
    Ok(SheetTable { headers, rows })
}
