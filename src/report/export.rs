//! Normalized table export.
//!
//! Writes the table the charts were drawn from as CSV or JSON so it can be
//! inspected or re-plotted elsewhere.

use crate::models::Table;
use serde_json::{Map, Value as JsonValue};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Export file type, chosen from the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unsupported export type for {0} (expected .csv or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write the table as CSV with a header row; missing cells are empty.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(table.columns())?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(|v| v.to_string()))?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write the table as a JSON array of objects keyed by column name.
pub fn write_json<W: Write>(table: &Table, writer: W) -> Result<(), ExportError> {
    let mut rows = Vec::with_capacity(table.len());
    for row in table.rows() {
        let mut object = Map::new();
        for (column, value) in table.columns().iter().zip(row) {
            object.insert(column.clone(), serde_json::to_value(value)?);
        }
        rows.push(JsonValue::Object(object));
    }

    serde_json::to_writer_pretty(writer, &rows)?;
    Ok(())
}

/// Write a table to `path` in the format its extension names.
pub fn write_table(table: &Table, path: &Path) -> Result<(), ExportError> {
    let format =
        ExportFormat::from_path(path).ok_or_else(|| ExportError::UnsupportedFormat(path.to_path_buf()))?;

    let io_error = |source: io::Error| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    let file = File::create(path).map_err(io_error)?;

    match format {
        ExportFormat::Csv => write_csv(table, file),
        ExportFormat::Json => write_json(table, file),
    }
}
