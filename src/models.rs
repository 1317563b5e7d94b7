//! Data models for benchmark results.
//!
//! This module contains the core data structures shared by the loader,
//! the aggregator and the normalizer: algorithm sources, cell values,
//! result records and the tabular form they are unioned into.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Raw column holding the pattern-set size.
pub const SIZE_COLUMN: &str = "size";
/// Raw column holding the measured duration in seconds.
pub const DURATION_COLUMN: &str = "duration";
/// Tag column naming the algorithm that produced a record.
pub const SOURCE_COLUMN: &str = "source";
/// Tag column holding the dataset identifier (result file stem).
pub const DATASET_COLUMN: &str = "dataset";

/// Pattern matching algorithm whose results are being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Source {
    /// Quartz pattern matching (C++ implementation).
    Quartz,
    /// Portmatching automaton-based pattern matching.
    Portmatching,
}

impl Source {
    /// Every configured source, in aggregation order.
    pub const ALL: [Source; 2] = [Source::Quartz, Source::Portmatching];

    /// Label written into the `source` column.
    pub fn label(&self) -> &'static str {
        match self {
            Source::Quartz => "Quartz",
            Source::Portmatching => "Portmatching",
        }
    }

    /// Name of the results subfolder holding this source's files.
    pub fn folder_name(&self) -> &'static str {
        match self {
            Source::Quartz => "quartz",
            Source::Portmatching => "portmatching",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quartz" => Ok(Source::Quartz),
            "portmatching" => Ok(Source::Portmatching),
            other => Err(format!("unknown pattern matching algorithm: {}", other)),
        }
    }
}

/// A single cell of a result table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    /// Absent in the source file, or empty.
    Missing,
}

impl Value {
    /// Infer a value from a raw CSV field: integer, then real, then text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Missing;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Value::Float(f);
        }
        Value::Text(trimmed.to_string())
    }

    /// Keep a raw CSV field as text; only an empty field becomes `Missing`.
    pub fn verbatim(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Value::Missing
        } else {
            Value::Text(trimmed.to_string())
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(s) => s.parse().ok(),
            Value::Missing => None,
        }
    }

    /// Non-negative integer view of the value.
    pub fn as_count(&self) -> Option<u64> {
        match self {
            Value::Int(i) => u64::try_from(*i).ok(),
            Value::Float(f) if *f >= 0.0 && f.fract() == 0.0 => Some(*f as u64),
            Value::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Text view of the value. Numbers are not converted.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
            Value::Missing => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// One row of raw measurement data read from a result file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    /// Algorithm that produced the measurement.
    pub source: Source,
    /// Dataset identifier, the stem of the result file.
    pub dataset: String,
    /// Payload columns in file order.
    pub fields: Vec<(String, Value)>,
}

impl ResultRecord {
    /// Look up a payload field by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

/// The records read from one result file.
#[derive(Debug, Clone)]
pub struct ResultFile {
    /// Source folder the file was found in.
    pub source: Source,
    /// Dataset identifier (file stem).
    pub dataset: String,
    /// Path of the file on disk.
    pub path: PathBuf,
    /// Records in file order.
    pub records: Vec<ResultRecord>,
}

/// Column-named rows of values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Creates an empty table with the given columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Appends a row. Short rows are padded with `Missing`.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Missing);
        self.rows.push(row);
    }

    /// Value at `row` in the named column.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// All values of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Renames a column in place. Returns false if `from` does not exist.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column_index(from) {
            Some(idx) => {
                self.columns[idx] = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Appends a column; `values` must have one entry per row.
    pub fn push_column(&mut self, name: &str, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }
}
