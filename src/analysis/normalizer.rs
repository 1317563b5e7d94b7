//! Schema normalization.
//!
//! Renames the raw result columns to the names used in charts and derives
//! the `n_qubits` and `dataset type` dimensions from the dataset identifier.

use super::grammar::{DatasetGrammar, GrammarWarning};
use crate::models::{Source, Table, Value, DATASET_COLUMN, DURATION_COLUMN, SIZE_COLUMN, SOURCE_COLUMN};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

pub const N_PATTERNS_COLUMN: &str = "Number of patterns";
pub const ALGORITHM_COLUMN: &str = "Pattern matching algorithm";
pub const N_QUBITS_COLUMN: &str = "n_qubits";
pub const DATASET_TYPE_COLUMN: &str = "dataset type";

/// Name given to the renamed `duration` column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum DurationColumn {
    /// `Runtime (s)`
    #[default]
    Runtime,
    /// `Duration (s)`, used by the legacy single-figure plots
    Duration,
}

impl DurationColumn {
    pub fn label(&self) -> &'static str {
        match self {
            DurationColumn::Runtime => "Runtime (s)",
            DurationColumn::Duration => "Duration (s)",
        }
    }
}

/// How a run names and decodes its columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaOptions {
    pub grammar: DatasetGrammar,
    pub duration_column: DurationColumn,
}

impl SchemaOptions {
    /// Voqc identifiers and `Duration (s)`, as in the first version of the plots.
    pub fn legacy() -> Self {
        Self {
            grammar: DatasetGrammar::LegacyVoqc,
            duration_column: DurationColumn::Duration,
        }
    }
}

impl From<&crate::config::SchemaConfig> for SchemaOptions {
    fn from(config: &crate::config::SchemaConfig) -> Self {
        Self {
            grammar: config.grammar,
            duration_column: config.duration_column,
        }
    }
}

/// The fixed raw-to-analysis column mapping for a run.
pub fn column_mapping(duration_column: DurationColumn) -> [(&'static str, &'static str); 3] {
    [
        (SIZE_COLUMN, N_PATTERNS_COLUMN),
        (DURATION_COLUMN, duration_column.label()),
        (SOURCE_COLUMN, ALGORITHM_COLUMN),
    ]
}

/// One plottable measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchPoint {
    pub n_patterns: u64,
    pub runtime: f64,
    pub algorithm: Source,
    pub dataset: String,
    pub n_qubits: String,
    pub dataset_type: String,
}

/// The aggregated table after renaming and dimension derivation.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    table: Table,
    duration_column: DurationColumn,
}

impl NormalizedTable {
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Label of the runtime column in this table.
    pub fn runtime_label(&self) -> &'static str {
        self.duration_column.label()
    }

    /// Rows with a usable pattern count, runtime and algorithm.
    pub fn points(&self) -> Vec<BenchPoint> {
        let runtime_label = self.runtime_label();
        let text = |row: usize, column: &str| {
            self.table
                .get(row, column)
                .map(|v| v.to_string())
                .unwrap_or_default()
        };

        let mut points = Vec::with_capacity(self.table.len());
        for row in 0..self.table.len() {
            let n_patterns = self.table.get(row, N_PATTERNS_COLUMN).and_then(Value::as_count);
            let runtime = self
                .table
                .get(row, runtime_label)
                .and_then(Value::as_f64)
                .filter(|r| r.is_finite() && *r >= 0.0);
            let algorithm = self
                .table
                .get(row, ALGORITHM_COLUMN)
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<Source>().ok());

            match (n_patterns, runtime, algorithm) {
                (Some(n_patterns), Some(runtime), Some(algorithm)) => points.push(BenchPoint {
                    n_patterns,
                    runtime,
                    algorithm,
                    dataset: text(row, DATASET_COLUMN),
                    n_qubits: text(row, N_QUBITS_COLUMN),
                    dataset_type: text(row, DATASET_TYPE_COLUMN),
                }),
                _ => debug!("Row {} has no plottable measurement, skipping", row),
            }
        }

        points
    }
}

/// Normalizer output: the table plus every identifier that failed to parse.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub table: NormalizedTable,
    /// One entry per distinct identifier that did not match the grammar.
    pub warnings: Vec<GrammarWarning>,
}

/// Rename the mapped columns and append `n_qubits` and `dataset type`.
pub fn normalize(mut table: Table, options: SchemaOptions) -> Normalized {
    for (from, to) in column_mapping(options.duration_column) {
        if table.column_index(to).is_some() && table.column_index(from).is_some() {
            warn!("Column '{}' already present; '{}' renamed alongside it", to, from);
        }
        if !table.rename_column(from, to) {
            debug!("Column '{}' not present, nothing to rename", from);
        }
    }

    // Identifiers repeat once per row, so each is decoded once.
    let mut cache: HashMap<String, (String, String)> = HashMap::new();
    let mut warnings = Vec::new();
    let mut n_qubits = Vec::with_capacity(table.len());
    let mut dataset_types = Vec::with_capacity(table.len());

    for row in 0..table.len() {
        let identifier = table
            .get(row, DATASET_COLUMN)
            .map(|v| v.to_string())
            .unwrap_or_default();

        let (qubits, dataset_type) = cache
            .entry(identifier.clone())
            .or_insert_with(|| {
                let extraction = options.grammar.extract(&identifier);
                if let Some(warning) = extraction.warning {
                    warn!("{}", warning);
                    warnings.push(warning);
                }
                (extraction.n_qubits, extraction.dataset_type)
            })
            .clone();

        n_qubits.push(Value::Text(qubits));
        dataset_types.push(Value::Text(dataset_type));
    }

    table.push_column(N_QUBITS_COLUMN, n_qubits);
    table.push_column(DATASET_TYPE_COLUMN, dataset_types);

    Normalized {
        table: NormalizedTable {
            table,
            duration_column: options.duration_column,
        },
        warnings,
    }
}
