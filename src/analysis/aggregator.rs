//! Record aggregation and table statistics.
//!
//! This module unions the record sets of every source into one table and
//! provides small grouping helpers used for the run summary.

use crate::models::{ResultRecord, Table, Value, DATASET_COLUMN, SOURCE_COLUMN};
use std::collections::BTreeMap;

/// Concatenate record sets into one table.
///
/// Order is preserved and nothing is deduplicated. Columns are the union of
/// all payload columns in first-seen order, followed by `source` and
/// `dataset`; a column a record lacks is `Missing` in its row.
pub fn aggregate(record_sets: &[Vec<ResultRecord>]) -> Table {
    let mut columns: Vec<String> = Vec::new();
    for record in record_sets.iter().flatten() {
        for (name, _) in &record.fields {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
    }
    let payload_width = columns.len();
    columns.push(SOURCE_COLUMN.to_string());
    columns.push(DATASET_COLUMN.to_string());

    let mut table = Table::new(columns);
    for record in record_sets.iter().flatten() {
        let mut row = vec![Value::Missing; payload_width];
        for (name, value) in &record.fields {
            if let Some(idx) = table.column_index(name) {
                row[idx] = value.clone();
            }
        }
        row.push(Value::from(record.source.label()));
        row.push(Value::from(record.dataset.as_str()));
        table.push_row(row);
    }

    table
}

/// Count rows per distinct value of a column.
pub fn count_by(table: &Table, column: &str) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();

    if let Some(values) = table.column(column) {
        for value in values {
            *counts.entry(value.to_string()).or_default() += 1;
        }
    }

    counts
}

/// Distinct values of `value_column` grouped by `key_column`, sorted.
pub fn distinct_by(table: &Table, key_column: &str, value_column: &str) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();

    let (Some(keys), Some(values)) = (table.column(key_column), table.column(value_column)) else {
        return grouped;
    };

    for (key, value) in keys.into_iter().zip(values) {
        let entry = grouped.entry(key.to_string()).or_default();
        let value = value.to_string();
        if !entry.contains(&value) {
            entry.push(value);
        }
    }

    for values in grouped.values_mut() {
        sort_facet_keys(values);
    }

    grouped
}

/// Sort facet keys ascending: numerically when every key is an integer,
/// lexicographically otherwise.
pub fn sort_facet_keys(keys: &mut [String]) {
    if keys.iter().all(|k| k.parse::<u64>().is_ok()) {
        keys.sort_by_key(|k| k.parse::<u64>().unwrap_or(0));
    } else {
        keys.sort();
    }
}
