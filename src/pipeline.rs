//! Load, aggregate and normalize in one pass.

use crate::analysis::normalizer::{ALGORITHM_COLUMN, DATASET_TYPE_COLUMN, N_QUBITS_COLUMN};
use crate::analysis::{aggregate, count_by, distinct_by, normalize, Normalized, SchemaOptions};
use crate::loader::{self, LoadOptions, LoadOutcome};
use crate::models::{ResultRecord, Source};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Everything a run needs besides the results folder.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Sources to load, in aggregation order.
    pub sources: Vec<Source>,
    pub load: LoadOptions,
    pub schema: SchemaOptions,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            sources: Source::ALL.to_vec(),
            load: LoadOptions::default(),
            schema: SchemaOptions::default(),
        }
    }
}

impl From<&crate::config::Config> for PipelineOptions {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            sources: Source::ALL.to_vec(),
            load: LoadOptions::from(&config.loader),
            schema: SchemaOptions::from(&config.schema),
        }
    }
}

/// Result of one pipeline run.
#[derive(Debug)]
pub struct PipelineOutput {
    /// Per-source load results, in source order.
    pub loads: Vec<LoadOutcome>,
    pub normalized: Normalized,
}

/// Per-source file and row counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSummary {
    pub source: Source,
    pub files: usize,
    pub skipped: usize,
    pub rows: usize,
}

/// Counts describing a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub sources: Vec<SourceSummary>,
    pub total_rows: usize,
    pub rows_by_algorithm: BTreeMap<String, usize>,
    /// Distinct qubit counts per dataset type, ascending.
    pub qubits_by_type: BTreeMap<String, Vec<String>>,
    pub grammar_warnings: usize,
}

/// Load every configured source under `results_folder`, union the records
/// and normalize the resulting table.
pub fn collect(results_folder: &Path, options: &PipelineOptions) -> PipelineOutput {
    let loads: Vec<LoadOutcome> = options
        .sources
        .iter()
        .map(|source| loader::load(*source, results_folder, &options.load))
        .collect();

    for outcome in &loads {
        info!(
            "{}: {} files, {} records",
            outcome.source,
            outcome.files.len(),
            outcome.record_count()
        );
    }

    let record_sets: Vec<Vec<ResultRecord>> = loads.iter().map(LoadOutcome::records).collect();
    let table = aggregate(&record_sets);
    let normalized = normalize(table, options.schema);

    PipelineOutput { loads, normalized }
}

impl PipelineOutput {
    pub fn summary(&self) -> RunSummary {
        let table = self.normalized.table.table();

        RunSummary {
            sources: self
                .loads
                .iter()
                .map(|outcome| SourceSummary {
                    source: outcome.source,
                    files: outcome.files.len(),
                    skipped: outcome.skipped.len(),
                    rows: outcome.record_count(),
                })
                .collect(),
            total_rows: table.len(),
            rows_by_algorithm: count_by(table, ALGORITHM_COLUMN),
            qubits_by_type: distinct_by(table, DATASET_TYPE_COLUMN, N_QUBITS_COLUMN),
            grammar_warnings: self.normalized.warnings.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_empty_results_folder() {
        let temp_dir = TempDir::new().unwrap();
        let output = collect(temp_dir.path(), &PipelineOptions::default());

        assert_eq!(output.loads.len(), 2);
        assert!(output.normalized.table.is_empty());

        let summary = output.summary();
        assert_eq!(summary.total_rows, 0);
        assert_eq!(summary.sources[0].source, Source::Quartz);
        assert_eq!(summary.sources[1].files, 0);
        assert!(summary.rows_by_algorithm.is_empty());
    }

    #[test]
    fn test_summary_counts() {
        let temp_dir = TempDir::new().unwrap();
        let quartz = temp_dir.path().join("quartz");
        let portmatching = temp_dir.path().join("portmatching");
        std::fs::create_dir_all(&quartz).unwrap();
        std::fs::create_dir_all(&portmatching).unwrap();
        std::fs::write(quartz.join("2_6-eccs.csv"), "size,duration\n200,0.1\n").unwrap();
        std::fs::write(quartz.join("broken.csv"), "size,duration\n1,2,3\n").unwrap();
        std::fs::write(
            portmatching.join("4_15-random.csv"),
            "size,duration\n200,0.1\n400,0.2\n",
        )
        .unwrap();
        std::fs::write(portmatching.join("scratch.csv"), "size,duration\n200,0.3\n").unwrap();

        let summary = collect(temp_dir.path(), &PipelineOptions::default()).summary();

        assert_eq!(
            summary.sources[0],
            SourceSummary {
                source: Source::Quartz,
                files: 1,
                skipped: 1,
                rows: 1
            }
        );
        assert_eq!(summary.total_rows, 4);
        assert_eq!(summary.rows_by_algorithm.get("Portmatching"), Some(&3));
        assert_eq!(summary.qubits_by_type.get("eccs"), Some(&vec!["2".to_string()]));
        assert_eq!(summary.qubits_by_type.get("random"), Some(&vec!["4".to_string()]));
        assert_eq!(summary.grammar_warnings, 1);
    }
}
