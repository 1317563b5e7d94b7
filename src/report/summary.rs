//! Run summary text.
//!
//! Renders the counts of a finished run for the terminal.

use crate::pipeline::RunSummary;
use std::path::PathBuf;

/// Generate the summary printed at the end of a run.
pub fn generate_summary_text(summary: &RunSummary, figures: &[PathBuf]) -> String {
    let mut output = String::new();

    output.push_str(&generate_sources_section(summary));
    output.push_str(&generate_table_section(summary));
    output.push_str(&generate_figures_section(figures));

    output
}

fn generate_sources_section(summary: &RunSummary) -> String {
    let mut section = String::new();

    section.push_str("📂 Sources:\n");
    for source in &summary.sources {
        section.push_str(&format!(
            "   {}: {} files, {} rows",
            source.source, source.files, source.rows
        ));
        if source.skipped > 0 {
            section.push_str(&format!(" ({} skipped)", source.skipped));
        }
        section.push('\n');
    }

    section
}

fn generate_table_section(summary: &RunSummary) -> String {
    let mut section = String::new();

    section.push_str(&format!("\n📊 Aggregated rows: {}\n", summary.total_rows));
    if summary.total_rows == 0 {
        section.push_str("   No benchmark results found.\n");
        return section;
    }

    for (algorithm, count) in &summary.rows_by_algorithm {
        section.push_str(&format!("   - {}: {}\n", algorithm, count));
    }

    for (dataset_type, qubits) in &summary.qubits_by_type {
        section.push_str(&format!(
            "   {} datasets: n_qubits in {{{}}}\n",
            dataset_type,
            qubits.join(", ")
        ));
    }

    if summary.grammar_warnings > 0 {
        section.push_str(&format!(
            "   ⚠️  {} dataset names did not match the naming grammar\n",
            summary.grammar_warnings
        ));
    }

    section
}

fn generate_figures_section(figures: &[PathBuf]) -> String {
    if figures.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("\n🖼️  Figures:\n");
    for path in figures {
        section.push_str(&format!("   {}\n", path.display()));
    }

    section
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;
    use crate::pipeline::SourceSummary;

    fn create_test_summary() -> RunSummary {
        RunSummary {
            sources: vec![
                SourceSummary {
                    source: Source::Quartz,
                    files: 2,
                    skipped: 1,
                    rows: 3,
                },
                SourceSummary {
                    source: Source::Portmatching,
                    files: 1,
                    skipped: 0,
                    rows: 2,
                },
            ],
            total_rows: 5,
            rows_by_algorithm: [("Portmatching".to_string(), 2), ("Quartz".to_string(), 3)]
                .into_iter()
                .collect(),
            qubits_by_type: [("eccs".to_string(), vec!["2".to_string(), "10".to_string()])]
                .into_iter()
                .collect(),
            grammar_warnings: 1,
        }
    }

    #[test]
    fn test_generate_summary_text() {
        let text = generate_summary_text(
            &create_test_summary(),
            &[PathBuf::from("results/bench-eccs.svg")],
        );

        assert!(text.contains("Quartz: 2 files, 3 rows (1 skipped)"));
        assert!(text.contains("Portmatching: 1 files, 2 rows\n"));
        assert!(text.contains("Aggregated rows: 5"));
        assert!(text.contains("eccs datasets: n_qubits in {2, 10}"));
        assert!(text.contains("1 dataset names"));
        assert!(text.contains("results/bench-eccs.svg"));
    }

    #[test]
    fn test_empty_run() {
        let text = generate_summary_text(&RunSummary::default(), &[]);

        assert!(text.contains("Aggregated rows: 0"));
        assert!(text.contains("No benchmark results found."));
        assert!(!text.contains("Figures"));
    }
}
