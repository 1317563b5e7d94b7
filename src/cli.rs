//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::{DatasetGrammar, DurationColumn};
use crate::plot::{ImageFormat, PlotLayout};
use crate::report::ExportFormat;
use clap::Parser;
use std::path::PathBuf;

/// matchbench - compare Quartz and Portmatching pattern matching benchmarks
///
/// Collects the CSV result files under <results_folder>/quartz and
/// <results_folder>/portmatching into one table, derives the qubit count and
/// dataset type from each file name, and plots runtime against the number
/// of patterns.
///
/// Examples:
///   matchbench
///   matchbench -r results --export results/all.csv
///   matchbench --layout single -o results/bench-plot.png
///   matchbench --grammar legacy-voqc --duration-column duration --layout single
///   matchbench --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Folder containing the per-algorithm result subfolders [default: results]
    #[arg(short = 'r', long = "results_folder", value_name = "DIR")]
    pub results_folder: Option<PathBuf>,

    /// Output file for the single-figure layout (.svg or .png)
    ///
    /// [default: results/bench-plot.svg]
    #[arg(short = 'o', long = "output_file", value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Which figures to draw
    #[arg(long, value_name = "LAYOUT")]
    pub layout: Option<PlotLayout>,

    /// Grammar used to decode dataset identifiers
    #[arg(long, value_name = "GRAMMAR")]
    pub grammar: Option<DatasetGrammar>,

    /// Name of the renamed duration column
    #[arg(long, value_name = "NAME")]
    pub duration_column: Option<DurationColumn>,

    /// File extensions treated as result files (comma-separated)
    ///
    /// Example: --extensions csv,tsv
    #[arg(long, value_name = "EXTS", value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,

    /// Also write the normalized table to this file (.csv or .json)
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Skip chart rendering
    #[arg(long)]
    pub no_plot: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .matchbench.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .matchbench.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    ///
    /// Malformed invocations exit with code 1; `--help` and `--version`
    /// print and exit 0.
    pub fn parse_args() -> Self {
        match Self::try_parse() {
            Ok(args) => args,
            Err(e) => {
                let code = parse_error_exit_code(&e);
                let _ = e.print();
                std::process::exit(code);
            }
        }
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref folder) = self.results_folder {
            if folder.exists() && !folder.is_dir() {
                return Err(format!(
                    "Results folder is not a directory: {}",
                    folder.display()
                ));
            }
        }

        if let Some(ref output) = self.output_file {
            if ImageFormat::from_path(output).is_none() {
                return Err(format!(
                    "Unsupported output file type: {} (expected .svg or .png)",
                    output.display()
                ));
            }
        }

        if let Some(ref export) = self.export {
            if ExportFormat::from_path(export).is_none() {
                return Err(format!(
                    "Unsupported export file type: {} (expected .csv or .json)",
                    export.display()
                ));
            }
        }

        if let Some(ref extensions) = self.extensions {
            if extensions.iter().all(|e| e.trim().is_empty()) {
                return Err("At least one result file extension is required".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

/// Exit code for a failed parse: 0 for help and version output, 1 otherwise.
pub fn parse_error_exit_code(error: &clap::Error) -> i32 {
    if error.use_stderr() {
        1
    } else {
        0
    }
}
