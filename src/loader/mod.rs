//! Result file loader for one algorithm source.
//!
//! This module discovers the tabular result files directly under a
//! source's results subfolder and parses each of them into tagged records.
//! A file that cannot be read is skipped with a diagnostic; it never
//! aborts the whole load.

use crate::models::{
    ResultFile, ResultRecord, Source, Value, DATASET_COLUMN, DURATION_COLUMN, SIZE_COLUMN,
    SOURCE_COLUMN,
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Configuration for result file discovery.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Extensions that mark a file as tabular (e.g., ["csv", "tsv"])
    pub extensions: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["csv".to_string(), "tsv".to_string()],
        }
    }
}

impl From<&crate::config::LoaderConfig> for LoadOptions {
    fn from(config: &crate::config::LoaderConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
        }
    }
}

/// Failure to read a single result file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed record in {path}: {source}")]
    Record {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("cannot read {path}: {source}")]
    Entry {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// A result file that was found but could not be loaded.
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error: LoadError,
}

/// Everything loaded from one source folder.
#[derive(Debug)]
pub struct LoadOutcome {
    pub source: Source,
    /// Successfully parsed files, in file-name order.
    pub files: Vec<ResultFile>,
    /// Files that matched but failed to parse.
    pub skipped: Vec<SkippedFile>,
}

impl LoadOutcome {
    /// All records of the loaded files, in load order.
    pub fn records(&self) -> Vec<ResultRecord> {
        self.files
            .iter()
            .flat_map(|f| f.records.iter().cloned())
            .collect()
    }

    /// Total number of records across loaded files.
    pub fn record_count(&self) -> usize {
        self.files.iter().map(|f| f.records.len()).sum()
    }
}

/// Load every tabular file under `<results_folder>/<source folder>`.
///
/// A missing or empty folder yields an outcome with no files.
pub fn load(source: Source, results_folder: &Path, options: &LoadOptions) -> LoadOutcome {
    let folder = results_folder.join(source.folder_name());
    let mut outcome = LoadOutcome {
        source,
        files: Vec::new(),
        skipped: Vec::new(),
    };

    if !folder.is_dir() {
        debug!(
            "No results folder for {} at {}",
            source,
            folder.display()
        );
        return outcome;
    }

    let (paths, unreadable) = tabular_files(&folder, options);
    outcome.skipped.extend(unreadable);

    for path in paths {
        match read_result_file(source, &path) {
            Ok(file) => {
                debug!(
                    "Loaded {} records from {}",
                    file.records.len(),
                    path.display()
                );
                outcome.files.push(file);
            }
            Err(error) => {
                warn!("Skipping result file: {}", error);
                outcome.skipped.push(SkippedFile { path, error });
            }
        }
    }

    outcome
}

/// List the tabular files directly inside `folder`, sorted by name.
///
/// Symlinks are followed. Entries that cannot be read (a dangling link, a
/// folder without read permission) are returned alongside the listing.
pub fn tabular_files(folder: &Path, options: &LoadOptions) -> (Vec<PathBuf>, Vec<SkippedFile>) {
    let mut files = Vec::new();
    let mut unreadable = Vec::new();

    let walker = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && is_tabular(entry.path(), options) {
                    files.push(entry.into_path());
                }
            }
            Err(error) => {
                let path = error
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| folder.to_path_buf());
                if path != folder && !is_tabular(&path, options) {
                    debug!("Ignoring unreadable entry {}: {}", path.display(), error);
                    continue;
                }
                warn!("Cannot read {}: {}", path.display(), error);
                unreadable.push(SkippedFile {
                    path: path.clone(),
                    error: LoadError::Entry {
                        path,
                        source: error,
                    },
                });
            }
        }
    }

    (files, unreadable)
}

/// Check if a path carries one of the tabular extensions.
fn is_tabular(path: &Path, options: &LoadOptions) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    options
        .extensions
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(ext))
}

fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}

/// Measurement columns are typed; every other column keeps its text as
/// written so it passes through unchanged.
fn read_cell(column: &str, raw: &str) -> Value {
    if column == SIZE_COLUMN || column == DURATION_COLUMN {
        Value::parse(raw)
    } else {
        Value::verbatim(raw)
    }
}

/// Parse one result file into records tagged with `source` and `dataset`.
pub fn read_result_file(source: Source, path: &Path) -> Result<ResultFile, LoadError> {
    let dataset = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| LoadError::Record {
            path: path.to_path_buf(),
            source,
        })?
        .iter()
        .map(String::from)
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|source| LoadError::Record {
            path: path.to_path_buf(),
            source,
        })?;

        // Tags replace payload columns of the same name.
        let fields = headers
            .iter()
            .zip(row.iter())
            .filter(|(name, _)| name.as_str() != SOURCE_COLUMN && name.as_str() != DATASET_COLUMN)
            .map(|(name, raw)| (name.clone(), read_cell(name, raw)))
            .collect();

        records.push(ResultRecord {
            source,
            dataset: dataset.clone(),
            fields,
        });
    }

    Ok(ResultFile {
        source,
        dataset,
        path: path.to_path_buf(),
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_missing_folder_yields_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let outcome = load(Source::Quartz, temp_dir.path(), &LoadOptions::default());

        assert!(outcome.files.is_empty());
        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.record_count(), 0);
    }

    #[test]
    fn test_load_tags_records() {
        let temp_dir = TempDir::new().unwrap();
        let folder = temp_dir.path().join("quartz");
        std::fs::create_dir(&folder).unwrap();
        write(&folder, "10_5-eccs.csv", "size,duration\n200,0.5\n400,1.25\n");

        let outcome = load(Source::Quartz, temp_dir.path(), &LoadOptions::default());

        assert_eq!(outcome.files.len(), 1);
        let records = outcome.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source, Source::Quartz);
        assert_eq!(records[0].dataset, "10_5-eccs");
        assert_eq!(records[1].get("size"), Some(&Value::Int(400)));
        assert_eq!(records[1].get("duration"), Some(&Value::Float(1.25)));
    }

    #[test]
    fn test_non_tabular_files_are_skipped_silently() {
        let temp_dir = TempDir::new().unwrap();
        let folder = temp_dir.path().join("portmatching");
        std::fs::create_dir(&folder).unwrap();
        write(&folder, "2_6-eccs.csv", "size,duration\n200,0.1\n");
        write(&folder, "notes.txt", "not a result file");
        write(&folder, "bench-plot.svg", "<svg/>");
        std::fs::create_dir(folder.join("nested.csv")).unwrap();

        let outcome = load(Source::Portmatching, temp_dir.path(), &LoadOptions::default());

        assert_eq!(outcome.files.len(), 1);
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn test_files_load_in_name_order() {
        let temp_dir = TempDir::new().unwrap();
        let folder = temp_dir.path().join("quartz");
        std::fs::create_dir(&folder).unwrap();
        write(&folder, "4_6-eccs.csv", "size,duration\n1,0.1\n");
        write(&folder, "2_6-eccs.csv", "size,duration\n1,0.1\n");
        write(&folder, "3_6-eccs.csv", "size,duration\n1,0.1\n");

        let outcome = load(Source::Quartz, temp_dir.path(), &LoadOptions::default());
        let names: Vec<_> = outcome.files.iter().map(|f| f.dataset.as_str()).collect();

        assert_eq!(names, vec!["2_6-eccs", "3_6-eccs", "4_6-eccs"]);
    }

    #[test]
    fn test_malformed_file_is_skipped_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let folder = temp_dir.path().join("quartz");
        std::fs::create_dir(&folder).unwrap();
        write(&folder, "2_6-eccs.csv", "size,duration\n200,0.1\n");
        write(&folder, "3_6-eccs.csv", "size,duration\n200,0.1,extra\n");

        let outcome = load(Source::Quartz, temp_dir.path(), &LoadOptions::default());

        assert_eq!(outcome.files.len(), 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert!(outcome.skipped[0].path.ends_with("3_6-eccs.csv"));
    }

    #[test]
    fn test_tsv_is_tab_delimited() {
        let temp_dir = TempDir::new().unwrap();
        let folder = temp_dir.path().join("quartz");
        std::fs::create_dir(&folder).unwrap();
        write(&folder, "6_15-random.tsv", "size\tduration\n200\t0.75\n");

        let outcome = load(Source::Quartz, temp_dir.path(), &LoadOptions::default());
        let records = outcome.records();

        assert_eq!(records[0].get("duration"), Some(&Value::Float(0.75)));
    }

    #[test]
    fn test_payload_source_column_is_replaced_by_tag() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("2_6-eccs.csv");
        std::fs::write(&path, "size,source\n200,other\n").unwrap();

        let file = read_result_file(Source::Portmatching, &path).unwrap();

        assert_eq!(file.records[0].get("source"), None);
        assert_eq!(file.records[0].source, Source::Portmatching);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_result_file_is_loaded() {
        let temp_dir = TempDir::new().unwrap();
        let folder = temp_dir.path().join("quartz");
        std::fs::create_dir(&folder).unwrap();
        let target = temp_dir.path().join("shared.csv");
        std::fs::write(&target, "size,duration\n100,0.5\n200,0.9\n").unwrap();
        std::os::unix::fs::symlink(&target, folder.join("10_5-eccs.csv")).unwrap();

        let outcome = load(Source::Quartz, temp_dir.path(), &LoadOptions::default());

        assert_eq!(outcome.files.len(), 1);
        assert_eq!(outcome.files[0].dataset, "10_5-eccs");
        assert_eq!(outcome.record_count(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let folder = temp_dir.path().join("quartz");
        std::fs::create_dir(&folder).unwrap();
        write(&folder, "2_6-eccs.csv", "size,duration\n200,0.1\n");
        std::os::unix::fs::symlink(temp_dir.path().join("gone.csv"), folder.join("3_6-eccs.csv"))
            .unwrap();
        std::os::unix::fs::symlink(temp_dir.path().join("gone.txt"), folder.join("notes.txt"))
            .unwrap();

        let outcome = load(Source::Quartz, temp_dir.path(), &LoadOptions::default());

        assert_eq!(outcome.files.len(), 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert!(outcome.skipped[0].path.ends_with("3_6-eccs.csv"));
        assert!(matches!(outcome.skipped[0].error, LoadError::Entry { .. }));
    }

    #[test]
    fn test_pass_through_columns_keep_their_text() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("2_6-eccs.csv");
        std::fs::write(&path, "size,duration,commit,run_id\n2,0.2,1e10,0042\n").unwrap();

        let file = read_result_file(Source::Quartz, &path).unwrap();
        let record = &file.records[0];

        assert_eq!(record.get("size"), Some(&Value::Int(2)));
        assert_eq!(record.get("duration"), Some(&Value::Float(0.2)));
        assert_eq!(record.get("commit"), Some(&Value::from("1e10")));
        assert_eq!(record.get("run_id"), Some(&Value::from("0042")));
    }
}
