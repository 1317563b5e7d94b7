//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.matchbench.toml` files.

use crate::analysis::{DatasetGrammar, DurationColumn};
use crate::plot::PlotLayout;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".matchbench.toml";

/// Largest accepted facet width or figure height, in pixels.
pub const MAX_FIGURE_PIXELS: u32 = 8192;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Result file discovery.
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Column naming and identifier decoding.
    #[serde(default)]
    pub schema: SchemaConfig,

    /// Chart output settings.
    #[serde(default)]
    pub plot: PlotConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Folder holding the `quartz/` and `portmatching/` subfolders.
    #[serde(default = "default_results_folder")]
    pub results_folder: PathBuf,

    /// Destination of the single-figure layout.
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            results_folder: default_results_folder(),
            output_file: default_output_file(),
            verbose: false,
        }
    }
}

fn default_results_folder() -> PathBuf {
    PathBuf::from("results")
}

fn default_output_file() -> PathBuf {
    PathBuf::from("results/bench-plot.svg")
}

/// Result file discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Extensions treated as tabular result files.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["csv", "tsv"].into_iter().map(String::from).collect()
}

/// Schema normalization settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Dataset identifier grammar.
    #[serde(default)]
    pub grammar: DatasetGrammar,

    /// Name of the renamed duration column.
    #[serde(default)]
    pub duration_column: DurationColumn,
}

/// Chart settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Which figures to draw.
    #[serde(default)]
    pub layout: PlotLayout,

    /// ECC comparison figure, relative to the results folder.
    #[serde(default = "default_eccs_file")]
    pub eccs_file: PathBuf,

    /// Random-dataset figure, relative to the results folder.
    #[serde(default = "default_random_file")]
    pub random_file: PathBuf,

    /// Width of one facet in pixels.
    #[serde(default = "default_facet_width")]
    pub facet_width: u32,

    /// Figure height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            layout: PlotLayout::default(),
            eccs_file: default_eccs_file(),
            random_file: default_random_file(),
            facet_width: default_facet_width(),
            height: default_height(),
        }
    }
}

fn default_eccs_file() -> PathBuf {
    PathBuf::from("bench-eccs.svg")
}

fn default_random_file() -> PathBuf {
    PathBuf::from("bench-random.svg")
}

fn default_facet_width() -> u32 {
    480
}

fn default_height() -> u32 {
    480
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values the user actually passed override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref folder) = args.results_folder {
            self.general.results_folder = folder.clone();
        }
        if let Some(ref output) = args.output_file {
            self.general.output_file = output.clone();
        }

        if let Some(grammar) = args.grammar {
            self.schema.grammar = grammar;
        }
        if let Some(duration_column) = args.duration_column {
            self.schema.duration_column = duration_column;
        }

        if let Some(layout) = args.layout {
            self.plot.layout = layout;
        }

        if let Some(ref extensions) = args.extensions {
            self.loader.extensions = extensions.clone();
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("plot.facet_width", self.plot.facet_width),
            ("plot.height", self.plot.height),
        ] {
            if value == 0 || value > MAX_FIGURE_PIXELS {
                bail!(
                    "{} must be between 1 and {} pixels, got {}",
                    key,
                    MAX_FIGURE_PIXELS,
                    value
                );
            }
        }
        if self.loader.extensions.iter().all(|e| e.trim().is_empty()) {
            bail!("loader.extensions must name at least one extension");
        }
        Ok(())
    }

    /// Path of the ECC comparison figure.
    pub fn eccs_output(&self) -> PathBuf {
        self.general.results_folder.join(&self.plot.eccs_file)
    }

    /// Path of the random-dataset figure.
    pub fn random_output(&self) -> PathBuf {
        self.general.results_folder.join(&self.plot.random_file)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
