//! Chart rendering.
//!
//! Builds the comparison figures from a normalized table and writes them
//! to disk.

pub mod facets;
pub mod render;

pub use facets::{eccs_comparison, random_scaling, single_comparison, Facet, Figure, Marker, Series};
pub use render::{render_figure, FigureSize, ImageFormat, PlotError};

use crate::analysis::NormalizedTable;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Which set of figures a run produces.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum PlotLayout {
    /// ECC comparison and random-dataset figures at fixed paths
    #[default]
    Comparison,
    /// One figure of every measurement, written to the output file
    Single,
}

/// Where each figure of a layout goes.
#[derive(Debug, Clone)]
pub struct FigureTargets {
    pub output_file: PathBuf,
    pub eccs_file: PathBuf,
    pub random_file: PathBuf,
}

impl From<&crate::config::Config> for FigureTargets {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            output_file: config.general.output_file.clone(),
            eccs_file: config.eccs_output(),
            random_file: config.random_output(),
        }
    }
}

/// The figures of `layout`, paired with their destinations.
pub fn plan_figures(
    table: &NormalizedTable,
    layout: PlotLayout,
    targets: &FigureTargets,
) -> Vec<(Figure, PathBuf)> {
    match layout {
        PlotLayout::Comparison => vec![
            (eccs_comparison(table), targets.eccs_file.clone()),
            (random_scaling(table), targets.random_file.clone()),
        ],
        PlotLayout::Single => vec![(single_comparison(table), targets.output_file.clone())],
    }
}

/// Render every non-empty figure of `layout`. Returns the paths written.
pub fn render_layout(
    table: &NormalizedTable,
    layout: PlotLayout,
    targets: &FigureTargets,
    size: FigureSize,
) -> Result<Vec<PathBuf>, PlotError> {
    let mut written = Vec::new();

    for (figure, path) in plan_figures(table, layout, targets) {
        if figure.is_empty() {
            warn!("No data for '{}', skipping {}", figure.title, path.display());
            continue;
        }

        render_figure(&figure, &path, size)?;
        info!(
            "Wrote {} ({} points in {} facets)",
            path.display(),
            figure.point_count(),
            figure.facets.len()
        );
        written.push(path);
    }

    Ok(written)
}
