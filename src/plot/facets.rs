//! Figure construction.
//!
//! Selects and groups normalized measurements into facets and series.
//! Nothing here draws; `render` turns a [`Figure`] into an image.

use crate::analysis::normalizer::N_QUBITS_COLUMN;
use crate::analysis::{sort_facet_keys, BenchPoint, NormalizedTable};
use crate::models::Source;
use std::collections::BTreeMap;

/// Dataset type of equivalence-class circuit sets.
pub const ECCS_DATASET_TYPE: &str = "eccs";
/// Dataset type of randomly generated circuit sets.
pub const RANDOM_DATASET_TYPE: &str = "random";

/// Point marker shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Triangle,
    Cross,
    Square,
}

impl Marker {
    const CYCLE: [Marker; 4] = [Marker::Circle, Marker::Triangle, Marker::Cross, Marker::Square];

    /// Marker for the `n`th series, cycling.
    pub fn nth(n: usize) -> Self {
        Self::CYCLE[n % Self::CYCLE.len()]
    }
}

/// One colored, marked group of points within a facet.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    /// Palette index; equal across facets for the same label.
    pub style: usize,
    pub marker: Marker,
    /// (number of patterns, runtime) pairs.
    pub points: Vec<(f64, f64)>,
}

/// One subplot, keyed by qubit count.
#[derive(Debug, Clone, PartialEq)]
pub struct Facet {
    pub key: String,
    pub series: Vec<Series>,
}

impl Facet {
    pub fn title(&self) -> String {
        format!("{} = {}", N_QUBITS_COLUMN, self.key)
    }
}

/// A row of facets sharing axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub facets: Vec<Facet>,
}

impl Figure {
    pub fn is_empty(&self) -> bool {
        self.facets.iter().all(|f| f.series.iter().all(|s| s.points.is_empty()))
    }

    /// Largest (x, y) over all facets, for shared axes.
    pub fn bounds(&self) -> (f64, f64) {
        self.facets
            .iter()
            .flat_map(|f| f.series.iter())
            .flat_map(|s| s.points.iter())
            .fold((0.0f64, 0.0f64), |(mx, my), &(x, y)| (mx.max(x), my.max(y)))
    }

    pub fn point_count(&self) -> usize {
        self.facets
            .iter()
            .flat_map(|f| f.series.iter())
            .map(|s| s.points.len())
            .sum()
    }
}

/// Both algorithms on ECC datasets, one facet per qubit count.
pub fn eccs_comparison(table: &NormalizedTable) -> Figure {
    let points: Vec<BenchPoint> = table
        .points()
        .into_iter()
        .filter(|p| p.dataset_type == ECCS_DATASET_TYPE)
        .collect();

    Figure {
        title: "Quartz vs Portmatching on ECC datasets".to_string(),
        x_label: crate::analysis::normalizer::N_PATTERNS_COLUMN.to_string(),
        y_label: table.runtime_label().to_string(),
        facets: facet_by_qubits(&points, |p, _| algorithm_series(p.algorithm)),
    }
}

/// Portmatching on random datasets, styled per qubit count.
pub fn random_scaling(table: &NormalizedTable) -> Figure {
    let points: Vec<BenchPoint> = table
        .points()
        .into_iter()
        .filter(|p| p.dataset_type == RANDOM_DATASET_TYPE && p.algorithm == Source::Portmatching)
        .collect();

    Figure {
        title: "Portmatching on random datasets".to_string(),
        x_label: crate::analysis::normalizer::N_PATTERNS_COLUMN.to_string(),
        y_label: table.runtime_label().to_string(),
        facets: facet_by_qubits(&points, |p, facet_idx| {
            (format!("{} qubits", p.n_qubits), facet_idx)
        }),
    }
}

/// Every measurement, algorithms by color, one facet per qubit count.
pub fn single_comparison(table: &NormalizedTable) -> Figure {
    let points = table.points();

    Figure {
        title: "Comparison between Portmatching and Quartz".to_string(),
        x_label: crate::analysis::normalizer::N_PATTERNS_COLUMN.to_string(),
        y_label: table.runtime_label().to_string(),
        facets: facet_by_qubits(&points, |p, _| algorithm_series(p.algorithm)),
    }
}

fn algorithm_series(algorithm: Source) -> (String, usize) {
    let style = Source::ALL
        .iter()
        .position(|s| *s == algorithm)
        .unwrap_or_default();
    (algorithm.label().to_string(), style)
}

/// Group points into facets by `n_qubits`, ascending, then into series
/// by the `(label, style)` that `series_of` assigns.
fn facet_by_qubits<F>(points: &[BenchPoint], series_of: F) -> Vec<Facet>
where
    F: Fn(&BenchPoint, usize) -> (String, usize),
{
    let mut keys: Vec<String> = Vec::new();
    for p in points {
        if !keys.contains(&p.n_qubits) {
            keys.push(p.n_qubits.clone());
        }
    }
    sort_facet_keys(&mut keys);

    keys.into_iter()
        .enumerate()
        .map(|(facet_idx, key)| {
            let mut grouped: BTreeMap<(usize, String), Vec<(f64, f64)>> = BTreeMap::new();
            for p in points.iter().filter(|p| p.n_qubits == key) {
                let (label, style) = series_of(p, facet_idx);
                grouped
                    .entry((style, label))
                    .or_default()
                    .push((p.n_patterns as f64, p.runtime));
            }

            let series = grouped
                .into_iter()
                .map(|((style, label), points)| Series {
                    label,
                    style,
                    marker: Marker::nth(style),
                    points,
                })
                .collect();

            Facet { key, series }
        })
        .collect()
}
