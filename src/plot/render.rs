//! Figure drawing with plotters.

use super::facets::{Figure, Marker, Series};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Image file type, chosen from the output extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Svg,
    Png,
}

impl ImageFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "svg" => Some(ImageFormat::Svg),
            "png" => Some(ImageFormat::Png),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("unsupported image type for {0} (expected .svg or .png)")]
    UnsupportedFormat(PathBuf),

    #[error("failed to create output folder for {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to draw {path}: {message}")]
    Draw { path: PathBuf, message: String },
}

/// Pixel size of a rendered figure.
#[derive(Debug, Clone, Copy)]
pub struct FigureSize {
    pub facet_width: u32,
    pub height: u32,
}

impl Default for FigureSize {
    fn default() -> Self {
        Self {
            facet_width: 480,
            height: 480,
        }
    }
}

impl From<&crate::config::PlotConfig> for FigureSize {
    fn from(config: &crate::config::PlotConfig) -> Self {
        Self {
            facet_width: config.facet_width,
            height: config.height,
        }
    }
}

/// Draw `figure` to `path`, creating parent folders as needed.
pub fn render_figure(figure: &Figure, path: &Path, size: FigureSize) -> Result<(), PlotError> {
    let format =
        ImageFormat::from_path(path).ok_or_else(|| PlotError::UnsupportedFormat(path.to_path_buf()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| PlotError::CreateDir {
            path: path.to_path_buf(),
            source,
        })?;
    }

    let dims = figure_dims(figure, size);
    debug!("Rendering {} ({}x{}) to {}", figure.title, dims.0, dims.1, path.display());

    let draw_error = |message: String| PlotError::Draw {
        path: path.to_path_buf(),
        message,
    };

    match format {
        ImageFormat::Svg => {
            let root = SVGBackend::new(path, dims).into_drawing_area();
            draw_figure(&root, figure).map_err(|e| draw_error(e.to_string()))
        }
        ImageFormat::Png => {
            let root = BitMapBackend::new(path, dims).into_drawing_area();
            draw_figure(&root, figure).map_err(|e| draw_error(e.to_string()))
        }
    }
}

/// Pixel size of the whole figure: one facet width per facet.
fn figure_dims(figure: &Figure, size: FigureSize) -> (u32, u32) {
    let facets = u32::try_from(figure.facets.len().max(1)).unwrap_or(u32::MAX);
    (size.facet_width.saturating_mul(facets), size.height)
}

fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    let body = root.titled(&figure.title, ("sans-serif", 22))?;

    let (x_max, y_max) = figure.bounds();
    let x_range = 0.0..(x_max * 1.05).max(1.0);
    let y_range = 0.0..(y_max * 1.1).max(1e-6);

    let panels = body.split_evenly((1, figure.facets.len().max(1)));
    for (panel, facet) in panels.iter().zip(&figure.facets) {
        let mut chart = ChartBuilder::on(panel)
            .caption(facet.title(), ("sans-serif", 16))
            .margin(10)
            .x_label_area_size(35)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range.clone(), y_range.clone())?;

        chart
            .configure_mesh()
            .x_desc(figure.x_label.as_str())
            .y_desc(figure.y_label.as_str())
            .draw()?;

        for series in &facet.series {
            draw_series(&mut chart, series)?;
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperLeft)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn draw_series<DB: DrawingBackend>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    series: &Series,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let style = Palette99::pick(series.style).filled();
    let stroke = Palette99::pick(series.style).stroke_width(2);
    let points = series.points.iter().copied();

    let annotation = match series.marker {
        Marker::Circle => {
            chart.draw_series(points.map(|p| Circle::new(p, 4, style)))?
                .legend(move |(x, y)| Circle::new((x, y), 4, style))
        }
        Marker::Triangle => chart
            .draw_series(points.map(|p| TriangleMarker::new(p, 5, style)))?
            .legend(move |(x, y)| TriangleMarker::new((x, y), 5, style)),
        Marker::Cross => chart
            .draw_series(points.map(|p| Cross::new(p, 4, stroke)))?
            .legend(move |(x, y)| Cross::new((x, y), 4, stroke)),
        Marker::Square => chart
            .draw_series(points.map(|(x, y)| {
                EmptyElement::at((x, y)) + Rectangle::new([(-4, -4), (4, 4)], style)
            }))?
            .legend(move |(x, y)| Rectangle::new([(x - 4, y - 4), (x + 4, y + 4)], style)),
    };
    annotation.label(series.label.as_str());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::facets::Facet;

    #[test]
    fn test_image_format_from_extension() {
        assert_eq!(ImageFormat::from_path(Path::new("a/b.svg")), Some(ImageFormat::Svg));
        assert_eq!(ImageFormat::from_path(Path::new("b.PNG")), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_path(Path::new("b.pdf")), None);
        assert_eq!(ImageFormat::from_path(Path::new("plot")), None);
    }

    #[test]
    fn test_figure_dims_scale_with_facets() {
        let facet = |key: &str| Facet {
            key: key.to_string(),
            series: Vec::new(),
        };
        let mut figure = Figure {
            title: "t".to_string(),
            x_label: "x".to_string(),
            y_label: "y".to_string(),
            facets: Vec::new(),
        };
        let size = FigureSize::default();
        assert_eq!(figure_dims(&figure, size), (480, 480));

        figure.facets = vec![facet("2"), facet("4"), facet("10")];
        assert_eq!(figure_dims(&figure, size), (1440, 480));

        let wide = FigureSize {
            facet_width: u32::MAX,
            height: 480,
        };
        assert_eq!(figure_dims(&figure, wide), (u32::MAX, 480));
    }

    #[test]
    fn test_unsupported_format_is_rejected_before_drawing() {
        let figure = Figure {
            title: "t".to_string(),
            x_label: "x".to_string(),
            y_label: "y".to_string(),
            facets: Vec::new(),
        };
        let err = render_figure(&figure, Path::new("out.pdf"), FigureSize::default()).unwrap_err();
        assert!(matches!(err, PlotError::UnsupportedFormat(_)));
    }
}
