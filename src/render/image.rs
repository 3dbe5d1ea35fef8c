//! Static chart output through plotters (SVG or PNG).
//!
//! PNG output needs the crate's `ttf` feature, since the bitmap backend has
//! no way to draw text without it; `renderer_for` refuses `.png` otherwise.
//! SVG always carries its text.

use std::path::{Path, PathBuf};

use log::info;
use plotters::{
    coord::Shift,
    prelude::*,
};

use crate::analysis::aggregator::AveragedSeries;
use crate::render::{ChartLabels, PlotRenderer, YBounds, padded, y_window};
use crate::utils::error::PlotError;

const DEFAULT_SIZE: (u32, u32) = (1024, 640);
const MARKER_RADIUS: i32 = 4;
const LINE_WIDTH: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Svg,
    Png,
}

/// Chart written to an image file.
#[derive(Debug, Clone)]
pub struct ChartImage {
    path: PathBuf,
    format: ImageFormat,
    size: (u32, u32),
}

impl ChartImage {
    pub fn new(path: &Path, format: ImageFormat) -> Self {
        Self {
            path: path.to_path_buf(),
            format,
            size: DEFAULT_SIZE,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }
}

impl PlotRenderer for ChartImage {
    fn render(
        &self,
        series: &AveragedSeries,
        labels: &ChartLabels,
        bounds: YBounds,
    ) -> Result<(), PlotError> {
        let drawn = match self.format {
            ImageFormat::Svg => {
                let root = SVGBackend::new(&self.path, self.size).into_drawing_area();
                draw_chart(&root, series, labels, bounds).map_err(|e| e.to_string())
            }
            ImageFormat::Png => {
                let root = BitMapBackend::new(&self.path, self.size).into_drawing_area();
                draw_chart(&root, series, labels, bounds).map_err(|e| e.to_string())
            }
        };
        drawn.map_err(|message| PlotError::render(&self.path, message))?;

        info!("chart written to {}", self.path.display());
        Ok(())
    }
}

/// Two line series with circle markers, mesh grid and a legend box.
fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &AveragedSeries,
    labels: &ChartLabels,
    bounds: YBounds,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let (x_lo, x_hi) = padded(series.x_extent());
    let (y_lo, y_hi) = y_window(series, bounds);

    let mut chart = ChartBuilder::on(root)
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .x_desc(labels.x.as_str())
        .y_desc(labels.y.as_str())
        .label_style(("sans-serif", 16))
        .draw()?;

    let lines = [
        (&series.y1s, labels.series[0].as_str(), GREEN),
        (&series.y2s, labels.series[1].as_str(), BLUE),
    ];

    for (ys, name, color) in lines {
        let points: Vec<(f64, f64)> = series
            .xs
            .iter()
            .copied()
            .zip(ys.iter().copied())
            .collect();

        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(LINE_WIDTH)))?
            .label(name)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(LINE_WIDTH))
            });

        chart.draw_series(
            points
                .into_iter()
                .map(|p| Circle::new(p, MARKER_RADIUS, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
