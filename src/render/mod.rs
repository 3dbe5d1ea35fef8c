//! Chart rendering for averaged series.
//!
//! Two backends behind [`PlotRenderer`]:
//! - `html`: interactive plotly chart (zoom, pan, hover).
//! - `image`: static plotters chart, SVG or PNG.
//!
//! Both draw the two series as solid lines with circle markers (first green,
//! second blue), labelled axes, a legend and grid lines.

pub mod html;
pub mod image;

use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::aggregator::AveragedSeries;
use crate::utils::error::PlotError;

use self::{
    html::InteractiveChart,
    image::{ChartImage, ImageFormat},
};

/// Axis titles and legend entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartLabels {
    pub x: String,
    pub y: String,
    pub series: [String; 2],
}

impl Default for ChartLabels {
    fn default() -> Self {
        Self {
            x: "Arrival Rates".into(),
            y: "Mean Delay".into(),
            series: ["Data Mean Delay".into(), "Voice Mean Delay".into()],
        }
    }
}

/// Fixed y-axis bounds; `(0, 0)` means auto-scale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct YBounds {
    pub upper: f64,
    pub lower: f64,
}

impl YBounds {
    pub fn new(upper: f64, lower: f64) -> Self {
        Self { upper, lower }
    }

    /// Ascending (low, high) clamp, or `None` when both bounds are zero.
    pub fn range(&self) -> Option<(f64, f64)> {
        if self.upper == 0.0 && self.lower == 0.0 {
            None
        } else {
            Some((self.upper.min(self.lower), self.upper.max(self.lower)))
        }
    }
}

/// Anything that can draw an averaged series somewhere.
pub trait PlotRenderer {
    fn render(
        &self,
        series: &AveragedSeries,
        labels: &ChartLabels,
        bounds: YBounds,
    ) -> Result<(), PlotError>;
}

/// Picks a backend from the output extension (`html`, `svg`, `png`).
///
/// `png` needs the `ttf` feature: the bitmap backend cannot draw text
/// without a font implementation.
pub fn renderer_for(output: &Path, open_in_browser: bool) -> Result<Box<dyn PlotRenderer>, PlotError> {
    let ext = output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let format = match ext.as_str() {
        "html" | "htm" => return Ok(Box::new(InteractiveChart::new(output, open_in_browser))),
        "svg" => ImageFormat::Svg,
        "png" if cfg!(feature = "ttf") => ImageFormat::Png,
        _ => {
            return Err(PlotError::UnsupportedOutput {
                path: output.to_path_buf(),
            });
        }
    };

    if open_in_browser {
        warn!(
            "--open only applies to HTML charts; {} will not be opened",
            output.display()
        );
    }
    Ok(Box::new(ChartImage::new(output, format)))
}

/// Hands a fully computed series to `renderer`.
pub fn render(
    series: &AveragedSeries,
    labels: &ChartLabels,
    bounds: YBounds,
    renderer: &dyn PlotRenderer,
) -> Result<(), PlotError> {
    debug!(
        "rendering {} points ({} vs {}), y clamp {:?}",
        series.len(),
        labels.series[0],
        labels.series[1],
        bounds.range()
    );
    renderer.render(series, labels, bounds)
}

/// Widens a data extent by 5% per side; degenerate or missing extents get a
/// unit-sized window so the chart still has an area to draw in.
pub(crate) fn padded(extent: Option<(f64, f64)>) -> (f64, f64) {
    match extent {
        None => (0.0, 1.0),
        Some((lo, hi)) if hi - lo <= f64::EPSILON * lo.abs().max(1.0) => (lo - 0.5, hi + 0.5),
        Some((lo, hi)) => {
            let pad = (hi - lo) * 0.05;
            (lo - pad, hi + pad)
        }
    }
}

/// y window: the explicit clamp when set, otherwise the padded data extent.
pub(crate) fn y_window(series: &AveragedSeries, bounds: YBounds) -> (f64, f64) {
    match bounds.range() {
        Some((lo, hi)) if hi > lo => (lo, hi),
        Some((lo, hi)) => padded(Some((lo, hi))),
        None => padded(series.y_extent()),
    }
}

/// The y window to pin, or `None` to let the backend auto-scale.
pub(crate) fn y_clamp(series: &AveragedSeries, bounds: YBounds) -> Option<(f64, f64)> {
    bounds.range().map(|_| y_window(series, bounds))
}
