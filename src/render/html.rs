//! Interactive chart output: a self-contained plotly HTML page.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::info;
use plotly::{
    Plot, Scatter,
    color::NamedColor,
    common::{DashType, Line, Marker, Mode},
    layout::{Axis, Layout},
};

use crate::analysis::aggregator::AveragedSeries;
use crate::render::{ChartLabels, PlotRenderer, YBounds, y_clamp};
use crate::utils::error::PlotError;

/// Chart written as HTML, optionally opened in the default browser.
#[derive(Debug, Clone)]
pub struct InteractiveChart {
    path: PathBuf,
    open_in_browser: bool,
}

impl InteractiveChart {
    pub fn new(path: &Path, open_in_browser: bool) -> Self {
        Self {
            path: path.to_path_buf(),
            open_in_browser,
        }
    }
}

impl PlotRenderer for InteractiveChart {
    fn render(
        &self,
        series: &AveragedSeries,
        labels: &ChartLabels,
        bounds: YBounds,
    ) -> Result<(), PlotError> {
        let plot = build_plot(series, labels, bounds);

        fs::write(&self.path, plot.to_html()).map_err(|source| PlotError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!("interactive chart written to {}", self.path.display());

        if self.open_in_browser {
            plot.show();
        }
        Ok(())
    }
}

/// Two `lines+markers` traces over the shared x sequence.
pub fn build_plot(series: &AveragedSeries, labels: &ChartLabels, bounds: YBounds) -> Plot {
    let mut plot = Plot::new();

    let traces = [
        (&series.y1s, labels.series[0].as_str(), NamedColor::Green),
        (&series.y2s, labels.series[1].as_str(), NamedColor::Blue),
    ];
    for (ys, name, color) in traces {
        plot.add_trace(
            Scatter::new(series.xs.clone(), ys.clone())
                .name(name)
                .mode(Mode::LinesMarkers)
                .line(Line::new().color(color).dash(DashType::Solid))
                .marker(Marker::new().color(color).size(8)),
        );
    }

    let mut y_axis = Axis::new().title(labels.y.as_str()).show_grid(true);
    if let Some((lo, hi)) = y_clamp(series, bounds) {
        y_axis = y_axis.range(vec![lo, hi]);
    }

    let layout = Layout::new()
        .show_legend(true)
        .x_axis(Axis::new().title(labels.x.as_str()).show_grid(true))
        .y_axis(y_axis);
    plot.set_layout(layout);

    plot
}
