//! Plot jobs: aggregate one sweep file, print the averaged triples, render.
//!
//! A [`PlotJob`] carries every parameter explicitly; its `Default` mirrors the
//! reference sweep (arrival rate vs data/voice mean delay, 8 replicates).
//! Several jobs run side by side with [`run_jobs`]; each owns its input,
//! accumulators and output file.

use std::path::PathBuf;

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::analysis::aggregator::{
    Aggregator, AveragedSeries, ColumnSelection, DEFAULT_REPLICATES, ReaderOptions,
};
use crate::render::{ChartLabels, YBounds, render, renderer_for};
use crate::utils::error::PlotError;

/// Everything one input → chart run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotJob {
    pub input: PathBuf,
    pub x_column: usize,
    pub y1_column: usize,
    pub y2_column: usize,
    pub x_label: String,
    pub y_label: String,
    pub series_labels: [String; 2],
    /// Both bounds zero: auto-scale.
    pub y_upper: f64,
    pub y_lower: f64,
    pub replicates: usize,
    pub delimiter: char,
    pub has_header: bool,
    /// `.html` (interactive), `.svg`, or `.png` (needs the `ttf` feature).
    pub output: PathBuf,
    /// Open HTML output in the browser once written.
    pub open: bool,
}

impl Default for PlotJob {
    fn default() -> Self {
        let labels = ChartLabels::default();
        Self {
            input: PathBuf::from("output/non_preemptive_packet_vs_mean_delay.txt"),
            x_column: 0,
            y1_column: 1,
            y2_column: 2,
            x_label: labels.x,
            y_label: labels.y,
            series_labels: labels.series,
            y_upper: 0.0,
            y_lower: 0.0,
            replicates: DEFAULT_REPLICATES,
            delimiter: ',',
            has_header: false,
            output: PathBuf::from("mean_delay.html"),
            open: false,
        }
    }
}

impl PlotJob {
    pub fn columns(&self) -> ColumnSelection {
        ColumnSelection::new(self.x_column, self.y1_column, self.y2_column)
    }

    pub fn labels(&self) -> ChartLabels {
        ChartLabels {
            x: self.x_label.clone(),
            y: self.y_label.clone(),
            series: self.series_labels.clone(),
        }
    }

    pub fn bounds(&self) -> YBounds {
        YBounds::new(self.y_upper, self.y_lower)
    }

    pub fn reader_options(&self) -> Result<ReaderOptions, PlotError> {
        if !self.delimiter.is_ascii() {
            return Err(PlotError::InvalidDelimiter(self.delimiter));
        }
        Ok(ReaderOptions {
            delimiter: self.delimiter as u8,
            has_header: self.has_header,
        })
    }
}

/// Runs one job: aggregate → stdout triples → chart. Returns the plotted series.
pub fn run_job(job: &PlotJob) -> Result<AveragedSeries, PlotError> {
    let renderer = renderer_for(&job.output, job.open)?;

    info!(
        "averaging {} (columns {:?}, {} replicates per key)",
        job.input.display(),
        job.columns(),
        job.replicates
    );
    let points = Aggregator::new(job.columns())
        .replicates(job.replicates)
        .options(job.reader_options()?)
        .aggregate_path(&job.input)?;

    for point in &points {
        println!("{}", point);
    }

    let series: AveragedSeries = points.into_iter().collect();
    render(&series, &job.labels(), job.bounds(), renderer.as_ref())?;
    Ok(series)
}

/// Runs independent jobs on scoped threads; outcomes come back in job order.
/// A failing job does not stop the others.
pub fn run_jobs(jobs: &[PlotJob]) -> Vec<Result<AveragedSeries, PlotError>> {
    let scoped = crossbeam::scope(|s| {
        let handles: Vec<_> = jobs
            .iter()
            .map(|job| s.spawn(move |_| run_job(job)))
            .collect();

        handles
            .into_iter()
            .enumerate()
            .map(|(index, handle)| {
                handle
                    .join()
                    .unwrap_or(Err(PlotError::JobPanicked { index }))
            })
            .collect::<Vec<_>>()
    });

    let outcomes = match scoped {
        Ok(outcomes) => outcomes,
        Err(_) => (0..jobs.len())
            .map(|index| Err(PlotError::JobPanicked { index }))
            .collect(),
    };

    for (job, outcome) in jobs.iter().zip(&outcomes) {
        if let Err(e) = outcome {
            error!("plot job for {} failed: {}", job.input.display(), e);
        }
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_job_matches_reference_sweep() {
        let job = PlotJob::default();
        assert_eq!(job.columns(), ColumnSelection::new(0, 1, 2));
        assert_eq!(job.replicates, 8);
        assert_eq!(job.bounds().range(), None);
        assert_eq!(job.labels().series[1], "Voice Mean Delay");
        assert_eq!(job.reader_options().unwrap(), ReaderOptions::default());
    }

    #[test]
    fn non_ascii_delimiter_is_rejected() {
        let job = PlotJob {
            delimiter: '§',
            ..PlotJob::default()
        };
        assert!(matches!(
            job.reader_options(),
            Err(PlotError::InvalidDelimiter('§'))
        ));
    }

    #[test]
    fn unsupported_output_fails_before_reading_input() {
        let job = PlotJob {
            input: PathBuf::from("no/such/input.csv"),
            output: PathBuf::from("chart.pdf"),
            ..PlotJob::default()
        };
        assert!(matches!(
            run_job(&job),
            Err(PlotError::UnsupportedOutput { .. })
        ));
    }
}
