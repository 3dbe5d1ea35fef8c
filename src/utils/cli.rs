//! Command-line arguments (clap derive).

use std::path::PathBuf;

use clap::Parser;

use crate::analysis::aggregator::DEFAULT_REPLICATES;
use crate::plot::PlotJob;

/// Sweep Plot - average replicate rows of a simulation sweep and chart them
///
/// Reads a headerless CSV, averages the two value columns per distinct
/// x-value over a fixed replicate count, prints `<x>, <mean1>, <mean2>` per
/// x-value and writes a two-series line chart.
///
/// Examples:
///   sweep_plot output/non_preemptive_packet_vs_mean_delay.txt
///   sweep_plot results.csv --y-upper 40 -o delay.svg
///   sweep_plot --config sweep_plot.toml
///   sweep_plot --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Sweep results file
    #[arg(value_name = "INPUT", default_value = "output/non_preemptive_packet_vs_mean_delay.txt")]
    pub input: PathBuf,

    /// Column holding the swept x-value
    #[arg(long, default_value_t = 0)]
    pub x_column: usize,

    /// Column averaged into the first series
    #[arg(long, default_value_t = 1)]
    pub y1_column: usize,

    /// Column averaged into the second series
    #[arg(long, default_value_t = 2)]
    pub y2_column: usize,

    #[arg(long, default_value = "Arrival Rates")]
    pub x_label: String,

    #[arg(long, default_value = "Mean Delay")]
    pub y_label: String,

    /// Legend entries for the two series
    #[arg(
        long,
        value_name = "FIRST,SECOND",
        value_delimiter = ',',
        default_values_t = [String::from("Data Mean Delay"), String::from("Voice Mean Delay")]
    )]
    pub series_labels: Vec<String>,

    /// Fixed y-axis bound (both bounds 0 = auto-scale)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub y_upper: f64,

    /// Fixed y-axis bound (both bounds 0 = auto-scale)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub y_lower: f64,

    /// Replicate rows expected per x-value; every sum is divided by this
    #[arg(long, default_value_t = DEFAULT_REPLICATES, env = "SWEEP_PLOT_REPLICATES")]
    pub replicates: usize,

    /// Field delimiter
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    /// Skip the first row
    #[arg(long)]
    pub has_header: bool,

    /// Chart file: .html (interactive), .svg, or .png (ttf builds)
    #[arg(short, long, value_name = "FILE", default_value = "mean_delay.html")]
    pub output: PathBuf,

    /// Open an HTML chart in the browser once written
    #[arg(long)]
    pub open: bool,

    /// Run every [[plot]] job in this TOML file instead of the flags above
    #[arg(short, long, value_name = "FILE", conflicts_with = "init_config")]
    pub config: Option<PathBuf>,

    /// Write a default sweep_plot.toml and exit
    #[arg(long)]
    pub init_config: bool,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn validate(&self) -> Result<(), String> {
        if self.series_labels.len() != 2 {
            return Err(format!(
                "--series-labels needs exactly two names, got {}",
                self.series_labels.len()
            ));
        }
        Ok(())
    }

    /// The single job described by the flags.
    pub fn to_job(&self) -> PlotJob {
        let mut labels = self.series_labels.iter().cloned();
        let defaults = PlotJob::default().series_labels;
        let series_labels = [
            labels.next().unwrap_or_else(|| defaults[0].clone()),
            labels.next().unwrap_or_else(|| defaults[1].clone()),
        ];

        PlotJob {
            input: self.input.clone(),
            x_column: self.x_column,
            y1_column: self.y1_column,
            y2_column: self.y2_column,
            x_label: self.x_label.clone(),
            y_label: self.y_label.clone(),
            series_labels,
            y_upper: self.y_upper,
            y_lower: self.y_lower,
            replicates: self.replicates,
            delimiter: self.delimiter,
            has_header: self.has_header,
            output: self.output.clone(),
            open: self.open,
        }
    }
}
