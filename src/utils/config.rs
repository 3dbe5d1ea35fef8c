//! TOML job file: one `[[plot]]` table per chart.
//!
//! ```toml
//! [[plot]]
//! input = "output/non_preemptive_packet_vs_mean_delay.txt"
//! x_label = "Arrival Rates"
//! y_label = "Mean Delay"
//! output = "mean_delay.html"
//! ```
//!
//! Omitted keys take the [`PlotJob`] defaults.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::plot::PlotJob;

/// Default job file name written by `--init-config`.
pub const DEFAULT_CONFIG_FILE: &str = "sweep_plot.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, rename = "plot")]
    pub plots: Vec<PlotJob>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        Ok(config)
    }

    /// A config holding the single reference job.
    pub fn default_toml() -> Result<String> {
        let config = Config {
            plots: vec![PlotJob::default()],
        };
        toml::to_string_pretty(&config).context("serialising default config")
    }
}
