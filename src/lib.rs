//! # Sweep Plot
//! Averages the replicate rows of a simulation sweep CSV and charts two
//! measured quantities against the swept variable.
//!
//! ## Pipeline
//! - **analysis:** one pass over the CSV, running sums per x-value, divided by
//!   the replicate count.
//! - **render:** interactive HTML (plotly) or static SVG/PNG (plotters).
//! - **plot:** job orchestration, single or many jobs on scoped threads.
//! - **utils:** CLI, TOML job file, error types.

pub mod analysis;
pub mod plot;
pub mod render;
pub mod utils;
