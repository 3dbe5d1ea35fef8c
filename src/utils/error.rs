//! Error taxonomy for aggregation and rendering.
//!
//! Every failure is fatal for the job that raised it; nothing is retried and no
//! partial result is returned.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures raised while reading and averaging a sweep file.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// Input file missing or unreadable; raised before any row is read.
    #[error("cannot open input {}: {source}", path.display())]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Selected field is not a float literal.
    #[error("row {row}: column {column} holds `{field}`, which is not a number")]
    Parse {
        row: usize,
        column: usize,
        field: String,
    },

    /// Row is shorter than the highest selected column.
    #[error("row {row}: column {column} requested but the row has {len} fields")]
    MissingColumn { row: usize, column: usize, len: usize },

    /// Reader-level failure (I/O mid-read, invalid UTF-8).
    #[error("malformed CSV input: {0}")]
    Csv(#[from] csv::Error),

    /// Replicate count of zero would divide every sum by zero.
    #[error("replicate count must be positive")]
    ZeroReplicates,
}

impl AggregateError {
    /// True for the row-shape failures (bad field or short row).
    pub fn is_malformed_row(&self) -> bool {
        matches!(
            self,
            AggregateError::Parse { .. } | AggregateError::MissingColumn { .. } | AggregateError::Csv(_)
        )
    }
}

/// Failures of a whole plot job.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error("unsupported chart format for {}: expected .html or .svg (.png needs the ttf feature)", path.display())]
    UnsupportedOutput { path: PathBuf },

    #[error("delimiter {0:?} is not a single-byte ASCII character")]
    InvalidDelimiter(char),

    #[error("rendering {} failed: {message}", path.display())]
    Render { path: PathBuf, message: String },

    #[error("writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("plot job {index} panicked")]
    JobPanicked { index: usize },
}

impl PlotError {
    pub fn render(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        PlotError::Render {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
