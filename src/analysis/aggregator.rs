//! Grouped averaging of sweep results: replicate rows → one mean per x-value.
//!
//! Reads the CSV once, adds each row's two value columns into running sums
//! keyed by the x column, then divides every sum by the replicate count.
//! The divisor is fixed, not the observed row count: a key with fewer or
//! more rows than expected still gets `sum / replicates`. Mismatches are only
//! logged.
//!
//! Output order is the order in which x-values first appear in the input.

use std::{
    fmt,
    fs::File,
    io::{self, Read},
    path::Path,
};

use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::keyed_sum::KeyedSum;
use crate::utils::error::AggregateError;

/// Expected replicate rows per x-value in a sweep file.
pub const DEFAULT_REPLICATES: usize = 8;

/// Column indices (0-based) of the key and the two averaged values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSelection {
    pub key: usize,
    pub value1: usize,
    pub value2: usize,
}

impl ColumnSelection {
    pub fn new(key: usize, value1: usize, value2: usize) -> Self {
        Self { key, value1, value2 }
    }

    /// Minimum number of fields a row needs.
    pub fn min_fields(&self) -> usize {
        self.key.max(self.value1).max(self.value2) + 1
    }
}

impl Default for ColumnSelection {
    fn default() -> Self {
        Self::new(0, 1, 2)
    }
}

/// Delimited-text reader settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    pub delimiter: u8,
    /// Skip the first row.
    pub has_header: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: false,
        }
    }
}

/// One averaged x-value: `(key, sum1 / replicates, sum2 / replicates)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AveragedPoint {
    pub x: f64,
    pub mean1: f64,
    pub mean2: f64,
}

/// Progress line format: `<key>, <mean1>, <mean2>`.
impl fmt::Display for AveragedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {:.6}, {:.6}", self.x, self.mean1, self.mean2)
    }
}

/// Three index-aligned sequences handed to a renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AveragedSeries {
    pub xs: Vec<f64>,
    pub y1s: Vec<f64>,
    pub y2s: Vec<f64>,
}

impl AveragedSeries {
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Finite (min, max) of the x sequence.
    pub fn x_extent(&self) -> Option<(f64, f64)> {
        extent(self.xs.iter())
    }

    /// Finite (min, max) over both y sequences.
    pub fn y_extent(&self) -> Option<(f64, f64)> {
        extent(self.y1s.iter().chain(self.y2s.iter()))
    }
}

impl FromIterator<AveragedPoint> for AveragedSeries {
    fn from_iter<I: IntoIterator<Item = AveragedPoint>>(iter: I) -> Self {
        let mut series = AveragedSeries::default();
        for point in iter {
            series.xs.push(point.x);
            series.y1s.push(point.mean1);
            series.y2s.push(point.mean2);
        }
        series
    }
}

fn extent<'a>(values: impl Iterator<Item = &'a f64>) -> Option<(f64, f64)> {
    values
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Configured averaging pass over one sweep file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregator {
    columns: ColumnSelection,
    replicates: usize,
    options: ReaderOptions,
}

impl Aggregator {
    pub fn new(columns: ColumnSelection) -> Self {
        Self {
            columns,
            replicates: DEFAULT_REPLICATES,
            options: ReaderOptions::default(),
        }
    }

    pub fn replicates(mut self, replicates: usize) -> Self {
        self.replicates = replicates;
        self
    }

    pub fn options(mut self, options: ReaderOptions) -> Self {
        self.options = options;
        self
    }

    /// Opens `path` and averages it. The file is closed on every return path.
    pub fn aggregate_path(&self, path: &Path) -> Result<Vec<AveragedPoint>, AggregateError> {
        if self.replicates == 0 {
            return Err(AggregateError::ZeroReplicates);
        }
        let file = File::open(path).map_err(|source| AggregateError::InputNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("reading sweep results from {}", path.display());
        self.aggregate(file)
    }

    /// Single pass over `source`; fails on the first bad row. An empty line is
    /// a row with no fields and fails as `MissingColumn` on the key column.
    pub fn aggregate<R: Read>(&self, source: R) -> Result<Vec<AveragedPoint>, AggregateError> {
        if self.replicates == 0 {
            return Err(AggregateError::ZeroReplicates);
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .has_headers(self.options.has_header)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(EmptyLineTracker::new(source));

        let mut sum_by_key1 = KeyedSum::new();
        let mut sum_by_key2 = KeyedSum::new();
        let mut record = StringRecord::new();
        let mut ordinal = 0usize;

        while reader.read_record(&mut record)? {
            ordinal += 1;
            let row = record
                .position()
                .map_or(ordinal as u64, |pos| pos.line());

            // csv skips empty lines; an empty line before this record is a
            // row with no key column.
            if let Some(empty) = reader.get_ref().first_empty_line()
                && empty < row
            {
                return Err(self.empty_row(empty));
            }
            let row = row as usize;

            let key = parse_field(&record, row, self.columns.key)?;
            let value1 = parse_field(&record, row, self.columns.value1)?;
            let value2 = parse_field(&record, row, self.columns.value2)?;

            sum_by_key1.add(key, value1);
            sum_by_key2.add(key, value2);
        }
        if let Some(empty) = reader.get_ref().first_empty_line() {
            return Err(self.empty_row(empty));
        }

        debug!(
            "read {} rows covering {} distinct keys",
            ordinal,
            sum_by_key1.len()
        );
        self.report_replicate_mismatch(&sum_by_key1);

        Ok(self.means(&sum_by_key1, &sum_by_key2))
    }

    /// Walks the first mapping in first-seen order; a key missing from the
    /// second mapping is dropped from the result.
    fn means(&self, sum_by_key1: &KeyedSum, sum_by_key2: &KeyedSum) -> Vec<AveragedPoint> {
        let divisor = self.replicates as f64;
        sum_by_key1
            .iter()
            .filter_map(|first| match sum_by_key2.get(first.key) {
                Some(second) => Some(AveragedPoint {
                    x: first.key,
                    mean1: first.sum / divisor,
                    mean2: second.sum / divisor,
                }),
                None => {
                    debug!("key {} has no second-series sum; skipped", first.key);
                    None
                }
            })
            .collect()
    }

    fn empty_row(&self, line: u64) -> AggregateError {
        AggregateError::MissingColumn {
            row: line as usize,
            column: self.columns.key,
            len: 0,
        }
    }

    fn report_replicate_mismatch(&self, sums: &KeyedSum) {
        let mut mismatched = 0usize;
        for entry in sums.iter().filter(|e| e.count != self.replicates) {
            mismatched += 1;
            debug!(
                "key {} has {} rows, averaging over {}",
                entry.key, entry.count, self.replicates
            );
        }
        if mismatched > 0 {
            warn!(
                "{} of {} keys do not have exactly {} replicate rows; their means use the fixed divisor",
                mismatched,
                sums.len(),
                self.replicates
            );
        }
    }
}

/// Averages `source` with default reader options (comma, no header).
pub fn aggregate<R: Read>(
    source: R,
    columns: ColumnSelection,
    replicates: usize,
) -> Result<Vec<AveragedPoint>, AggregateError> {
    Aggregator::new(columns).replicates(replicates).aggregate(source)
}

fn parse_field(record: &StringRecord, row: usize, column: usize) -> Result<f64, AggregateError> {
    let raw = record.get(column).ok_or(AggregateError::MissingColumn {
        row,
        column,
        len: record.len(),
    })?;
    raw.parse::<f64>().map_err(|_| AggregateError::Parse {
        row,
        column,
        field: raw.to_string(),
    })
}

/// Passes bytes through unchanged, remembering the first line that has no
/// content (`\r` alone counts as empty). An empty line inside a quoted
/// field is counted too.
struct EmptyLineTracker<R> {
    inner: R,
    line: u64,
    line_len: usize,
    first_empty: Option<u64>,
}

impl<R: Read> EmptyLineTracker<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            line: 1,
            line_len: 0,
            first_empty: None,
        }
    }

    /// 1-based line number of the first empty line read so far.
    fn first_empty_line(&self) -> Option<u64> {
        self.first_empty
    }
}

impl<R: Read> Read for EmptyLineTracker<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        for &byte in &buf[..n] {
            match byte {
                b'\n' => {
                    if self.line_len == 0 && self.first_empty.is_none() {
                        self.first_empty = Some(self.line);
                    }
                    self.line += 1;
                    self.line_len = 0;
                }
                b'\r' => {}
                _ => self.line_len += 1,
            }
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str, replicates: usize) -> Result<Vec<AveragedPoint>, AggregateError> {
        aggregate(input.as_bytes(), ColumnSelection::default(), replicates)
    }

    fn triples(points: &[AveragedPoint]) -> Vec<(f64, f64, f64)> {
        points.iter().map(|p| (p.x, p.mean1, p.mean2)).collect()
    }

    #[test]
    fn averages_replicates_by_fixed_divisor() {
        let points = run("1,10,20\n1,30,40\n2,5,5\n2,15,15\n", 2).unwrap();
        assert_eq!(triples(&points), vec![(1.0, 20.0, 30.0), (2.0, 10.0, 10.0)]);
    }

    #[test]
    fn divisor_ignores_observed_row_count() {
        // Three rows for key 4 but the divisor stays 8.
        let points = run("4,8,16\n4,8,16\n4,8,16\n", 8).unwrap();
        assert_eq!(triples(&points), vec![(4.0, 3.0, 6.0)]);
    }

    #[test]
    fn output_follows_first_seen_key_order() {
        let points = run("0.3,1,1\n0.1,1,1\n0.3,1,1\n0.2,1,1\n0.1,1,1\n", 1).unwrap();
        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.3, 0.1, 0.2]);
    }

    #[test]
    fn empty_input_is_empty_result() {
        assert!(run("", 8).unwrap().is_empty());
    }

    #[test]
    fn zero_replicates_is_rejected() {
        assert!(matches!(run("1,2,3\n", 0), Err(AggregateError::ZeroReplicates)));
        assert!(matches!(run("", 0), Err(AggregateError::ZeroReplicates)));
    }

    #[test]
    fn non_numeric_key_fails_with_row_and_column() {
        match run("1,10,20\nx,10,20\n", 2) {
            Err(AggregateError::Parse { row, column, field }) => {
                assert_eq!(row, 2);
                assert_eq!(column, 0);
                assert_eq!(field, "x");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn short_row_fails() {
        let err = run("1,10,20\n2,10\n", 2).unwrap_err();
        assert!(err.is_malformed_row());
        assert!(matches!(
            err,
            AggregateError::MissingColumn { row: 2, column: 2, len: 2 }
        ));
    }

    #[test]
    fn blank_line_is_a_row_without_key_column() {
        let err = run("1,10,20\n\n1,30,40\n", 2).unwrap_err();
        assert!(err.is_malformed_row());
        assert!(matches!(
            err,
            AggregateError::MissingColumn { row: 2, column: 0, len: 0 }
        ));

        assert!(matches!(
            run("1,10,20\r\n\r\n", 1),
            Err(AggregateError::MissingColumn { row: 2, column: 0, len: 0 })
        ));
        assert!(matches!(
            run("\n1,10,20\n", 1),
            Err(AggregateError::MissingColumn { row: 1, .. })
        ));
    }

    #[test]
    fn bad_row_before_blank_line_is_reported_first() {
        assert!(matches!(
            run("1,10,20\nx,1,1\n\n", 1),
            Err(AggregateError::Parse { row: 2, .. })
        ));
    }

    #[test]
    fn crlf_line_endings_are_not_blank_lines() {
        let points = run("1,10,20\r\n1,30,40\r\n", 2).unwrap();
        assert_eq!(triples(&points), vec![(1.0, 20.0, 30.0)]);
    }

    #[test]
    fn key_only_in_second_mapping_is_dropped() {
        let mut sum_by_key1 = KeyedSum::new();
        let mut sum_by_key2 = KeyedSum::new();
        sum_by_key1.add(1.0, 2.0);
        sum_by_key2.add(1.0, 4.0);
        sum_by_key2.add(9.0, 4.0);

        let points = Aggregator::new(ColumnSelection::default())
            .replicates(2)
            .means(&sum_by_key1, &sum_by_key2);
        assert_eq!(
            points,
            vec![AveragedPoint { x: 1.0, mean1: 1.0, mean2: 2.0 }]
        );
    }

    #[test]
    fn custom_columns_and_header() {
        let input = "seed,rate,util,delay_data,delay_voice\n1,0.5,0.1,3,5\n2,0.5,0.1,5,7\n";
        let points = Aggregator::new(ColumnSelection::new(1, 3, 4))
            .replicates(2)
            .options(ReaderOptions {
                delimiter: b',',
                has_header: true,
            })
            .aggregate(input.as_bytes())
            .unwrap();
        assert_eq!(triples(&points), vec![(0.5, 4.0, 6.0)]);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let points = run(" 1, 10.5 ,20 \n", 1).unwrap();
        assert_eq!(triples(&points), vec![(1.0, 10.5, 20.0)]);
    }

    #[test]
    fn semicolon_delimiter() {
        let points = Aggregator::new(ColumnSelection::default())
            .replicates(1)
            .options(ReaderOptions {
                delimiter: b';',
                has_header: false,
            })
            .aggregate("2;4;6\n".as_bytes())
            .unwrap();
        assert_eq!(triples(&points), vec![(2.0, 4.0, 6.0)]);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let input = "3,1,2\n1,3,4\n3,5,6\n";
        assert_eq!(run(input, 2).unwrap(), run(input, 2).unwrap());
    }

    #[test]
    fn display_matches_progress_line() {
        let point = AveragedPoint { x: 1.0, mean1: 20.0, mean2: 30.5 };
        assert_eq!(point.to_string(), "1, 20.000000, 30.500000");
        let point = AveragedPoint { x: 0.25, mean1: 0.1, mean2: 0.0 };
        assert_eq!(point.to_string(), "0.25, 0.100000, 0.000000");
    }

    #[test]
    fn series_from_points_stays_aligned() {
        let points = run("1,10,20\n2,5,50\n", 1).unwrap();
        let series: AveragedSeries = points.into_iter().collect();
        assert_eq!(series.xs, vec![1.0, 2.0]);
        assert_eq!(series.y1s, vec![10.0, 5.0]);
        assert_eq!(series.y2s, vec![20.0, 50.0]);
        assert_eq!(series.x_extent(), Some((1.0, 2.0)));
        assert_eq!(series.y_extent(), Some((5.0, 50.0)));
    }

    #[test]
    fn missing_file_is_input_not_found() {
        let err = Aggregator::new(ColumnSelection::default())
            .aggregate_path(Path::new("definitely/not/here.csv"))
            .unwrap_err();
        assert!(matches!(err, AggregateError::InputNotFound { .. }));
    }
}
