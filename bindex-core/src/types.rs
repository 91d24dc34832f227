//! Data types passed between the export stages.

use std::fmt;
use std::path::{Path, PathBuf};

/// One ordered set of bind values, read from one line of the parameter file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterTuple(Vec<String>);

impl ParameterTuple {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ParameterTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

impl From<Vec<&str>> for ParameterTuple {
    fn from(values: Vec<&str>) -> Self {
        Self(values.into_iter().map(str::to_string).collect())
    }
}

/// One selected row, values in column order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultRow(Vec<String>);

impl ResultRow {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    /// Build a row from raw column values, trimming every non-empty value.
    /// `None` (SQL NULL) becomes the empty string.
    pub fn from_columns<I>(columns: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let values = columns
            .into_iter()
            .map(|value| match value {
                Some(v) if !v.is_empty() => v.trim().to_string(),
                _ => String::new(),
            })
            .collect();
        Self(values)
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render the row as one output line (without the line separator).
    pub fn join(&self, delimiter: &str) -> String {
        self.0.join(delimiter)
    }
}

impl From<Vec<&str>> for ResultRow {
    fn from(values: Vec<&str>) -> Self {
        Self(values.into_iter().map(str::to_string).collect())
    }
}

/// Where a run writes, and how many rows the current file already holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    /// Base file path inside the run directory; rotated files derive from it.
    base: PathBuf,
    /// Rows written to the current file since the last rotation.
    pub running_count: usize,
}

impl OutputTarget {
    /// A fresh target. Counting always starts at zero for a run, even if
    /// files already exist under `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            running_count: 0,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

/// Totals reported at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunCounters {
    /// Parameter tuples whose query and write both completed.
    pub tuples_processed: usize,
    /// Rows returned by the source across all tuples.
    pub rows_selected: usize,
    /// Rows written to output files.
    pub rows_written: usize,
}
