//! Delimited output with row-count rotation.
//!
//! The writer keeps no state of its own between calls: the caller threads
//! the running row count through, and the current file is rediscovered
//! from the file system on every row.
//!
//! Per row:
//! 1. At `max_rows_per_file` rows, rotate to the next missing suffix and
//!    reset the count.
//! 2. Otherwise target the current file.
//! 3. The first row of a file truncates it; later rows append.
//! 4. A newline follows every row except the one that fills the file.

use crate::config::OutputConfig;
use crate::error::{ExportError, ExportResult};
use crate::naming::{current_file, next_file};
use crate::types::ResultRow;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Outcome of writing one batch of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteProgress {
    /// Rows in the current file after the batch.
    pub running_count: usize,
    /// Rows actually written (empty rows are skipped).
    pub rows_written: usize,
}

#[derive(Debug, Clone)]
pub struct RecordWriter {
    delimiter: String,
    max_rows_per_file: usize,
    suffix_width: usize,
}

impl RecordWriter {
    pub fn new(delimiter: impl Into<String>, max_rows_per_file: usize, suffix_width: usize) -> Self {
        Self {
            delimiter: delimiter.into(),
            max_rows_per_file,
            suffix_width,
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(
            config.delimiter.clone(),
            config.max_rows_per_file,
            config.suffix_width,
        )
    }

    pub fn max_rows_per_file(&self) -> usize {
        self.max_rows_per_file
    }

    /// Drain `rows` into the files rooted at `base`, starting from
    /// `running_count` rows already in the current file.
    pub fn write(
        &self,
        base: &Path,
        rows: Vec<ResultRow>,
        running_count: usize,
    ) -> ExportResult<WriteProgress> {
        let mut count = running_count;
        let mut written = 0;

        for row in rows {
            if row.is_empty() {
                continue;
            }

            let target = if count >= self.max_rows_per_file {
                count = 0;
                next_file(base, self.suffix_width)
            } else {
                current_file(base, self.suffix_width)
            };

            let mut line = row.join(&self.delimiter);
            count += 1;
            if count < self.max_rows_per_file {
                line.push('\n');
            }
            write_line(&target, &line, count == 1)?;
            written += 1;
        }

        Ok(WriteProgress {
            running_count: count,
            rows_written: written,
        })
    }
}

fn write_line(path: &Path, line: &str, truncate: bool) -> ExportResult<()> {
    let mut options = OpenOptions::new();
    if truncate {
        options.write(true).create(true).truncate(true);
    } else {
        options.append(true);
    }

    let mut file = options
        .open(path)
        .map_err(|e| ExportError::write(path, e))?;
    file.write_all(line.as_bytes())
        .map_err(|e| ExportError::write(path, e))
}
