//! bindex Test Utilities
//!
//! Shared test infrastructure for the bindex workspace:
//! - Proptest generators for parameter tuples and result rows
//! - A scripted query runner and a recording pause
//! - Fixtures for parameter files and output directories

pub use bindex_core::{
    ExportError, ExportResult, ParameterTuple, Pause, PauseInterrupted, QueryRunner, ResultRow,
};

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// MOCK QUERY RUNNER
// ============================================================================

/// One scripted answer of [`MockQueryRunner`].
#[derive(Debug, Clone)]
pub enum Scripted {
    Rows(Vec<ResultRow>),
    QueryFailure(String),
    BindFailure { expected: usize },
}

/// Answers each `execute` call with the next scripted response, and records
/// the parameters it was called with.
#[derive(Debug, Default)]
pub struct MockQueryRunner {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<ParameterTuple>>,
}

impl MockQueryRunner {
    pub fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call returns rows; one batch per call, in order.
    pub fn with_batches(batches: impl IntoIterator<Item = Vec<ResultRow>>) -> Self {
        Self::new(batches.into_iter().map(Scripted::Rows))
    }

    pub fn calls(&self) -> Vec<ParameterTuple> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }
}

#[async_trait]
impl QueryRunner for MockQueryRunner {
    async fn execute(&self, params: &ParameterTuple) -> ExportResult<Vec<ResultRow>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(params.clone());
        }
        let next = self
            .script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front());

        match next {
            Some(Scripted::Rows(rows)) => Ok(rows),
            Some(Scripted::QueryFailure(reason)) => Err(ExportError::Query {
                params: params.clone(),
                reason,
            }),
            Some(Scripted::BindFailure { expected }) => Err(ExportError::Bind {
                params: params.clone(),
                expected,
                got: params.len(),
            }),
            None => Err(ExportError::Query {
                params: params.clone(),
                reason: "mock script exhausted".to_string(),
            }),
        }
    }
}

// ============================================================================
// RECORDING PAUSE
// ============================================================================

/// Records requested pauses without waiting. Optionally reports an
/// interruption on the n-th call (1-based).
#[derive(Debug, Default)]
pub struct RecordingPause {
    requested: Mutex<Vec<Duration>>,
    interrupt_on: Option<usize>,
}

impl RecordingPause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupting_on(call: usize) -> Self {
        Self {
            requested: Mutex::new(Vec::new()),
            interrupt_on: Some(call),
        }
    }

    pub fn requested(&self) -> Vec<Duration> {
        self.requested
            .lock()
            .map(|requested| requested.clone())
            .unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.requested.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Pause for RecordingPause {
    async fn pause(&self, duration: Duration) -> Result<(), PauseInterrupted> {
        let call = match self.requested.lock() {
            Ok(mut requested) => {
                requested.push(duration);
                requested.len()
            }
            Err(_) => return Err(PauseInterrupted),
        };
        if self.interrupt_on == Some(call) {
            return Err(PauseInterrupted);
        }
        Ok(())
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    use super::*;
    use tempfile::TempDir;

    /// Shorthand for building rows in tests.
    pub fn row(values: &[&str]) -> ResultRow {
        ResultRow::from(values.to_vec())
    }

    pub fn rows(values: &[&[&str]]) -> Vec<ResultRow> {
        values.iter().map(|v| row(v)).collect()
    }

    pub fn tuple(values: &[&str]) -> ParameterTuple {
        ParameterTuple::from(values.to_vec())
    }

    pub fn temp_dir() -> TempDir {
        TempDir::new().expect("TempDir creation should succeed")
    }

    /// Write `lines` joined by `\n` (with a trailing newline) to `dir/name`.
    pub fn write_param_file(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut contents = lines.join("\n");
        contents.push('\n');
        std::fs::write(&path, contents).expect("parameter file write should succeed");
        path
    }

    /// Raw file contents; panics when the file is missing.
    pub fn read_output(path: &Path) -> String {
        std::fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("expected output file {}: {}", path.display(), e))
    }

    /// Sorted file names inside `dir`.
    pub fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .expect("directory should be readable")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use super::*;
    use proptest::prelude::*;

    /// A single parameter value: no tabs or line breaks.
    pub fn arb_param_value() -> impl Strategy<Value = String> {
        "[A-Za-z0-9 _.:-]{0,12}"
    }

    /// A parameter line's tuple. Never a single empty value, which would
    /// serialize to a blank line and read back as the empty tuple.
    pub fn arb_parameter_tuple() -> impl Strategy<Value = ParameterTuple> {
        prop_oneof![
            Just(ParameterTuple::default()),
            prop::collection::vec(arb_param_value(), 1..5)
                .prop_filter("single empty value is a blank line", |values| {
                    !(values.len() == 1 && values[0].is_empty())
                })
                .prop_map(ParameterTuple::new),
        ]
    }

    /// A cell value as it comes back from the source: already trimmed,
    /// non-empty, no delimiter (`|`) and no line breaks.
    pub fn arb_cell() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_.,:-]{1,10}"
    }

    /// Non-empty rows of a fixed width.
    pub fn arb_result_rows(width: usize, max_rows: usize) -> impl Strategy<Value = Vec<ResultRow>> {
        prop::collection::vec(
            prop::collection::vec(arb_cell(), width).prop_map(ResultRow::new),
            0..=max_rows,
        )
    }

    /// Row counts per parameter tuple for a whole run.
    pub fn arb_batch_sizes() -> impl Strategy<Value = Vec<usize>> {
        prop::collection::vec(0usize..8, 1..6)
    }
}
