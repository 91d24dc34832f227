//! The export run loop.
//!
//! For each parameter tuple, in order: query, write, then pause unless it
//! was the last tuple. The first failure ends the run; files already
//! written stay where they are.

use crate::config::ExportConfig;
use crate::error::{ExportError, ExportResult};
use crate::naming::prepare_run_base;
use crate::runner::{Pause, QueryRunner};
use crate::types::{OutputTarget, ParameterTuple, RunCounters};
use crate::writer::RecordWriter;
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use std::path::Path;
use std::time::{Duration, Instant};

pub struct ExportOrchestrator<R, P> {
    runner: R,
    writer: RecordWriter,
    pause: P,
    sleep: Duration,
}

impl<R, P> ExportOrchestrator<R, P>
where
    R: QueryRunner,
    P: Pause,
{
    pub fn new(runner: R, writer: RecordWriter, pause: P, sleep: Duration) -> Self {
        Self {
            runner,
            writer,
            pause,
            sleep,
        }
    }

    pub fn from_config(config: &ExportConfig, runner: R, pause: P) -> Self {
        Self::new(
            runner,
            RecordWriter::from_config(&config.output),
            pause,
            config.throttle.sleep(),
        )
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn pause(&self) -> &P {
        &self.pause
    }

    /// Run every tuple into a fresh run directory stamped with the current
    /// local time.
    pub async fn run(
        &self,
        tuples: &[ParameterTuple],
        output_base: &Path,
    ) -> ExportResult<RunCounters> {
        let target = self.prepare(output_base, &Local::now())?;
        self.run_into(tuples, target).await
    }

    /// Create the run directory for a run started at `started`.
    pub fn prepare<Tz>(&self, output_base: &Path, started: &DateTime<Tz>) -> ExportResult<OutputTarget>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let base = prepare_run_base(output_base, started).inspect_err(|e| {
            tracing::error!(error = %e, "Error occurred creating save path");
        })?;
        tracing::info!(
            path = %base.display(),
            max_rows_per_file = self.writer.max_rows_per_file(),
            "Prepared output location"
        );
        Ok(OutputTarget::new(base))
    }

    /// Run every tuple into an already prepared target.
    pub async fn run_into(
        &self,
        tuples: &[ParameterTuple],
        mut target: OutputTarget,
    ) -> ExportResult<RunCounters> {
        let total = tuples.len();
        let mut counters = RunCounters::default();

        for (index, params) in tuples.iter().enumerate() {
            tracing::info!(tuple = %params, position = index + 1, total, "Checking target parameter");

            let started = Instant::now();
            tracing::info!("Selecting data of database");
            let rows = self.runner.execute(params).await.inspect_err(|e| {
                tracing::error!(tuple = %params, error = %e, "Error occurred during select of database");
            })?;
            let selected = rows.len();
            counters.rows_selected += selected;
            tracing::info!(
                rows = selected,
                elapsed_secs = elapsed_secs(started),
                "Completed selection data"
            );

            let started = Instant::now();
            tracing::info!("Writing data of database");
            let progress = self
                .writer
                .write(target.base(), rows, target.running_count)
                .inspect_err(|e| {
                    tracing::error!(tuple = %params, error = %e, "Error occurred writing file");
                })?;
            target.running_count = progress.running_count;
            counters.rows_written += progress.rows_written;
            counters.tuples_processed += 1;
            tracing::info!(
                rows = progress.rows_written,
                running_count = progress.running_count,
                elapsed_secs = elapsed_secs(started),
                "Completed write data of database"
            );

            if index + 1 < total {
                tracing::info!(sleep_secs = self.sleep.as_secs(), "Sleep for next selection");
                self.pause.pause(self.sleep).await.map_err(|_| {
                    let err = ExportError::SleepInterrupted {
                        completed: index + 1,
                        total,
                    };
                    tracing::error!(error = %err, "Error occurred during sleep");
                    err
                })?;
            }
        }

        tracing::info!(
            tuples = counters.tuples_processed,
            rows_selected = counters.rows_selected,
            rows_written = counters.rows_written,
            "Completed all processing"
        );
        Ok(counters)
    }
}

fn elapsed_secs(started: Instant) -> f64 {
    started.elapsed().as_secs_f64()
}
