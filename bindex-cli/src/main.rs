//! bindex entry point.
//!
//! Loads the job configuration, reads the parameter file, and exports one
//! query result per parameter tuple into the rotating output files.

mod args;
mod error;
mod shutdown;
mod telemetry;

use bindex_core::{ExportConfig, ExportOrchestrator, ParamSource, RunCounters, TokioPause};
use bindex_pg::PgQueryRunner;
use error::CliError;
use std::process::ExitCode;
use std::time::Instant;
use telemetry::{init_logging, LogFormat};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = init_logging(LogFormat::from_env()) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let started = Instant::now();
    match shutdown::run_until_interrupted(run(), tokio::signal::ctrl_c()).await {
        Ok(counters) => {
            tracing::info!(
                tuples = counters.tuples_processed,
                rows_selected = counters.rows_selected,
                rows_written = counters.rows_written,
                elapsed_secs = started.elapsed().as_secs_f64(),
                "Export finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            let tuple = e.params().map(ToString::to_string).unwrap_or_default();
            tracing::error!(kind = ?e.kind(), tuple = %tuple, error = %e, "Export failed");
            ExitCode::from(e.exit_status())
        }
    }
}

async fn run() -> Result<RunCounters, CliError> {
    let config_path = args::config_path()?;
    let config = ExportConfig::load(&config_path)?;
    tracing::info!(config = %config_path.display(), "Loaded configuration");

    let runner = PgQueryRunner::from_config(&config.source)?;

    let tuples = ParamSource::load(&config.params.file, config.params.base_dir.as_deref())?;
    tracing::info!(count = tuples.len(), "Loaded parameter tuples");

    let export = ExportOrchestrator::from_config(&config, runner, TokioPause);
    let counters = export.run(&tuples, &config.output.file).await?;
    Ok(counters)
}
