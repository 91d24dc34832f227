//! Ctrl-C handling for the whole run.
//!
//! A Ctrl-C listener replaces the SIGINT default for the rest of the process,
//! so the binary listens for the entire run and stops it wherever it is.

use crate::error::CliError;
use std::future::Future;

/// Drive `run` to completion unless `interrupt` fires first.
///
/// `run` is polled first, so a Ctrl-C that lands during the pause surfaces
/// as the run's own `SleepInterrupted` rather than as [`CliError::Interrupted`].
/// If the listener itself fails, the run continues without it.
pub async fn run_until_interrupted<T, R, S>(run: R, interrupt: S) -> Result<T, CliError>
where
    R: Future<Output = Result<T, CliError>>,
    S: Future<Output = std::io::Result<()>>,
{
    let mut run = std::pin::pin!(run);
    tokio::select! {
        biased;
        result = &mut run => result,
        signal = interrupt => match signal {
            Ok(()) => {
                tracing::error!("Ctrl-C received, stopping the run");
                Err(CliError::Interrupted)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ctrl-C handler unavailable, running uninterruptibly");
                run.await
            }
        },
    }
}
