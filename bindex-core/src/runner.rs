//! Seams between the run loop and the outside world: the relational source
//! and the inter-tuple pause.

use crate::error::ExportResult;
use crate::types::{ParameterTuple, ResultRow};
use async_trait::async_trait;
use std::time::Duration;

/// Executes the configured query for one parameter tuple.
///
/// Implementations open a connection, bind `params` positionally, read the
/// whole result set, and close the connection before returning, on success
/// and on failure alike.
#[async_trait]
pub trait QueryRunner: Send + Sync {
    async fn execute(&self, params: &ParameterTuple) -> ExportResult<Vec<ResultRow>>;
}

/// Waits between parameter tuples.
#[async_trait]
pub trait Pause: Send + Sync {
    /// Wait for `duration`, or report that the wait was cut short.
    async fn pause(&self, duration: Duration) -> Result<(), PauseInterrupted>;
}

/// Returned by a [`Pause`] that was cut short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseInterrupted;

/// Sleeps on the tokio timer. Ctrl-C during the sleep interrupts it.
///
/// Listening for Ctrl-C replaces the SIGINT default for the whole process,
/// so callers must also watch for it outside the pause.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPause;

#[async_trait]
impl Pause for TokioPause {
    async fn pause(&self, duration: Duration) -> Result<(), PauseInterrupted> {
        let mut sleep = std::pin::pin!(tokio::time::sleep(duration));
        tokio::select! {
            _ = &mut sleep => Ok(()),
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => Err(PauseInterrupted),
                Err(e) => {
                    tracing::warn!(error = %e, "Ctrl-C handler unavailable, sleeping uninterruptibly");
                    sleep.await;
                    Ok(())
                }
            },
        }
    }
}
