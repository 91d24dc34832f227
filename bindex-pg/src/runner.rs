//! PostgreSQL implementation of [`QueryRunner`].
//!
//! Each call opens its own connection, runs the query inside a read-only
//! transaction, materializes every row as text and closes the connection
//! again before returning.

use crate::bind::text_params;
use crate::cell::CellText;
use crate::connection::{describe_target, ConnectionSpec, Driver};
use async_trait::async_trait;
use bindex_core::{ExportError, ExportResult, ParameterTuple, QueryRunner, ResultRow, SourceConfig};
use postgres_types::ToSql;
use std::time::Instant;
use tokio::task::JoinError;
use tokio_postgres::{Client, NoTls, Row};

pub struct PgQueryRunner {
    spec: ConnectionSpec,
    pg_config: tokio_postgres::Config,
    target: String,
    query: String,
}

impl std::fmt::Debug for PgQueryRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgQueryRunner")
            .field("target", &self.target)
            .field("spec", &self.spec)
            .field("query", &self.query)
            .finish()
    }
}

impl PgQueryRunner {
    /// Fails with a config error when the connection URL does not parse.
    pub fn new(spec: ConnectionSpec, query: impl Into<String>) -> ExportResult<Self> {
        let pg_config = spec.pg_config()?;
        let target = describe_target(&pg_config);
        Ok(Self {
            spec,
            pg_config,
            target,
            query: query.into(),
        })
    }

    /// Resolve the driver and build a runner from the `[source]` section.
    pub fn from_config(source: &SourceConfig) -> ExportResult<Self> {
        let driver = Driver::resolve(&source.driver)?;
        tracing::debug!(?driver, "Resolved database driver");
        Self::new(ConnectionSpec::from_config(source), source.query.clone())
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Everything between connect and close.
    async fn select(&self, client: &mut Client, params: &ParameterTuple) -> ExportResult<Vec<ResultRow>> {
        let query_err = |e: tokio_postgres::Error| ExportError::Query {
            params: params.clone(),
            reason: describe(&e),
        };

        let transaction = client
            .build_transaction()
            .read_only(true)
            .start()
            .await
            .map_err(query_err)?;

        // Timestamps with time zone are rendered in UTC.
        let timeout_ms = self.spec.statement_timeout().as_millis();
        transaction
            .batch_execute(&format!(
                "SET LOCAL statement_timeout = {}; SET LOCAL TimeZone = 'UTC'",
                timeout_ms
            ))
            .await
            .map_err(query_err)?;

        let statement = transaction.prepare(&self.query).await.map_err(query_err)?;
        let expected = statement.params().len();
        if expected != params.len() {
            return Err(ExportError::Bind {
                params: params.clone(),
                expected,
                got: params.len(),
            });
        }

        let bound = text_params(params.values());
        let refs: Vec<&(dyn ToSql + Sync)> = bound.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        let rows = transaction.query(&statement, &refs).await.map_err(query_err)?;

        let selected = rows
            .iter()
            .map(|row| read_row(row, params))
            .collect::<ExportResult<Vec<_>>>()?;

        transaction.rollback().await.map_err(|e| ExportError::Close {
            params: params.clone(),
            reason: describe(&e),
        })?;
        Ok(selected)
    }
}

#[async_trait]
impl QueryRunner for PgQueryRunner {
    async fn execute(&self, params: &ParameterTuple) -> ExportResult<Vec<ResultRow>> {
        let started = Instant::now();
        tracing::info!(target_db = %self.target, "Creating connection of database");

        let (mut client, connection) = self.pg_config.connect(NoTls).await.map_err(|e| {
            ExportError::Connection {
                params: params.clone(),
                reason: describe(&e),
            }
        })?;
        let driver = tokio::spawn(connection);
        tracing::info!(
            elapsed_secs = started.elapsed().as_secs_f64(),
            "Completed creating connection of database"
        );

        let outcome = self.select(&mut client, params).await;

        drop(client);
        let closed = close_outcome(driver.await);

        settle(outcome, closed, params)
    }
}

/// Combine the select outcome with the close outcome. A select error always
/// wins; a close failure after a successful select is itself fatal.
fn settle(
    outcome: ExportResult<Vec<ResultRow>>,
    closed: Result<(), String>,
    params: &ParameterTuple,
) -> ExportResult<Vec<ResultRow>> {
    match (outcome, closed) {
        (Ok(rows), Ok(())) => {
            tracing::debug!(rows = rows.len(), "Closed database connection");
            Ok(rows)
        }
        (Ok(_), Err(reason)) => {
            tracing::error!(tuple = %params, error = %reason, "Error occurred during close of database connection");
            Err(ExportError::Close {
                params: params.clone(),
                reason,
            })
        }
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(reason)) => {
            tracing::error!(tuple = %params, error = %reason, "Error occurred during close of database connection");
            Err(e)
        }
    }
}

/// Read every column by name. NULL and whitespace-only values come out as
/// empty strings; everything else is trimmed.
fn read_row(row: &Row, params: &ParameterTuple) -> ExportResult<ResultRow> {
    let mut values = Vec::with_capacity(row.len());
    for column in row.columns() {
        let cell: Option<CellText> = row.try_get(column.name()).map_err(|e| ExportError::Query {
            params: params.clone(),
            reason: format!("column {} ({}): {}", column.name(), column.type_().name(), e),
        })?;
        values.push(cell.map(CellText::into_string));
    }
    Ok(ResultRow::from_columns(values))
}

fn close_outcome(joined: Result<Result<(), tokio_postgres::Error>, JoinError>) -> Result<(), String> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(describe(&e)),
        Err(e) => Err(e.to_string()),
    }
}

/// Server errors carry their SQLSTATE and message; everything else uses the
/// driver's own description.
fn describe(e: &tokio_postgres::Error) -> String {
    match e.as_db_error() {
        Some(db) => format!("{} ({})", db.message(), db.code().code()),
        None => e.to_string(),
    }
}
