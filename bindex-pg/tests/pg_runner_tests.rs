//! Runs against a live PostgreSQL.
//!
//! Enabled with `--features db-tests`; the server is taken from
//! `BINDEX_TEST_DATABASE_URL`. Every query is self-contained so no schema
//! setup is needed.

#![cfg(feature = "db-tests")]

use bindex_core::{ExportError, ParameterTuple, QueryRunner, ResultRow};
use bindex_pg::{ConnectionSpec, PgQueryRunner};
use std::time::Duration;

fn runner(query: &str) -> PgQueryRunner {
    let url = std::env::var("BINDEX_TEST_DATABASE_URL")
        .expect("BINDEX_TEST_DATABASE_URL must be set for db-tests");
    PgQueryRunner::new(ConnectionSpec::new(url, Duration::from_secs(10)), query).expect("runner")
}

fn row(values: &[&str]) -> ResultRow {
    ResultRow::from(values.to_vec())
}

#[tokio::test]
async fn test_binds_text_parameters_positionally() {
    let runner = runner("SELECT $1::text AS a, $2::int + 1 AS b");
    let rows = runner
        .execute(&ParameterTuple::from(vec!["hello", "41"]))
        .await
        .expect("query");
    assert_eq!(rows, vec![row(&["hello", "42"])]);
}

#[tokio::test]
async fn test_trims_values_and_renders_null_as_empty() {
    let runner = runner(
        "SELECT v, w FROM (VALUES ('  padded  '::text, NULL::int), ('   ', 7)) AS t(v, w) ORDER BY w NULLS FIRST",
    );
    let rows = runner.execute(&ParameterTuple::default()).await.expect("query");
    assert_eq!(rows, vec![row(&["padded", ""]), row(&["", "7"])]);
}

#[tokio::test]
async fn test_renders_common_types() {
    let runner = runner(
        "SELECT 12.50::numeric, true, DATE '2024-01-02', TIMESTAMP '2024-01-02 03:04:05', \
         '\\x0a0b'::bytea, '00000000-0000-0000-0000-000000000001'::uuid",
    );
    let rows = runner.execute(&ParameterTuple::default()).await.expect("query");
    assert_eq!(
        rows,
        vec![row(&[
            "12.50",
            "t",
            "2024-01-02",
            "2024-01-02 03:04:05",
            "\\x0a0b",
            "00000000-0000-0000-0000-000000000001",
        ])]
    );
}

#[tokio::test]
async fn test_parameter_count_mismatch_is_bind_error() {
    let runner = runner("SELECT $1::text, $2::text");
    let err = runner
        .execute(&ParameterTuple::from(vec!["only"]))
        .await
        .unwrap_err();
    assert!(matches!(err, ExportError::Bind { expected: 2, got: 1, .. }));
}

#[tokio::test]
async fn test_server_error_is_query_error() {
    let runner = runner("SELECT * FROM bindex_table_that_does_not_exist");
    let err = runner.execute(&ParameterTuple::default()).await.unwrap_err();
    match err {
        ExportError::Query { reason, .. } => assert!(reason.contains("42P01"), "{reason}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_statement_timeout_cancels_long_query() {
    let url = std::env::var("BINDEX_TEST_DATABASE_URL").expect("BINDEX_TEST_DATABASE_URL");
    let runner = PgQueryRunner::new(ConnectionSpec::new(url, Duration::from_secs(1)), "SELECT pg_sleep(5)")
        .expect("runner");
    let err = runner.execute(&ParameterTuple::default()).await.unwrap_err();
    match err {
        ExportError::Query { reason, .. } => assert!(reason.contains("57014"), "{reason}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_read_only_transaction_rejects_writes() {
    let runner = runner("CREATE TABLE bindex_should_fail (x int)");
    let err = runner.execute(&ParameterTuple::default()).await.unwrap_err();
    assert!(matches!(err, ExportError::Query { .. }));
}

#[tokio::test]
async fn test_zero_column_rows_are_returned() {
    let runner = runner("SELECT FROM generate_series(1, 2)");
    let rows = runner.execute(&ParameterTuple::default()).await.expect("query");
    assert_eq!(rows, vec![ResultRow::default(), ResultRow::default()]);
}

#[tokio::test]
async fn test_timestamptz_is_rendered_in_utc() {
    let runner = runner("SELECT TIMESTAMPTZ '2024-01-02 12:00:00+09'");
    let rows = runner.execute(&ParameterTuple::default()).await.expect("query");
    assert_eq!(rows, vec![row(&["2024-01-02 03:00:00+00"])]);
}
