//! End-to-end runs of the export loop against a scripted source.

use bindex_core::{ErrorKind, ExportError, ExportOrchestrator, RecordWriter, RunCounters};
use bindex_test_utils::fixtures::*;
use bindex_test_utils::{MockQueryRunner, RecordingPause, Scripted};
use chrono::{TimeZone, Utc};
use std::path::PathBuf;
use std::time::Duration;

const SLEEP: Duration = Duration::from_secs(3);

fn orchestrator(
    runner: MockQueryRunner,
    pause: RecordingPause,
    max_rows: usize,
) -> ExportOrchestrator<MockQueryRunner, RecordingPause> {
    ExportOrchestrator::new(runner, RecordWriter::new("|", max_rows, 3), pause, SLEEP)
}

fn run_dir(root: &std::path::Path) -> PathBuf {
    root.join("20240102030405")
}

fn started() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
        .single()
        .expect("valid timestamp")
}

#[tokio::test]
async fn test_two_tuples_span_rotation_boundary() {
    let dir = temp_dir();
    let runner = MockQueryRunner::with_batches(vec![
        rows(&[&["1", "a"], &["2", "b"], &["3", "c"]]),
        rows(&[&["4", "d"]]),
    ]);
    let export = orchestrator(runner, RecordingPause::new(), 2);
    let tuples = vec![tuple(&["A", "B"]), tuple(&["C", "D"])];

    let target = export
        .prepare(&dir.path().join("export.txt"), &started())
        .expect("prepare");
    let counters = export.run_into(&tuples, target).await.expect("run");

    assert_eq!(
        counters,
        RunCounters {
            tuples_processed: 2,
            rows_selected: 4,
            rows_written: 4,
        }
    );

    let out = run_dir(dir.path());
    assert_eq!(file_names(&out), vec!["export.txt", "export_000.txt"]);
    assert_eq!(read_output(&out.join("export.txt")), "1|a\n2|b");
    assert_eq!(read_output(&out.join("export_000.txt")), "3|c\n4|d");

    assert_eq!(export.pause().requested(), vec![SLEEP]);
    assert_eq!(export.runner().calls(), tuples);
}

#[tokio::test]
async fn test_single_tuple_never_pauses() {
    let dir = temp_dir();
    let runner = MockQueryRunner::with_batches(vec![rows(&[&["x"]])]);
    let export = orchestrator(runner, RecordingPause::new(), 10);

    let target = export
        .prepare(&dir.path().join("one.txt"), &started())
        .expect("prepare");
    export
        .run_into(&[tuple(&["only"])], target)
        .await
        .expect("run");

    assert_eq!(export.pause().count(), 0);
    assert_eq!(read_output(&run_dir(dir.path()).join("one.txt")), "x\n");
}

#[tokio::test]
async fn test_pause_between_every_pair_of_tuples() {
    let dir = temp_dir();
    let runner = MockQueryRunner::with_batches(vec![Vec::new(), Vec::new(), Vec::new(), Vec::new()]);
    let export = orchestrator(runner, RecordingPause::new(), 10);
    let tuples = vec![tuple(&["1"]), tuple(&["2"]), tuple(&[]), tuple(&["4"])];

    let target = export
        .prepare(&dir.path().join("out.txt"), &started())
        .expect("prepare");
    let counters = export.run_into(&tuples, target).await.expect("run");

    assert_eq!(counters.tuples_processed, 4);
    assert_eq!(counters.rows_written, 0);
    assert_eq!(export.pause().count(), 3);
    // No rows, no files; the run directory itself still exists.
    assert!(file_names(&run_dir(dir.path())).is_empty());
}

#[tokio::test]
async fn test_no_tuples_is_an_empty_successful_run() {
    let dir = temp_dir();
    let export = orchestrator(MockQueryRunner::default(), RecordingPause::new(), 10);

    let target = export
        .prepare(&dir.path().join("out.txt"), &started())
        .expect("prepare");
    let counters = export.run_into(&[], target).await.expect("run");

    assert_eq!(counters, RunCounters::default());
    assert_eq!(export.runner().call_count(), 0);
    assert_eq!(export.pause().count(), 0);
}

#[tokio::test]
async fn test_second_query_failure_leaves_first_output_untouched() {
    let dir = temp_dir();
    let runner = MockQueryRunner::new(vec![
        Scripted::Rows(rows(&[&["1", "a"]])),
        Scripted::QueryFailure("relation \"t\" does not exist".to_string()),
        Scripted::Rows(rows(&[&["never"]])),
    ]);
    let export = orchestrator(runner, RecordingPause::new(), 2);
    let tuples = vec![tuple(&["A", "B"]), tuple(&["C", "D"]), tuple(&["E", "F"])];

    let target = export
        .prepare(&dir.path().join("export.txt"), &started())
        .expect("prepare");
    let err = export.run_into(&tuples, target).await.unwrap_err();

    match &err {
        ExportError::Query { params, reason } => {
            assert_eq!(params, &tuple(&["C", "D"]));
            assert!(reason.contains("does not exist"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::Source);

    let out = run_dir(dir.path());
    assert_eq!(file_names(&out), vec!["export.txt"]);
    assert_eq!(read_output(&out.join("export.txt")), "1|a\n");
    assert_eq!(export.runner().call_count(), 2);
    assert_eq!(export.pause().count(), 1);
}

#[tokio::test]
async fn test_bind_failure_aborts_before_any_write() {
    let dir = temp_dir();
    let runner = MockQueryRunner::new(vec![Scripted::BindFailure { expected: 2 }]);
    let export = orchestrator(runner, RecordingPause::new(), 2);

    let target = export
        .prepare(&dir.path().join("export.txt"), &started())
        .expect("prepare");
    let err = export
        .run_into(&[tuple(&["only-one"]), tuple(&["x", "y"])], target)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExportError::Bind {
            expected: 2,
            got: 1,
            ..
        }
    ));
    assert!(file_names(&run_dir(dir.path())).is_empty());
    assert_eq!(export.pause().count(), 0);
}

#[tokio::test]
async fn test_interrupted_pause_stops_the_run() {
    let dir = temp_dir();
    let runner = MockQueryRunner::with_batches(vec![rows(&[&["1"]]), rows(&[&["2"]]), rows(&[&["3"]])]);
    let export = orchestrator(runner, RecordingPause::interrupting_on(1), 10);

    let target = export
        .prepare(&dir.path().join("out.txt"), &started())
        .expect("prepare");
    let err = export
        .run_into(&[tuple(&["a"]), tuple(&["b"]), tuple(&["c"])], target)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExportError::SleepInterrupted {
            completed: 1,
            total: 3
        }
    ));
    assert_eq!(export.runner().call_count(), 1);
    assert_eq!(read_output(&run_dir(dir.path()).join("out.txt")), "1\n");
}

#[tokio::test]
async fn test_write_failure_is_fatal() {
    let dir = temp_dir();
    let runner = MockQueryRunner::with_batches(vec![rows(&[&["1"]]), rows(&[&["2"]])]);
    let export = orchestrator(runner, RecordingPause::new(), 10);

    let target = export
        .prepare(&dir.path().join("out.txt"), &started())
        .expect("prepare");
    // Occupy the output name with a directory so the first write fails.
    std::fs::create_dir(run_dir(dir.path()).join("out.txt")).expect("create_dir");

    let err = export
        .run_into(&[tuple(&["a"]), tuple(&["b"])], target)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Output);
    assert_eq!(export.runner().call_count(), 1);
    assert_eq!(export.pause().count(), 0);
}

#[tokio::test]
async fn test_run_creates_timestamped_directory() {
    let dir = temp_dir();
    let runner = MockQueryRunner::with_batches(vec![rows(&[&["v"]])]);
    let export = orchestrator(runner, RecordingPause::new(), 10);

    export
        .run(&[tuple(&["p"])], &dir.path().join("daily.txt"))
        .await
        .expect("run");

    let dirs = file_names(dir.path());
    assert_eq!(dirs.len(), 1);
    assert_eq!(dirs[0].len(), 14);
    assert!(dirs[0].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(read_output(&dir.path().join(&dirs[0]).join("daily.txt")), "v\n");
}

#[tokio::test]
async fn test_zero_column_rows_count_as_selected_but_are_not_written() {
    let dir = temp_dir();
    let runner = MockQueryRunner::with_batches(vec![vec![
        row(&["1", "a"]),
        bindex_core::ResultRow::default(),
        row(&["2", "b"]),
    ]]);
    let export = orchestrator(runner, RecordingPause::new(), 10);

    let target = export
        .prepare(&dir.path().join("export.txt"), &started())
        .expect("prepare");
    let counters = export.run_into(&[tuple(&["A"])], target).await.expect("run");

    assert_eq!(counters.rows_selected, 3);
    assert_eq!(counters.rows_written, 2);
    assert_eq!(read_output(&run_dir(dir.path()).join("export.txt")), "1|a\n2|b\n");
}
