mod helpers;

use helpers::{names, TestProject};
use tome::error::TomeError;
use tome::session::{SearchRecord, SessionTracker, SqliteStore};

fn open(project: &TestProject) -> SessionTracker<SqliteStore> {
    SessionTracker::new(SqliteStore::open(project.config.session_db_path()).unwrap())
}

fn search(tracker: &mut SessionTracker<SqliteStore>, id: &str, considered: &[&str]) -> String {
    tracker
        .record_search(SearchRecord {
            tracking_id: Some(id.into()),
            agent_name: Some("test-writer".into()),
            tags: names(&["testing"]),
            categories: names(&["testing"]),
            considered: names(considered),
            ..Default::default()
        })
        .unwrap()
}

#[test]
fn read_then_usage_computes_skipped_and_precision() {
    let project = TestProject::new();
    let mut tracker = open(&project);
    search(&mut tracker, "agent-1", &["a", "b", "c"]);

    tracker.record_read("agent-1", names(&["a"])).unwrap();
    tracker.record_usage("agent-1", names(&["a"]), vec![]).unwrap();

    let record = open(&project).record("agent-1").unwrap().unwrap();
    assert_eq!(record.read, names(&["a"]));
    assert_eq!(record.skipped, names(&["b", "c"]));
    assert_eq!(record.usage.unwrap().precision, 1.0);
}

#[test]
fn partial_usage_rounds_precision() {
    let project = TestProject::new();
    let mut tracker = open(&project);
    search(&mut tracker, "agent-2", &["a", "b", "c"]);

    tracker.record_read("agent-2", names(&["a", "b", "c"])).unwrap();
    tracker
        .record_usage("agent-2", names(&["a"]), names(&["b", "c"]))
        .unwrap();

    let record = tracker.record("agent-2").unwrap().unwrap();
    assert_eq!(record.usage.unwrap().precision, 0.33);
}

#[test]
fn updates_for_unknown_tracking_id_fail() {
    let project = TestProject::new();
    let mut tracker = open(&project);

    let err = tracker.record_read("nobody", names(&["a"])).unwrap_err();
    assert!(matches!(err, TomeError::TrackingRecordNotFound(id) if id == "nobody"));

    let err = tracker.record_usage("nobody", names(&["a"]), vec![]).unwrap_err();
    assert!(matches!(err, TomeError::TrackingRecordNotFound(_)));

    assert!(tracker.records().unwrap().is_empty());
}

#[test]
fn generated_tracking_ids_are_unique() {
    let project = TestProject::new();
    let mut tracker = open(&project);

    let first = tracker.record_search(SearchRecord::default()).unwrap();
    let second = tracker.record_search(SearchRecord::default()).unwrap();
    assert_ne!(first, second);
    assert_eq!(tracker.records().unwrap().len(), 2);
}

#[test]
fn selection_is_kept_with_reasoning() {
    let project = TestProject::new();
    let mut tracker = open(&project);
    search(&mut tracker, "agent-3", &["a", "b"]);

    tracker
        .record_selection(
            "agent-3",
            names(&["a"]),
            names(&["b"]),
            Some("b covers a different framework".into()),
        )
        .unwrap();

    let selection = tracker.record("agent-3").unwrap().unwrap().selection.unwrap();
    assert_eq!(selection.selected, names(&["a"]));
    assert_eq!(selection.skipped, names(&["b"]));
    assert_eq!(selection.reasoning.as_deref(), Some("b covers a different framework"));
}

#[test]
fn summary_aggregates_across_records() {
    let project = TestProject::new();
    let mut tracker = open(&project);

    search(&mut tracker, "one", &["a", "b"]);
    tracker.record_read("one", names(&["a", "b"])).unwrap();
    tracker.record_usage("one", names(&["a", "b"]), vec![]).unwrap();

    search(&mut tracker, "two", &["a", "c"]);
    tracker.record_read("two", names(&["a"])).unwrap();
    tracker.record_usage("two", vec![], names(&["a"])).unwrap();

    search(&mut tracker, "three", &["c"]);

    let summary = tracker.summary().unwrap();
    assert_eq!(summary.records, 3);
    assert_eq!(summary.with_reads, 2);
    assert_eq!(summary.with_usage, 2);
    assert_eq!(summary.mean_precision, Some(0.5));
    assert_eq!(summary.most_read[0].name, "a");
    assert_eq!(summary.most_read[0].count, 2);
}
