mod helpers;

use tome::db;
use tome::db::schema::{get_schema_version, SCHEMA_VERSION};

#[test]
fn fresh_db_records_schema_version() {
    let conn = helpers::test_db();
    assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
}

#[test]
fn reopening_keeps_existing_state() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("session.db");

    {
        let conn = db::open_database(&path).unwrap();
        conn.execute(
            "INSERT INTO loaded_packages (name, loaded_at) VALUES ('a', '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
    }

    let conn = db::open_database(&path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM loaded_packages", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
}

#[test]
fn open_database_creates_parent_directories() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("nested/state/session.db");

    let conn = db::open_database(&path).unwrap();
    assert!(path.exists());

    let mode: String = conn
        .query_row("PRAGMA journal_mode", [], |r| r.get(0))
        .unwrap();
    assert_eq!(mode, "wal");
}

#[test]
fn tracking_event_kind_is_constrained() {
    let conn = helpers::test_db();
    let err = conn.execute(
        "INSERT INTO tracking_events (tracking_id, kind, payload, created_at)
         VALUES ('t', 'bogus', '{}', '2026-01-01T00:00:00Z')",
        [],
    );
    assert!(err.is_err());
}
