//! SQL DDL for the session database.
//!
//! Defines `session_state` (a single row), `loaded_packages`, the append-only
//! `tracking_events` log, and `schema_meta`. All DDL uses `IF NOT EXISTS`.

use rusqlite::{Connection, Transaction, TransactionBehavior};

const SCHEMA_SQL: &str = r#"
-- Current session; at most one row
CREATE TABLE IF NOT EXISTS session_state (
    id INTEGER PRIMARY KEY CHECK(id = 1),
    session_id TEXT NOT NULL,
    started_at TEXT NOT NULL,
    categories_shown INTEGER NOT NULL DEFAULT 0
);

-- Packages already delivered this session
CREATE TABLE IF NOT EXISTS loaded_packages (
    name TEXT PRIMARY KEY,
    loaded_at TEXT NOT NULL
);

-- Tracking log; records are reduced from these rows at read time
CREATE TABLE IF NOT EXISTS tracking_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tracking_id TEXT NOT NULL,
    kind TEXT NOT NULL CHECK(kind IN ('search','selection','read','usage')),
    payload TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tracking_events_tracking_id ON tracking_events(tracking_id, id);
CREATE INDEX IF NOT EXISTS idx_tracking_events_kind ON tracking_events(kind);

CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Version recorded in `schema_meta` for databases created by this build.
pub const SCHEMA_VERSION: u32 = 1;

/// Create every table and index and record [`SCHEMA_VERSION`], in one write transaction.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION.to_string()],
    )?;
    tx.commit()
}

pub fn get_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT value FROM schema_meta WHERE key = 'schema_version'",
        [],
        |row| {
            let val: String = row.get(0)?;
            Ok(val.parse::<u32>().unwrap_or(0))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        for table in ["session_state", "loaded_packages", "tracking_events", "schema_meta"] {
            assert!(tables.contains(&table.to_string()), "missing {table}");
        }
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn tracking_events_are_indexed_by_id_and_kind() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let indexes: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='index' AND tbl_name='tracking_events'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(indexes.contains(&"idx_tracking_events_tracking_id".to_string()));
        assert!(indexes.contains(&"idx_tracking_events_kind".to_string()));
    }

    #[test]
    fn session_state_holds_one_row() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO session_state (id, session_id, started_at) VALUES (1, 's', 't')",
            [],
        )
        .unwrap();
        let second = conn.execute(
            "INSERT INTO session_state (id, session_id, started_at) VALUES (2, 's', 't')",
            [],
        );
        assert!(second.is_err());
    }
}
