pub mod schema;

use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// How long a writer waits on another process's lock before giving up.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (or create) the session database at the given path with the schema initialized.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(path)?;

    // Set before anything that takes a lock so racing first opens wait instead of failing
    conn.busy_timeout(BUSY_TIMEOUT)?;
    // WAL lets concurrent agent processes read while one writes
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    schema::init_schema(&conn)?;

    tracing::debug!(path = %path.display(), "session database opened");
    Ok(conn)
}

/// Open an in-memory database with the full schema, for tests.
pub fn open_memory_database() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    schema::init_schema(&conn)?;
    Ok(conn)
}
