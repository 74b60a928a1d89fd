//! SQLite-backed [`SessionStore`].
//!
//! Every mutation runs in an `IMMEDIATE` transaction so concurrent processes serialize on
//! the write lock instead of overwriting each other.

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::collections::BTreeSet;
use std::path::Path;

use super::tracking::{StoredEvent, TrackingEvent};
use super::{new_session_id, now_rfc3339, SessionState, SessionStore};
use crate::error::{Result, TomeError};

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            conn: crate::db::open_database(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: crate::db::open_memory_database()?,
        })
    }

    fn write_tx(&mut self) -> Result<rusqlite::Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}

fn ensure_session_row(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO session_state (id, session_id, started_at) VALUES (1, ?1, ?2)",
        params![new_session_id(), now_rfc3339()],
    )?;
    Ok(())
}

impl SessionStore for SqliteStore {
    fn snapshot(&self) -> Result<SessionState> {
        let row = self
            .conn
            .query_row(
                "SELECT session_id, started_at, categories_shown FROM session_state WHERE id = 1",
                [],
                |r| {
                    Ok((
                        r.get::<_, String>(0)?,
                        r.get::<_, String>(1)?,
                        r.get::<_, bool>(2)?,
                    ))
                },
            )
            .optional()?;

        let loaded_packages = self
            .conn
            .prepare("SELECT name FROM loaded_packages ORDER BY name")?
            .query_map([], |r| r.get::<_, String>(0))?
            .collect::<rusqlite::Result<BTreeSet<_>>>()?;

        Ok(match row {
            Some((session_id, started_at, categories_shown)) => SessionState {
                session_id: Some(session_id),
                started_at: Some(started_at),
                loaded_packages,
                categories_shown,
            },
            None => SessionState {
                loaded_packages,
                ..Default::default()
            },
        })
    }

    fn begin(&mut self, session_id: &str, started_at: &str) -> Result<()> {
        let tx = self.write_tx()?;
        tx.execute("DELETE FROM loaded_packages", [])?;
        tx.execute(
            "INSERT OR REPLACE INTO session_state (id, session_id, started_at, categories_shown)
             VALUES (1, ?1, ?2, 0)",
            params![session_id, started_at],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let tx = self.write_tx()?;
        tx.execute("DELETE FROM loaded_packages", [])?;
        tx.execute("UPDATE session_state SET categories_shown = 0", [])?;
        tx.commit()?;
        Ok(())
    }

    fn add_loaded(&mut self, names: &[String]) -> Result<()> {
        let now = now_rfc3339();
        let tx = self.write_tx()?;
        ensure_session_row(&tx)?;
        {
            let mut stmt =
                tx.prepare("INSERT OR IGNORE INTO loaded_packages (name, loaded_at) VALUES (?1, ?2)")?;
            for name in names {
                stmt.execute(params![name, now])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn set_categories_shown(&mut self) -> Result<()> {
        let tx = self.write_tx()?;
        ensure_session_row(&tx)?;
        tx.execute("UPDATE session_state SET categories_shown = 1 WHERE id = 1", [])?;
        tx.commit()?;
        Ok(())
    }

    fn append_event(
        &mut self,
        tracking_id: &str,
        event: &TrackingEvent,
        require_search: bool,
    ) -> Result<()> {
        let payload = serde_json::to_string(event)?;
        let tx = self.write_tx()?;
        if require_search {
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM tracking_events WHERE tracking_id = ?1 AND kind = 'search')",
                [tracking_id],
                |r| r.get(0),
            )?;
            if !exists {
                return Err(TomeError::TrackingRecordNotFound(tracking_id.to_string()));
            }
        }
        tx.execute(
            "INSERT INTO tracking_events (tracking_id, kind, payload, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![tracking_id, event.kind(), payload, now_rfc3339()],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn events(&self, tracking_id: Option<&str>) -> Result<Vec<StoredEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT tracking_id, payload, created_at FROM tracking_events
             WHERE ?1 IS NULL OR tracking_id = ?1
             ORDER BY id",
        )?;
        let rows = stmt
            .query_map([tracking_id], |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut events = Vec::with_capacity(rows.len());
        for (tracking_id, payload, created_at) in rows {
            match serde_json::from_str::<TrackingEvent>(&payload) {
                Ok(event) => events.push(StoredEvent {
                    tracking_id,
                    event,
                    created_at,
                }),
                Err(e) => {
                    tracing::warn!(tracking_id = %tracking_id, error = %e, "skipping undecodable tracking event");
                }
            }
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tracking::{ReadEvent, SearchEvent};

    #[test]
    fn absent_state_reads_as_empty() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.snapshot().unwrap(), SessionState::default());
    }

    #[test]
    fn add_loaded_creates_session_lazily_and_unions() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.add_loaded(&["x".into(), "y".into()]).unwrap();
        store.add_loaded(&["y".into(), "z".into()]).unwrap();

        let state = store.snapshot().unwrap();
        assert!(state.session_id.unwrap().starts_with("session-"));
        assert_eq!(state.loaded_packages.len(), 3);
    }

    #[test]
    fn begin_resets_loaded_and_shown() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.add_loaded(&["x".into()]).unwrap();
        store.set_categories_shown().unwrap();
        store.begin("session-new", "2026-01-01T00:00:00Z").unwrap();

        let state = store.snapshot().unwrap();
        assert_eq!(state.session_id.as_deref(), Some("session-new"));
        assert!(state.loaded_packages.is_empty());
        assert!(!state.categories_shown);
    }

    #[test]
    fn append_requires_search_when_asked() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let read = TrackingEvent::Read(ReadEvent {
            read: vec!["a".into()],
        });
        let err = store.append_event("t1", &read, true).unwrap_err();
        assert!(matches!(err, TomeError::TrackingRecordNotFound(_)));

        store
            .append_event("t1", &TrackingEvent::Search(SearchEvent::default()), false)
            .unwrap();
        store.append_event("t1", &read, true).unwrap();
        store
            .append_event("t2", &TrackingEvent::Search(SearchEvent::default()), false)
            .unwrap();

        assert_eq!(store.events(Some("t1")).unwrap().len(), 2);
        assert_eq!(store.events(None).unwrap().len(), 3);
    }
}
